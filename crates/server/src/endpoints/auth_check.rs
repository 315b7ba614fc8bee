//! # GET /auth
//!
//! セッションCookieの値で署名検証とトークン検証（inspect）を再実行する。
//! 失敗時は `403 {"error":"unauthorized"}`。

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use login_types::{token_prefix, StatusResponse, VerifyMode};

use crate::auth::{validate_token, verify_signature};
use crate::config::AppState;
use crate::error::{LoginError, Unauthorized};
use crate::session::Session;

pub async fn handle_auth_check(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match check_session(&state, &headers).await {
        Ok(session) => {
            tracing::debug!(address = %session.address, "認証チェック成功");
            Json(StatusResponse::ok()).into_response()
        }
        Err(err) => {
            tracing::warn!(reason = %err, "認証チェックを拒否しました");
            Unauthorized(StatusCode::FORBIDDEN).into_response()
        }
    }
}

async fn check_session(state: &AppState, headers: &HeaderMap) -> Result<Session, LoginError> {
    let session = Session::from_headers(headers)?;

    if !verify_signature(&session.token, &session.signature, &session.address) {
        return Err(LoginError::SignatureMismatch);
    }
    validate_token(state, &session.token, &session.address, VerifyMode::Inspect)
        .await
        .inspect_err(|_| {
            tracing::debug!(token = %token_prefix(&session.token), "セッションのトークンが無効です");
        })?;

    Ok(session)
}
