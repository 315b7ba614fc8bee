//! # POST /api/login
//!
//! 署名検証 → トークン検証（redeem） → セッション発行。
//! 失敗時は理由を問わず `401 {"error":"unauthorized"}`、Cookieは発行しない。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use login_types::{token_prefix, LoginRequest, StatusResponse};

use crate::auth::LoginAttempt;
use crate::config::AppState;
use crate::error::{LoginError, Unauthorized};
use crate::session::Session;

pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = LoginError::MalformedRequest(rejection.body_text());
            tracing::warn!(reason = %err, "ログインを拒否しました");
            return Unauthorized(StatusCode::UNAUTHORIZED).into_response();
        }
    };

    let mut attempt = LoginAttempt::new(request);
    match run_attempt(&state, &mut attempt).await {
        Ok(session) => {
            tracing::info!(
                address = %session.address,
                token = %token_prefix(&session.token),
                "ログイン成功"
            );
            let cookies = session
                .set_cookie_headers(state.cookie_secure)
                .into_iter()
                .map(|cookie| (header::SET_COOKIE, cookie));
            (AppendHeaders(cookies), Json(StatusResponse::ok())).into_response()
        }
        Err(err) => {
            tracing::warn!(
                address = %attempt.request().address,
                token = %token_prefix(&attempt.request().token),
                state = ?attempt.state(),
                reason = %err,
                "ログインを拒否しました"
            );
            Unauthorized(StatusCode::UNAUTHORIZED).into_response()
        }
    }
}

async fn run_attempt(state: &AppState, attempt: &mut LoginAttempt) -> Result<Session, LoginError> {
    attempt.check_signature()?;
    attempt.validate_token(state).await?;
    attempt.issue_session()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_helpers::*;
    use login_crypto::{ed25519_sign, encode_signature, Ed25519SigningKey};
    use std::time::Duration;

    async fn login(state: Arc<AppState>, request: LoginRequest) -> Response {
        handle_login(State(state), Ok(Json(request))).await
    }

    #[tokio::test]
    async fn test_valid_login_sets_session_cookies() {
        let fx = Fixture::new();
        let request = fx.mint_and_sign().await;

        let resp = login(fx.state.clone(), request.clone()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookies = set_cookies(&resp);
        assert_eq!(cookies.len(), 3);
        assert!(cookies.contains(&format!("token={}; Path=/; HttpOnly; SameSite=Lax", request.token)));
        assert!(cookies.contains(&format!("address={}; Path=/; HttpOnly; SameSite=Lax", request.address)));
        assert_eq!(body_json(resp).await, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_replay_rejected() {
        let fx = Fixture::new();
        let request = fx.mint_and_sign().await;

        assert_eq!(login(fx.state.clone(), request.clone()).await.status(), StatusCode::OK);

        let replay = login(fx.state.clone(), request).await;
        assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&replay).is_empty());
    }

    /// 同じリクエストを同時に送っても、成功するのは1件だけ
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_logins_redeem_once() {
        let fx = Fixture::new();
        let request = fx.mint_and_sign().await;

        let (first, second) = tokio::join!(
            tokio::spawn(login(fx.state.clone(), request.clone())),
            tokio::spawn(login(fx.state.clone(), request.clone())),
        );
        let statuses = [first.unwrap().status(), second.unwrap().status()];

        let successes = statuses.iter().filter(|s| **s == StatusCode::OK).count();
        assert_eq!(successes, 1, "statuses: {statuses:?}");
        assert!(statuses.contains(&StatusCode::UNAUTHORIZED));
        assert_eq!(
            fx.contract.with_state(|c| c.token_state(&request.token)),
            Some(login_contract::TokenState::Redeemed)
        );
    }

    #[tokio::test]
    async fn test_wrong_address_signature_rejected_before_contract() {
        let fx = Fixture::new();
        let mut request = fx.mint_and_sign().await;
        let intruder = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        request.signature = encode_signature(&ed25519_sign(&intruder, request.token.as_bytes()));
        let connects_before = fx.connects();

        let resp = login(fx.state.clone(), request).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&resp).is_empty());
        assert_eq!(body_json(resp).await, serde_json::json!({"error": "unauthorized"}));
        // 署名検証で拒否され、コントラクトには問い合わせない
        assert_eq!(fx.connects(), connects_before);
    }

    /// 他人のトークンに自分の鍵で署名しても、アドレス束縛で拒否される
    #[tokio::test]
    async fn test_token_minted_for_other_address_rejected() {
        let fx = Fixture::new();
        let victim_request = fx.mint_and_sign().await;

        let attacker = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        let request = sign_as(&attacker, &victim_request.token);

        let resp = login(fx.state.clone(), request).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // 被害者のトークンは消費されていない
        assert_eq!(login(fx.state.clone(), victim_request).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unminted_token_rejected() {
        let fx = Fixture::new();
        let request = sign_as(&fx.user, &"ab".repeat(32));

        let resp = login(fx.state.clone(), request).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unreachable_rpc_rejected() {
        let fx = Fixture::new();
        let request = fx.mint_and_sign().await;
        let connector = login_contract::RpcConnector::new(
            "http://127.0.0.1:1",
            CONTRACT_ID,
            Duration::from_secs(2),
        );
        let state = Arc::new(state_with_connector(Box::new(connector), Duration::from_secs(2)));

        let resp = login(state, request).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&resp).is_empty());
    }

    #[tokio::test]
    async fn test_slow_rpc_times_out() {
        let fx = Fixture::new();
        let request = fx.mint_and_sign().await;
        let url = spawn_slow_rpc(Duration::from_secs(5)).await;
        let connector =
            login_contract::RpcConnector::new(&url, CONTRACT_ID, Duration::from_secs(30));
        let state = Arc::new(state_with_connector(Box::new(connector), Duration::from_millis(300)));

        let started = std::time::Instant::now();
        let resp = login(state, request).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unauthorized() {
        let fx = Fixture::new();
        let url = spawn_server(fx.state.clone()).await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{url}/api/login"))
            .header("content-type", "application/json")
            .body(r#"{"token": "abc"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get("set-cookie").is_none());

        let resp = http
            .post(format!("{url}/api/login"))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"error": "unauthorized"}));
    }
}
