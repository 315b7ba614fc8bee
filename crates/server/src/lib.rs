//! # Token Login Server
//!
//! ## 役割
//! - 署名検証（ローカル）
//! - トークン検証（コントラクトの `verifyToken`）
//! - セッションCookieの発行
//! - 認証チェック（Cookieの再検証）
//!
//! ## API エンドポイント
//! - `POST /api/login`: ログイン
//! - `GET /auth`: 認証チェック
//! - `GET /`: ヘルスチェック
//! - `GET /.well-known/login-info`: コントラクトID公開

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use config::{AppState, ServerConfig};
pub use error::LoginError;

use endpoints::{handle_auth_check, handle_health, handle_login, handle_login_info};

/// ルーターを構築する。
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/api/login", post(handle_login))
        .route("/auth", get(handle_auth_check))
        .route("/.well-known/login-info", get(handle_login_info))
        .with_state(state)
}
