//! # Login Server エラー型
//!
//! 失敗理由はログにのみ出力し、クライアントには `{"error":"unauthorized"}` だけを返す。

use axum::http::StatusCode;
use axum::Json;
use login_contract::ContractError;
use login_crypto::CryptoError;
use login_types::ErrorResponse;

use crate::auth::AttemptState;

/// ログイン・認証チェックのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// リクエストボディが不正
    #[error("不正なリクエスト: {0}")]
    MalformedRequest(String),
    /// セッションCookieが欠落
    #[error("Cookieがありません: {0}")]
    MissingCookie(&'static str),
    /// 署名がトークン・アドレスと一致しない
    #[error("署名がアドレスと一致しません")]
    SignatureMismatch,
    /// オペレーター証明書の生成失敗
    #[error("暗号処理に失敗: {0}")]
    Crypto(#[from] CryptoError),
    /// コントラクト呼び出しの失敗（接続・RPC・レスポンス不正）
    #[error("コントラクト呼び出しに失敗: {0}")]
    Contract(#[from] ContractError),
    /// コントラクト呼び出しのタイムアウト
    #[error("コントラクト呼び出しがタイムアウトしました")]
    Timeout,
    /// コントラクトがトークンを無効と判定
    #[error("トークンが無効です")]
    TokenRejected,
    /// ログイン試行の手順違反
    #[error("不正な状態遷移: {from:?} から {to}")]
    InvalidTransition {
        from: AttemptState,
        to: &'static str,
    },
    /// 設定エラー
    #[error("設定エラー: {0}")]
    Config(String),
}

/// 認証失敗レスポンス。ステータスはエンドポイントごとに異なる
/// （ログインは401、認証チェックは403）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized(pub StatusCode);

impl axum::response::IntoResponse for Unauthorized {
    fn into_response(self) -> axum::response::Response {
        (self.0, Json(ErrorResponse::unauthorized())).into_response()
    }
}
