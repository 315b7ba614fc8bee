//! # クライアント エラー型

use login_contract::ContractError;
use login_crypto::CryptoError;

/// ログインフローのエラー型。いずれもその試行を中断する。
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// ユーザーがウォレットの署名要求を拒否した
    #[error("署名がキャンセルされました")]
    Cancelled,
    /// ウォレットの署名処理に失敗
    #[error("ウォレットエラー: {0}")]
    Wallet(String),
    /// コントラクト呼び出しに失敗
    #[error("コントラクト呼び出しに失敗: {0}")]
    Contract(#[from] ContractError),
    #[error("暗号処理に失敗: {0}")]
    Crypto(#[from] CryptoError),
    /// サーバーとの通信に失敗
    #[error("HTTP通信に失敗: {0}")]
    Http(String),
    /// サーバーがログインを拒否した
    #[error("ログインが拒否されました (HTTP {0})")]
    Rejected(u16),
    /// クライアントとサーバーのコントラクトIDが異なる
    #[error("コントラクトIDが一致しません: クライアント {client}, サーバー {server}")]
    ContractMismatch { client: String, server: String },
    /// 設定不足・不正
    #[error("設定エラー: {0}")]
    Config(String),
    /// 既にログイン処理中
    #[error("ログイン処理中です")]
    Busy,
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}
