//! # コントラクトクライアント エラー型

use login_crypto::CryptoError;

/// コントラクト呼び出しのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// RPCエンドポイントへの通信失敗（接続拒否、タイムアウト、HTTPエラー）
    #[error("RPC通信に失敗: {0}")]
    Transport(String),
    /// RPCノードがエラーオブジェクトを返した
    #[error("RPCエラー (code {code}): {message}")]
    Rpc { code: i64, message: String },
    /// コントラクトが `{"err": ...}` を返した
    #[error("コントラクトがエラーを返しました: {0}")]
    Reverted(String),
    /// レスポンスの形式が不正
    #[error("不正なレスポンス: {0}")]
    InvalidResponse(String),
    /// クレデンシャルの生成・検証に失敗
    #[error("クレデンシャルが不正: {0}")]
    Credential(#[from] CryptoError),
    /// 接続先のコントラクトIDが設定と一致しない
    #[error("コントラクトIDが一致しません: 期待値 {expected}, 実際 {actual}")]
    ContractMismatch { expected: String, actual: String },
}
