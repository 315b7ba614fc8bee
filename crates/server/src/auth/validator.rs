//! # トークン検証
//!
//! 呼び出しごとに新しいコントラクト接続を開き、オペレーター証明書で
//! `verifyToken` を問い合わせる。結果はキャッシュしない。
//! 接続失敗・RPCエラー・タイムアウト・不正なレスポンスは全て検証失敗として扱う。

use login_contract::{ContractClient, ContractConnector};
use login_types::{token_prefix, VerifyMode};

use crate::config::AppState;
use crate::error::LoginError;

/// トークンが `address` に対して有効であることをコントラクトに確認する。
pub async fn validate_token(
    state: &AppState,
    token: &str,
    address: &str,
    mode: VerifyMode,
) -> Result<(), LoginError> {
    let credential = state.operator_credential()?;

    let check = async {
        let client = state.connector.connect().await?;
        client.verify_token(&credential, token, address, mode).await
    };
    let valid = tokio::time::timeout(state.rpc_timeout, check)
        .await
        .map_err(|_| LoginError::Timeout)??;

    if valid {
        tracing::debug!(token = %token_prefix(token), address = %address, ?mode, "トークン検証成功");
        Ok(())
    } else {
        Err(LoginError::TokenRejected)
    }
}
