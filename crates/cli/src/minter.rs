//! # トークンのミント

use login_contract::{ContractClient, ContractConnector};
use login_crypto::Credential;

use crate::error::ClientError;

/// クレデンシャルのアドレスに紐づく新しいトークンをコントラクトから取得する。
pub async fn mint_token(
    connector: &dyn ContractConnector,
    credential: &Credential,
) -> Result<String, ClientError> {
    let client = connector.connect().await?;
    Ok(client.mint_token(credential).await?)
}
