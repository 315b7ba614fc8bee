//! # 署名
//!
//! トークンはウォレット互換のため `0x` 付きHexで渡すが、署名対象は
//! `token.as_bytes()` そのもの。証明書の委任署名も同じウォレットで行う。

use login_crypto::{encode_hex, unix_timestamp, CertificateRequest, Credential};

use crate::error::ClientError;
use crate::wallet::{SignOutcome, WalletSigner};

async fn request_signature(wallet: &dyn WalletSigner, message: &[u8]) -> Result<String, ClientError> {
    match wallet.sign_raw(&encode_hex(message)).await {
        SignOutcome::Signed(signature) => Ok(signature),
        SignOutcome::Cancelled => Err(ClientError::Cancelled),
        SignOutcome::Failed(reason) => Err(ClientError::Wallet(reason)),
    }
}

/// トークンに署名する。
pub async fn sign_token(wallet: &dyn WalletSigner, token: &str) -> Result<String, ClientError> {
    request_signature(wallet, token.as_bytes()).await
}

/// ウォレットの委任署名でコントラクトクエリ用のクレデンシャルを発行する。
pub async fn derive_credential(
    wallet: &dyn WalletSigner,
    ttl_secs: u64,
) -> Result<Credential, ClientError> {
    let request = CertificateRequest::new(wallet.address(), unix_timestamp(), ttl_secs);
    let signature = request_signature(wallet, &request.sign_bytes()?).await?;
    Ok(request.into_credential(signature))
}
