//! # ウォレット
//!
//! 署名要求はユーザーの承認待ちとなる中断点。結果は [`SignOutcome`] で返る。
//! ウォレットには `0x` 付きHexでペイロードを渡し、ウォレットはデコードした
//! 生バイト列に署名する。

use std::sync::Arc;

use login_crypto::{
    address_from_verifying_key, decode_hex, ed25519_sign, encode_signature, Ed25519SigningKey,
};

/// 署名要求の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// `0x` 付きHexの署名
    Signed(String),
    /// ユーザーが拒否した
    Cancelled,
    /// ウォレット内部のエラー
    Failed(String),
}

/// ブラウザ拡張等のウォレットの抽象化。
#[async_trait::async_trait]
pub trait WalletSigner: Send + Sync {
    /// 署名者アドレス（Base58）
    fn address(&self) -> &str;

    /// `0x` 付きHexのペイロードに署名する。
    async fn sign_raw(&self, payload_hex: &str) -> SignOutcome;
}

/// 署名ごとに呼ばれる承認関数。引数は署名対象のHex。
pub type Approval = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// ローカル鍵で署名するウォレット。
pub struct KeypairWallet {
    signing_key: Ed25519SigningKey,
    address: String,
    approval: Option<Approval>,
}

impl KeypairWallet {
    pub fn new(signing_key: Ed25519SigningKey) -> Self {
        let address = address_from_verifying_key(&signing_key.verifying_key());
        Self {
            signing_key,
            address,
            approval: None,
        }
    }

    pub fn generate() -> Self {
        Self::new(Ed25519SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// 署名前にユーザー承認を求める。
    pub fn with_approval(mut self, approval: Approval) -> Self {
        self.approval = Some(approval);
        self
    }
}

#[async_trait::async_trait]
impl WalletSigner for KeypairWallet {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_raw(&self, payload_hex: &str) -> SignOutcome {
        let payload = match decode_hex(payload_hex) {
            Ok(payload) => payload,
            Err(e) => return SignOutcome::Failed(e.to_string()),
        };

        if let Some(approve) = &self.approval {
            if !approve(payload_hex) {
                return SignOutcome::Cancelled;
            }
        }

        SignOutcome::Signed(encode_signature(&ed25519_sign(&self.signing_key, &payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use login_crypto::{encode_hex, verify_message_signature};

    #[tokio::test]
    async fn test_signs_decoded_bytes() {
        let wallet = KeypairWallet::generate();
        let outcome = wallet.sign_raw(&encode_hex(b"hello")).await;

        let SignOutcome::Signed(signature) = outcome else {
            panic!("expected signature, got {outcome:?}");
        };
        assert!(verify_message_signature(b"hello", &signature, wallet.address()).unwrap());
    }

    #[tokio::test]
    async fn test_declined_approval_cancels() {
        let wallet = KeypairWallet::generate().with_approval(Arc::new(|_: &str| false));
        assert_eq!(wallet.sign_raw("0x00").await, SignOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_non_hex_payload_fails() {
        let wallet = KeypairWallet::generate();
        assert!(matches!(wallet.sign_raw("0xnope").await, SignOutcome::Failed(_)));
    }
}
