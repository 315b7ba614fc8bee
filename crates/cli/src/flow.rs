//! # ログインフロー
//!
//! 1. サーバーのコントラクトIDを確認（不一致なら中断）
//! 2. ウォレットの委任署名でクレデンシャルを発行
//! 3. トークンをミント
//! 4. トークンに署名
//! 5. サーバーに送信
//!
//! いずれかが失敗した時点で中断し、以降の手順は実行しない。

use login_contract::ContractConnector;
use login_types::{token_prefix, LoginRequest};

use crate::error::ClientError;
use crate::minter::mint_token;
use crate::signer::{derive_credential, sign_token};
use crate::submitter::{LoginSession, LoginSubmitter};
use crate::wallet::WalletSigner;

/// クレデンシャルのデフォルト有効期間（秒）
pub const DEFAULT_CERT_TTL_SECS: u64 = 300;

pub struct LoginFlow<'a> {
    connector: &'a dyn ContractConnector,
    wallet: &'a dyn WalletSigner,
    submitter: LoginSubmitter,
    cert_ttl_secs: u64,
}

impl<'a> LoginFlow<'a> {
    pub fn new(
        connector: &'a dyn ContractConnector,
        wallet: &'a dyn WalletSigner,
        submitter: LoginSubmitter,
    ) -> Self {
        Self {
            connector,
            wallet,
            submitter,
            cert_ttl_secs: DEFAULT_CERT_TTL_SECS,
        }
    }

    pub fn with_cert_ttl(mut self, cert_ttl_secs: u64) -> Self {
        self.cert_ttl_secs = cert_ttl_secs;
        self
    }

    /// サーバーとクライアントが同じコントラクトを参照しているか確認する。
    pub async fn ensure_same_contract(&self) -> Result<(), ClientError> {
        let info = self.submitter.fetch_login_info().await?;
        let client_id = self.connector.contract_id();
        if info.contract_id != client_id {
            return Err(ClientError::ContractMismatch {
                client: client_id.to_string(),
                server: info.contract_id,
            });
        }
        Ok(())
    }

    pub async fn run(&self) -> Result<LoginSession, ClientError> {
        self.ensure_same_contract().await?;

        let credential = derive_credential(self.wallet, self.cert_ttl_secs).await?;
        let token = mint_token(self.connector, &credential).await?;
        tracing::debug!(
            address = %self.wallet.address(),
            token = %token_prefix(&token),
            "トークンをミントしました"
        );

        let signature = sign_token(self.wallet, &token).await?;
        let request = LoginRequest {
            token,
            signature,
            address: self.wallet.address().to_string(),
        };

        let session = self.submitter.submit(&request).await?;
        tracing::info!(address = %request.address, "ログインしました");
        Ok(session)
    }
}
