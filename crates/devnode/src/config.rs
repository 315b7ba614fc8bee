//! # 開発用ノード設定
//!
//! ## 環境変数
//! - `DEVNODE_BIND`: リッスンアドレス（デフォルト `127.0.0.1:9944`）
//! - `CONTRACT_ID`: デプロイするコントラクトID（デフォルト `0xdevnode`）
//! - `CONTRACT_OWNER`: 所有者アドレス（Base58）。未設定時はランダム生成
//! - `CONTRACT_SECRET_KEY`: トークン用秘密鍵。未設定時はランダム生成
//! - `TOKEN_TTL_SECS`: 未使用トークンの有効期間（デフォルト 300）

use login_contract::{InMemoryContract, TokenContract, DEFAULT_TOKEN_TTL_SECS};
use login_crypto::{address_from_verifying_key, parse_address, Ed25519SigningKey};

use crate::DevnodeError;

pub struct DevnodeConfig {
    pub bind: String,
    pub contract_id: String,
    pub owner: String,
    pub secret_key: String,
    pub token_ttl_secs: u64,
}

impl DevnodeConfig {
    pub fn from_env() -> Result<Self, DevnodeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DevnodeError> {
        let bind = lookup("DEVNODE_BIND").unwrap_or_else(|| "127.0.0.1:9944".to_string());
        let contract_id = lookup("CONTRACT_ID").unwrap_or_else(|| "0xdevnode".to_string());

        let token_ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(value) => value.trim().parse().map_err(|_| {
                DevnodeError::Config(format!("TOKEN_TTL_SECSの値が不正です: {value}"))
            })?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let owner = match lookup("CONTRACT_OWNER") {
            Some(owner) => {
                parse_address(&owner)
                    .map_err(|e| DevnodeError::Config(format!("CONTRACT_OWNER: {e}")))?;
                owner
            }
            None => {
                let key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
                let owner = address_from_verifying_key(&key.verifying_key());
                tracing::warn!(
                    owner = %owner,
                    "CONTRACT_OWNER未設定: ランダムな所有者を使用します（所有者専用メソッドは実行できません）"
                );
                owner
            }
        };

        let secret_key = lookup("CONTRACT_SECRET_KEY").unwrap_or_else(|| {
            tracing::warn!("CONTRACT_SECRET_KEY未設定: ランダムな秘密鍵を生成します");
            hex::encode(rand::random::<[u8; 32]>())
        });

        Ok(Self {
            bind,
            contract_id,
            owner,
            secret_key,
            token_ttl_secs,
        })
    }

    /// 設定どおりにコントラクトをデプロイする。
    pub fn deploy(&self) -> InMemoryContract {
        InMemoryContract::new(
            &self.contract_id,
            TokenContract::new(&self.owner, &self.secret_key).with_token_ttl(self.token_ttl_secs),
        )
    }
}
