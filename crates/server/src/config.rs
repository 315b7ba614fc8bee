//! # サーバー設定・共有状態
//!
//! 環境変数からの設定読み込みとサーバーの共有状態の定義。
//! 共有状態は起動後に変更されない。

use std::time::Duration;

use login_contract::{ContractConnector, RpcConnector};
use login_crypto::{
    address_from_verifying_key, signing_key_from_hex, unix_timestamp, Credential,
    Ed25519SigningKey,
};

use crate::error::LoginError;

/// サーバー設定。
pub struct ServerConfig {
    /// リッスンアドレス
    pub bind_addr: String,
    /// コントラクトノードのJSON-RPC URL
    pub rpc_url: String,
    /// トークン検証に使用するコントラクトID
    pub contract_id: String,
    /// オペレーター証明書の署名鍵
    pub operator_key: Ed25519SigningKey,
    /// コントラクト呼び出し1回あたりのタイムアウト
    pub rpc_timeout: Duration,
    /// オペレーター証明書の有効期間（秒）
    pub cert_ttl_secs: u64,
    /// Cookieに `Secure` 属性を付与するか
    pub cookie_secure: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, LoginError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を構築する。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoginError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let rpc_url =
            lookup("CONTRACT_RPC_URL").unwrap_or_else(|| "http://127.0.0.1:9944".to_string());

        let contract_id = lookup("CONTRACT_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LoginError::Config("CONTRACT_IDが未設定です".to_string()))?;

        // クライアントとサーバーで異なるコントラクトを参照するとログインが必ず失敗する
        if let Some(client_id) = lookup("CLIENT_CONTRACT_ID") {
            if client_id != contract_id {
                return Err(LoginError::Config(format!(
                    "CLIENT_CONTRACT_ID ({client_id}) が CONTRACT_ID ({contract_id}) と一致しません"
                )));
            }
        }

        let operator_key = match lookup("OPERATOR_SIGNING_KEY") {
            Some(key_hex) => signing_key_from_hex(&key_hex)
                .map_err(|e| LoginError::Config(format!("OPERATOR_SIGNING_KEY: {e}")))?,
            None => {
                tracing::warn!(
                    "OPERATOR_SIGNING_KEYが未設定です。ランダムキーを生成します（開発環境用）"
                );
                Ed25519SigningKey::generate(&mut rand::rngs::OsRng)
            }
        };

        let rpc_timeout_secs = parse_or(&lookup, "RPC_TIMEOUT_SECS", 10)?;
        let cert_ttl_secs = parse_or(&lookup, "CERT_TTL_SECS", 300)?;
        let cookie_secure = parse_or(&lookup, "COOKIE_SECURE", false)?;

        Ok(Self {
            bind_addr,
            rpc_url,
            contract_id,
            operator_key,
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            cert_ttl_secs,
            cookie_secure,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, LoginError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| LoginError::Config(format!("{key}の値が不正です: {value}"))),
        None => Ok(default),
    }
}

/// サーバーの共有状態。
pub struct AppState {
    /// コントラクト接続（リクエストごとに `connect` する）
    pub connector: Box<dyn ContractConnector>,
    /// オペレーター証明書の署名鍵
    pub operator_key: Ed25519SigningKey,
    pub rpc_timeout: Duration,
    pub cert_ttl_secs: u64,
    pub cookie_secure: bool,
}

impl AppState {
    /// JSON-RPC接続を使用する状態を構築する。
    pub fn from_config(config: ServerConfig) -> Self {
        let connector = RpcConnector::new(&config.rpc_url, &config.contract_id, config.rpc_timeout);
        Self {
            connector: Box::new(connector),
            operator_key: config.operator_key,
            rpc_timeout: config.rpc_timeout,
            cert_ttl_secs: config.cert_ttl_secs,
            cookie_secure: config.cookie_secure,
        }
    }

    pub fn contract_id(&self) -> &str {
        self.connector.contract_id()
    }

    pub fn operator_address(&self) -> String {
        address_from_verifying_key(&self.operator_key.verifying_key())
    }

    /// コントラクトクエリ用のオペレーター証明書を発行する。
    pub fn operator_credential(&self) -> Result<Credential, LoginError> {
        Ok(Credential::derive(
            &self.operator_key,
            unix_timestamp(),
            self.cert_ttl_secs,
        )?)
    }
}
