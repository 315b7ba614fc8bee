//! # トークンコントラクト
//!
//! ログイントークンの発行・検証を行うコントラクトロジック。
//! 呼び出し元アドレスは署名済みクエリの証明書から導出済みのものを受け取る。
//!
//! ## トークン
//! `hex(HMAC-SHA256(secret_key, address || nonce_be64))`
//!
//! - `nonce` はミントごとに増加するため、同じアドレスでも毎回異なるトークンになる
//! - `secret_key` をローテーションすると未使用・使用済みを問わず全トークンが無効になる
//!
//! ## 状態遷移
//! `Issued --verify(redeem)--> Redeemed`、所有者による `revoke` で `Revoked`。
//! 状態を変える `redeem` は所有者（サーバーのオペレーター）のみ呼び出せる。

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use login_types::{methods, ContractOutput, VerifyMode};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 未使用トークンの有効期間（秒）
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 300;

/// トークンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// ミント済み・未使用
    Issued,
    /// ログインで消費済み（セッション確認に使用可能）
    Redeemed,
    /// 所有者により無効化済み
    Revoked,
}

/// コントラクトが `{"err": ...}` として返すエラー。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractRevert {
    #[error("NotOwner")]
    NotOwner,
    #[error("InvalidArgs")]
    InvalidArgs,
    #[error("UnknownMethod")]
    UnknownMethod,
    #[error("InvalidSecretKey")]
    InvalidSecretKey,
}

#[derive(Debug, Clone)]
struct TokenRecord {
    account: String,
    nonce: u64,
    minted_at: u64,
    state: TokenState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyTokenArgs {
    token: String,
    account_id: String,
    mode: VerifyMode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetSecretKeyArgs {
    secret_key: String,
}

#[derive(Deserialize)]
struct RevokeTokenArgs {
    token: String,
}

/// トークンコントラクトの状態。
#[derive(Debug)]
pub struct TokenContract {
    owner: String,
    secret_key: String,
    token_ttl_secs: u64,
    next_nonce: u64,
    tokens: HashMap<String, TokenRecord>,
}

impl TokenContract {
    /// コントラクトをデプロイする。`owner` はデプロイ者のアドレス。
    pub fn new(owner: &str, secret_key: &str) -> Self {
        Self {
            owner: owner.to_string(),
            secret_key: secret_key.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            next_nonce: 0,
            tokens: HashMap::new(),
        }
    }

    /// 未使用トークンの有効期間を変更する。
    pub fn with_token_ttl(mut self, token_ttl_secs: u64) -> Self {
        self.token_ttl_secs = token_ttl_secs;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn ensure_owner(&self, caller: &str) -> Result<(), ContractRevert> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(ContractRevert::NotOwner)
        }
    }

    pub fn get_account_id(&self, caller: &str) -> String {
        caller.to_string()
    }

    pub fn get_secret_key(&self, caller: &str) -> Result<String, ContractRevert> {
        self.ensure_owner(caller)?;
        Ok(self.secret_key.clone())
    }

    /// 秘密鍵をローテーションする。発行済みトークンは全て無効になる。
    pub fn set_secret_key(&mut self, caller: &str, secret_key: &str) -> Result<String, ContractRevert> {
        self.ensure_owner(caller)?;
        if secret_key.is_empty() {
            return Err(ContractRevert::InvalidSecretKey);
        }
        self.secret_key = secret_key.to_string();
        Ok(self.secret_key.clone())
    }

    fn mac(&self, account: &str, nonce: u64) -> Result<HmacSha256, ContractRevert> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret_key.as_bytes())
            .map_err(|_| ContractRevert::InvalidSecretKey)?;
        mac.update(account.as_bytes());
        mac.update(&nonce.to_be_bytes());
        Ok(mac)
    }

    /// 呼び出し元アドレスに紐づくトークンを発行する。
    pub fn create_token(&mut self, caller: &str, now: u64) -> Result<String, ContractRevert> {
        self.prune_expired(now);

        let nonce = self.next_nonce;
        self.next_nonce += 1;
        let token = hex::encode(self.mac(caller, nonce)?.finalize().into_bytes());

        self.tokens.insert(
            token.clone(),
            TokenRecord {
                account: caller.to_string(),
                nonce,
                minted_at: now,
                state: TokenState::Issued,
            },
        );
        Ok(token)
    }

    /// トークンが `account` に対して有効かを検証する。
    ///
    /// - `Redeem`: 所有者のみ。`Issued` かつ有効期間内なら `Redeemed` に遷移して `true`
    /// - `Inspect`: `Redeemed` なら `true`（状態は変えない）
    pub fn verify_token(
        &mut self,
        caller: &str,
        token: &str,
        account: &str,
        mode: VerifyMode,
        now: u64,
    ) -> Result<bool, ContractRevert> {
        if mode == VerifyMode::Redeem {
            self.ensure_owner(caller)?;
        }
        Ok(self.check_token(token, account, mode, now))
    }

    fn check_token(&mut self, token: &str, account: &str, mode: VerifyMode, now: u64) -> bool {
        let Some(record) = self.tokens.get(token) else {
            return false;
        };
        if record.account != account {
            return false;
        }

        let Ok(token_bytes) = hex::decode(token) else {
            return false;
        };
        let authentic = self
            .mac(account, record.nonce)
            .map(|mac| mac.verify_slice(&token_bytes).is_ok())
            .unwrap_or(false);
        if !authentic {
            return false;
        }

        let expired = now > record.minted_at.saturating_add(self.token_ttl_secs);
        match (mode, record.state) {
            (VerifyMode::Redeem, TokenState::Issued) if !expired => {
                if let Some(record) = self.tokens.get_mut(token) {
                    record.state = TokenState::Redeemed;
                }
                true
            }
            (VerifyMode::Inspect, TokenState::Redeemed) => true,
            _ => false,
        }
    }

    /// トークンを無効化する（所有者のみ）。
    pub fn revoke_token(&mut self, caller: &str, token: &str) -> Result<bool, ContractRevert> {
        self.ensure_owner(caller)?;
        Ok(match self.tokens.get_mut(token) {
            Some(record) => {
                record.state = TokenState::Revoked;
                true
            }
            None => false,
        })
    }

    pub fn token_state(&self, token: &str) -> Option<TokenState> {
        self.tokens.get(token).map(|record| record.state)
    }

    /// 有効期限切れの未使用トークンを削除する。
    fn prune_expired(&mut self, now: u64) {
        let ttl = self.token_ttl_secs;
        self.tokens.retain(|_, record| {
            record.state != TokenState::Issued || now <= record.minted_at.saturating_add(ttl)
        });
    }

    /// メソッド名とJSON引数でコントラクトを実行する。
    pub fn execute(
        &mut self,
        caller: &str,
        method: &str,
        args: &serde_json::Value,
        now: u64,
    ) -> ContractOutput {
        let result = match method {
            methods::CREATE_TOKEN => self.create_token(caller, now).map(serde_json::Value::from),
            methods::VERIFY_TOKEN => parse_args::<VerifyTokenArgs>(args)
                .and_then(|a| self.verify_token(caller, &a.token, &a.account_id, a.mode, now))
                .map(serde_json::Value::from),
            methods::GET_ACCOUNT_ID => Ok(serde_json::Value::from(self.get_account_id(caller))),
            methods::GET_SECRET_KEY => self.get_secret_key(caller).map(serde_json::Value::from),
            methods::SET_SECRET_KEY => parse_args::<SetSecretKeyArgs>(args)
                .and_then(|a| self.set_secret_key(caller, &a.secret_key))
                .map(serde_json::Value::from),
            methods::REVOKE_TOKEN => parse_args::<RevokeTokenArgs>(args)
                .and_then(|a| self.revoke_token(caller, &a.token))
                .map(serde_json::Value::from),
            _ => Err(ContractRevert::UnknownMethod),
        };

        match result {
            Ok(value) => ContractOutput::Ok(value),
            Err(revert) => ContractOutput::Err(revert.to_string()),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: &serde_json::Value) -> Result<T, ContractRevert> {
    serde_json::from_value(args.clone()).map_err(|_| ContractRevert::InvalidArgs)
}
