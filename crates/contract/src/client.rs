//! # コントラクトクライアント
//!
//! ## 抽象化
//! - [`ContractConnector`]: リクエストごとに新しいクライアントを生成する
//! - [`ContractClient`]: 1回の接続内で署名済みクエリを送信する
//!
//! 接続はリクエスト間で共有しない。チェーン状態はクエリ時点のものを使う。

use login_crypto::{unix_timestamp, Credential};
use login_types::{methods, ContractOutput, ContractQuery, SignedQuery, VerifyMode};

use crate::error::ContractError;

/// リクエストスコープのコントラクト接続。
#[async_trait::async_trait]
pub trait ContractClient: Send + Sync {
    /// 接続先コントラクトID
    fn contract_id(&self) -> &str;

    /// 署名済みクエリを送信し、実行結果を返す。
    async fn query(&self, signed: SignedQuery) -> Result<ContractOutput, ContractError>;

    /// クレデンシャルでクエリに署名してメソッドを呼び出す。
    /// コントラクトが `{"err": ...}` を返した場合は `Reverted`。
    async fn query_contract_method(
        &self,
        credential: &Credential,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ContractError> {
        let query = ContractQuery {
            contract_id: self.contract_id().to_string(),
            method: method.to_string(),
            args,
            issued_at: unix_timestamp(),
            nonce: rand::random(),
        };
        let signed = credential.sign_query(query)?;

        match self.query(signed).await? {
            ContractOutput::Ok(value) => Ok(value),
            ContractOutput::Err(reason) => Err(ContractError::Reverted(reason)),
        }
    }

    /// クレデンシャルのアドレスに紐づくトークンを発行する。
    async fn mint_token(&self, credential: &Credential) -> Result<String, ContractError> {
        let value = self
            .query_contract_method(credential, methods::CREATE_TOKEN, serde_json::json!({}))
            .await?;
        value.as_str().map(str::to_string).ok_or_else(|| {
            ContractError::InvalidResponse(format!("createTokenの結果が文字列ではありません: {value}"))
        })
    }

    /// トークンが `address` に対して有効かを問い合わせる。
    async fn verify_token(
        &self,
        credential: &Credential,
        token: &str,
        address: &str,
        mode: VerifyMode,
    ) -> Result<bool, ContractError> {
        let args = serde_json::json!({
            "token": token,
            "accountId": address,
            "mode": mode,
        });
        let value = self
            .query_contract_method(credential, methods::VERIFY_TOKEN, args)
            .await?;
        value.as_bool().ok_or_else(|| {
            ContractError::InvalidResponse(format!("verifyTokenの結果が真偽値ではありません: {value}"))
        })
    }
}

/// コントラクトへの接続を生成する。
#[async_trait::async_trait]
pub trait ContractConnector: Send + Sync {
    /// 接続先として設定されたコントラクトID
    fn contract_id(&self) -> &str;

    /// 新しい接続を開く。
    async fn connect(&self) -> Result<Box<dyn ContractClient>, ContractError>;
}
