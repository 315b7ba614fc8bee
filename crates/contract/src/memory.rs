//! # インメモリコントラクト
//!
//! プロセス内でトークンコントラクトを実行する。開発用ノード（login-devnode）と
//! テストで使用する。署名済みクエリの検証はRPC経由と同じ手順で行う。

use std::sync::{Arc, Mutex, MutexGuard};

use login_crypto::{unix_timestamp, verify_signed_query};
use login_types::{ContractInfo, ContractOutput, SignedQuery};

use crate::client::{ContractClient, ContractConnector};
use crate::error::ContractError;
use crate::token::TokenContract;

/// デプロイ済みコントラクト。クローンは同じ状態を共有する。
#[derive(Clone)]
pub struct InMemoryContract {
    contract_id: String,
    state: Arc<Mutex<TokenContract>>,
}

impl InMemoryContract {
    pub fn new(contract_id: &str, contract: TokenContract) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            state: Arc::new(Mutex::new(contract)),
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    fn lock(&self) -> MutexGuard<'_, TokenContract> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn info(&self) -> ContractInfo {
        ContractInfo {
            contract_id: self.contract_id.clone(),
            owner: self.lock().owner().to_string(),
        }
    }

    /// コントラクト状態を直接操作する。
    pub fn with_state<R>(&self, f: impl FnOnce(&mut TokenContract) -> R) -> R {
        f(&mut self.lock())
    }

    /// 署名済みクエリを検証して実行する。
    ///
    /// 宛先IDの不一致・証明書不正はクエリ自体の拒否（`Err`）、
    /// コントラクト内のエラーは `ContractOutput::Err`。
    pub fn execute(&self, signed: &SignedQuery, now: u64) -> Result<ContractOutput, ContractError> {
        if signed.query.contract_id != self.contract_id {
            return Err(ContractError::ContractMismatch {
                expected: self.contract_id.clone(),
                actual: signed.query.contract_id.clone(),
            });
        }
        let caller = verify_signed_query(signed, now)?;

        let output = self
            .lock()
            .execute(&caller, &signed.query.method, &signed.query.args, now);
        tracing::debug!(method = %signed.query.method, caller = %caller, "コントラクトクエリを実行しました");
        Ok(output)
    }

    pub fn connector(&self) -> InMemoryConnector {
        InMemoryConnector {
            contract: self.clone(),
        }
    }
}

/// インメモリコントラクトへの接続を生成する。
#[derive(Clone)]
pub struct InMemoryConnector {
    contract: InMemoryContract,
}

#[async_trait::async_trait]
impl ContractConnector for InMemoryConnector {
    fn contract_id(&self) -> &str {
        self.contract.contract_id()
    }

    async fn connect(&self) -> Result<Box<dyn ContractClient>, ContractError> {
        Ok(Box::new(InMemoryClient {
            contract: self.contract.clone(),
        }))
    }
}

struct InMemoryClient {
    contract: InMemoryContract,
}

#[async_trait::async_trait]
impl ContractClient for InMemoryClient {
    fn contract_id(&self) -> &str {
        self.contract.contract_id()
    }

    async fn query(&self, signed: SignedQuery) -> Result<ContractOutput, ContractError> {
        self.contract.execute(&signed, unix_timestamp())
    }
}
