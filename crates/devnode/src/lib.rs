//! # Token Login 開発用ノード
//!
//! トークンコントラクトをインメモリで実行し、JSON-RPCで公開する。
//! ローカル開発と結合テストで実チェーンの代わりに使用する。
//!
//! ## RPCメソッド
//! - `contract_getInfo [contractId]`
//! - `contract_query [SignedQuery]`

pub mod config;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use login_contract::{ContractError, InMemoryContract};
use login_crypto::unix_timestamp;
use login_types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, SignedQuery, RPC_GET_INFO, RPC_QUERY,
};

/// ノードのエラー型。JSON-RPCのエラーオブジェクトに変換される。
#[derive(Debug, thiserror::Error)]
pub enum DevnodeError {
    #[error("未対応のメソッド: {0}")]
    MethodNotFound(String),
    #[error("不正なパラメータ: {0}")]
    InvalidParams(String),
    #[error("コントラクトが見つかりません: {0}")]
    ContractNotFound(String),
    #[error("クエリが拒否されました: {0}")]
    QueryRejected(String),
    #[error("設定エラー: {0}")]
    Config(String),
}

impl DevnodeError {
    fn code(&self) -> i64 {
        match self {
            DevnodeError::MethodNotFound(_) => -32601,
            DevnodeError::InvalidParams(_) => -32602,
            DevnodeError::ContractNotFound(_) => -32001,
            DevnodeError::QueryRejected(_) => -32002,
            DevnodeError::Config(_) => -32603,
        }
    }
}

impl From<ContractError> for DevnodeError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::ContractMismatch { actual, .. } => DevnodeError::ContractNotFound(actual),
            other => DevnodeError::QueryRejected(other.to_string()),
        }
    }
}

/// RPCルーターを構築する。
pub fn router(contract: InMemoryContract) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .with_state(contract)
}

/// JSON-RPCリクエストを処理する。エラーもHTTP 200のJSON-RPCレスポンスとして返す。
pub async fn handle_rpc(
    State(contract): State<InMemoryContract>,
    Json(req): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let (result, error) = match dispatch(&contract, &req) {
        Ok(value) => (Some(value), None),
        Err(e) => {
            tracing::warn!(method = %req.method, error = %e, "RPCリクエストを拒否しました");
            (
                None,
                Some(JsonRpcError {
                    code: e.code(),
                    message: e.to_string(),
                }),
            )
        }
    };
    Json(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id: req.id,
        result,
        error,
    })
}

fn dispatch(
    contract: &InMemoryContract,
    req: &JsonRpcRequest,
) -> Result<serde_json::Value, DevnodeError> {
    match req.method.as_str() {
        RPC_GET_INFO => {
            let requested = req
                .params
                .first()
                .and_then(|v| v.as_str())
                .ok_or_else(|| DevnodeError::InvalidParams("contractIdが必要です".to_string()))?;
            if requested != contract.contract_id() {
                return Err(DevnodeError::ContractNotFound(requested.to_string()));
            }
            serde_json::to_value(contract.info())
                .map_err(|e| DevnodeError::InvalidParams(e.to_string()))
        }
        RPC_QUERY => {
            let param = req
                .params
                .first()
                .cloned()
                .ok_or_else(|| DevnodeError::InvalidParams("SignedQueryが必要です".to_string()))?;
            let signed: SignedQuery = serde_json::from_value(param)
                .map_err(|e| DevnodeError::InvalidParams(e.to_string()))?;
            let output = contract.execute(&signed, unix_timestamp())?;
            serde_json::to_value(output).map_err(|e| DevnodeError::InvalidParams(e.to_string()))
        }
        other => Err(DevnodeError::MethodNotFound(other.to_string())),
    }
}
