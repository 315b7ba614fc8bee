//! # JSON-RPC コントラクトクライアント
//!
//! ノードのJSON-RPCエンドポイント経由でコントラクトを呼び出す。
//!
//! ## RPCメソッド
//! - `contract_getInfo [contractId]` → `{contractId, owner}`
//! - `contract_query [SignedQuery]` → `{"ok": ...}` | `{"err": ...}`
//!
//! 接続ごとに新しいHTTPクライアントを構築し、全リクエストにタイムアウトを設定する。

use std::time::Duration;

use login_types::{
    ContractInfo, ContractOutput, JsonRpcRequest, JsonRpcResponse, SignedQuery, RPC_GET_INFO,
    RPC_QUERY,
};

use crate::client::{ContractClient, ContractConnector};
use crate::error::ContractError;

/// RPCエンドポイントへの接続設定。
#[derive(Debug, Clone)]
pub struct RpcConnector {
    rpc_url: String,
    contract_id: String,
    timeout: Duration,
}

impl RpcConnector {
    pub fn new(rpc_url: &str, contract_id: &str, timeout: Duration) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            contract_id: contract_id.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ContractConnector for RpcConnector {
    fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// HTTPクライアントを構築し、`contract_getInfo` でコントラクトの存在とIDを確認する。
    async fn connect(&self) -> Result<Box<dyn ContractClient>, ContractError> {
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ContractError::Transport(format!("HTTPクライアントの構築に失敗: {e}")))?;

        let result = rpc_call(
            &http_client,
            &self.rpc_url,
            RPC_GET_INFO,
            vec![serde_json::json!(self.contract_id)],
        )
        .await?;
        let info: ContractInfo = serde_json::from_value(result)
            .map_err(|e| ContractError::InvalidResponse(format!("contract_getInfo: {e}")))?;

        if info.contract_id != self.contract_id {
            return Err(ContractError::ContractMismatch {
                expected: self.contract_id.clone(),
                actual: info.contract_id,
            });
        }
        tracing::debug!(
            rpc_url = %self.rpc_url,
            contract_id = %info.contract_id,
            owner = %info.owner,
            "コントラクトに接続しました"
        );

        Ok(Box::new(RpcContractClient {
            http_client,
            rpc_url: self.rpc_url.clone(),
            contract_id: info.contract_id,
        }))
    }
}

/// 1リクエスト分のRPC接続。
struct RpcContractClient {
    http_client: reqwest::Client,
    rpc_url: String,
    contract_id: String,
}

#[async_trait::async_trait]
impl ContractClient for RpcContractClient {
    fn contract_id(&self) -> &str {
        &self.contract_id
    }

    async fn query(&self, signed: SignedQuery) -> Result<ContractOutput, ContractError> {
        let params = serde_json::to_value(&signed)
            .map_err(|e| ContractError::InvalidResponse(format!("クエリのシリアライズに失敗: {e}")))?;
        let result = rpc_call(&self.http_client, &self.rpc_url, RPC_QUERY, vec![params]).await?;
        serde_json::from_value(result)
            .map_err(|e| ContractError::InvalidResponse(format!("contract_query: {e}")))
    }
}

/// JSON-RPCリクエストを送信し、`result` を返す。
async fn rpc_call(
    http_client: &reqwest::Client,
    rpc_url: &str,
    method: &str,
    params: Vec<serde_json::Value>,
) -> Result<serde_json::Value, ContractError> {
    let request = JsonRpcRequest::new(1, method, params);

    let resp = http_client
        .post(rpc_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ContractError::Transport(format!("{method}: {e}")))?;

    if !resp.status().is_success() {
        return Err(ContractError::Transport(format!(
            "{method}: HTTP {}",
            resp.status()
        )));
    }

    let body: JsonRpcResponse = resp
        .json()
        .await
        .map_err(|e| ContractError::InvalidResponse(format!("{method}: {e}")))?;

    if let Some(error) = body.error {
        return Err(ContractError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    body.result
        .ok_or_else(|| ContractError::InvalidResponse(format!("{method}: resultがありません")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use login_crypto::{unix_timestamp, Credential, Ed25519SigningKey};

    /// 固定レスポンスを返すモックRPCノードを起動する
    async fn spawn_mock_node(
        handler: fn(JsonRpcRequest) -> serde_json::Value,
    ) -> String {
        let app = Router::new().route(
            "/",
            post(move |Json(req): Json<JsonRpcRequest>| async move { Json(handler(req)) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        format!("http://{addr}")
    }

    fn rpc_result(id: u64, result: serde_json::Value) -> serde_json::Value {
        serde_json::json!({"jsonrpc": "2.0", "id": id, "result": result})
    }

    fn honest_node(req: JsonRpcRequest) -> serde_json::Value {
        match req.method.as_str() {
            RPC_GET_INFO => rpc_result(
                req.id,
                serde_json::json!({"contractId": req.params[0], "owner": "owner"}),
            ),
            RPC_QUERY => rpc_result(req.id, serde_json::json!({"ok": true})),
            _ => serde_json::json!({
                "jsonrpc": "2.0", "id": req.id,
                "error": {"code": -32601, "message": "method not found"}
            }),
        }
    }

    fn credential() -> Credential {
        let key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        Credential::derive(&key, unix_timestamp(), 300).unwrap()
    }

    #[tokio::test]
    async fn test_verify_token_over_rpc() {
        let url = spawn_mock_node(honest_node).await;
        let connector = RpcConnector::new(&url, "0xtoken", Duration::from_secs(5));

        let client = connector.connect().await.unwrap();
        let ok = client
            .verify_token(&credential(), "abc", "addr", login_types::VerifyMode::Redeem)
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_connect_rejects_mismatched_contract() {
        fn impostor(req: JsonRpcRequest) -> serde_json::Value {
            rpc_result(req.id, serde_json::json!({"contractId": "0xother", "owner": "o"}))
        }
        let url = spawn_mock_node(impostor).await;
        let connector = RpcConnector::new(&url, "0xtoken", Duration::from_secs(5));

        let result = connector.connect().await;
        assert!(matches!(result, Err(ContractError::ContractMismatch { .. })));
    }

    #[tokio::test]
    async fn test_rpc_error_object_surfaces() {
        fn failing(req: JsonRpcRequest) -> serde_json::Value {
            serde_json::json!({
                "jsonrpc": "2.0", "id": req.id,
                "error": {"code": -32000, "message": "contract not found"}
            })
        }
        let url = spawn_mock_node(failing).await;
        let connector = RpcConnector::new(&url, "0xtoken", Duration::from_secs(5));

        let result = connector.connect().await;
        assert!(matches!(result, Err(ContractError::Rpc { code: -32000, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let connector =
            RpcConnector::new("http://127.0.0.1:1", "0xtoken", Duration::from_secs(2));
        let result = connector.connect().await;
        assert!(matches!(result, Err(ContractError::Transport(_))));
    }
}
