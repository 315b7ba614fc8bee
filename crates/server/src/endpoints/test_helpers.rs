//! # テスト用ヘルパー
//!
//! インメモリコントラクトに接続したサーバー状態と、接続回数を数えるコネクター。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use axum::Json;
use login_contract::{
    ContractClient, ContractConnector, ContractError, InMemoryConnector, InMemoryContract,
    TokenContract,
};
use login_crypto::{
    address_from_verifying_key, ed25519_sign, encode_signature, unix_timestamp, Credential,
    Ed25519SigningKey,
};
use login_types::LoginRequest;

use crate::config::AppState;

pub const CONTRACT_ID: &str = "0xlogin-test";

/// `connect` の呼び出し回数を記録するコネクター
pub struct CountingConnector {
    inner: InMemoryConnector,
    connects: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ContractConnector for CountingConnector {
    fn contract_id(&self) -> &str {
        self.inner.contract_id()
    }

    async fn connect(&self) -> Result<Box<dyn ContractClient>, ContractError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.inner.connect().await
    }
}

/// 応答しないコントラクトノード
pub struct StallingConnector;

#[async_trait::async_trait]
impl ContractConnector for StallingConnector {
    fn contract_id(&self) -> &str {
        CONTRACT_ID
    }

    async fn connect(&self) -> Result<Box<dyn ContractClient>, ContractError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ContractError::Transport("unreachable".to_string()))
    }
}

/// デプロイ済みコントラクトとサーバー状態。コントラクト所有者はオペレーター。
pub struct Fixture {
    pub contract: InMemoryContract,
    pub state: Arc<AppState>,
    pub user: Ed25519SigningKey,
    pub address: String,
    connects: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new() -> Self {
        let operator_key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        let owner = address_from_verifying_key(&operator_key.verifying_key());
        let contract = InMemoryContract::new(CONTRACT_ID, TokenContract::new(&owner, "secret_key"));

        let connects = Arc::new(AtomicUsize::new(0));
        let connector = CountingConnector {
            inner: contract.connector(),
            connects: connects.clone(),
        };
        let state = Arc::new(AppState {
            connector: Box::new(connector),
            operator_key,
            rpc_timeout: Duration::from_secs(5),
            cert_ttl_secs: 300,
            cookie_secure: false,
        });

        let user = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        let address = address_from_verifying_key(&user.verifying_key());
        Self {
            contract,
            state,
            user,
            address,
            connects,
        }
    }

    /// サーバー経由の `connect` 回数
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// ユーザーとしてトークンをミントし、署名したログインリクエストを返す
    pub async fn mint_and_sign(&self) -> LoginRequest {
        let credential = Credential::derive(&self.user, unix_timestamp(), 300).unwrap();
        let client = self.contract.connector().connect().await.unwrap();
        let token = client.mint_token(&credential).await.unwrap();
        sign_as(&self.user, &token)
    }
}

pub fn sign_as(key: &Ed25519SigningKey, token: &str) -> LoginRequest {
    LoginRequest {
        token: token.to_string(),
        signature: encode_signature(&ed25519_sign(key, token.as_bytes())),
        address: address_from_verifying_key(&key.verifying_key()),
    }
}

pub fn state_with_connector(connector: Box<dyn ContractConnector>, rpc_timeout: Duration) -> AppState {
    AppState {
        connector,
        operator_key: Ed25519SigningKey::generate(&mut rand::rngs::OsRng),
        rpc_timeout,
        cert_ttl_secs: 300,
        cookie_secure: false,
    }
}

pub fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// `Set-Cookie` の値をブラウザと同様に `Cookie` ヘッダーにまとめる
pub fn cookie_headers(set_cookies: &[String]) -> HeaderMap {
    let pairs: Vec<&str> = set_cookies
        .iter()
        .map(|c| c.split(';').next().unwrap())
        .collect();
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(&pairs.join("; ")).unwrap());
    headers
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// ルーターを `127.0.0.1:0` で起動し、ベースURLを返す
pub async fn spawn_server(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, crate::router(state)).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}")
}

/// 全リクエストに `delay` 後に応答するRPCノードを起動する
pub async fn spawn_slow_rpc(delay: Duration) -> String {
    let app = axum::Router::new().route(
        "/",
        axum::routing::post(move || async move {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": null}))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}")
}
