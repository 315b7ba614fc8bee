//! テスト用の開発ノード・ログインサーバー・モックサーバー

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use login_contract::{InMemoryContract, RpcConnector, TokenContract};
use login_crypto::{address_from_verifying_key, Ed25519SigningKey};
use login_server::AppState;
use login_types::{ErrorResponse, LoginInfo};

pub const CONTRACT_ID: &str = "0xcli-test";

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}")
}

/// 開発ノードとログインサーバーを起動する。オペレーターがコントラクト所有者。
pub struct Deployment {
    pub contract: InMemoryContract,
    pub rpc_url: String,
    pub server_url: String,
}

impl Deployment {
    pub async fn start() -> Self {
        let operator_key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        let owner = address_from_verifying_key(&operator_key.verifying_key());
        let contract = InMemoryContract::new(CONTRACT_ID, TokenContract::new(&owner, "secret_key"));
        let rpc_url = serve(login_devnode::router(contract.clone())).await;

        let state = AppState {
            connector: Box::new(RpcConnector::new(&rpc_url, CONTRACT_ID, Duration::from_secs(5))),
            operator_key,
            rpc_timeout: Duration::from_secs(5),
            cert_ttl_secs: 300,
            cookie_secure: false,
        };
        let server_url = serve(login_server::router(Arc::new(state))).await;

        Self {
            contract,
            rpc_url,
            server_url,
        }
    }

    pub fn connector(&self) -> RpcConnector {
        RpcConnector::new(&self.rpc_url, CONTRACT_ID, Duration::from_secs(5))
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/login", self.server_url)
    }
}

/// `contract_id` を公開し、`/api/login` の受信回数を数えるモックサーバー
pub async fn spawn_counting_server(contract_id: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new()
        .route(
            "/.well-known/login-info",
            get(move || async move {
                Json(LoginInfo {
                    contract_id: contract_id.to_string(),
                })
            }),
        )
        .route(
            "/api/login",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(ErrorResponse::unauthorized()),
                    )
                }
            }),
        );
    (serve(app).await, hits)
}
