//! # login-server
//!
//! ## 環境変数
//! - `BIND_ADDR`: リッスンアドレス（デフォルト `0.0.0.0:3000`）
//! - `CONTRACT_RPC_URL`: コントラクトノードのJSON-RPC URL（デフォルト `http://127.0.0.1:9944`）
//! - `CONTRACT_ID`: トークンコントラクトID（必須）
//! - `CLIENT_CONTRACT_ID`: クライアントに配布したコントラクトID。`CONTRACT_ID` と異なれば起動しない
//! - `OPERATOR_SIGNING_KEY`: オペレーター証明書の署名鍵（Hex 32バイト）
//! - `RPC_TIMEOUT_SECS`: コントラクト呼び出しのタイムアウト（デフォルト 10）
//! - `CERT_TTL_SECS`: オペレーター証明書の有効期間（デフォルト 300）
//! - `COOKIE_SECURE`: Cookieに `Secure` を付与するか（デフォルト false）

use std::sync::Arc;

use login_server::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        rpc_url = %config.rpc_url,
        contract_id = %config.contract_id,
        rpc_timeout_secs = config.rpc_timeout.as_secs(),
        "設定を読み込みました"
    );

    let state = Arc::new(AppState::from_config(config));
    tracing::info!(operator = %state.operator_address(), "オペレーターアドレス");

    let app = login_server::router(state);

    tracing::info!("Login Serverを {} で起動します", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
