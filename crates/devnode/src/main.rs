//! # login-devnode
//!
//! 環境変数は [`login_devnode::config`] を参照。

use login_devnode::config::DevnodeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = DevnodeConfig::from_env()?;
    let contract = config.deploy();

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        contract_id = %config.contract_id,
        owner = %config.owner,
        token_ttl_secs = config.token_ttl_secs,
        "開発用ノードを起動します"
    );
    axum::serve(listener, login_devnode::router(contract)).await?;

    Ok(())
}
