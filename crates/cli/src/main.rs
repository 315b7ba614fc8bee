//! # login-cli
//!
//! - `keygen`: ウォレット鍵を生成
//! - `login`: トークンをミント・署名してログインし、セッションCookieを出力
//! - `check`: セッションCookieで認証チェック

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use login_cli::button::{LOGIN_API_URL_ATTR, REDIRECT_URL_ATTR};
use login_cli::{KeypairWallet, LoginButton, LoginSession, LoginSubmitter, Navigation, ServerEndpoints};
use login_contract::RpcConnector;
use login_crypto::{address_from_verifying_key, encode_hex, signing_key_from_hex, Ed25519SigningKey};

#[derive(Parser, Debug)]
#[command(name = "login-cli", version, about = "Token Login クライアント")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ウォレット鍵を生成し、秘密鍵（Hex）とアドレスを出力する
    Keygen,

    /// ログインしてセッションCookieを出力する
    Login {
        /// ログインAPIのURL
        #[arg(long, env = "LOGIN_API_URL", default_value = "http://127.0.0.1:3000/api/login")]
        login_api_url: String,

        /// ログイン成功後の遷移先
        #[arg(long)]
        redirect_url: Option<String>,

        /// コントラクトノードのJSON-RPC URL
        #[arg(long, env = "CONTRACT_RPC_URL", default_value = "http://127.0.0.1:9944")]
        rpc_url: String,

        /// トークンコントラクトID
        #[arg(long, env = "CONTRACT_ID")]
        contract_id: String,

        /// ウォレット秘密鍵（Hex 32バイト）
        #[arg(long, env = "WALLET_KEY")]
        key: String,

        /// 署名前に確認を求める
        #[arg(long, default_value_t = false)]
        confirm: bool,

        /// RPCタイムアウト（秒）
        #[arg(long, default_value_t = 10)]
        rpc_timeout_secs: u64,
    },

    /// セッションCookieで認証チェックを行う
    Check {
        /// ログインAPIのURL
        #[arg(long, env = "LOGIN_API_URL", default_value = "http://127.0.0.1:3000/api/login")]
        login_api_url: String,

        /// `token=...; address=...; signature=...`
        #[arg(long)]
        cookie: String,
    },
}

/// 標準入力で署名の承認を求める
fn prompt_approval(payload_hex: &str) -> bool {
    eprint!("署名要求 {payload_hex} を承認しますか? [y/N] ");
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Keygen => {
            let key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
            println!("secret_key: {}", encode_hex(&key.to_bytes()));
            println!("address:    {}", address_from_verifying_key(&key.verifying_key()));
        }
        Command::Login {
            login_api_url,
            redirect_url,
            rpc_url,
            contract_id,
            key,
            confirm,
            rpc_timeout_secs,
        } => {
            let mut wallet = KeypairWallet::new(signing_key_from_hex(&key)?);
            if confirm {
                wallet = wallet.with_approval(Arc::new(prompt_approval));
            }
            let connector =
                RpcConnector::new(&rpc_url, &contract_id, Duration::from_secs(rpc_timeout_secs));

            let mut button = LoginButton::new();
            button.set_attribute(LOGIN_API_URL_ATTR, &login_api_url);
            if let Some(url) = &redirect_url {
                button.set_attribute(REDIRECT_URL_ATTR, url);
            }

            let (session, navigation) = button.click(&connector, &wallet).await?;
            println!("{}", session.cookie_header());
            if let Navigation::Redirect(url) = navigation {
                println!("redirect: {url}");
            }
        }
        Command::Check {
            login_api_url,
            cookie,
        } => {
            let submitter = LoginSubmitter::new(ServerEndpoints::from_login_url(&login_api_url)?)?;
            let session = LoginSession::from_cookie_header(&cookie);
            if submitter.check_auth(&session).await? {
                println!("authenticated");
            } else {
                anyhow::bail!("認証されていません");
            }
        }
    }

    Ok(())
}
