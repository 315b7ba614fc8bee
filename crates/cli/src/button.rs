//! # ログインボタン
//!
//! 属性:
//! - `login-api-url`: ログインAPIのURL
//! - `redirect-url`: ログイン成功後の遷移先
//!
//! 処理中は `loading`。成功・失敗・キャンセルのいずれでも処理後に解除される。

use std::sync::atomic::{AtomicBool, Ordering};

use login_contract::ContractConnector;

use crate::error::ClientError;
use crate::flow::LoginFlow;
use crate::submitter::{LoginSession, LoginSubmitter, ServerEndpoints};
use crate::wallet::WalletSigner;

pub const LOGIN_API_URL_ATTR: &str = "login-api-url";
pub const REDIRECT_URL_ATTR: &str = "redirect-url";

/// ログイン成功後の遷移
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// `redirect-url` へ遷移
    Redirect(String),
    /// 遷移先未設定
    Stay,
}

#[derive(Debug, Default)]
pub struct LoginButton {
    login_api_url: Option<String>,
    redirect_url: Option<String>,
    loading: AtomicBool,
}

/// ドロップ時に `loading` を解除する（フローのキャンセル時も含む）
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LoginButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// 属性を設定する。未知の属性は無視する。
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match name {
            LOGIN_API_URL_ATTR => self.login_api_url = Some(value.to_string()),
            REDIRECT_URL_ATTR => self.redirect_url = Some(value.to_string()),
            _ => tracing::debug!(name, "未知の属性を無視します"),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// ボタン押下。ログインフローを実行し、成功時の遷移先を返す。
    pub async fn click(
        &self,
        connector: &dyn ContractConnector,
        wallet: &dyn WalletSigner,
    ) -> Result<(LoginSession, Navigation), ClientError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::Busy);
        }
        let _loading = LoadingGuard(&self.loading);

        let result = self.run(connector, wallet).await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "ログインに失敗しました");
        }
        result
    }

    async fn run(
        &self,
        connector: &dyn ContractConnector,
        wallet: &dyn WalletSigner,
    ) -> Result<(LoginSession, Navigation), ClientError> {
        let login_api_url = self
            .login_api_url
            .as_deref()
            .ok_or_else(|| ClientError::Config(format!("{LOGIN_API_URL_ATTR}が未設定です")))?;
        let submitter = LoginSubmitter::new(ServerEndpoints::from_login_url(login_api_url)?)?;

        let session = LoginFlow::new(connector, wallet, submitter).run().await?;
        let navigation = match &self.redirect_url {
            Some(url) => Navigation::Redirect(url.clone()),
            None => Navigation::Stay,
        };
        Ok((session, navigation))
    }
}
