//! # ログイン送信
//!
//! `{token, signature, address}` をサーバーに送信する。200以外はその試行の終了で、
//! 再送・リトライは行わない。成功時は `Set-Cookie` をセッションとして保持する。

use std::time::Duration;

use login_types::{LoginInfo, LoginRequest};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{StatusCode, Url};

use crate::error::ClientError;

/// サーバーへの1リクエストあたりのデフォルトタイムアウト
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// ログインサーバーのエンドポイント群。
#[derive(Debug, Clone)]
pub struct ServerEndpoints {
    pub login: Url,
    pub auth: Url,
    pub login_info: Url,
}

impl ServerEndpoints {
    /// ログインAPIのURLから同一オリジンの他エンドポイントを導出する。
    pub fn from_login_url(login_api_url: &str) -> Result<Self, ClientError> {
        let login = Url::parse(login_api_url)
            .map_err(|e| ClientError::Config(format!("login-api-url: {e}")))?;
        let join = |path: &str| {
            login
                .join(path)
                .map_err(|e| ClientError::Config(format!("{path}: {e}")))
        };
        Ok(Self {
            auth: join("/auth")?,
            login_info: join("/.well-known/login-info")?,
            login,
        })
    }

    /// サーバーのベースURLから導出する。
    pub fn from_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::from_login_url(&format!("{}/api/login", base_url.trim_end_matches('/')))
    }
}

/// ログイン成功時にサーバーが発行したCookie。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    cookies: Vec<(String, String)>,
}

impl LoginSession {
    /// `Cookie: name=value; ...` 形式の文字列から復元する。
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { cookies }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `Cookie` ヘッダー値
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// ログインサーバーへのHTTPクライアント。
#[derive(Debug, Clone)]
pub struct LoginSubmitter {
    http_client: reqwest::Client,
    endpoints: ServerEndpoints,
}

impl LoginSubmitter {
    pub fn new(endpoints: ServerEndpoints) -> Result<Self, ClientError> {
        Self::with_timeout(endpoints, DEFAULT_HTTP_TIMEOUT)
    }

    /// 全リクエストに `timeout` を設定したクライアントを構築する。
    pub fn with_timeout(endpoints: ServerEndpoints, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(format!("HTTPクライアントの構築に失敗: {e}")))?;
        Ok(Self {
            http_client,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &ServerEndpoints {
        &self.endpoints
    }

    /// サーバーが使用するコントラクトIDを取得する。
    pub async fn fetch_login_info(&self) -> Result<LoginInfo, ClientError> {
        let resp = self
            .http_client
            .get(self.endpoints.login_info.clone())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Http(format!(
                "login-info: HTTP {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    /// ログインリクエストを送信する。
    pub async fn submit(&self, request: &LoginRequest) -> Result<LoginSession, ClientError> {
        let resp = self
            .http_client
            .post(self.endpoints.login.clone())
            .json(request)
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(ClientError::Rejected(resp.status().as_u16()));
        }

        let cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|cookie| {
                let pair = cookie.split(';').next()?;
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Ok(LoginSession { cookies })
    }

    /// セッションで `/auth` を呼び出し、認証済みかを返す。
    pub async fn check_auth(&self, session: &LoginSession) -> Result<bool, ClientError> {
        let resp = self
            .http_client
            .get(self.endpoints.auth.clone())
            .header(COOKIE, session.cookie_header())
            .send()
            .await?;
        Ok(resp.status() == StatusCode::OK)
    }
}
