//! # セッションCookie
//!
//! `token`・`address`・`signature` の3つのCookie（`Path=/`、有効期限なし）。
//! Cookieは主張のキャッシュに過ぎず、認証チェックのたびにコントラクトで再検証する。

use axum::http::{header, HeaderMap};
use login_types::{ADDRESS_COOKIE, SIGNATURE_COOKIE, TOKEN_COOKIE};

use crate::error::LoginError;

/// ログイン成功時に発行されるセッション。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub address: String,
    pub signature: String,
}

impl Session {
    /// `Set-Cookie` ヘッダー値を生成する。
    pub fn set_cookie_headers(&self, secure: bool) -> Vec<String> {
        [
            (TOKEN_COOKIE, &self.token),
            (ADDRESS_COOKIE, &self.address),
            (SIGNATURE_COOKIE, &self.signature),
        ]
        .into_iter()
        .map(|(name, value)| set_cookie(name, value, secure))
        .collect()
    }

    /// リクエストの `Cookie` ヘッダーからセッションを復元する。
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, LoginError> {
        let cookie = |name: &'static str| {
            extract_cookie(headers, name).ok_or(LoginError::MissingCookie(name))
        };
        Ok(Self {
            token: cookie(TOKEN_COOKIE)?,
            address: cookie(ADDRESS_COOKIE)?,
            signature: cookie(SIGNATURE_COOKIE)?,
        })
    }
}

fn set_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Cookie` ヘッダー（複数可）から指定名の値を取り出す。空値は欠落とみなす。
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn session() -> Session {
        Session {
            token: "9f2c".to_string(),
            address: "5Fhq".to_string(),
            signature: "0xab".to_string(),
        }
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookies = session().set_cookie_headers(false);
        assert_eq!(
            cookies,
            vec![
                "token=9f2c; Path=/; HttpOnly; SameSite=Lax",
                "address=5Fhq; Path=/; HttpOnly; SameSite=Lax",
                "signature=0xab; Path=/; HttpOnly; SameSite=Lax",
            ]
        );
        // 有効期限は付与しない
        assert!(cookies.iter().all(|c| !c.contains("Max-Age") && !c.contains("Expires")));

        let secure = session().set_cookie_headers(true);
        assert!(secure.iter().all(|c| c.ends_with("; Secure")));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=9f2c; address=5Fhq; signature=0xab"),
        );
        assert_eq!(Session::from_headers(&headers).unwrap(), session());
    }

    #[test]
    fn test_from_split_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("token=9f2c"));
        headers.append(header::COOKIE, HeaderValue::from_static("address=5Fhq; signature=0xab"));
        assert_eq!(Session::from_headers(&headers).unwrap(), session());
    }

    #[test]
    fn test_missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=9f2c; address="));
        assert!(matches!(
            Session::from_headers(&headers),
            Err(LoginError::MissingCookie("address"))
        ));
        assert!(matches!(
            Session::from_headers(&HeaderMap::new()),
            Err(LoginError::MissingCookie("token"))
        ));
    }
}
