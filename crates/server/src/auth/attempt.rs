//! # ログイン試行
//!
//! `Pending → SignatureChecked → TokenValidated → SessionIssued`
//!
//! 失敗はいずれの段階でも `Rejected`（終端、Cookieは発行しない）。
//! 署名検証を経ずにコントラクトへ問い合わせることはできない。

use login_types::{LoginRequest, VerifyMode};

use crate::auth::{validate_token, verify_signature};
use crate::config::AppState;
use crate::error::LoginError;
use crate::session::Session;

/// ログイン試行の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    SignatureChecked,
    TokenValidated,
    SessionIssued,
    Rejected,
}

/// 1回のログイン試行。
#[derive(Debug)]
pub struct LoginAttempt {
    request: LoginRequest,
    state: AttemptState,
}

impl LoginAttempt {
    pub fn new(request: LoginRequest) -> Self {
        Self {
            request,
            state: AttemptState::Pending,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn request(&self) -> &LoginRequest {
        &self.request
    }

    fn require(&mut self, expected: AttemptState, to: &'static str) -> Result<(), LoginError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.reject(LoginError::InvalidTransition {
                from: self.state,
                to,
            }))
        }
    }

    fn reject(&mut self, err: LoginError) -> LoginError {
        self.state = AttemptState::Rejected;
        err
    }

    /// `Pending → SignatureChecked`
    pub fn check_signature(&mut self) -> Result<(), LoginError> {
        self.require(AttemptState::Pending, "SignatureChecked")?;

        let req = &self.request;
        if !verify_signature(&req.token, &req.signature, &req.address) {
            return Err(self.reject(LoginError::SignatureMismatch));
        }
        self.state = AttemptState::SignatureChecked;
        Ok(())
    }

    /// `SignatureChecked → TokenValidated`。トークンはここで消費される。
    pub async fn validate_token(&mut self, state: &AppState) -> Result<(), LoginError> {
        self.require(AttemptState::SignatureChecked, "TokenValidated")?;

        let req = &self.request;
        let result = validate_token(state, &req.token, &req.address, VerifyMode::Redeem).await;
        match result {
            Ok(()) => {
                self.state = AttemptState::TokenValidated;
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// `TokenValidated → SessionIssued`
    pub fn issue_session(&mut self) -> Result<Session, LoginError> {
        self.require(AttemptState::TokenValidated, "SessionIssued")?;

        self.state = AttemptState::SessionIssued;
        Ok(Session {
            token: self.request.token.clone(),
            address: self.request.address.clone(),
            signature: self.request.signature.clone(),
        })
    }
}
