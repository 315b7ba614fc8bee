//! # 認証処理
//!
//! - [`verifier`]: ローカルの署名検証（コントラクト呼び出しより前に必ず実行）
//! - [`validator`]: コントラクトの `verifyToken` による検証
//! - [`attempt`]: ログイン試行の状態遷移

pub mod attempt;
pub mod validator;
pub mod verifier;

pub use attempt::{AttemptState, LoginAttempt};
pub use validator::validate_token;
pub use verifier::verify_signature;

