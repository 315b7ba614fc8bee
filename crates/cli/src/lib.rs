//! # Token Login クライアント
//!
//! トークンのミント → 署名 → 送信 を行うクライアント側の実装。
//!
//! - [`wallet`]: ウォレットの抽象化（署名要求は承認・拒否され得る）
//! - [`minter`]: コントラクトからのトークン取得
//! - [`signer`]: トークン署名・委任証明書の署名
//! - [`submitter`]: サーバーへの送信とセッション保持
//! - [`flow`]: 一連の手順
//! - [`button`]: ログインボタンの状態モデル

pub mod button;
pub mod error;
pub mod flow;
pub mod minter;
pub mod signer;
pub mod submitter;
pub mod wallet;

#[cfg(test)]
mod test_support;

pub use button::{LoginButton, Navigation};
pub use error::ClientError;
pub use flow::LoginFlow;
pub use submitter::{LoginSession, LoginSubmitter, ServerEndpoints};
pub use wallet::{KeypairWallet, SignOutcome, WalletSigner};
