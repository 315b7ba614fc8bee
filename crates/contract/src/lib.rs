//! # Token Login コントラクト
//!
//! ログイントークンを発行・検証するコントラクトと、そのクライアント。
//!
//! ## 構成
//! - [`token`]: コントラクトロジック（HMACトークン、一度きりの消費、所有者専用操作）
//! - [`client`]: 接続の抽象化とメソッド呼び出しヘルパー
//! - [`memory`]: プロセス内実行（開発ノード・テスト用）
//! - [`rpc`]: JSON-RPC経由の実行

pub mod client;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod token;

pub use client::{ContractClient, ContractConnector};
pub use error::ContractError;
pub use memory::{InMemoryConnector, InMemoryContract};
pub use rpc::RpcConnector;
pub use token::{ContractRevert, TokenContract, TokenState, DEFAULT_TOKEN_TTL_SECS};
