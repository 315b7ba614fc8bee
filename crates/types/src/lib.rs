//! # Token Login 共有型定義
//!
//! クライアント・サーバー・コントラクト間でやり取りされるデータ構造。
//!
//! ## エンコーディング規則
//! - Base58: アドレス、公開鍵
//! - Hex (`0x`プレフィックス付き): 署名、ウォレットに渡す生バイト列
//! - Hex (プレフィックスなし): コントラクトが発行するトークン

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// セッションCookie
// ---------------------------------------------------------------------------

/// トークンを保持するCookie名
pub const TOKEN_COOKIE: &str = "token";
/// アドレスを保持するCookie名
pub const ADDRESS_COOKIE: &str = "address";
/// トークン署名を保持するCookie名
pub const SIGNATURE_COOKIE: &str = "signature";

/// ログ出力用のトークン先頭8文字。トークン全体はログに出さない。
pub fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

// ---------------------------------------------------------------------------
// HTTP API (POST /api/login, GET /auth, GET /)
// ---------------------------------------------------------------------------

/// POST /api/login リクエスト。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// コントラクトが発行したトークン
    pub token: String,
    /// `0x`付きHexエンコードされたトークン署名
    pub signature: String,
    /// Base58エンコードされた署名者アドレス
    pub address: String,
}

/// 成功レスポンス `{"status": "ok"}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// 失敗レスポンス `{"error": "unauthorized"}`。
/// 失敗理由はクライアントに返さない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn unauthorized() -> Self {
        Self {
            error: "unauthorized".to_string(),
        }
    }
}

/// GET /.well-known/login-info レスポンス。
///
/// クライアントはミント前に自身のコントラクトIDと一致するか確認する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInfo {
    /// サーバーがトークン検証に使用するコントラクトID
    pub contract_id: String,
}

// ---------------------------------------------------------------------------
// 委任証明書 (cert)
// ---------------------------------------------------------------------------

/// 証明書の署名対象。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBody {
    /// 委任元アドレス（Base58）。コントラクトはこれを呼び出し元とみなす。
    pub address: String,
    /// 委任先のエフェメラルEd25519公開鍵（Base58）
    pub ephemeral_pubkey: String,
    /// 発行時刻（UNIXタイムスタンプ）
    pub issued_at: u64,
    /// 有効期限（UNIXタイムスタンプ）
    pub expires_at: u64,
}

/// 委任証明書。`body`のJSONバイト列に対する委任元の署名を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub body: CertificateBody,
    /// `0x`付きHexエンコードされた署名
    pub signature: String,
}

// ---------------------------------------------------------------------------
// コントラクトクエリ
// ---------------------------------------------------------------------------

/// コントラクトメソッド名
pub mod methods {
    pub const CREATE_TOKEN: &str = "createToken";
    pub const VERIFY_TOKEN: &str = "verifyToken";
    pub const GET_ACCOUNT_ID: &str = "getAccountId";
    pub const GET_SECRET_KEY: &str = "getSecretKey";
    pub const SET_SECRET_KEY: &str = "setSecretKey";
    pub const REVOKE_TOKEN: &str = "revokeToken";
}

/// verifyTokenの検証モード。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// ログイン時。未使用トークンを消費する（一度きり）。
    Redeem,
    /// セッション確認時。消費済みトークンの有効性のみ確認する。
    Inspect,
}

/// エフェメラル鍵で署名されるクエリ本体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractQuery {
    /// 宛先コントラクトID
    pub contract_id: String,
    /// メソッド名（`methods`参照）
    pub method: String,
    /// メソッド引数
    pub args: serde_json::Value,
    /// クエリ作成時刻（UNIXタイムスタンプ）
    pub issued_at: u64,
    /// クエリごとの乱数
    pub nonce: u64,
}

/// 証明書付き署名済みクエリ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedQuery {
    pub query: ContractQuery,
    pub cert: Certificate,
    /// `query`のJSONバイト列に対するエフェメラル鍵の署名（`0x`付きHex）
    pub query_signature: String,
}

/// コントラクトメソッドの実行結果。`{"ok": ...}` または `{"err": ...}`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractOutput {
    Ok(serde_json::Value),
    Err(String),
}

/// contract_getInfo の結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub contract_id: String,
    /// コントラクト所有者のアドレス（Base58）
    pub owner: String,
}

// ---------------------------------------------------------------------------
// JSON-RPC 2.0
// ---------------------------------------------------------------------------

/// コントラクト情報取得メソッド
pub const RPC_GET_INFO: &str = "contract_getInfo";
/// コントラクトクエリメソッド
pub const RPC_QUERY: &str = "contract_query";

/// JSON-RPCリクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPCレスポンス。`result`と`error`のどちらか一方を持つ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPCエラーオブジェクト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}
