//! # Token Login 暗号処理
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム | エンコーディング |
//! |------|------------|----------------|
//! | トークン署名 | Ed25519 | `0x`付きHex |
//! | アドレス | Ed25519公開鍵 | Base58 |
//! | 委任証明書 | Ed25519 | `0x`付きHex |
//!
//! トークン署名は `token.as_bytes()` に対して行う。ブラウザウォレットの
//! `signRaw` が付与する `<Bytes>...</Bytes>` ラップ形式も受け付ける。

pub mod certificate;

use std::time::{SystemTime, UNIX_EPOCH};

use base58::{FromBase58, ToBase58};
use ed25519_dalek::{Signer, Verifier};

pub use certificate::{verify_certificate, verify_signed_query, CertificateRequest, Credential};
pub use ed25519_dalek::{
    Signature as Ed25519Signature, SigningKey as Ed25519SigningKey,
    VerifyingKey as Ed25519VerifyingKey,
};

/// ウォレットの `signRaw` がメッセージを包む接頭辞
const BYTES_PREFIX: &[u8] = b"<Bytes>";
/// ウォレットの `signRaw` がメッセージを包む接尾辞
const BYTES_SUFFIX: &[u8] = b"</Bytes>";

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// アドレスのデコード失敗（Base58不正、長さ不正、曲線上の点でない）
    #[error("不正なアドレス: {0}")]
    InvalidAddress(String),
    /// 署名のデコード失敗
    #[error("不正な署名: {0}")]
    InvalidSignature(String),
    /// Hexのデコード失敗
    #[error("不正なHex: {0}")]
    InvalidHex(String),
    /// 秘密鍵のデコード失敗
    #[error("不正な秘密鍵: {0}")]
    InvalidKey(String),
    /// Ed25519署名検証エラー
    #[error("Ed25519署名検証に失敗しました")]
    SignatureVerifyError,
    /// 証明書の有効期間外
    #[error("証明書の有効期間外です")]
    CertificateExpired,
    /// 署名対象のシリアライズ失敗
    #[error("シリアライズに失敗: {0}")]
    Serialization(String),
}

/// 現在のUNIXタイムスタンプ（秒）。
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// エンコーディング
// ---------------------------------------------------------------------------

/// バイト列を `0x` 付きHexにエンコードする。
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// `0x` 付き（または無し）Hexをデコードする。
pub fn decode_hex(value: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// 公開鍵からBase58アドレスを導出する。
pub fn address_from_verifying_key(key: &Ed25519VerifyingKey) -> String {
    key.to_bytes().to_base58()
}

/// Base58アドレスを公開鍵にデコードする。
pub fn parse_address(address: &str) -> Result<Ed25519VerifyingKey, CryptoError> {
    let bytes = address
        .from_base58()
        .map_err(|e| CryptoError::InvalidAddress(format!("Base58デコードに失敗: {e:?}")))?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidAddress("アドレスは32バイトである必要があります".to_string())
    })?;
    Ed25519VerifyingKey::from_bytes(&arr).map_err(|e| CryptoError::InvalidAddress(e.to_string()))
}

/// 署名を `0x` 付きHexにエンコードする。
pub fn encode_signature(signature: &Ed25519Signature) -> String {
    encode_hex(&signature.to_bytes())
}

/// `0x` 付きHexの署名をデコードする。
pub fn parse_signature(signature: &str) -> Result<Ed25519Signature, CryptoError> {
    let bytes = decode_hex(signature).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let arr: [u8; 64] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidSignature("署名は64バイトである必要があります".to_string())
    })?;
    Ok(Ed25519Signature::from_bytes(&arr))
}

/// Hexの32バイト秘密鍵からEd25519署名鍵を構築する。
pub fn signing_key_from_hex(value: &str) -> Result<Ed25519SigningKey, CryptoError> {
    let bytes = decode_hex(value.trim()).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey("秘密鍵は32バイトである必要があります".to_string())
    })?;
    Ok(Ed25519SigningKey::from_bytes(&arr))
}

/// メッセージを `<Bytes>...</Bytes>` で包む。
pub fn wrap_bytes(message: &[u8]) -> Vec<u8> {
    let mut wrapped = Vec::with_capacity(BYTES_PREFIX.len() + message.len() + BYTES_SUFFIX.len());
    wrapped.extend_from_slice(BYTES_PREFIX);
    wrapped.extend_from_slice(message);
    wrapped.extend_from_slice(BYTES_SUFFIX);
    wrapped
}

// ---------------------------------------------------------------------------
// 署名・検証
// ---------------------------------------------------------------------------

/// Ed25519による署名。
pub fn ed25519_sign(signing_key: &Ed25519SigningKey, message: &[u8]) -> Ed25519Signature {
    signing_key.sign(message)
}

/// Ed25519による署名検証。
pub fn ed25519_verify(
    verifying_key: &Ed25519VerifyingKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| CryptoError::SignatureVerifyError)
}

/// 生メッセージ、またはウォレットがラップした形式のどちらかに対する署名を検証する。
pub(crate) fn verify_raw_or_wrapped(
    verifying_key: &Ed25519VerifyingKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    if ed25519_verify(verifying_key, message, signature).is_ok() {
        return Ok(());
    }
    if message.starts_with(BYTES_PREFIX) {
        return Err(CryptoError::SignatureVerifyError);
    }
    ed25519_verify(verifying_key, &wrap_bytes(message), signature)
}

/// `address` の秘密鍵で `message` に署名されたかを検証する。
///
/// 署名不一致は `Ok(false)`、エンコーディング不正は `Err` を返す。
pub fn verify_message_signature(
    message: &[u8],
    signature: &str,
    address: &str,
) -> Result<bool, CryptoError> {
    let verifying_key = parse_address(address)?;
    let signature = parse_signature(signature)?;
    Ok(verify_raw_or_wrapped(&verifying_key, message, &signature).is_ok())
}

/// トークン署名を検証する。署名対象は `token.as_bytes()`。
pub fn verify_token_signature(
    token: &str,
    signature: &str,
    address: &str,
) -> Result<bool, CryptoError> {
    verify_message_signature(token.as_bytes(), signature, address)
}
