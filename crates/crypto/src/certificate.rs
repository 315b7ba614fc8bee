//! # 委任証明書 (cert)
//!
//! コントラクトへのクエリを認可する短命のクレデンシャル。
//!
//! 1. エフェメラルEd25519鍵を生成し、`CertificateBody` を構築する
//! 2. 委任元（ウォレットまたはオペレーター鍵）が本文のJSONバイト列に署名する
//! 3. 各クエリはエフェメラル鍵で署名され、コントラクトは証明書の `address` を呼び出し元とみなす

use login_types::{Certificate, CertificateBody, ContractQuery, SignedQuery};

use crate::{
    address_from_verifying_key, ed25519_sign, ed25519_verify, encode_signature, parse_address,
    parse_signature, verify_raw_or_wrapped, CryptoError, Ed25519SigningKey, Ed25519VerifyingKey,
};

/// 許容する時刻のずれ（秒）
const CLOCK_SKEW_SECS: u64 = 30;
/// クエリの最大有効時間（秒）
const QUERY_MAX_AGE_SECS: u64 = 120;

/// 委任元の署名待ちの証明書。
pub struct CertificateRequest {
    body: CertificateBody,
    ephemeral_key: Ed25519SigningKey,
}

impl CertificateRequest {
    /// エフェメラル鍵を生成し、`address` からの委任要求を構築する。
    pub fn new(address: &str, issued_at: u64, ttl_secs: u64) -> Self {
        let ephemeral_key = Ed25519SigningKey::generate(&mut rand::rngs::OsRng);
        let body = CertificateBody {
            address: address.to_string(),
            ephemeral_pubkey: address_from_verifying_key(&ephemeral_key.verifying_key()),
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
        };
        Self {
            body,
            ephemeral_key,
        }
    }

    pub fn body(&self) -> &CertificateBody {
        &self.body
    }

    /// 委任元が署名するバイト列。
    pub fn sign_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        body_bytes(&self.body)
    }

    /// 委任元の署名を付けてクレデンシャルを完成させる。
    pub fn into_credential(self, signature: String) -> Credential {
        Credential {
            cert: Certificate {
                body: self.body,
                signature,
            },
            ephemeral_key: self.ephemeral_key,
        }
    }
}

/// 署名済み証明書とエフェメラル秘密鍵の組。
pub struct Credential {
    cert: Certificate,
    ephemeral_key: Ed25519SigningKey,
}

impl Credential {
    /// ローカルの署名鍵から直接クレデンシャルを導出する（サーバーのオペレーター用）。
    pub fn derive(
        signing_key: &Ed25519SigningKey,
        issued_at: u64,
        ttl_secs: u64,
    ) -> Result<Self, CryptoError> {
        let address = address_from_verifying_key(&signing_key.verifying_key());
        let request = CertificateRequest::new(&address, issued_at, ttl_secs);
        let signature = ed25519_sign(signing_key, &request.sign_bytes()?);
        Ok(request.into_credential(encode_signature(&signature)))
    }

    /// 委任元アドレス
    pub fn address(&self) -> &str {
        &self.cert.body.address
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    /// クエリにエフェメラル鍵で署名する。
    pub fn sign_query(&self, query: ContractQuery) -> Result<SignedQuery, CryptoError> {
        let bytes =
            serde_json::to_vec(&query).map_err(|e| CryptoError::Serialization(e.to_string()))?;
        let signature = ed25519_sign(&self.ephemeral_key, &bytes);
        Ok(SignedQuery {
            query,
            cert: self.cert.clone(),
            query_signature: encode_signature(&signature),
        })
    }
}

fn body_bytes(body: &CertificateBody) -> Result<Vec<u8>, CryptoError> {
    serde_json::to_vec(body).map_err(|e| CryptoError::Serialization(e.to_string()))
}

/// 証明書を検証し、エフェメラル公開鍵を返す。
pub fn verify_certificate(
    cert: &Certificate,
    now: u64,
) -> Result<Ed25519VerifyingKey, CryptoError> {
    let body = &cert.body;
    if body.issued_at > now.saturating_add(CLOCK_SKEW_SECS)
        || now > body.expires_at
        || body.issued_at > body.expires_at
    {
        return Err(CryptoError::CertificateExpired);
    }

    let delegator = parse_address(&body.address)?;
    let signature = parse_signature(&cert.signature)?;
    verify_raw_or_wrapped(&delegator, &body_bytes(body)?, &signature)?;

    parse_address(&body.ephemeral_pubkey)
}

/// 署名済みクエリを検証し、呼び出し元アドレスを返す。
pub fn verify_signed_query(signed: &SignedQuery, now: u64) -> Result<String, CryptoError> {
    let ephemeral = verify_certificate(&signed.cert, now)?;

    let issued_at = signed.query.issued_at;
    if issued_at > now.saturating_add(CLOCK_SKEW_SECS)
        || now.saturating_sub(issued_at) > QUERY_MAX_AGE_SECS
    {
        return Err(CryptoError::CertificateExpired);
    }

    let bytes = serde_json::to_vec(&signed.query)
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let signature = parse_signature(&signed.query_signature)?;
    ed25519_verify(&ephemeral, &bytes, &signature)?;

    Ok(signed.cert.body.address.clone())
}
