//! # 署名検証
//!
//! トークンの生バイト列に対する署名をローカルで検証する。

use login_crypto::verify_token_signature;

/// `address` の秘密鍵で `token` に署名されたかを検証する。
///
/// 不正な入力（Hex・Base58・長さ・曲線上の点）はパニックせず `false`。
pub fn verify_signature(token: &str, signature: &str, address: &str) -> bool {
    match verify_token_signature(token, signature, address) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!(address = %address, error = %e, "署名またはアドレスの形式が不正です");
            false
        }
    }
}
