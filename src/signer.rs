//! POST policy signature.
//!
//! <https://help.aliyun.com/document_detail/31988.html>

/// Signs the base64-encoded policy with the access key secret.
///
/// Returns the base64 (standard, padded) of HMAC-SHA1(`secret_key`,
/// `policy_base64`).
///
/// ```rust
/// use oss_post_policy::signer::sign;
/// assert_eq!(sign("hello", "1234567890"), "b84KVc+LroDiz0ebUANfdzSRxa0=");
/// ```
pub fn sign(policy_base64: &str, secret_key: &str) -> String {
    let key = ring::hmac::Key::new(
        ring::hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
        secret_key.as_bytes(),
    );
    let tag = ring::hmac::sign(&key, policy_base64.as_bytes());
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, tag.as_ref())
}
