//! Request signing for the Cloudinary upload API
//!
//! Signed parameters are sorted by name, joined as `k=v` pairs with `&`, the API secret
//! is appended and the result is hashed with SHA-256 (hex encoded).

use sha2::{Digest, Sha256};

/// Parameters excluded from the signature
const UNSIGNED: &[&str] = &["file", "api_key", "resource_type", "cloud_name", "signature"];

/// String that gets hashed, without the secret
pub fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut signed: Vec<_> = params
        .iter()
        .filter(|(k, v)| !UNSIGNED.contains(k) && !v.is_empty())
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));
    signed
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex encoded SHA-256 signature
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
