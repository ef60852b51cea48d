use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Reproduce the portal's password hashing transform.
///
/// `base64(SHA-256(password || captcha))` over UTF-8 bytes, concatenated with
/// no delimiter. The portal verifies credentials with the identical recipe, so
/// any deviation here makes every login fail with a generic invalid-credentials
/// response upstream.
pub fn hash_portal_password(password: &str, captcha: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(captcha.as_bytes());
    STANDARD.encode(hasher.finalize())
}
