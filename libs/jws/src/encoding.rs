//! Encoding primitives shared by both flows

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Unpadded base64url.
pub fn base64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub fn base64url_decode(input: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(input)?)
}

/// `base64url(header) "." base64url(payload)`
pub fn signing_input(header: &[u8], payload: &[u8]) -> String {
    format!("{}.{}", base64url_encode(header), base64url_encode(payload))
}

/// SHA-256 over the exact bytes given.
pub fn sha256_digest(input: impl AsRef<[u8]>) -> [u8; 32] {
    Sha256::digest(input).into()
}
