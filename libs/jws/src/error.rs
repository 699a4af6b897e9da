//! Error types for JWS composition

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, JwsError>;

#[derive(Debug, Error)]
pub enum JwsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 segment: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid compact JWS: {0}")]
    InvalidCompact(String),

    #[error("Unknown flow type '{0}'")]
    UnknownFlow(String),

    #[error("Card signature is empty")]
    EmptySignature,
}
