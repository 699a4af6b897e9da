//! Error types for the authenticator application

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Connector(#[from] authenticator_connector::Error),

    #[error("JWS error: {0}")]
    Jws(#[from] authenticator_jws::JwsError),

    #[error("Invalid signature encoding from connector: {0}")]
    SignatureEncoding(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Support code shown to users next to the message.
    pub fn support_code(&self) -> &'static str {
        match self {
            Error::Connector(e) => e.support_code(),
            Error::Jws(_) | Error::SignatureEncoding(_) => "AUTHCL_1102",
            Error::Configuration(_) | Error::ConfigLoad(_) | Error::Io(_) | Error::Json(_) => {
                "AUTHCL_0001"
            }
        }
    }
}
