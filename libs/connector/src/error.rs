//! Error types for the connector client

use thiserror::Error;

use crate::models::CardType;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Connector client errors
#[derive(Error, Debug)]
pub enum Error {
    /// SOAP fault or non-OK status returned by the connector.
    #[error("Connector error {code}: {description}")]
    Connector { code: String, description: String },

    #[error("Malformed connector response: {0}")]
    MalformedResponse(String),

    #[error("No {card_type} card found")]
    CardNotFound { card_type: CardType },

    #[error("Multiple {card_type} cards found ({count})")]
    MultipleCardsFound { card_type: CardType, count: usize },

    #[error("No card handle acquired for {card_type}; request the card handle first")]
    MissingCardHandle { card_type: CardType },

    #[error("PIN of {card_type} is not verified (status: {status})")]
    PinNotVerified { card_type: CardType, status: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl Error {
    /// Stable support code shown to users next to the message.
    pub fn support_code(&self) -> &'static str {
        match self {
            Error::Connector { .. } | Error::MalformedResponse(_) => "AUTHCL_1101",
            Error::CardNotFound { .. } => "AUTHCL_1104",
            Error::MultipleCardsFound { .. } => "AUTHCL_1105",
            Error::MissingCardHandle { .. } => "AUTHCL_1106",
            Error::PinNotVerified { .. } => "AUTHCL_1107",
            Error::Transport(_) | Error::Http(_) => "AUTHCL_1100",
            Error::Configuration(_) | Error::Url(_) | Error::Io(_) => "AUTHCL_0001",
            Error::Xml(_) => "AUTHCL_1101",
        }
    }

    /// Whether this error only says that more than one matching card is inserted.
    pub fn is_multiple_cards(&self) -> bool {
        matches!(self, Error::MultipleCardsFound { .. })
    }
}
