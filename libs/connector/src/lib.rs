//! Konnektor client for card based authentication
//!
//! Talks SOAP to a gematik connector to find an inserted HBA or SMC-B, check
//! its PIN status, read its authentication certificate and have it sign a
//! challenge digest.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use authenticator_connector::{
//!     CardSession, CardType, ConnectorClient, ConnectorEntryOptions, ContextParameter, Crypt,
//!     HttpTransport,
//! };
//!
//! # async fn example() -> authenticator_connector::Result<()> {
//! let options = ConnectorEntryOptions::new("konnektor.local", 443, "/ws");
//! let client = ConnectorClient::new(
//!     options,
//!     ContextParameter::default(),
//!     Arc::new(HttpTransport::default()),
//! );
//! let mut session = CardSession::new(client, Crypt::Rsa);
//! session.get_card_handle(CardType::SmcB).await?;
//! let _pin_verified = session.check_pin_status(CardType::SmcB).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod request_config;
pub mod session;
pub mod signer;
pub mod soap;
pub mod tls;
pub mod transport;

pub use client::{ConnectorClient, DEFAULT_SDS_PATH};
pub use discovery::{parse_service_directory, ServiceEndpoints};
pub use endpoint::resolve_endpoint;
pub use error::{Error, Result};
pub use models::{
    AuthSignParameter, CardData, CardType, ConnectorEntryOptions, ContextParameter, Crypt,
    FarmMapping, FlowType, PinStatus, TlsAuthType,
};
pub use request_config::{build_connector_request_config, RequestConfig};
pub use session::{CardSession, SessionState, AUTH_CERT_REF};
pub use signer::sign_challenge;
pub use tls::{build_idp_client, load_ca_chain, ProbeTimeouts};
pub use transport::{ConnectorTransport, HttpTransport, TransportResponse};
