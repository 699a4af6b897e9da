//! Per-request transport settings for connector calls
//!
//! The connector presents a device certificate that is not issued under a
//! public root and whose name never matches the configured hostname, so
//! certificate validation is controlled by the persisted
//! `reject_unauthorized` flag. Trust material for the connector is kept
//! apart from the IDP's pinned chain (see [`crate::tls`]).

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{ConnectorEntryOptions, TlsAuthType};

const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
const DEFAULT_ACCEPT: &str = "*/*";

/// Basic auth credentials. The password never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// PEM encoded client key and certificate for mutual TLS.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub key_pem: Vec<u8>,
    pub cert_pem: Vec<u8>,
}

impl ClientIdentity {
    /// Certificate followed by key, the layout `reqwest::Identity::from_pem` expects.
    pub fn to_pem_bundle(&self) -> Vec<u8> {
        let mut bundle = Vec::with_capacity(self.cert_pem.len() + self.key_pem.len() + 1);
        bundle.extend_from_slice(&self.cert_pem);
        if !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(&self.key_pem);
        bundle
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("key_pem", &"<redacted>")
            .field("cert_pem_len", &self.cert_pem.len())
            .finish()
    }
}

/// TLS settings for the connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorTls {
    pub reject_unauthorized: bool,
    /// PEM certificates trusted for the connector only.
    pub ca_chain: Vec<Vec<u8>>,
    pub client_identity: Option<ClientIdentity>,
}

/// Everything the transport needs to send one connector request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
    pub tls: ConnectorTls,
}

impl RequestConfig {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }
}

/// Build the request configuration for a connector call.
///
/// Default headers are merged with `extra_headers`; the caller wins on
/// conflicts. Authentication material follows the configured
/// [`TlsAuthType`]: credentials for basic auth, key and certificate read from
/// disk for client certificate auth, neither for server-only TLS.
pub fn build_connector_request_config(
    options: &ConnectorEntryOptions,
    ca_chain: &[Vec<u8>],
    extra_headers: &[(&str, &str)],
) -> Result<RequestConfig> {
    let mut config = RequestConfig::default();
    config.set_header("Content-Type", DEFAULT_CONTENT_TYPE);
    config.set_header("Accept", DEFAULT_ACCEPT);
    for (name, value) in extra_headers {
        config.set_header(name, value);
    }

    config.tls.reject_unauthorized = options.reject_unauthorized.unwrap_or(false);
    config.tls.ca_chain = ca_chain.to_vec();

    match options.tls_auth_type {
        TlsAuthType::BasicAuth => match (&options.username, &options.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                config.basic_auth = Some(BasicAuth {
                    username: username.clone(),
                    password: password.clone(),
                });
            }
            _ => tracing::warn!("Missing credentials for basic auth"),
        },
        TlsAuthType::ServerClientCertAuth => {
            let key_file = options.key_file.as_deref().ok_or_else(|| {
                Error::Configuration("client certificate auth requires a key file".to_string())
            })?;
            let cert_file = options.cert_file.as_deref().ok_or_else(|| {
                Error::Configuration(
                    "client certificate auth requires a certificate file".to_string(),
                )
            })?;
            config.tls.client_identity = Some(ClientIdentity {
                key_pem: read_material(key_file, "key")?,
                cert_pem: read_material(cert_file, "certificate")?,
            });
        }
        TlsAuthType::ServerCertAuth => {}
    }

    Ok(config)
}

fn read_material(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        Error::Configuration(format!(
            "Failed to read client {what} file {}: {e}",
            path.display()
        ))
    })
}
