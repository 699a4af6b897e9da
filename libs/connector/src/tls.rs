//! Trust material and HTTP client construction
//!
//! Connector and IDP never share trust material: the connector client trusts
//! the connector CA directory (plus whatever `reject_unauthorized` allows),
//! the IDP client trusts nothing but the pinned IDP chain.

use reqwest::{Certificate, Client, Identity};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::request_config::ConnectorTls;

const CERT_EXTENSIONS: &[&str] = &["pem", "crt", "cer"];

/// Load every PEM certificate file from `dir`, sorted by file name.
pub fn load_ca_chain(dir: &Path) -> Result<Vec<Vec<u8>>> {
    if !dir.is_dir() {
        return Err(Error::Configuration(format!(
            "CA directory {} does not exist",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| CERT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    let mut chain = Vec::with_capacity(paths.len());
    for path in paths {
        chain.push(fs::read(&path)?);
    }

    tracing::debug!(dir = %dir.display(), certificates = chain.len(), "Loaded CA chain");
    Ok(chain)
}

/// HTTP client for connector calls.
pub fn build_connector_client(tls: &ConnectorTls, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!tls.reject_unauthorized);

    for pem in &tls.ca_chain {
        builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
    }

    if let Some(identity) = &tls.client_identity {
        builder = builder.identity(Identity::from_pem(&identity.to_pem_bundle())?);
    }

    Ok(builder.build()?)
}

/// Timeouts for a single IDP reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub connect: Duration,
    pub secure_connect: Duration,
    pub response: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(500),
            secure_connect: Duration::from_millis(1000),
            response: Duration::from_millis(1000),
        }
    }
}

/// HTTP client for the IDP that trusts only the pinned chain.
///
/// reqwest applies its connect timeout to TCP connect and TLS handshake
/// together, so the handshake budget bounds both; the overall timeout adds
/// the response budget on top. Requests are never retried.
pub fn build_idp_client(ca_chain: &[Vec<u8>], timeouts: ProbeTimeouts) -> Result<Client> {
    let mut builder = Client::builder()
        .tls_built_in_root_certs(false)
        // TCP connect and TLS handshake share this budget, so the shorter
        // TCP connect limit is not enforced on its own.
        .connect_timeout(timeouts.connect.max(timeouts.secure_connect))
        .timeout(timeouts.secure_connect + timeouts.response);

    for pem in ca_chain {
        builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
    }

    Ok(builder.build()?)
}
