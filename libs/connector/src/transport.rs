//! HTTP transport seam for connector calls
//!
//! The connector client only needs "send this body, give me status and
//! body back". [`HttpTransport`] does that with reqwest; tests plug in
//! scripted implementations.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::Result;
use crate::request_config::{ConnectorTls, RequestConfig};
use crate::tls::build_connector_client;

/// Status and body of a connector response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ConnectorTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: String,
        config: &RequestConfig,
    ) -> Result<TransportResponse>;

    async fn get(&self, url: &str, config: &RequestConfig) -> Result<TransportResponse>;
}

/// reqwest based transport.
///
/// The underlying client depends on the TLS settings, so it is rebuilt only
/// when those change between calls.
pub struct HttpTransport {
    timeout: Duration,
    client: Mutex<Option<(ConnectorTls, Client)>>,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: Mutex::new(None),
        }
    }

    fn client_for(&self, tls: &ConnectorTls) -> Result<Client> {
        let mut cached = self
            .client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached_tls, client)) = cached.as_ref() {
            if cached_tls == tls {
                return Ok(client.clone());
            }
        }

        let client = build_connector_client(tls, self.timeout)?;
        *cached = Some((tls.clone(), client.clone()));
        Ok(client)
    }

    fn apply(
        &self,
        mut request: reqwest::RequestBuilder,
        config: &RequestConfig,
    ) -> reqwest::RequestBuilder {
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(auth) = &config.basic_auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<TransportResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl ConnectorTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: String,
        config: &RequestConfig,
    ) -> Result<TransportResponse> {
        let client = self.client_for(&config.tls)?;
        let request = self.apply(client.post(url), config).body(body);
        self.send(request).await
    }

    async fn get(&self, url: &str, config: &RequestConfig) -> Result<TransportResponse> {
        let client = self.client_for(&config.tls)?;
        let request = self.apply(client.get(url), config);
        self.send(request).await
    }
}
