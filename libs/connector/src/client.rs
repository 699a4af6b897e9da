//! Connector SOAP client
//!
//! Binds entry options, calling context and trust material to a transport.
//! Every operation is posted to the endpoint announced for its service in
//! `connector.sds`, or to the configured base path when discovery was not
//! run or did not list the service.

use std::sync::Arc;

use crate::discovery::{parse_service_directory, ServiceEndpoints};
use crate::endpoint::resolve_endpoint;
use crate::error::{Error, Result};
use crate::models::{ConnectorEntryOptions, ContextParameter};
use crate::request_config::build_connector_request_config;
use crate::soap::{SoapAction, SoapRequest, SOAP_CONTENT_TYPE};
use crate::transport::{ConnectorTransport, TransportResponse};

pub const DEFAULT_SDS_PATH: &str = "/connector.sds";

#[derive(Clone)]
pub struct ConnectorClient {
    options: ConnectorEntryOptions,
    context: ContextParameter,
    ca_chain: Vec<Vec<u8>>,
    transport: Arc<dyn ConnectorTransport>,
    endpoints: ServiceEndpoints,
    sds_path: String,
}

impl ConnectorClient {
    pub fn new(
        options: ConnectorEntryOptions,
        context: ContextParameter,
        transport: Arc<dyn ConnectorTransport>,
    ) -> Self {
        Self {
            options,
            context,
            ca_chain: Vec::new(),
            transport,
            endpoints: ServiceEndpoints::default(),
            sds_path: DEFAULT_SDS_PATH.to_string(),
        }
    }

    /// Trust the given PEM certificates for connector calls.
    pub fn with_ca_chain(mut self, ca_chain: Vec<Vec<u8>>) -> Self {
        self.ca_chain = ca_chain;
        self
    }

    pub fn with_sds_path(mut self, sds_path: impl Into<String>) -> Self {
        self.sds_path = sds_path.into();
        self
    }

    pub fn options(&self) -> &ConnectorEntryOptions {
        &self.options
    }

    pub fn context(&self) -> &ContextParameter {
        &self.context
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Fetch `connector.sds` and remember the announced service endpoints.
    pub async fn discover_services(&mut self) -> Result<&ServiceEndpoints> {
        let mut sds_options = self.options.clone();
        sds_options.path = self.sds_path.clone();
        let url = resolve_endpoint(&sds_options, None)?;
        let config = build_connector_request_config(&self.options, &self.ca_chain, &[])?;

        tracing::debug!(endpoint = %url, "Fetching connector service directory");
        let response = self.transport.get(&url, &config).await?;
        if !response.is_success() {
            return Err(Error::Transport(format!(
                "connector.sds answered with HTTP {}",
                response.status
            )));
        }

        self.endpoints = parse_service_directory(&response.body)?;
        Ok(&self.endpoints)
    }

    /// Discovery that falls back to the base path on any failure.
    pub async fn discover_services_or_default(&mut self) {
        if let Err(e) = self.discover_services().await {
            tracing::warn!(error = %e, "Service discovery failed, using configured base path");
            self.endpoints = ServiceEndpoints::default();
        }
    }

    /// Absolute URL the given operation is posted to.
    pub fn endpoint_for(&self, action: SoapAction) -> Result<String> {
        resolve_endpoint(&self.options, self.endpoints.for_action(action))
    }

    /// Post a request to the endpoint of its service.
    pub async fn call<R: SoapRequest + ?Sized>(&self, request: &R) -> Result<TransportResponse> {
        let endpoint = self.endpoint_for(request.action())?;
        self.call_at(&endpoint, request).await
    }

    /// Post a request to an already resolved endpoint.
    pub async fn call_at<R: SoapRequest + ?Sized>(
        &self,
        endpoint: &str,
        request: &R,
    ) -> Result<TransportResponse> {
        let action = request.action();
        let config = build_connector_request_config(
            &self.options,
            &self.ca_chain,
            &[
                ("Content-Type", SOAP_CONTENT_TYPE),
                ("SOAPAction", action.header_value()),
            ],
        )?;

        tracing::debug!(soap_action = action.name(), endpoint, "Sending connector request");
        let response = self.transport.post(endpoint, request.render(), &config).await?;
        tracing::debug!(
            soap_action = action.name(),
            status = response.status,
            "Connector responded"
        );
        Ok(response)
    }
}
