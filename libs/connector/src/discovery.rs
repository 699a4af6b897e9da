//! Connector service directory (`connector.sds`)
//!
//! The connector announces one endpoint per service and interface version.
//! Endpoints found here are used as explicit endpoints for
//! [`crate::endpoint::resolve_endpoint`].

use roxmltree::Document;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::soap::SoapAction;

/// Announced endpoint locations keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEndpoints {
    services: HashMap<String, Vec<ServiceVersion>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceVersion {
    target_namespace: String,
    location: String,
}

impl ServiceEndpoints {
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Endpoint for an operation, preferring the interface version the
    /// envelopes are written for and falling back to the last listed one.
    pub fn for_action(&self, action: SoapAction) -> Option<&str> {
        let versions = self.services.get(action.service_name())?;
        let namespace = action
            .header_value()
            .split_once('#')
            .map(|(ns, _)| ns)
            .unwrap_or_default();

        versions
            .iter()
            .find(|v| v.target_namespace == namespace)
            .or_else(|| versions.last())
            .map(|v| v.location.as_str())
    }
}

/// Parse a `connector.sds` document.
pub fn parse_service_directory(xml: &str) -> Result<ServiceEndpoints> {
    let doc = Document::parse(xml)?;
    let mut endpoints = ServiceEndpoints::default();

    for service in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Service")
    {
        let Some(name) = service.attribute("Name") else {
            continue;
        };

        for version in service
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Version")
        {
            let location = ["EndpointTLS", "Endpoint"].iter().find_map(|tag| {
                version
                    .children()
                    .find(|n| n.is_element() && n.tag_name().name() == *tag)
                    .and_then(|n| n.attribute("Location"))
            });

            if let Some(location) = location {
                endpoints
                    .services
                    .entry(name.to_string())
                    .or_default()
                    .push(ServiceVersion {
                        target_namespace: version
                            .attribute("TargetNamespace")
                            .unwrap_or_default()
                            .to_string(),
                        location: location.to_string(),
                    });
            }
        }
    }

    if endpoints.is_empty() {
        return Err(Error::MalformedResponse(
            "connector.sds lists no service endpoints".to_string(),
        ));
    }
    Ok(endpoints)
}
