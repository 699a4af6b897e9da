//! Connector endpoint resolution
//!
//! Every SOAP call goes to `https://{host}:{port}{path}`. The path is either
//! taken from an explicit service endpoint (as announced in `connector.sds`)
//! or from the configured base path. Connector farms host several logical
//! connectors behind one hostname and tell them apart by a path prefix.

use url::Url;

use crate::error::Result;
use crate::models::ConnectorEntryOptions;

/// Compute the absolute URL for a connector call.
///
/// With an explicit endpoint only its path component is used; host and port
/// always come from the configured entry options. Pure string computation,
/// nothing is contacted.
pub fn resolve_endpoint(options: &ConnectorEntryOptions, explicit: Option<&str>) -> Result<String> {
    let path = match explicit {
        Some(endpoint) => Url::parse(endpoint)?.path().to_string(),
        None => map_farm_path(options, &options.path),
    };

    Ok(format!("https://{}:{}{}", options.hostname, options.port, path))
}

/// Prepend the farm prefix when the hostname belongs to a connector farm.
fn map_farm_path(options: &ConnectorEntryOptions, path: &str) -> String {
    let farm = &options.farm;
    if farm.host_pattern.is_empty() || !options.hostname.contains(&farm.host_pattern) {
        return path.to_string();
    }

    let prefix = farm.path_prefix.trim_end_matches('/');
    if path == prefix || path.starts_with(&format!("{prefix}/")) {
        return path.to_string();
    }
    format!("{prefix}{path}")
}
