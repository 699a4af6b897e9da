//! Support diagnostics
//!
//! Two independent checks: can the connector see exactly one usable SMC-B,
//! and does each configured IDP answer with HTTP 200. Errors become
//! [`TestResult`]s instead of propagating.

use authenticator_connector::{
    build_idp_client, load_ca_chain, CardSession, CardType, ConnectorTransport,
    Error as ConnectorError, ProbeTimeouts,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::auth::connect_with;
use crate::config::Config;
use crate::error::Error;

pub const SMCB_TEST_NAME: &str = "Smartcard readability (SMC-B)";
pub const IDP_TEST_NAME: &str = "IDP reachability";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub details: String,
}

impl TestResult {
    pub fn success(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Success,
            details: details.into(),
        }
    }

    pub fn failure(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failure,
            details: details.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TestStatus::Success
    }
}

fn describe(error: &Error) -> String {
    match error {
        Error::Connector(ConnectorError::Connector { code, description }) => {
            format!("Connector error {code}: {description}")
        }
        other => format!("{other} [{}]", other.support_code()),
    }
}

/// Look for exactly one SMC-B. More than one still counts as readable.
pub async fn smcb_readability(session: &mut CardSession) -> TestResult {
    match session.get_card_handle(CardType::SmcB).await {
        Ok(card) => TestResult::success(
            SMCB_TEST_NAME,
            format!(
                "SMC-B found (terminal {}, slot {}, ICCSN {})",
                card.ct_id, card.slot_nr, card.iccsn
            ),
        ),
        Err(e) if e.is_multiple_cards() => {
            TestResult::success(SMCB_TEST_NAME, "Multiple SMC-B cards found")
        }
        Err(e) => {
            tracing::warn!(error = %e, "SMC-B readability check failed");
            TestResult::failure(SMCB_TEST_NAME, describe(&Error::Connector(e)))
        }
    }
}

/// Probe every IDP listed in the JSON file at `config_path`.
///
/// A missing or unreadable file yields one failure, not one per IDP.
pub async fn idp_reachability(
    config_path: &Path,
    ca_chain: &[Vec<u8>],
    timeouts: ProbeTimeouts,
) -> Vec<TestResult> {
    let idps = match read_idp_list(config_path) {
        Ok(idps) => idps,
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "IDP list unavailable");
            return vec![TestResult::failure(IDP_TEST_NAME, describe(&e))];
        }
    };

    let client = match build_idp_client(ca_chain, timeouts) {
        Ok(client) => client,
        Err(e) => return vec![TestResult::failure(IDP_TEST_NAME, describe(&e.into()))],
    };

    let mut results = Vec::with_capacity(idps.len());
    for (name, url) in idps {
        let test_name = format!("{IDP_TEST_NAME}: {name}");
        let result = match client.get(&url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                TestResult::success(test_name, format!("{url} answered with HTTP 200"))
            }
            Ok(response) => TestResult::failure(
                test_name,
                format!("{url} answered with HTTP {}", response.status().as_u16()),
            ),
            Err(e) => TestResult::failure(test_name, format!("{url} unreachable: {e}")),
        };
        tracing::info!(idp = %name, status = ?result.status, "IDP probe finished");
        results.push(result);
    }
    results
}

fn read_idp_list(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    if !path.is_file() {
        return Err(Error::Configuration(format!(
            "IDP test configuration {} not found",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run all checks: SMC-B readability first, then one result per IDP.
pub async fn run_all(config: &Config, transport: Arc<dyn ConnectorTransport>) -> Vec<TestResult> {
    let mut results = Vec::new();

    match connect_with(config, transport).await {
        Ok(mut session) => results.push(smcb_readability(&mut session).await),
        Err(e) => results.push(TestResult::failure(SMCB_TEST_NAME, describe(&e))),
    }

    let ca_chain = match &config.idp.ca_directory {
        Some(dir) => match load_ca_chain(dir) {
            Ok(chain) => chain,
            Err(e) => {
                results.push(TestResult::failure(IDP_TEST_NAME, describe(&e.into())));
                return results;
            }
        },
        None => Vec::new(),
    };

    results.extend(
        idp_reachability(
            &config.diagnostics.test_cases_path(),
            &ca_chain,
            config.idp.probe_timeouts(),
        )
        .await,
    );
    results
}
