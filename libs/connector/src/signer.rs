//! External authenticate: let the card sign a challenge digest
//!
//! Never retried. A repeated request can prompt the card holder for the PIN
//! again and count towards the card's retry limit.

use crate::client::ConnectorClient;
use crate::error::Result;
use crate::models::{AuthSignParameter, ContextParameter, FlowType};
use crate::soap::response::extract_signature;
use crate::soap::{parse_response, ExternalAuthenticateRequest};

/// Sign `params.base64_data` with the card behind `card_handle`.
///
/// Returns the base64 signature value from the connector response. Faults
/// and transport errors propagate unchanged.
pub async fn sign_challenge(
    client: &ConnectorClient,
    context: &ContextParameter,
    endpoint: &str,
    card_handle: &str,
    params: &AuthSignParameter,
    flow: FlowType,
) -> Result<String> {
    let request = ExternalAuthenticateRequest {
        context,
        card_handle,
        signature_type: &params.signature_type,
        signature_scheme: params.signature_scheme(flow),
        base64_data: &params.base64_data,
    };

    tracing::info!(%flow, signature_type = %params.signature_type, "Requesting card signature");
    let response = client.call_at(endpoint, &request).await?;
    parse_response(&response, extract_signature)
}
