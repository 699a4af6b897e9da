//! SOAP response parsing
//!
//! Connector responses are matched by local element name so that the
//! various namespace prefixes used by different connector vendors do not
//! matter.

use roxmltree::{Document, Node};

use crate::error::{Error, Result};
use crate::models::{CardData, CardType, PinStatus};
use crate::transport::TransportResponse;

fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn descendant_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    descendant(node, name)
        .map(text_of)
        .filter(|text| !text.is_empty())
}

/// Parse a connector response body, turning faults and error statuses into
/// [`Error::Connector`] and feeding the document to `extract` otherwise.
pub fn parse_response<T>(
    response: &TransportResponse,
    extract: impl FnOnce(&Document<'_>) -> Result<T>,
) -> Result<T> {
    let doc = match Document::parse(&response.body) {
        Ok(doc) => doc,
        Err(e) if response.is_success() => return Err(Error::Xml(e)),
        Err(_) => {
            return Err(Error::Transport(format!(
                "Connector answered with HTTP {}",
                response.status
            )))
        }
    };

    check_fault(&doc)?;
    if !response.is_success() {
        return Err(Error::Transport(format!(
            "Connector answered with HTTP {}",
            response.status
        )));
    }
    check_status(&doc)?;
    extract(&doc)
}

/// Map a SOAP fault to a connector error, preferring the gematik error trace.
fn check_fault(doc: &Document<'_>) -> Result<()> {
    let Some(fault) = descendant(doc.root(), "Fault") else {
        return Ok(());
    };

    if let Some(trace) = descendant(fault, "Trace") {
        let code = descendant_text(trace, "Code").unwrap_or_else(|| "unknown".to_string());
        let description = descendant_text(trace, "ErrorText")
            .or_else(|| descendant_text(fault, "faultstring"))
            .unwrap_or_default();
        return Err(Error::Connector { code, description });
    }

    Err(Error::Connector {
        code: descendant_text(fault, "faultcode").unwrap_or_else(|| "unknown".to_string()),
        description: descendant_text(fault, "faultstring").unwrap_or_default(),
    })
}

/// `Status/Result` other than `OK` (e.g. `Warning` is accepted, `Error` is not).
fn check_status(doc: &Document<'_>) -> Result<()> {
    let Some(status) = descendant(doc.root(), "Status") else {
        return Ok(());
    };
    let result = child(status, "Result").map(text_of).unwrap_or_default();
    if result.is_empty() || result == "OK" || result == "Warning" {
        return Ok(());
    }

    let code = descendant_text(status, "Code").unwrap_or_else(|| result.clone());
    let description = descendant_text(status, "ErrorText").unwrap_or(result);
    Err(Error::Connector { code, description })
}

/// Cards listed in a `GetCardsResponse`.
pub fn extract_cards(doc: &Document<'_>) -> Result<Vec<CardData>> {
    let cards_node = descendant(doc.root(), "Cards")
        .ok_or_else(|| Error::MalformedResponse("GetCardsResponse without Cards".to_string()))?;

    cards_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Card")
        .map(|card| {
            let field = |name: &str| descendant_text(card, name).unwrap_or_default();
            let card_handle = field("CardHandle");
            if card_handle.is_empty() {
                return Err(Error::MalformedResponse("Card without CardHandle".to_string()));
            }
            let card_type = field("CardType").parse::<CardType>().map_err(|_| {
                Error::MalformedResponse(format!("Unsupported card type '{}'", field("CardType")))
            });
            Ok(card_type.map(|card_type| CardData {
                card_type,
                ct_id: field("CtId"),
                slot_nr: field("SlotId"),
                card_handle,
                iccsn: field("Iccsn"),
                pin_status: None,
                certificate: None,
            }))
        })
        // Cards of types this client does not handle (eGK, KVK, ...) are skipped.
        .filter_map(|result| match result {
            Ok(Ok(card)) => Some(Ok(card)),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Skipping card");
                None
            }
            Err(e) => Some(Err(e)),
        })
        .collect()
}

pub fn extract_pin_status(doc: &Document<'_>) -> Result<PinStatus> {
    descendant_text(doc.root(), "PinStatus")
        .map(|raw| PinStatus::parse(&raw))
        .ok_or_else(|| {
            Error::MalformedResponse("GetPinStatusResponse without PinStatus".to_string())
        })
}

/// Base64 DER of the first certificate in the response, whitespace removed.
pub fn extract_certificate(doc: &Document<'_>) -> Result<String> {
    descendant_text(doc.root(), "X509Certificate")
        .map(|b64| b64.split_whitespace().collect())
        .ok_or_else(|| {
            Error::MalformedResponse("ReadCardCertificateResponse without X509Certificate".into())
        })
}

/// Base64 signature value of an `ExternalAuthenticateResponse`.
pub fn extract_signature(doc: &Document<'_>) -> Result<String> {
    descendant_text(doc.root(), "Base64Signature")
        .map(|b64| b64.split_whitespace().collect())
        .ok_or_else(|| {
            Error::MalformedResponse("ExternalAuthenticateResponse without Base64Signature".into())
        })
}
