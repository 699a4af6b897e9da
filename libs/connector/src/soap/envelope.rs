//! Typed SOAP request envelopes
//!
//! Each request is a struct with every template field mandatory; rendering
//! substitutes all placeholders of its template with XML-escaped values.

use quick_xml::escape::escape;

use crate::models::{CardType, ContextParameter, Crypt};

pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

const GET_CARDS_TEMPLATE: &str = include_str!("../../assets/soap/get-cards.xml");
const GET_PIN_STATUS_TEMPLATE: &str = include_str!("../../assets/soap/get-pin-status.xml");
const READ_CARD_CERTIFICATE_TEMPLATE: &str =
    include_str!("../../assets/soap/read-card-certificate.xml");
const AUTH_SIGN_TEMPLATE: &str = include_str!("../../assets/soap/auth-sign.xml");

/// Connector operations and their `SOAPAction` header values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapAction {
    GetCards,
    GetPinStatus,
    ReadCardCertificate,
    ExternalAuthenticate,
}

impl SoapAction {
    pub fn header_value(&self) -> &'static str {
        match self {
            SoapAction::GetCards => "http://ws.gematik.de/conn/EventService/v7.2#GetCards",
            SoapAction::GetPinStatus => "http://ws.gematik.de/conn/CardService/v8.1#GetPinStatus",
            SoapAction::ReadCardCertificate => {
                "http://ws.gematik.de/conn/CertificateService/v6.0#ReadCardCertificate"
            }
            SoapAction::ExternalAuthenticate => {
                "http://ws.gematik.de/conn/SignatureService/v7.4#ExternalAuthenticate"
            }
        }
    }

    /// Service name as listed in `connector.sds`.
    pub fn service_name(&self) -> &'static str {
        match self {
            SoapAction::GetCards => "EventService",
            SoapAction::GetPinStatus => "CardService",
            SoapAction::ReadCardCertificate => "CertificateService",
            SoapAction::ExternalAuthenticate => "AuthSignatureService",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoapAction::GetCards => "GetCards",
            SoapAction::GetPinStatus => "GetPinStatus",
            SoapAction::ReadCardCertificate => "ReadCardCertificate",
            SoapAction::ExternalAuthenticate => "ExternalAuthenticate",
        }
    }

    /// Resolve a `SOAPAction` header value (full URI or bare operation name).
    pub fn from_header(value: &str) -> Option<Self> {
        let name = value.trim_matches('"').rsplit('#').next().unwrap_or(value);
        [
            SoapAction::GetCards,
            SoapAction::GetPinStatus,
            SoapAction::ReadCardCertificate,
            SoapAction::ExternalAuthenticate,
        ]
        .into_iter()
        .find(|action| action.name() == name)
    }
}

/// A request that renders to a complete SOAP envelope.
pub trait SoapRequest {
    fn action(&self) -> SoapAction;
    fn render(&self) -> String;
}

/// Single pass over the template; inserted values are never scanned again.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let candidate = &rest[open..];
        let token = candidate.find('}').map(|close| &candidate[..=close]);
        let value = token.and_then(|token| {
            values
                .iter()
                .find(|(placeholder, _)| *placeholder == token)
                .map(|(_, value)| (token.len(), *value))
        });

        match value {
            Some((consumed, value)) => {
                rendered.push_str(&escape(value));
                rest = &candidate[consumed..];
            }
            None => {
                rendered.push('{');
                rest = &candidate[1..];
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

fn context_values(context: &ContextParameter) -> [(&'static str, &str); 4] {
    [
        ("{MANDANT}", context.mandant_id.as_str()),
        ("{CLIENT}", context.client_id.as_str()),
        ("{WORKPLACE}", context.workplace_id.as_str()),
        ("{USER}", context.user_id.as_str()),
    ]
}

/// GetCards filters by card type only; the PIN type travels with GetPinStatus.
#[derive(Debug, Clone)]
pub struct GetCardsRequest<'a> {
    pub context: &'a ContextParameter,
    pub card_type: CardType,
}

impl SoapRequest for GetCardsRequest<'_> {
    fn action(&self) -> SoapAction {
        SoapAction::GetCards
    }

    fn render(&self) -> String {
        let mut values = context_values(self.context).to_vec();
        values.push(("{CARDTYPE}", self.card_type.as_str()));
        fill(GET_CARDS_TEMPLATE, &values)
    }
}

#[derive(Debug, Clone)]
pub struct GetPinStatusRequest<'a> {
    pub context: &'a ContextParameter,
    pub card_handle: &'a str,
    pub pin_type: &'a str,
}

impl SoapRequest for GetPinStatusRequest<'_> {
    fn action(&self) -> SoapAction {
        SoapAction::GetPinStatus
    }

    fn render(&self) -> String {
        let mut values = context_values(self.context).to_vec();
        values.push(("{CARDHANDLE}", self.card_handle));
        values.push(("{PINTYPE}", self.pin_type));
        fill(GET_PIN_STATUS_TEMPLATE, &values)
    }
}

#[derive(Debug, Clone)]
pub struct ReadCardCertificateRequest<'a> {
    pub context: &'a ContextParameter,
    pub card_handle: &'a str,
    pub cert_ref: &'a str,
    pub crypt: Crypt,
}

impl SoapRequest for ReadCardCertificateRequest<'_> {
    fn action(&self) -> SoapAction {
        SoapAction::ReadCardCertificate
    }

    fn render(&self) -> String {
        let mut values = context_values(self.context).to_vec();
        values.push(("{CARDHANDLE}", self.card_handle));
        values.push(("{CERTREF}", self.cert_ref));
        values.push(("{CRYPT}", self.crypt.as_str()));
        fill(READ_CARD_CERTIFICATE_TEMPLATE, &values)
    }
}

/// External authenticate envelope; `signature_scheme` is already selected
/// for the requesting flow.
#[derive(Debug, Clone)]
pub struct ExternalAuthenticateRequest<'a> {
    pub context: &'a ContextParameter,
    pub card_handle: &'a str,
    pub signature_type: &'a str,
    pub signature_scheme: &'a str,
    pub base64_data: &'a str,
}

impl SoapRequest for ExternalAuthenticateRequest<'_> {
    fn action(&self) -> SoapAction {
        SoapAction::ExternalAuthenticate
    }

    fn render(&self) -> String {
        let mut values = context_values(self.context).to_vec();
        values.push(("{CARDHANDLE}", self.card_handle));
        values.push(("{SIGNATURETYPE}", self.signature_type));
        values.push(("{SIGNATURESCHEME}", self.signature_scheme));
        values.push(("{BASE64DATA}", self.base64_data));
        fill(AUTH_SIGN_TEMPLATE, &values)
    }
}
