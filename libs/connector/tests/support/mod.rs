#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authenticator_connector::soap::SoapAction;
use authenticator_connector::{
    ConnectorClient, ConnectorEntryOptions, ConnectorTransport, ContextParameter, Error,
    RequestConfig, Result, TransportResponse,
};

/// A request as seen by the scripted connector.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub action: Option<SoapAction>,
    pub body: String,
    pub config: RequestConfig,
}

/// Connector double answering each SOAP operation with a canned response.
#[derive(Default)]
pub struct ScriptedConnector {
    responses: Mutex<HashMap<SoapAction, TransportResponse>>,
    sds: Mutex<Option<TransportResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, action: SoapAction, body: impl Into<String>) -> &Self {
        self.respond_with(action, 200, body)
    }

    pub fn respond_with(&self, action: SoapAction, status: u16, body: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().insert(
            action,
            TransportResponse {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn serve_sds(&self, body: impl Into<String>) -> &Self {
        *self.sds.lock().unwrap() = Some(TransportResponse {
            status: 200,
            body: body.into(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, action: SoapAction) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.action == Some(action))
            .collect()
    }
}

#[async_trait]
impl ConnectorTransport for ScriptedConnector {
    async fn post(
        &self,
        url: &str,
        body: String,
        config: &RequestConfig,
    ) -> Result<TransportResponse> {
        let action = config.header("SOAPAction").and_then(SoapAction::from_header);
        self.requests.lock().unwrap().push(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            action,
            body,
            config: config.clone(),
        });

        action
            .and_then(|action| self.responses.lock().unwrap().get(&action).cloned())
            .ok_or_else(|| Error::Transport(format!("no scripted response for {action:?}")))
    }

    async fn get(&self, url: &str, config: &RequestConfig) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            action: None,
            body: String::new(),
            config: config.clone(),
        });

        self.sds
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Transport("connection refused".to_string()))
    }
}

pub fn context() -> ContextParameter {
    ContextParameter {
        mandant_id: "Mandant1".to_string(),
        client_id: "ClientID1".to_string(),
        workplace_id: "Workplace1".to_string(),
        user_id: "User1".to_string(),
    }
}

pub fn client(connector: &Arc<ScriptedConnector>) -> ConnectorClient {
    let options = ConnectorEntryOptions::new("konnektor.local", 8443, "/ws");
    ConnectorClient::new(options, context(), connector.clone())
}

fn envelope(body: &str) -> String {
    format!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:CONN="http://ws.gematik.de/conn/ConnectorCommon/v5.0"
    xmlns:CARDCMN="http://ws.gematik.de/conn/CardServiceCommon/v2.0"
    xmlns:CARD="http://ws.gematik.de/conn/CardService/v8.1"><soap:Body>{body}</soap:Body></soap:Envelope>"#
    )
}

/// `GetCardsResponse` listing `(card type, handle)` pairs.
pub fn cards_response(cards: &[(&str, &str)]) -> String {
    let cards: String = cards
        .iter()
        .enumerate()
        .map(|(slot, (card_type, handle))| {
            format!(
                "<CARD:Card><CONN:CardHandle>{handle}</CONN:CardHandle>\
                 <CARDCMN:CardType>{card_type}</CARDCMN:CardType>\
                 <CARDCMN:Iccsn>8027600000000000{slot:04}</CARDCMN:Iccsn>\
                 <CARDCMN:CtId>CT1</CARDCMN:CtId><CARDCMN:SlotId>{}</CARDCMN:SlotId></CARD:Card>",
                slot + 1
            )
        })
        .collect();
    envelope(&format!(
        "<GetCardsResponse><CONN:Status><CONN:Result>OK</CONN:Result></CONN:Status>\
         <CARD:Cards>{cards}</CARD:Cards></GetCardsResponse>"
    ))
}

pub fn pin_status_response(status: &str) -> String {
    envelope(&format!(
        "<GetPinStatusResponse><CONN:Status><CONN:Result>OK</CONN:Result></CONN:Status>\
         <CARD:PinStatus>{status}</CARD:PinStatus></GetPinStatusResponse>"
    ))
}

pub fn certificate_response(certificate: &str) -> String {
    envelope(&format!(
        "<ReadCardCertificateResponse><CONN:Status><CONN:Result>OK</CONN:Result></CONN:Status>\
         <X509DataInfoList><X509DataInfo><CertRef>C.AUT</CertRef><X509Data>\
         <X509Certificate>{certificate}</X509Certificate></X509Data></X509DataInfo>\
         </X509DataInfoList></ReadCardCertificateResponse>"
    ))
}

pub fn signature_response(signature: &str) -> String {
    envelope(&format!(
        "<ExternalAuthenticateResponse><CONN:Status><CONN:Result>OK</CONN:Result></CONN:Status>\
         <SignatureObject><Base64Signature Type=\"urn:ietf:rfc:3447\">{signature}</Base64Signature>\
         </SignatureObject></ExternalAuthenticateResponse>"
    ))
}

pub fn fault_response(code: &str, text: &str) -> String {
    envelope(&format!(
        "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>{text}</faultstring>\
         <detail><Error><Trace><Code>{code}</Code><ErrorText>{text}</ErrorText></Trace></Error>\
         </detail></soap:Fault>"
    ))
}
