#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authenticator::Config;
use authenticator_connector::soap::SoapAction;
use authenticator_connector::{
    ConnectorTransport, ContextParameter, Error, RequestConfig, Result, TransportResponse,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Connector double keyed by SOAP operation; records every request body.
#[derive(Default)]
pub struct MockConnector {
    responses: Mutex<HashMap<SoapAction, (u16, String)>>,
    once: Mutex<HashMap<SoapAction, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<(SoapAction, String)>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, action: SoapAction, body: impl Into<String>) -> &Self {
        self.respond_with(action, 200, body)
    }

    pub fn respond_with(&self, action: SoapAction, status: u16, body: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(action, (status, body.into()));
        self
    }

    /// Answer the next `action` with `body`, then fall back to `respond`.
    pub fn respond_once(&self, action: SoapAction, body: impl Into<String>) -> &Self {
        self.once
            .lock()
            .unwrap()
            .entry(action)
            .or_default()
            .push_back((200, body.into()));
        self
    }

    pub fn bodies_for(&self, action: SoapAction) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl ConnectorTransport for MockConnector {
    async fn post(
        &self,
        _url: &str,
        body: String,
        config: &RequestConfig,
    ) -> Result<TransportResponse> {
        let action = config
            .header("SOAPAction")
            .and_then(SoapAction::from_header)
            .ok_or_else(|| Error::Transport("missing SOAPAction".to_string()))?;
        self.requests.lock().unwrap().push((action, body));

        if let Some((status, body)) = self
            .once
            .lock()
            .unwrap()
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
        {
            return Ok(TransportResponse { status, body });
        }

        self.responses
            .lock()
            .unwrap()
            .get(&action)
            .cloned()
            .map(|(status, body)| TransportResponse { status, body })
            .ok_or_else(|| Error::Transport(format!("no response scripted for {action:?}")))
    }

    async fn get(&self, _url: &str, _config: &RequestConfig) -> Result<TransportResponse> {
        Err(Error::Transport("connection refused".to_string()))
    }
}

/// Configuration pointing at a fake connector, IDP list under `app_dir`.
pub fn test_config(app_dir: &Path) -> Config {
    let mut config = Config::default();
    config.connector.hostname = "konnektor.test".to_string();
    config.connector.discover_services = false;
    config.context = ContextParameter {
        mandant_id: "Mandant1".to_string(),
        client_id: "ClientID1".to_string(),
        workplace_id: "Workplace1".to_string(),
        user_id: "User1".to_string(),
    };
    config.diagnostics.app_directory = Some(app_dir.to_path_buf());
    config
}

/// Plain HTTP server answering every request with `status_line`.
pub async fn http_stub(status_line: &'static str) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response =
                    format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(format!("http://{addr}/.well-known/openid-configuration"))
}

fn envelope(body: &str) -> String {
    format!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{body}</soap:Body></soap:Envelope>"#
    )
}

pub fn cards_response(cards: &[(&str, &str)]) -> String {
    let cards: String = cards
        .iter()
        .map(|(card_type, handle)| {
            format!(
                "<Card><CardHandle>{handle}</CardHandle><CardType>{card_type}</CardType>\
                 <Iccsn>80276001011699910102</Iccsn><CtId>CT1</CtId><SlotId>1</SlotId></Card>"
            )
        })
        .collect();
    envelope(&format!(
        "<GetCardsResponse><Status><Result>OK</Result></Status><Cards>{cards}</Cards></GetCardsResponse>"
    ))
}

pub fn pin_status_response(status: &str) -> String {
    envelope(&format!(
        "<GetPinStatusResponse><Status><Result>OK</Result></Status>\
         <PinStatus>{status}</PinStatus></GetPinStatusResponse>"
    ))
}

pub fn certificate_response(certificate: &str) -> String {
    envelope(&format!(
        "<ReadCardCertificateResponse><Status><Result>OK</Result></Status><X509DataInfoList>\
         <X509DataInfo><X509Data><X509Certificate>{certificate}</X509Certificate></X509Data>\
         </X509DataInfo></X509DataInfoList></ReadCardCertificateResponse>"
    ))
}

pub fn signature_response(signature: &str) -> String {
    envelope(&format!(
        "<ExternalAuthenticateResponse><Status><Result>OK</Result></Status><SignatureObject>\
         <Base64Signature>{signature}</Base64Signature></SignatureObject>\
         </ExternalAuthenticateResponse>"
    ))
}

pub fn fault_response(code: &str, text: &str) -> String {
    envelope(&format!(
        "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>{text}</faultstring>\
         <detail><Error><Trace><Code>{code}</Code><ErrorText>{text}</ErrorText></Trace>\
         </Error></detail></soap:Fault>"
    ))
}
