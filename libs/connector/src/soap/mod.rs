//! SOAP envelopes and response parsing for the connector services

pub mod envelope;
pub mod response;

pub use envelope::{
    ExternalAuthenticateRequest, GetCardsRequest, GetPinStatusRequest, ReadCardCertificateRequest,
    SoapAction, SoapRequest, SOAP_CONTENT_TYPE,
};
pub use response::parse_response;
