//! JWS composers for the OGR and CIDP flows
//!
//! Both flows produce `header.payload.signature`; they differ in the header
//! claims, the payload shape and the algorithm identifiers. The card signs
//! `SHA-256(signing input)`, never the signing input itself.

use serde::Serialize;

use crate::assertion::SignedAssertion;
use crate::encoding::{sha256_digest, signing_input};
use crate::error::Result;
use crate::flow::{Crypt, FlowType, SigningAlgorithm};

/// Serialized protected header and payload of one assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwsOptions {
    pub protected_header: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Capabilities shared by the flow specific composers.
pub trait JwsComposer {
    fn flow(&self) -> FlowType;

    fn algorithm(&self) -> SigningAlgorithm;

    fn create_jws_options(&self) -> Result<JwsOptions>;

    fn create_signing_input(&self) -> Result<String> {
        let options = self.create_jws_options()?;
        Ok(signing_input(&options.protected_header, &options.payload))
    }

    /// Digest handed to the card for signing.
    fn digest(&self) -> Result<[u8; 32]> {
        Ok(sha256_digest(self.create_signing_input()?))
    }

    /// Attach the raw card signature.
    fn compose(&self, signature: Vec<u8>) -> Result<SignedAssertion> {
        let options = self.create_jws_options()?;
        SignedAssertion::compose(options.protected_header, options.payload, signature)
    }
}

#[derive(Serialize)]
struct OgrHeader<'a> {
    alg: &'a str,
    typ: &'a str,
    x5c: [&'a str; 1],
}

#[derive(Serialize)]
struct OgrPayload<'a> {
    challenge: &'a str,
}

#[derive(Serialize)]
struct CidpHeader<'a> {
    x5c: [&'a str; 1],
    typ: &'a str,
    cty: &'a str,
    alg: &'a str,
}

#[derive(Serialize)]
struct CidpPayload<'a> {
    njwt: &'a str,
}

/// OGR assertion: `{"alg","typ":"JWT","x5c"}` over `{"challenge"}`.
#[derive(Debug, Clone)]
pub struct OgrJws {
    /// Base64 DER authentication certificate.
    pub certificate: String,
    pub challenge: String,
    pub crypt: Crypt,
}

impl JwsComposer for OgrJws {
    fn flow(&self) -> FlowType {
        FlowType::Ogr
    }

    fn algorithm(&self) -> SigningAlgorithm {
        FlowType::Ogr.algorithm(self.crypt)
    }

    fn create_jws_options(&self) -> Result<JwsOptions> {
        let header = OgrHeader {
            alg: self.algorithm().alg,
            typ: "JWT",
            x5c: [self.certificate.as_str()],
        };
        let payload = OgrPayload {
            challenge: &self.challenge,
        };
        Ok(JwsOptions {
            protected_header: serde_json::to_vec(&header)?,
            payload: serde_json::to_vec(&payload)?,
        })
    }
}

/// CIDP assertion: nested JWT carrying the IDP challenge as `njwt`.
#[derive(Debug, Clone)]
pub struct CidpJws {
    pub certificate: String,
    pub challenge: String,
    pub crypt: Crypt,
}

impl JwsComposer for CidpJws {
    fn flow(&self) -> FlowType {
        FlowType::Cidp
    }

    fn algorithm(&self) -> SigningAlgorithm {
        FlowType::Cidp.algorithm(self.crypt)
    }

    fn create_jws_options(&self) -> Result<JwsOptions> {
        let header = CidpHeader {
            x5c: [self.certificate.as_str()],
            typ: "JWT",
            cty: "NJWT",
            alg: self.algorithm().alg,
        };
        let payload = CidpPayload {
            njwt: &self.challenge,
        };
        Ok(JwsOptions {
            protected_header: serde_json::to_vec(&header)?,
            payload: serde_json::to_vec(&payload)?,
        })
    }
}

impl FlowType {
    /// Composer for this flow.
    pub fn composer(
        self,
        certificate: impl Into<String>,
        challenge: impl Into<String>,
        crypt: Crypt,
    ) -> Box<dyn JwsComposer + Send + Sync> {
        let certificate = certificate.into();
        let challenge = challenge.into();
        match self {
            FlowType::Ogr => Box::new(OgrJws {
                certificate,
                challenge,
                crypt,
            }),
            FlowType::Cidp => Box::new(CidpJws {
                certificate,
                challenge,
                crypt,
            }),
        }
    }
}
