//! Flow variants and their signing algorithms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JwsError;

/// Key algorithm family of the card's authentication certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Crypt {
    #[default]
    Rsa,
    Ecc,
}

impl Crypt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crypt::Rsa => "RSA",
            Crypt::Ecc => "ECC",
        }
    }
}

impl fmt::Display for Crypt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which IDP flow requested the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// Legacy OIDC relay fronted by the connector signature service.
    Ogr,
    /// Keycloak compatible flow.
    Cidp,
}

/// Algorithm identifiers for one flow and key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningAlgorithm {
    /// JWS `alg` header value.
    pub alg: &'static str,
    /// `SignatureType` of the external authenticate request.
    pub signature_type: &'static str,
    /// `SignatureSchemes` of the external authenticate request; empty for ECC.
    pub signature_scheme: &'static str,
}

const RSA_SIGNATURE_TYPE: &str = "urn:ietf:rfc:3447";
const ECDSA_SIGNATURE_TYPE: &str = "urn:bsi:tr:03111:ecdsa";

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Ogr => "ogr",
            FlowType::Cidp => "cidp",
        }
    }

    pub fn algorithm(&self, crypt: Crypt) -> SigningAlgorithm {
        match (self, crypt) {
            (FlowType::Ogr, Crypt::Rsa) => SigningAlgorithm {
                alg: "RS256",
                signature_type: RSA_SIGNATURE_TYPE,
                signature_scheme: "RSASSA-PKCS1-v1_5",
            },
            (FlowType::Ogr, Crypt::Ecc) => SigningAlgorithm {
                alg: "ES256",
                signature_type: ECDSA_SIGNATURE_TYPE,
                signature_scheme: "",
            },
            (FlowType::Cidp, Crypt::Rsa) => SigningAlgorithm {
                alg: "PS256",
                signature_type: RSA_SIGNATURE_TYPE,
                signature_scheme: "RSASSA-PSS",
            },
            (FlowType::Cidp, Crypt::Ecc) => SigningAlgorithm {
                alg: "BP256R1",
                signature_type: ECDSA_SIGNATURE_TYPE,
                signature_scheme: "",
            },
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = JwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ogr" => Ok(FlowType::Ogr),
            "cidp" | "keycloak" => Ok(FlowType::Cidp),
            other => Err(JwsError::UnknownFlow(other.to_string())),
        }
    }
}
