//! Data model shared by the connector operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

pub use authenticator_jws::{Crypt, FlowType};

/// Smartcard types the authenticator works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "HBA")]
    Hba,
    #[serde(rename = "SMC-B")]
    SmcB,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Hba => "HBA",
            CardType::SmcB => "SMC-B",
        }
    }

    /// PIN reference queried for this card type.
    pub fn pin_type(&self) -> &'static str {
        match self {
            CardType::Hba => "PIN.CH",
            CardType::SmcB => "PIN.SMC",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HBA" => Ok(CardType::Hba),
            "SMC-B" | "SMCB" => Ok(CardType::SmcB),
            other => Err(Error::Configuration(format!("Unknown card type '{other}'"))),
        }
    }
}

/// PIN state reported by the connector.
///
/// Unknown values are kept verbatim so they can be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinStatus {
    Verified,
    Verifiable,
    Blocked,
    Rejected,
    TransportPin,
    Other(String),
}

impl PinStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "VERIFIED" => PinStatus::Verified,
            "VERIFIABLE" => PinStatus::Verifiable,
            "BLOCKED" => PinStatus::Blocked,
            "REJECTED" => PinStatus::Rejected,
            "TRANSPORT_PIN" => PinStatus::TransportPin,
            other => PinStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PinStatus::Verified => "VERIFIED",
            PinStatus::Verifiable => "VERIFIABLE",
            PinStatus::Blocked => "BLOCKED",
            PinStatus::Rejected => "REJECTED",
            PinStatus::TransportPin => "TRANSPORT_PIN",
            PinStatus::Other(raw) => raw,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, PinStatus::Verified)
    }
}

impl fmt::Display for PinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card as known to the current session.
///
/// `pin_status` and `certificate` stay empty until they are requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub card_type: CardType,
    pub ct_id: String,
    pub slot_nr: String,
    pub card_handle: String,
    pub iccsn: String,
    pub pin_status: Option<PinStatus>,
    /// Base64 DER certificate as transported by the connector.
    pub certificate: Option<String>,
}

/// Identifies the calling context for every connector call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParameter {
    pub mandant_id: String,
    pub client_id: String,
    pub workplace_id: String,
    pub user_id: String,
}

/// Parameters of one external authenticate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSignParameter {
    pub signature_type: String,
    /// Scheme used when the OGR flow requested the signature.
    pub ogr_signature_scheme: String,
    /// Scheme used when the CIDP flow requested the signature.
    pub cidp_signature_scheme: String,
    /// Base64 of the bytes the card signs.
    pub base64_data: String,
}

impl AuthSignParameter {
    /// Parameters for signing `base64_data` with a card of the given key family.
    pub fn new(crypt: Crypt, base64_data: impl Into<String>) -> Self {
        let ogr = FlowType::Ogr.algorithm(crypt);
        let cidp = FlowType::Cidp.algorithm(crypt);
        Self {
            signature_type: cidp.signature_type.to_string(),
            ogr_signature_scheme: ogr.signature_scheme.to_string(),
            cidp_signature_scheme: cidp.signature_scheme.to_string(),
            base64_data: base64_data.into(),
        }
    }

    pub fn signature_scheme(&self, flow: FlowType) -> &str {
        match flow {
            FlowType::Ogr => &self.ogr_signature_scheme,
            FlowType::Cidp => &self.cidp_signature_scheme,
        }
    }
}

/// How the authenticator proves itself to the connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsAuthType {
    BasicAuth,
    ServerClientCertAuth,
    #[default]
    ServerCertAuth,
}

/// Multi-tenant connector farm remapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmMapping {
    #[serde(default = "default_farm_host_pattern")]
    pub host_pattern: String,
    #[serde(default = "default_farm_path_prefix")]
    pub path_prefix: String,
}

fn default_farm_host_pattern() -> String {
    "ksp.ltuzd.telematik-test".to_string()
}

fn default_farm_path_prefix() -> String {
    "/kon23".to_string()
}

impl Default for FarmMapping {
    fn default() -> Self {
        Self {
            host_pattern: default_farm_host_pattern(),
            path_prefix: default_farm_path_prefix(),
        }
    }
}

/// Persisted connector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorEntryOptions {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub tls_auth_type: TlsAuthType,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub cert_file: Option<PathBuf>,
    #[serde(default)]
    pub reject_unauthorized: Option<bool>,
    #[serde(default)]
    pub remote_kt: Option<String>,
    #[serde(default)]
    pub local_kt: Option<String>,
    #[serde(default)]
    pub farm: FarmMapping,
}

fn default_port() -> u16 {
    443
}

fn default_protocol() -> String {
    "https".to_string()
}

impl ConnectorEntryOptions {
    pub fn new(hostname: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            path: path.into(),
            protocol: default_protocol(),
            tls_auth_type: TlsAuthType::default(),
            username: None,
            password: None,
            key_file: None,
            cert_file: None,
            reject_unauthorized: None,
            remote_kt: None,
            local_kt: None,
            farm: FarmMapping::default(),
        }
    }
}
