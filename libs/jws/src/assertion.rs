//! Compact JWS serialization

use std::fmt;

use crate::encoding::{base64url_decode, base64url_encode, signing_input};
use crate::error::{JwsError, Result};

/// A signed assertion bound to one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAssertion {
    header: Vec<u8>,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl SignedAssertion {
    /// Assemble from serialized header and payload JSON and raw signature bytes.
    pub fn compose(header: Vec<u8>, payload: Vec<u8>, signature: Vec<u8>) -> Result<Self> {
        if signature.is_empty() {
            return Err(JwsError::EmptySignature);
        }
        Ok(Self {
            header,
            payload,
            signature,
        })
    }

    /// Split and decode a compact JWS.
    pub fn parse(compact: &str) -> Result<Self> {
        let mut segments = compact.trim().split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(JwsError::InvalidCompact(
                "expected three dot separated segments".to_string(),
            ));
        };

        Self::compose(
            base64url_decode(header)?,
            base64url_decode(payload)?,
            base64url_decode(signature)?,
        )
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn header_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.header)?)
    }

    pub fn payload_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    pub fn signing_input(&self) -> String {
        signing_input(&self.header, &self.payload)
    }

    pub fn to_compact(&self) -> String {
        format!(
            "{}.{}",
            self.signing_input(),
            base64url_encode(&self.signature)
        )
    }
}

impl fmt::Display for SignedAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact())
    }
}
