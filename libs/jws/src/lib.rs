//! Compact JWS composition for card signed IDP challenges
//!
//! The card never sees the JWS: a composer produces header and payload, the
//! SHA-256 digest of the signing input goes to the connector, and the
//! returned signature bytes complete the assertion.
//!
//! ```rust
//! use authenticator_jws::{Crypt, FlowType, JwsComposer, SignedAssertion};
//!
//! # fn example() -> authenticator_jws::Result<()> {
//! let composer = FlowType::Cidp.composer("MIIC...", "challenge", Crypt::Rsa);
//! let digest = composer.digest()?;
//! // ... digest is signed by the card ...
//! # let signature = digest.to_vec();
//! let assertion = composer.compose(signature)?;
//! let compact = assertion.to_compact();
//! assert_eq!(SignedAssertion::parse(&compact)?, assertion);
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod composer;
pub mod encoding;
pub mod error;
pub mod flow;

pub use assertion::SignedAssertion;
pub use composer::{CidpJws, JwsComposer, JwsOptions, OgrJws};
pub use encoding::{base64url_decode, base64url_encode, sha256_digest, signing_input};
pub use error::{JwsError, Result};
pub use flow::{Crypt, FlowType, SigningAlgorithm};
