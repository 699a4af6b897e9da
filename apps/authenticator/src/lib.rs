//! Smartcard authenticator
//!
//! Signs IDP challenges with an HBA or SMC-B through a gematik connector and
//! runs support diagnostics against the configured connector and IDPs.

pub mod auth;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;

pub use auth::{connect, connect_with, AuthFlow};
pub use config::Config;
pub use diagnostics::{run_all, TestResult, TestStatus};
pub use error::{Error, Result};
