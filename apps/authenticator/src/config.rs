//! Application configuration
//!
//! Layered with the `config` crate: an optional file (`authenticator.toml`,
//! `.yaml` or `.json`, or the path in `AUTHENTICATOR_CONFIG`) followed by
//! `AUTHENTICATOR__SECTION__KEY` environment variables. A `.env` file in the
//! working directory is read first.

use authenticator_connector::{
    ConnectorEntryOptions, ContextParameter, Crypt, FarmMapping, ProbeTimeouts, TlsAuthType,
    DEFAULT_SDS_PATH,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "AUTHENTICATOR_CONFIG";
const DEFAULT_CONFIG_NAME: &str = "authenticator";
const ENV_PREFIX: &str = "AUTHENTICATOR";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub context: ContextParameter,
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub idp: IdpConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
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
    /// PEM certificates trusted for the connector.
    #[serde(default)]
    pub ca_directory: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub discover_services: bool,
    #[serde(default = "default_sds_path")]
    pub sds_path: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: default_port(),
            path: String::new(),
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
            ca_directory: None,
            discover_services: true,
            sds_path: default_sds_path(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ConnectorConfig {
    pub fn entry_options(&self) -> ConnectorEntryOptions {
        ConnectorEntryOptions {
            hostname: self.hostname.clone(),
            port: self.port,
            path: self.path.clone(),
            protocol: self.protocol.clone(),
            tls_auth_type: self.tls_auth_type,
            username: self.username.clone(),
            password: self.password.clone(),
            key_file: self.key_file.clone(),
            cert_file: self.cert_file.clone(),
            reject_unauthorized: self.reject_unauthorized,
            remote_kt: self.remote_kt.clone(),
            local_kt: self.local_kt.clone(),
            farm: self.farm.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigningConfig {
    #[serde(default)]
    pub crypt: Crypt,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdpConfig {
    /// Pinned IDP trust chain; never shared with the connector.
    #[serde(default)]
    pub ca_directory: Option<PathBuf>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_secure_connect_timeout_ms")]
    pub secure_connect_timeout_ms: u64,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            ca_directory: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            secure_connect_timeout_ms: default_secure_connect_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl IdpConfig {
    pub fn probe_timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            secure_connect: Duration::from_millis(self.secure_connect_timeout_ms),
            response: Duration::from_millis(self.response_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Installation directory holding the IDP list; defaults to the
    /// directory of the running executable.
    #[serde(default)]
    pub app_directory: Option<PathBuf>,
    #[serde(default = "default_test_cases_file")]
    pub config_file_name: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            app_directory: None,
            config_file_name: default_test_cases_file(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn test_cases_path(&self) -> PathBuf {
        let dir = self.app_directory.clone().unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        dir.join(&self.config_file_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub file_enabled: bool,
    #[serde(default = "default_log_directory")]
    pub file_directory: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_enabled: false,
            file_directory: default_log_directory(),
            file_prefix: default_log_prefix(),
            file_rotation: default_log_rotation(),
        }
    }
}

fn default_port() -> u16 {
    443
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sds_path() -> String {
    DEFAULT_SDS_PATH.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout_ms() -> u64 {
    500
}

fn default_secure_connect_timeout_ms() -> u64 {
    1000
}

fn default_response_timeout_ms() -> u64 {
    1000
}

fn default_test_cases_file() -> String {
    "test-cases-config.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("authenticator").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn default_log_prefix() -> String {
    "authenticator".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load from `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let file = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load with an explicit config file (extension decides the format).
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        let connector = &self.connector;
        if connector.hostname.trim().is_empty() {
            return Err(Error::Configuration("connector.hostname is required".into()));
        }
        if connector.port == 0 {
            return Err(Error::Configuration("connector.port must not be 0".into()));
        }

        let context = &self.context;
        for (name, value) in [
            ("context.mandant_id", &context.mandant_id),
            ("context.client_id", &context.client_id),
            ("context.workplace_id", &context.workplace_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!("{name} is required")));
            }
        }

        match connector.tls_auth_type {
            TlsAuthType::BasicAuth => {
                let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
                if !present(&connector.username) || !present(&connector.password) {
                    return Err(Error::Configuration(
                        "BasicAuth requires connector.username and connector.password".into(),
                    ));
                }
            }
            TlsAuthType::ServerClientCertAuth => {
                if connector.key_file.is_none() || connector.cert_file.is_none() {
                    return Err(Error::Configuration(
                        "ServerClientCertAuth requires connector.key_file and connector.cert_file"
                            .into(),
                    ));
                }
            }
            TlsAuthType::ServerCertAuth => {}
        }

        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            return Err(Error::Configuration(format!(
                "logging.file_rotation '{}' is not one of daily, hourly, minutely, never",
                self.logging.file_rotation
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
        [connector]
        hostname = "konnektor.praxis.local"

        [context]
        mandant_id = "Mandant1"
        client_id = "ClientID1"
        workplace_id = "Workplace1"
        user_id = "User1"
    "#;

    #[test]
    fn loads_file_with_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.connector.port, 443);
        assert_eq!(config.connector.sds_path, "/connector.sds");
        assert!(config.connector.discover_services);
        assert_eq!(config.connector.tls_auth_type, TlsAuthType::ServerCertAuth);
        assert_eq!(config.connector.farm.path_prefix, "/kon23");
        assert_eq!(config.signing.crypt, Crypt::Rsa);
        assert_eq!(config.diagnostics.config_file_name, "test-cases-config.json");
        assert_eq!(config.idp.probe_timeouts(), ProbeTimeouts::default());
        config.validate().unwrap();
    }

    #[test]
    fn reads_auth_and_signing_sections() {
        let file = write_config(
            r#"
            [connector]
            hostname = "ksp.ltuzd.telematik-test"
            port = 8443
            tls_auth_type = "BasicAuth"
            username = "praxis"
            password = "secret"
            reject_unauthorized = true

            [context]
            mandant_id = "M"
            client_id = "C"
            workplace_id = "W"

            [signing]
            crypt = "ECC"
        "#,
        );
        let config = Config::load_from(Some(file.path())).unwrap();
        config.validate().unwrap();

        let entry = config.connector.entry_options();
        assert_eq!(entry.port, 8443);
        assert_eq!(entry.tls_auth_type, TlsAuthType::BasicAuth);
        assert_eq!(entry.reject_unauthorized, Some(true));
        assert_eq!(config.signing.crypt, Crypt::Ecc);
    }

    #[test]
    fn validation_rejects_incomplete_settings() {
        let file = write_config(MINIMAL);
        let base = Config::load_from(Some(file.path())).unwrap();

        let mut missing_host = base.clone();
        missing_host.connector.hostname.clear();
        assert!(missing_host.validate().is_err());

        let mut basic_without_password = base.clone();
        basic_without_password.connector.tls_auth_type = TlsAuthType::BasicAuth;
        basic_without_password.connector.username = Some("user".into());
        assert!(basic_without_password.validate().is_err());

        let mut cert_without_key = base.clone();
        cert_without_key.connector.tls_auth_type = TlsAuthType::ServerClientCertAuth;
        cert_without_key.connector.cert_file = Some(PathBuf::from("client.pem"));
        assert!(cert_without_key.validate().is_err());

        let mut no_mandant = base;
        no_mandant.context.mandant_id.clear();
        let err = no_mandant.validate().unwrap_err();
        assert!(err.to_string().contains("mandant_id"));
    }

    #[test]
    fn test_cases_path_uses_app_directory() {
        let diagnostics = DiagnosticsConfig {
            app_directory: Some(PathBuf::from("/opt/authenticator")),
            ..Default::default()
        };
        assert_eq!(
            diagnostics.test_cases_path(),
            PathBuf::from("/opt/authenticator/test-cases-config.json")
        );
    }
}
