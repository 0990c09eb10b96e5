//! Session configuration
//!
//! A [`Config`] is built once per session through [`ConfigBuilder`] and then
//! shared by reference. Credentials, environment and transport settings are
//! immutable after construction. The debug, account and rate-limit flags can
//! be toggled through `&self` setters so every client holding the shared
//! configuration observes the change.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
use crate::errors::{Result, SdkError};

/// Target environment of the partner APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "SANDBOX",
            Self::Production => "PRODUCTION",
        }
    }
}

impl FromStr for Environment {
    type Err = SdkError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SANDBOX" => Ok(Self::Sandbox),
            "PRODUCTION" => Ok(Self::Production),
            _ => Err(SdkError::invalid_environment(value)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session configuration
pub struct Config {
    environment: Environment,
    client_id: String,
    client_secret: String,
    certificate_path: PathBuf,
    certificate_password: String,
    base_url: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
    rate_limit_backoff: Duration,
    rate_limit_max_wait: Duration,
    token_expiry_margin: Duration,
    certificate_warning_days: u32,
    debug: AtomicBool,
    rate_limit_control: AtomicBool,
    account: RwLock<Option<String>>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn certificate_path(&self) -> &Path {
        &self.certificate_path
    }

    pub fn certificate_password(&self) -> &str {
        &self.certificate_password
    }

    /// Base URL used for every call: the override when set, otherwise the
    /// environment's URL. Never ends with a slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.environment.base_url())
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Wait before the rate-limit retry when the server sends no `Retry-After`
    pub fn rate_limit_backoff(&self) -> Duration {
        self.rate_limit_backoff
    }

    /// Longest server-requested wait the rate-limit retry will sit through
    pub fn rate_limit_max_wait(&self) -> Duration {
        self.rate_limit_max_wait
    }

    pub fn token_expiry_margin(&self) -> Duration {
        self.token_expiry_margin
    }

    pub fn certificate_warning_days(&self) -> u32 {
        self.certificate_warning_days
    }

    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn rate_limit_control(&self) -> bool {
        self.rate_limit_control.load(Ordering::Relaxed)
    }

    pub fn set_rate_limit_control(&self, enabled: bool) {
        self.rate_limit_control.store(enabled, Ordering::Relaxed);
    }

    pub fn account(&self) -> Option<String> {
        self.account.read().clone()
    }

    pub fn set_account(&self, account: Option<String>) {
        *self.account.write() = account.filter(|a| !a.trim().is_empty());
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("certificate_path", &self.certificate_path)
            .field("certificate_password", &"<redacted>")
            .field("base_url", &self.base_url())
            .field("debug", &self.debug())
            .field("rate_limit_control", &self.rate_limit_control())
            .field("account", &self.account())
            .finish_non_exhaustive()
    }
}

/// Builder and file/env representation of [`Config`]
///
/// Every field is optional so the same struct can be deserialized from a
/// partial TOML/JSON document and completed programmatically. Validation
/// happens in [`ConfigBuilder::build`].
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigBuilder {
    pub environment: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub certificate_path: Option<PathBuf>,
    pub certificate_password: Option<String>,
    pub debug: bool,
    pub account: Option<String>,
    pub rate_limit_control: Option<bool>,
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub rate_limit_backoff_secs: Option<u64>,
    pub rate_limit_max_wait_secs: Option<u64>,
    pub token_expiry_margin_secs: Option<u64>,
    pub certificate_warning_days: Option<u32>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn certificate(mut self, path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        self.certificate_path = Some(path.into());
        self.certificate_password = Some(password.into());
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn rate_limit_control(mut self, enabled: bool) -> Self {
        self.rate_limit_control = Some(enabled);
        self
    }

    /// Point the session at a gateway or test server instead of the
    /// environment's base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff_secs = Some(backoff.as_secs());
        self
    }

    pub fn rate_limit_max_wait(mut self, max_wait: Duration) -> Self {
        self.rate_limit_max_wait_secs = Some(max_wait.as_secs());
        self
    }

    pub fn token_expiry_margin(mut self, margin: Duration) -> Self {
        self.token_expiry_margin_secs = Some(margin.as_secs());
        self
    }

    pub fn certificate_warning_days(mut self, days: u32) -> Self {
        self.certificate_warning_days = Some(days);
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// The environment is checked first so an unknown value is reported
    /// before anything else is looked at.
    ///
    /// # Errors
    /// - `SdkError::InvalidEnvironment` for a missing or unknown environment
    /// - `SdkError::Config` for missing credentials, certificate settings or a
    ///   malformed base URL override
    pub fn build(self) -> Result<Config> {
        let environment: Environment = self.environment.as_deref().unwrap_or_default().parse()?;

        let client_id = required(self.client_id, "client_id")?;
        let client_secret = required(self.client_secret, "client_secret")?;
        let certificate_path = self
            .certificate_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| SdkError::config("certificate_path is required"))?;
        let certificate_password = self.certificate_password.unwrap_or_default();

        let base_url = match self.base_url.map(|u| u.trim().trim_end_matches('/').to_string()) {
            Some(url) if url.is_empty() => None,
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(SdkError::config(format!("base_url must be an http(s) URL: {url}")));
            }
            other => other,
        };

        Ok(Config {
            environment,
            client_id,
            client_secret,
            certificate_path,
            certificate_password,
            base_url,
            connect_timeout: Duration::from_secs(
                self.connect_timeout_secs.unwrap_or(defaults::CONNECT_TIMEOUT_SECS),
            ),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs.unwrap_or(defaults::REQUEST_TIMEOUT_SECS),
            ),
            rate_limit_backoff: Duration::from_secs(
                self.rate_limit_backoff_secs.unwrap_or(defaults::RATE_LIMIT_BACKOFF_SECS),
            ),
            rate_limit_max_wait: Duration::from_secs(
                self.rate_limit_max_wait_secs.unwrap_or(defaults::RATE_LIMIT_MAX_WAIT_SECS),
            ),
            token_expiry_margin: Duration::from_secs(
                self.token_expiry_margin_secs.unwrap_or(defaults::TOKEN_EXPIRY_MARGIN_SECS),
            ),
            certificate_warning_days: self
                .certificate_warning_days
                .unwrap_or(defaults::CERTIFICATE_WARNING_DAYS),
            debug: AtomicBool::new(self.debug),
            rate_limit_control: AtomicBool::new(self.rate_limit_control.unwrap_or(true)),
            account: RwLock::new(self.account.filter(|a| !a.trim().is_empty())),
        })
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("environment", &self.environment)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("certificate_path", &self.certificate_path)
            .field("certificate_password", &self.certificate_password.as_ref().map(|_| "<redacted>"))
            .field("debug", &self.debug)
            .field("account", &self.account)
            .field("rate_limit_control", &self.rate_limit_control)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SdkError::config(format!("{name} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConfigBuilder {
        ConfigBuilder::new()
            .environment("SANDBOX")
            .client_id("client-id")
            .client_secret("client-secret")
            .certificate("/etc/certs/partner.pfx", "cert-pass")
    }

    #[test]
    fn test_environment_parsing_is_case_insensitive() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!(" PRODUCTION ".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_unknown_environment_is_rejected_before_other_checks() {
        // Credentials are missing too, but the environment must be reported.
        let err = ConfigBuilder::new().environment("STAGING").build().unwrap_err();
        assert!(matches!(err, SdkError::InvalidEnvironment { ref value, .. } if value == "STAGING"));
    }

    #[test]
    fn test_missing_environment_is_invalid() {
        let err = ConfigBuilder::new().client_id("x").build().unwrap_err();
        assert!(matches!(err, SdkError::InvalidEnvironment { .. }));
    }

    #[test]
    fn test_defaults() {
        let config = complete().build().unwrap();
        assert_eq!(config.environment(), Environment::Sandbox);
        assert_eq!(config.base_url(), SANDBOX_BASE_URL);
        assert!(config.rate_limit_control());
        assert!(!config.debug());
        assert_eq!(config.account(), None);
        assert_eq!(config.token_expiry_margin(), Duration::from_secs(5));
        assert_eq!(config.rate_limit_backoff(), Duration::from_secs(60));
        assert_eq!(config.rate_limit_max_wait(), Duration::from_secs(60));
        assert_eq!(config.certificate_warning_days(), 30);
    }

    #[test]
    fn test_missing_credentials() {
        let err = ConfigBuilder::new()
            .environment("PRODUCTION")
            .client_secret("secret")
            .certificate("/tmp/c.pfx", "p")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("client_id"));

        let err = ConfigBuilder::new()
            .environment("PRODUCTION")
            .client_id("id")
            .client_secret("secret")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("certificate_path"));
    }

    #[test]
    fn test_base_url_override_is_normalized() {
        let config = complete().base_url("http://127.0.0.1:8080/").build().unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");

        let err = complete().base_url("ftp://example.com").build().unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_flags_toggle_through_shared_reference() {
        let config = std::sync::Arc::new(complete().build().unwrap());
        let shared = config.clone();

        config.set_debug(true);
        config.set_rate_limit_control(false);
        config.set_account(Some("12345678".to_string()));

        assert!(shared.debug());
        assert!(!shared.rate_limit_control());
        assert_eq!(shared.account().as_deref(), Some("12345678"));

        config.set_account(Some("  ".to_string()));
        assert_eq!(shared.account(), None);
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = complete().build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("client-secret"));
        assert!(!rendered.contains("cert-pass"));
        assert!(rendered.contains("client-id"));

        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("client-secret"));
    }

    #[test]
    fn test_builder_deserializes_from_toml_shape() {
        let json = r#"{
            "environment": "production",
            "client_id": "id",
            "client_secret": "secret",
            "certificate_path": "/certs/p.pfx",
            "certificate_password": "pw",
            "rate_limit_control": false,
            "account": "987654"
        }"#;
        let builder: ConfigBuilder = serde_json::from_str(json).unwrap();
        let config = builder.build().unwrap();
        assert_eq!(config.environment(), Environment::Production);
        assert!(!config.rate_limit_control());
        assert_eq!(config.account().as_deref(), Some("987654"));
    }
}
