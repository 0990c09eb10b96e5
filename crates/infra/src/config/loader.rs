//! Configuration loader
//!
//! Loads session configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file, when present, is merged into the process environment
//! 2. Environment variables are tried first
//! 3. If incomplete, falls back to loading from file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BANKPARTNER_ENVIRONMENT`: `SANDBOX` or `PRODUCTION`
//! - `BANKPARTNER_CLIENT_ID`: OAuth client identifier
//! - `BANKPARTNER_CLIENT_SECRET`: OAuth client secret
//! - `BANKPARTNER_CERT_PATH`: PKCS#12 certificate bundle
//! - `BANKPARTNER_CERT_PASSWORD`: bundle password
//! - `BANKPARTNER_ACCOUNT`: checking account (optional)
//! - `BANKPARTNER_DEBUG`: log requests and responses (true/false)
//! - `BANKPARTNER_RATE_LIMIT_CONTROL`: retry once on 429 (true/false)
//! - `BANKPARTNER_BASE_URL`: base URL override (optional)
//!
//! ## File Locations
//! The loader probes `bankpartner.toml` and `bankpartner.json` in the current
//! working directory and its two parents, then next to the executable.

use std::path::{Path, PathBuf};

use bankpartner_domain::{Config, ConfigBuilder, Result, SdkError};

pub const ENV_ENVIRONMENT: &str = "BANKPARTNER_ENVIRONMENT";
pub const ENV_CLIENT_ID: &str = "BANKPARTNER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "BANKPARTNER_CLIENT_SECRET";
pub const ENV_CERT_PATH: &str = "BANKPARTNER_CERT_PATH";
pub const ENV_CERT_PASSWORD: &str = "BANKPARTNER_CERT_PASSWORD";
pub const ENV_ACCOUNT: &str = "BANKPARTNER_ACCOUNT";
pub const ENV_DEBUG: &str = "BANKPARTNER_DEBUG";
pub const ENV_RATE_LIMIT_CONTROL: &str = "BANKPARTNER_RATE_LIMIT_CONTROL";
pub const ENV_BASE_URL: &str = "BANKPARTNER_BASE_URL";

/// Load configuration with automatic fallback strategy
///
/// Merges a `.env` file into the environment, then attempts to load from
/// environment variables. If that fails, falls back to a config file.
///
/// # Errors
/// - `SdkError::InvalidEnvironment` if `BANKPARTNER_ENVIRONMENT` is set to an
///   unknown value; the file is not consulted in that case
/// - otherwise the file loader's error when neither source yields a valid
///   configuration
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let builder = builder_from_env();
    let environment_set = builder.environment.is_some();

    match builder.build() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e @ SdkError::InvalidEnvironment { .. }) if environment_set => Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// - `SdkError::InvalidEnvironment` if `BANKPARTNER_ENVIRONMENT` is missing or
///   unknown
/// - `SdkError::Config` if credentials or certificate settings are missing
pub fn load_from_env() -> Result<Config> {
    builder_from_env().build()
}

/// Collect whatever `BANKPARTNER_*` variables are set into a builder
pub fn builder_from_env() -> ConfigBuilder {
    ConfigBuilder {
        environment: env_opt(ENV_ENVIRONMENT),
        client_id: env_opt(ENV_CLIENT_ID),
        client_secret: env_opt(ENV_CLIENT_SECRET),
        certificate_path: env_opt(ENV_CERT_PATH).map(PathBuf::from),
        certificate_password: env_opt(ENV_CERT_PASSWORD),
        debug: env_bool(ENV_DEBUG, false),
        account: env_opt(ENV_ACCOUNT),
        rate_limit_control: Some(env_bool(ENV_RATE_LIMIT_CONTROL, true)),
        base_url: env_opt(ENV_BASE_URL),
        ..ConfigBuilder::default()
    }
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// file extension.
///
/// # Errors
/// Returns `SdkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
///
/// and any error from [`ConfigBuilder::build`].
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SdkError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SdkError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SdkError::config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)?.build()
}

/// Parse a builder from file contents; `.toml` or `.json` by extension
fn parse_config(contents: &str, path: &Path) -> Result<ConfigBuilder> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SdkError::config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SdkError::config(format!("Invalid JSON format: {}", e))),
        _ => Err(SdkError::config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .into_iter()
        .flat_map(|root| [root.join("bankpartner.toml"), root.join("bankpartner.json")])
        .find(|path| path.exists())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
