//! Mutual-TLS channel to the partner APIs
//!
//! One [`SecureChannel`] per session. It loads the PKCS#12 bundle, presents it
//! as the client identity and hands out a pooled `reqwest::Client` that every
//! token and data request of the session shares.

use std::sync::Arc;
use std::time::Duration;

use bankpartner_domain::constants::user_agent;
use bankpartner_domain::{Config, Result, SdkError};
use once_cell::sync::OnceCell;
use reqwest::{Client as ReqwestClient, Identity};
use tracing::{debug, info};

use crate::certificate;

/// Idle pooled connections are closed after this long.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Connection manager presenting the session's client certificate.
///
/// The underlying client is built on first use and shared by every request
/// of the session afterwards. A failed build is not cached, so the next
/// call tries again and reports the same certificate error.
pub struct SecureChannel {
    config: Arc<Config>,
    client: OnceCell<ReqwestClient>,
}

impl SecureChannel {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config, client: OnceCell::new() }
    }

    /// Shared client, building it on first call.
    ///
    /// # Errors
    /// - `SdkError::CertificateNotFound` if the bundle file is missing
    /// - `SdkError::Certificate` if the bundle cannot be loaded as a TLS
    ///   identity or the client cannot be constructed
    pub fn client(&self) -> Result<&ReqwestClient> {
        self.client.get_or_try_init(|| {
            let client = build_client(&self.config)?;
            info!(
                path = %self.config.certificate_path().display(),
                "secure channel initialized"
            );
            Ok(client)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

/// Build a client that presents the configured certificate on every TLS
/// handshake.
pub fn build_client(config: &Config) -> Result<ReqwestClient> {
    let bundle = certificate::read_bundle(config.certificate_path())?;

    let identity = Identity::from_pkcs12_der(&bundle, config.certificate_password())
        .map_err(|err| SdkError::certificate(format!("cannot load client identity: {err}")))?;

    debug!(
        connect_timeout = ?config.connect_timeout(),
        request_timeout = ?config.request_timeout(),
        "building secure channel"
    );

    ReqwestClient::builder()
        .use_native_tls()
        .identity(identity)
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .user_agent(user_agent())
        .no_proxy()
        .build()
        .map_err(|err| SdkError::certificate(format!("cannot build TLS client: {err}")))
}
