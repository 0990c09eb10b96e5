//! SDK session
//!
//! A [`Session`] owns everything one set of credentials needs: the shared
//! configuration, the lazily built secure channel, the token cache and the
//! request executor. Sessions are independent of each other, so several
//! credentials can be used side by side in one process.

use std::sync::Arc;

use bankpartner_core::{Clock, SystemClock};
use bankpartner_domain::{Config, ConfigBuilder, Result};
use tracing::{info, warn};

use crate::api::{RequestExecutor, WebhookHelper};
use crate::auth::TokenProvider;
use crate::certificate;
use crate::config::loader;
use crate::http::SecureChannel;

pub struct Session {
    config: Arc<Config>,
    channel: Arc<SecureChannel>,
    tokens: Arc<TokenProvider>,
    executor: RequestExecutor,
    warnings: Vec<String>,
}

impl Session {
    /// Validate `builder` and open a session.
    ///
    /// # Errors
    /// `SdkError::InvalidEnvironment` or `SdkError::Config` from validation.
    /// Certificate problems never fail construction; they show up in
    /// [`Session::warnings`] and as errors on the first request.
    pub fn from_builder(builder: ConfigBuilder) -> Result<Self> {
        Ok(Self::new(builder.build()?))
    }

    /// Open a session from `BANKPARTNER_*` variables or a config file
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(loader::load()?))
    }

    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(config);
        let warnings = certificate_warnings(&config, clock.as_ref());

        let channel = Arc::new(SecureChannel::new(config.clone()));
        let tokens = Arc::new(TokenProvider::with_clock(config.clone(), channel.clone(), clock));
        let executor = RequestExecutor::new(config.clone(), channel.clone(), tokens.clone());

        info!(
            environment = %config.environment(),
            base_url = config.base_url(),
            warnings = warnings.len(),
            "session created"
        );

        Self { config, channel, tokens, executor, warnings }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }

    pub fn channel(&self) -> &SecureChannel {
        &self.channel
    }

    pub fn webhooks(&self) -> WebhookHelper<'_> {
        WebhookHelper::new(&self.executor)
    }

    /// Notices collected while opening the session, such as an expiring
    /// certificate
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn set_debug(&self, enabled: bool) {
        self.config.set_debug(enabled);
    }

    pub fn set_account(&self, account: Option<String>) {
        self.config.set_account(account);
    }

    pub fn set_rate_limit_control(&self, enabled: bool) {
        self.config.set_rate_limit_control(enabled);
    }
}

fn certificate_warnings(config: &Config, clock: &dyn Clock) -> Vec<String> {
    let notice = match certificate::inspect(config.certificate_path(), config.certificate_password())
    {
        Ok(info) => certificate::expiry_warning(
            &info,
            clock.now_utc(),
            config.certificate_warning_days(),
        ),
        Err(err) => Some(format!("Certificate could not be inspected: {err}")),
    };

    if let Some(notice) = &notice {
        warn!(path = %config.certificate_path().display(), "{notice}");
    }

    notice.into_iter().collect()
}
