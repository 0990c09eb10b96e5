//! OAuth2 client-credentials tokens, cached per scope
//!
//! Tokens are requested over the session's secure channel and kept until
//! `expires_in` minus the configured safety margin has elapsed on the local
//! clock. Concurrent callers asking for the same missing or expired scope
//! share a single token request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bankpartner_core::{AccessTokenProvider, Clock, SystemClock};
use bankpartner_domain::constants::{GRANT_TYPE_CLIENT_CREDENTIALS, TOKEN_PATH};
use bankpartner_domain::{CachedToken, Config, Result, TokenResponse};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::errors::{classify_response, IntoSdkError};
use crate::http::SecureChannel;

/// Per-scope token cache backed by the authorization server
pub struct TokenProvider {
    config: Arc<Config>,
    channel: Arc<SecureChannel>,
    clock: Arc<dyn Clock>,
    tokens: RwLock<HashMap<String, CachedToken>>,
    refresh_locks: parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenProvider {
    pub fn new(config: Arc<Config>, channel: Arc<SecureChannel>) -> Self {
        Self::with_clock(config, channel, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Arc<Config>,
        channel: Arc<SecureChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            channel,
            clock,
            tokens: RwLock::new(HashMap::new()),
            refresh_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Valid token for `scope`, requesting a new one when none is cached or
    /// the cached one is past its validity window.
    ///
    /// # Errors
    /// - certificate errors from the secure channel
    /// - `SdkError::Client` / `SdkError::Server` for a rejected token request
    ///   or a transport failure
    #[instrument(skip(self))]
    pub async fn token(&self, scope: &str) -> Result<CachedToken> {
        if let Some(token) = self.valid_cached(scope).await {
            return Ok(token);
        }

        let lock = self.refresh_lock(scope);
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.valid_cached(scope).await {
            return Ok(token);
        }

        let token = self.request_token(scope).await?;
        self.tokens.write().await.insert(scope.to_string(), token.clone());
        Ok(token)
    }

    /// Scopes that currently hold a cached token, valid or not
    pub async fn cached_scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.tokens.read().await.keys().cloned().collect();
        scopes.sort();
        scopes
    }

    /// Forget the token for `scope`; the next call requests a new one
    pub async fn invalidate(&self, scope: &str) {
        if self.tokens.write().await.remove(scope).is_some() {
            debug!(scope, "cached token invalidated");
        }
    }

    /// Forget every cached token
    pub async fn clear(&self) {
        self.tokens.write().await.clear();
    }

    async fn valid_cached(&self, scope: &str) -> Option<CachedToken> {
        let now = self.clock.now_utc();
        let margin = self.config.token_expiry_margin();
        self.tokens.read().await.get(scope).filter(|token| token.is_valid_at(now, margin)).cloned()
    }

    fn refresh_lock(&self, scope: &str) -> Arc<Mutex<()>> {
        self.refresh_locks.lock().entry(scope.to_string()).or_default().clone()
    }

    async fn request_token(&self, scope: &str) -> Result<CachedToken> {
        let client = self.channel.client()?;
        let url = format!("{}{}", self.config.base_url(), TOKEN_PATH);

        let form = [
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret()),
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
            ("scope", scope),
        ];

        if self.config.debug() {
            info!(
                target: "http_debug",
                method = "POST",
                url = %url,
                client_id = self.config.client_id(),
                grant_type = GRANT_TYPE_CLIENT_CREDENTIALS,
                scope,
                "token request"
            );
        }

        let response =
            client.post(&url).form(&form).send().await.map_err(IntoSdkError::into_sdk_error)?;
        let status = response.status();
        let body = response.text().await.map_err(IntoSdkError::into_sdk_error)?;

        if self.config.debug() {
            info!(target: "http_debug", %status, "token response");
        }

        if !status.is_success() {
            debug!(%status, "token request rejected");
            return Err(classify_response(status, &body));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(IntoSdkError::into_sdk_error)?;
        let token = CachedToken::from_response(parsed, scope, self.clock.now_utc());

        info!(
            scope,
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "access token acquired"
        );
        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for TokenProvider {
    async fn access_token(&self, scope: &str) -> Result<String> {
        self.token(scope).await.map(|token| token.access_token)
    }

    async fn invalidate(&self, scope: &str) {
        TokenProvider::invalidate(self, scope).await;
    }
}
