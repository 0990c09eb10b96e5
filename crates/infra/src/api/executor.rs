//! Request executor
//!
//! Every call to the partner APIs goes through [`RequestExecutor::execute`]:
//! it attaches the bearer token for the requested scope, sends the request
//! over the secure channel, classifies the response, and retries once when
//! the server rate-limits the caller.

use std::sync::Arc;
use std::time::Duration;

use bankpartner_core::AccessTokenProvider;
use bankpartner_domain::constants::headers;
use bankpartner_domain::{Config, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::{classify_response, IntoSdkError};
use crate::http::SecureChannel;

/// Authenticated request pipeline shared by all domain clients of a session
pub struct RequestExecutor {
    config: Arc<Config>,
    channel: Arc<SecureChannel>,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RequestExecutor {
    pub fn new(
        config: Arc<Config>,
        channel: Arc<SecureChannel>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self { config, channel, tokens }
    }

    /// Issue `method url` with a token for `scope` and return the raw
    /// response body.
    ///
    /// When rate-limit control is enabled a 429 response is not returned to
    /// the caller straight away: the executor waits for the server's
    /// `Retry-After` hint (or the configured backoff) and sends the request
    /// once more.
    ///
    /// # Errors
    /// - certificate errors when the secure channel cannot be built
    /// - token errors from the token provider
    /// - `SdkError::Client` for 4xx responses and transport failures
    /// - `SdkError::Server` for 5xx responses
    #[instrument(skip(self, body))]
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        scope: &str,
        body: Option<&str>,
    ) -> Result<String> {
        let client = self.channel.client()?;
        let mut rate_limit_retry_used = false;

        loop {
            let token = self.tokens.access_token(scope).await?;

            let mut builder = client
                .request(method.clone(), url)
                .header(AUTHORIZATION, format!("Bearer {token}"));
            if let Some(account) = self.config.account() {
                builder = builder.header(headers::ACCOUNT, account);
            }
            if let Some(body) = body {
                builder =
                    builder.header(CONTENT_TYPE, headers::CONTENT_TYPE_JSON).body(body.to_string());
            }
            let request = builder.build().map_err(IntoSdkError::into_sdk_error)?;

            if self.config.debug() {
                info!(
                    target: "http_debug",
                    method = %request.method(),
                    url = %request.url(),
                    headers = %describe_headers(request.headers()),
                    body = body.unwrap_or(""),
                    "request"
                );
            }

            debug!("sending request");
            let response = client.execute(request).await.map_err(IntoSdkError::into_sdk_error)?;

            let status = response.status();
            let response_headers = response.headers().clone();
            let text = response.text().await.map_err(IntoSdkError::into_sdk_error)?;

            if self.config.debug() {
                info!(
                    target: "http_debug",
                    %status,
                    headers = %describe_headers(&response_headers),
                    body = %text,
                    "response"
                );
            }

            if status.is_success() {
                debug!(%status, "request succeeded");
                return Ok(text);
            }

            if status == StatusCode::TOO_MANY_REQUESTS
                && self.config.rate_limit_control()
                && !rate_limit_retry_used
            {
                match rate_limit_wait(&self.config, &response_headers, Utc::now()) {
                    Some(wait) => {
                        warn!(
                            wait_secs = wait.as_secs(),
                            "rate limited, retrying once after waiting"
                        );
                        tokio::time::sleep(wait).await;
                        rate_limit_retry_used = true;
                        continue;
                    }
                    None => warn!(
                        max_wait_secs = self.config.rate_limit_max_wait().as_secs(),
                        "rate limited with a retry hint beyond the allowed wait, not retrying"
                    ),
                }
            }

            debug!(%status, "request failed");
            return Err(classify_response(status, &text));
        }
    }

    pub async fn get(&self, url: &str, scope: &str) -> Result<String> {
        self.execute(Method::GET, url, scope, None).await
    }

    pub async fn post(&self, url: &str, scope: &str, body: &str) -> Result<String> {
        self.execute(Method::POST, url, scope, Some(body)).await
    }

    pub async fn put(&self, url: &str, scope: &str, body: &str) -> Result<String> {
        self.execute(Method::PUT, url, scope, Some(body)).await
    }

    pub async fn patch(&self, url: &str, scope: &str, body: &str) -> Result<String> {
        self.execute(Method::PATCH, url, scope, Some(body)).await
    }

    pub async fn delete(&self, url: &str, scope: &str) -> Result<String> {
        self.execute(Method::DELETE, url, scope, None).await
    }

    /// GET and decode the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, scope: &str) -> Result<T> {
        let text = self.get(url, scope).await?;
        decode(&text)
    }

    /// Send `body` as JSON and decode the JSON response.
    ///
    /// Empty responses (204 and friends) decode from `null`, so `()` and
    /// `Option<_>` work as response types.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        url: &str,
        scope: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_string(body).map_err(IntoSdkError::into_sdk_error)?;
        let text = self.execute(method, url, scope, Some(&payload)).await?;
        decode(&text)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(IntoSdkError::into_sdk_error);
    }
    serde_json::from_str(text).map_err(IntoSdkError::into_sdk_error)
}

/// Wait before the rate-limit retry, or `None` when the server asks for more
/// than `rate_limit_max_wait`. Without a usable hint the configured backoff
/// applies.
fn rate_limit_wait(config: &Config, headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    match retry_after(headers, now) {
        Some(hint) if hint > config.rate_limit_max_wait() => None,
        Some(hint) => Some(hint),
        None => Some(config.rate_limit_backoff()),
    }
}

/// Wait requested by a `Retry-After` header, either delta-seconds or an
/// HTTP date
fn retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

/// Header list for debug output, without credentials
fn describe_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| *name != AUTHORIZATION)
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join(", ")
}
