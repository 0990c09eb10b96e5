//! Data types shared by the transport layer and the domain clients

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One page of a paginated listing
///
/// Listing endpoints report their paging metadata with either English or
/// Portuguese keys; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default, alias = "totalPaginas")]
    pub total_pages: u32,

    #[serde(default, alias = "totalElementos")]
    pub total_elements: u64,

    #[serde(default, alias = "primeiraPagina")]
    pub first: bool,

    #[serde(default, alias = "ultimaPagina")]
    pub last: bool,

    #[serde(default, alias = "tamanhoPagina")]
    pub page_size: u32,

    #[serde(default, alias = "numeroDeElementos")]
    pub number_of_elements: u32,

    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page with consistent metadata, mostly useful for tests and
    /// for endpoints that return bare arrays
    pub fn new(content: Vec<T>, index: u32, total_pages: u32) -> Self {
        let count = content.len() as u32;
        Self {
            total_pages,
            total_elements: 0,
            first: index == 0,
            last: index + 1 >= total_pages,
            page_size: count,
            number_of_elements: count,
            content,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first,
            last: self.last,
            page_size: self.page_size,
            number_of_elements: self.number_of_elements,
            content: self.content.into_iter().map(f).collect(),
        }
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }
}

/// Token endpoint response body
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    pub expires_in: i64,

    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Access token cached for one scope
///
/// `created_at` is the local capture time of the token response, so the
/// validity window depends only on the local clock and `expires_in`.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
    pub created_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn from_response(response: TokenResponse, scope: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: scope.to_string(),
            created_at,
        }
    }

    /// Nominal expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.expires_in)
    }

    /// `now < created_at + expires_in - margin`
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: std::time::Duration) -> bool {
        let margin = Duration::from_std(margin).unwrap_or_else(|_| Duration::zero());
        now < self.expires_at() - margin
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Validity window of a client certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    /// Whole days left before `not_after`, negative once expired
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_days()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.not_after <= now
    }
}

/// Registered webhook as returned by the webhook endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub webhook_url: String,

    #[serde(default, alias = "criacao")]
    pub creation_date: Option<String>,
}

/// Body of a webhook registration call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeWebhookRequest {
    pub webhook_url: String,
}
