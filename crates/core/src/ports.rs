//! Port interfaces
//!
//! These traits define the boundaries between the transport-independent
//! logic and the HTTP implementations in `bankpartner-infra`.

use async_trait::async_trait;
use bankpartner_domain::{Page, Result};

/// Source of bearer tokens, one per OAuth scope
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return an access token valid for `scope`, requesting a new one when
    /// none is cached or the cached one has expired
    async fn access_token(&self, scope: &str) -> Result<String>;

    /// Drop any cached token for `scope`
    async fn invalidate(&self, scope: &str);
}

/// A paginated listing addressed by zero-based page index
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    async fn fetch_page(&self, index: u32) -> Result<Page<T>>;
}
