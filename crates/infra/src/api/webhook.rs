//! Webhook registration shared by the banking, billing and Pix clients
//!
//! The three webhook APIs differ only in URL and scope, so callers pass both.

use bankpartner_domain::{IncludeWebhookRequest, Result, Webhook};
use reqwest::Method;
use tracing::info;

use super::executor::RequestExecutor;

/// Include, retrieve and delete a webhook through the request executor
pub struct WebhookHelper<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> WebhookHelper<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Register `webhook_url` as the callback for the API at `url`
    pub async fn include(&self, url: &str, scope: &str, webhook_url: &str) -> Result<()> {
        let request = IncludeWebhookRequest { webhook_url: webhook_url.to_string() };
        let _: Option<serde_json::Value> =
            self.executor.send_json(Method::PUT, url, scope, &request).await?;
        info!(url, "webhook included");
        Ok(())
    }

    pub async fn retrieve(&self, url: &str, scope: &str) -> Result<Webhook> {
        self.executor.get_json(url, scope).await
    }

    pub async fn delete(&self, url: &str, scope: &str) -> Result<()> {
        self.executor.delete(url, scope).await?;
        info!(url, "webhook deleted");
        Ok(())
    }
}
