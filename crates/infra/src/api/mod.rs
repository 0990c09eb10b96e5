//! Authenticated request pipeline for the partner APIs
//!
//! Domain clients build endpoint URLs with [`ApiUrl`], send them through the
//! session's [`RequestExecutor`] and decode the raw JSON they get back.
//! Listing endpoints feed the executor into
//! [`bankpartner_core::collect_all`] page by page.

pub mod executor;
pub mod url;
pub mod webhook;

pub use executor::RequestExecutor;
pub use url::ApiUrl;
pub use webhook::WebhookHelper;
