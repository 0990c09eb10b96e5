//! Endpoint URL construction

use bankpartner_domain::{Config, Result, SdkError};
use url::Url;

/// Builder joining the session base URL, an endpoint path and query
/// parameters.
///
/// ```
/// use bankpartner_infra::api::ApiUrl;
///
/// let url = ApiUrl::from_base("https://cdpj.partners.bancointer.com.br", "/banking/v2/extrato")
///     .query("dataInicio", "2024-01-01")
///     .query("dataFim", "2024-01-31")
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     url,
///     "https://cdpj.partners.bancointer.com.br/banking/v2/extrato?dataInicio=2024-01-01&dataFim=2024-01-31"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ApiUrl {
    base: String,
    path: String,
    query: Vec<(String, String)>,
}

impl ApiUrl {
    pub fn new(config: &Config, path: impl Into<String>) -> Self {
        Self::from_base(config.base_url(), path)
    }

    pub fn from_base(base: impl Into<String>, path: impl Into<String>) -> Self {
        Self { base: base.into(), path: path.into(), query: Vec::new() }
    }

    /// Append a query parameter; values are percent-encoded on build
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// # Errors
    /// `SdkError::Config` when the base URL and path do not form a valid URL
    pub fn build(&self) -> Result<String> {
        let base = self.base.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let joined = if path.is_empty() { base.to_string() } else { format!("{base}/{path}") };

        let mut url = Url::parse(&joined)
            .map_err(|err| SdkError::config(format!("invalid URL '{joined}': {err}")))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.into())
    }
}
