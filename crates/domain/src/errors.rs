//! Error types used throughout the SDK

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level rejection reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default, alias = "razao")]
    pub reason: String,

    #[serde(default, alias = "propriedade")]
    pub property: String,

    #[serde(default, alias = "valor")]
    pub value: Option<String>,
}

/// Error payload returned by the partner APIs
///
/// Every [`SdkError`] carries one. When the server body cannot be decoded a
/// synthetic detail is built from the status line or the transport message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub detail: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default, alias = "violacoes")]
    pub violations: Vec<Violation>,
}

impl ErrorDetail {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Synthetic detail for an error response whose body could not be decoded
    pub fn from_status_line(status_line: impl Into<String>) -> Self {
        Self::new("Unexpected response").with_detail(status_line)
    }

    /// Decode a server error body.
    ///
    /// Returns `None` for empty bodies, non-JSON bodies and JSON documents
    /// that carry neither a title nor a detail.
    pub fn from_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        let detail: Self = serde_json::from_str(trimmed).ok()?;
        if detail.title.is_empty() && detail.detail.is_none() && detail.violations.is_empty() {
            return None;
        }
        Some(detail)
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail.as_deref() {
            Some(detail) if !detail.is_empty() && !self.title.is_empty() => {
                write!(f, "{}: {}", self.title, detail)?;
            }
            Some(detail) if !detail.is_empty() => write!(f, "{detail}")?,
            _ => write!(f, "{}", self.title)?,
        }
        for violation in &self.violations {
            write!(f, " [{}: {}]", violation.property, violation.reason)?;
        }
        Ok(())
    }
}

/// Broad classification of [`SdkError`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkErrorCategory {
    /// Certificate bundle missing, unreadable, invalid or expired
    Certificate,
    /// Unknown environment or incomplete credentials
    Configuration,
    /// 4xx responses and client-side transport failures
    Client,
    /// 5xx responses
    Server,
}

/// Main error type for the SDK
///
/// Callers can match a specific variant or fall back to [`SdkError::category`]
/// and [`SdkError::detail`] to handle errors broadly.
#[derive(Error, Debug, Clone)]
pub enum SdkError {
    #[error("Certificate not found: {}", .path.display())]
    CertificateNotFound { path: PathBuf, detail: ErrorDetail },

    #[error("Certificate expired: {0}")]
    CertificateExpired(ErrorDetail),

    #[error("Certificate error: {0}")]
    Certificate(ErrorDetail),

    #[error("Invalid environment '{value}': {detail}")]
    InvalidEnvironment { value: String, detail: ErrorDetail },

    #[error("Configuration error: {0}")]
    Config(ErrorDetail),

    #[error("Client error: {detail}")]
    Client { status: Option<u16>, detail: ErrorDetail },

    #[error("Server error: {detail}")]
    Server { status: u16, detail: ErrorDetail },
}

/// Title of the detail carried by [`SdkError::transport`] errors
pub const TRANSPORT_FAILURE_TITLE: &str = "Transport failure";

/// Title of the detail carried by [`SdkError::malformed_response`] errors
pub const MALFORMED_RESPONSE_TITLE: &str = "Malformed response";

impl SdkError {
    pub fn certificate_not_found(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let detail = ErrorDetail::new("Certificate not found")
            .with_detail(format!("no readable certificate bundle at {}", path.display()));
        Self::CertificateNotFound { path, detail }
    }

    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Certificate(ErrorDetail::new("Invalid certificate").with_detail(message))
    }

    pub fn certificate_expired(message: impl Into<String>) -> Self {
        Self::CertificateExpired(ErrorDetail::new("Certificate expired").with_detail(message))
    }

    pub fn invalid_environment(value: impl Into<String>) -> Self {
        let value = value.into();
        let detail = ErrorDetail::new("Invalid environment")
            .with_detail("expected one of SANDBOX, PRODUCTION");
        Self::InvalidEnvironment { value, detail }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(ErrorDetail::new("Invalid configuration").with_detail(message))
    }

    /// Client-side failure that never reached an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Client {
            status: None,
            detail: ErrorDetail::new(TRANSPORT_FAILURE_TITLE).with_detail(message),
        }
    }

    /// A response arrived but its body could not be decoded
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::Client {
            status: None,
            detail: ErrorDetail::new(MALFORMED_RESPONSE_TITLE).with_detail(message),
        }
    }

    pub fn client(status: u16, detail: ErrorDetail) -> Self {
        Self::Client { status: Some(status), detail }
    }

    pub fn server(status: u16, detail: ErrorDetail) -> Self {
        Self::Server { status, detail }
    }

    /// The error payload carried by this error
    pub fn detail(&self) -> &ErrorDetail {
        match self {
            Self::CertificateNotFound { detail, .. }
            | Self::InvalidEnvironment { detail, .. }
            | Self::Client { detail, .. }
            | Self::Server { detail, .. } => detail,
            Self::CertificateExpired(detail) | Self::Certificate(detail) | Self::Config(detail) => {
                detail
            }
        }
    }

    /// HTTP status that produced this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } => *status,
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> SdkErrorCategory {
        match self {
            Self::CertificateNotFound { .. } | Self::CertificateExpired(_) | Self::Certificate(_) => {
                SdkErrorCategory::Certificate
            }
            Self::InvalidEnvironment { .. } | Self::Config(_) => SdkErrorCategory::Configuration,
            Self::Client { .. } => SdkErrorCategory::Client,
            Self::Server { .. } => SdkErrorCategory::Server,
        }
    }

    /// True for HTTP 429 responses
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Whether repeating the same call later may succeed: 5xx, 429 and
    /// transport failures. A body that failed to decode stays malformed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Server { .. } => true,
            Self::Client { status: Some(429), .. } => true,
            Self::Client { status: None, detail } => detail.title == TRANSPORT_FAILURE_TITLE,
            _ => false,
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_english_error_body() {
        let body = r#"{
            "title": "Invalid request",
            "detail": "Some fields are invalid",
            "timestamp": "2024-03-01T10:00:00Z",
            "violations": [{"reason": "must not be blank", "property": "payer.name", "value": ""}]
        }"#;

        let detail = ErrorDetail::from_body(body).unwrap();
        assert_eq!(detail.title, "Invalid request");
        assert_eq!(detail.timestamp.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(detail.violations.len(), 1);
        assert_eq!(detail.violations[0].property, "payer.name");
    }

    #[test]
    fn test_decode_localized_violation_keys() {
        let body = r#"{
            "title": "Requisicao invalida",
            "violacoes": [{"razao": "valor invalido", "propriedade": "valorNominal", "valor": "-1"}]
        }"#;

        let detail = ErrorDetail::from_body(body).unwrap();
        assert_eq!(detail.violations[0].reason, "valor invalido");
        assert_eq!(detail.violations[0].property, "valorNominal");
        assert_eq!(detail.violations[0].value.as_deref(), Some("-1"));
    }

    #[test]
    fn test_undecodable_bodies_yield_none() {
        assert!(ErrorDetail::from_body("").is_none());
        assert!(ErrorDetail::from_body("<html>Bad gateway</html>").is_none());
        assert!(ErrorDetail::from_body("{}").is_none());
    }

    #[test]
    fn test_detail_display() {
        let detail = ErrorDetail::new("Invalid request").with_detail("missing payer");
        assert_eq!(detail.to_string(), "Invalid request: missing payer");

        let synthetic = ErrorDetail::from_status_line("502 Bad Gateway");
        assert_eq!(synthetic.to_string(), "Unexpected response: 502 Bad Gateway");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            SdkError::certificate_not_found("/tmp/missing.pfx").category(),
            SdkErrorCategory::Certificate
        );
        assert_eq!(SdkError::certificate("bad password").category(), SdkErrorCategory::Certificate);
        assert_eq!(SdkError::invalid_environment("STAGING").category(), SdkErrorCategory::Configuration);
        assert_eq!(SdkError::client(404, ErrorDetail::new("x")).category(), SdkErrorCategory::Client);
        assert_eq!(SdkError::server(503, ErrorDetail::new("x")).category(), SdkErrorCategory::Server);
    }

    #[test]
    fn test_every_variant_carries_detail() {
        let err = SdkError::certificate_not_found("/tmp/missing.pfx");
        assert!(err.detail().detail.as_deref().unwrap().contains("/tmp/missing.pfx"));
        assert!(err.to_string().contains("/tmp/missing.pfx"));

        let err = SdkError::invalid_environment("STAGING");
        assert!(err.to_string().contains("STAGING"));
        assert_eq!(err.detail().title, "Invalid environment");
    }

    #[test]
    fn test_retry_metadata() {
        assert!(SdkError::server(500, ErrorDetail::new("x")).is_retryable());
        assert!(SdkError::client(429, ErrorDetail::new("x")).is_retryable());
        assert!(SdkError::client(429, ErrorDetail::new("x")).is_rate_limited());
        assert!(SdkError::transport("connection refused").is_retryable());
        assert!(!SdkError::malformed_response("expected value at line 1").is_retryable());
        assert!(!SdkError::client(400, ErrorDetail::new("x")).is_retryable());
        assert!(!SdkError::certificate("bad").is_retryable());
    }
}
