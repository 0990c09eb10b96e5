//! Endpoint paths, header names, scope identifiers and default settings

/// Base URL of the partner sandbox environment
pub const SANDBOX_BASE_URL: &str = "https://cdpj-sandbox.partners.uatinter.co";

/// Base URL of the partner production environment
pub const PRODUCTION_BASE_URL: &str = "https://cdpj.partners.bancointer.com.br";

/// OAuth2 token endpoint, relative to the environment base URL
pub const TOKEN_PATH: &str = "/oauth/v2/token";

/// Grant type used for every token request
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// HTTP header names used by the transport layer
pub mod headers {
    /// Selects the checking account when a credential maps to several accounts
    pub const ACCOUNT: &str = "x-conta-corrente";

    /// Content type for JSON request bodies
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Defaults applied by [`crate::ConfigBuilder`] when a value is not supplied
pub mod defaults {
    /// TCP/TLS connect timeout, in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Whole-request timeout, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Wait before the single rate-limit retry when the server sends no hint
    pub const RATE_LIMIT_BACKOFF_SECS: u64 = 60;

    /// Longest `Retry-After` hint honoured; longer hints surface the 429
    pub const RATE_LIMIT_MAX_WAIT_SECS: u64 = 60;

    /// Tokens are treated as expired this many seconds before nominal expiry
    pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 5;

    /// Certificates expiring within this many days produce a session warning
    pub const CERTIFICATE_WARNING_DAYS: u32 = 30;
}

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("bankpartner-sdk-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// OAuth2 scope identifiers accepted by the partner authorization server
pub mod scopes {
    pub const STATEMENT_READ: &str = "extrato.read";

    pub const BILLING_READ: &str = "boleto-cobranca.read";
    pub const BILLING_WRITE: &str = "boleto-cobranca.write";

    pub const BILLET_PAYMENT_READ: &str = "pagamento-boleto.read";
    pub const BILLET_PAYMENT_WRITE: &str = "pagamento-boleto.write";
    pub const DARF_PAYMENT_WRITE: &str = "pagamento-darf.write";
    pub const BATCH_PAYMENT_READ: &str = "pagamento-lote.read";
    pub const BATCH_PAYMENT_WRITE: &str = "pagamento-lote.write";
    pub const PIX_PAYMENT_READ: &str = "pagamento-pix.read";
    pub const PIX_PAYMENT_WRITE: &str = "pagamento-pix.write";

    pub const BANKING_WEBHOOK_READ: &str = "webhook-banking.read";
    pub const BANKING_WEBHOOK_WRITE: &str = "webhook-banking.write";

    pub const IMMEDIATE_CHARGE_READ: &str = "cob.read";
    pub const IMMEDIATE_CHARGE_WRITE: &str = "cob.write";
    pub const DUE_DATE_CHARGE_READ: &str = "cobv.read";
    pub const DUE_DATE_CHARGE_WRITE: &str = "cobv.write";
    pub const DUE_DATE_CHARGE_BATCH_READ: &str = "lotecobv.read";
    pub const DUE_DATE_CHARGE_BATCH_WRITE: &str = "lotecobv.write";
    pub const PIX_READ: &str = "pix.read";
    pub const PIX_WRITE: &str = "pix.write";
    pub const PIX_WEBHOOK_READ: &str = "webhook.read";
    pub const PIX_WEBHOOK_WRITE: &str = "webhook.write";
    pub const LOCATION_READ: &str = "payloadlocation.read";
    pub const LOCATION_WRITE: &str = "payloadlocation.write";

    /// Every scope above, in declaration order
    pub const ALL: &[&str] = &[
        STATEMENT_READ,
        BILLING_READ,
        BILLING_WRITE,
        BILLET_PAYMENT_READ,
        BILLET_PAYMENT_WRITE,
        DARF_PAYMENT_WRITE,
        BATCH_PAYMENT_READ,
        BATCH_PAYMENT_WRITE,
        PIX_PAYMENT_READ,
        PIX_PAYMENT_WRITE,
        BANKING_WEBHOOK_READ,
        BANKING_WEBHOOK_WRITE,
        IMMEDIATE_CHARGE_READ,
        IMMEDIATE_CHARGE_WRITE,
        DUE_DATE_CHARGE_READ,
        DUE_DATE_CHARGE_WRITE,
        DUE_DATE_CHARGE_BATCH_READ,
        DUE_DATE_CHARGE_BATCH_WRITE,
        PIX_READ,
        PIX_WRITE,
        PIX_WEBHOOK_READ,
        PIX_WEBHOOK_WRITE,
        LOCATION_READ,
        LOCATION_WRITE,
    ];

    /// Returns true if `scope` is one of the known identifiers
    pub fn is_known(scope: &str) -> bool {
        ALL.contains(&scope)
    }
}
