//! # Gateway Configuration
//!
//! Account credentials and endpoint URLs for the PagSeguro API.
//! Loaded once at startup, either from environment variables or from a TOML
//! file with one section per environment:
//!
//! ```toml
//! [development]
//! developer = true
//! base = "http://localhost:3000"
//! email = "john@doe.com"
//! authenticity_token = "9CA8D46AF0C6177CB4C23D76CAF5E4B0"
//!
//! [production]
//! email = "store@example.com"
//! authenticity_token = "..."
//!
//! [production.messages]
//! 11004 = "Moeda é obrigatória."
//! ```

use pagseguro_core::PaymentError;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

pub const LIVE_CHECKOUT_URL: &str = "https://ws.pagseguro.uol.com.br/v2/checkout";
pub const LIVE_NOTIFICATION_URL: &str =
    "https://ws.pagseguro.uol.com.br/v2/transactions/notifications";
pub const LIVE_PAYMENT_URL: &str = "https://pagseguro.uol.com.br/v2/checkout/payment.html";

/// Where the developer stub listens unless told otherwise
pub const DEFAULT_DEVELOPER_BASE: &str = "http://localhost:3000";

pub const DEVELOPER_CHECKOUT_PATH: &str = "/pagseguro_developer/checkout";
pub const DEVELOPER_NOTIFICATION_PATH: &str = "/pagseguro_developer_notification";
pub const DEVELOPER_PAYMENT_PATH: &str = "/pagseguro_developer/payment";

/// Gateway API configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Account email (default for orders and lookups)
    pub email: String,

    /// Account token (default for orders and lookups)
    pub token: String,

    /// Checkout creation endpoint
    pub checkout_url: String,

    /// Notification lookup endpoint (code is appended as a path segment)
    pub notification_url: String,

    /// Buyer payment page
    pub payment_url: String,

    /// Routing to the local developer stub
    pub developer: bool,

    /// Localized messages by gateway error code
    pub messages: HashMap<u32, String>,

    /// Request timeout
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct EnvironmentSection {
    email: String,
    authenticity_token: String,
    #[serde(default)]
    developer: bool,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl GatewayConfig {
    /// Config for the live gateway
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            checkout_url: LIVE_CHECKOUT_URL.to_string(),
            notification_url: LIVE_NOTIFICATION_URL.to_string(),
            payment_url: LIVE_PAYMENT_URL.to_string(),
            developer: false,
            messages: HashMap::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAGSEGURO_EMAIL`
    /// - `PAGSEGURO_TOKEN`
    ///
    /// Optional:
    /// - `PAGSEGURO_DEVELOPER` (`true`/`1` routes to the developer stub)
    /// - `PAGSEGURO_DEVELOPER_BASE` (stub address, default `http://localhost:3000`)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let email = env::var("PAGSEGURO_EMAIL")
            .map_err(|_| PaymentError::Configuration("PAGSEGURO_EMAIL not set".to_string()))?;

        let token = env::var("PAGSEGURO_TOKEN")
            .map_err(|_| PaymentError::Configuration("PAGSEGURO_TOKEN not set".to_string()))?;

        let config = Self::new(email, token);

        let developer = env::var("PAGSEGURO_DEVELOPER")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if developer {
            let base = env::var("PAGSEGURO_DEVELOPER_BASE")
                .unwrap_or_else(|_| DEFAULT_DEVELOPER_BASE.to_string());
            return Ok(config.with_developer_base(base));
        }

        Ok(config)
    }

    /// Parse the section for `environment` out of a TOML document
    pub fn from_toml_str(content: &str, environment: &str) -> Result<Self, PaymentError> {
        let mut sections: HashMap<String, EnvironmentSection> = toml::from_str(content)
            .map_err(|e| PaymentError::Configuration(format!("invalid config: {e}")))?;

        let section = sections.remove(environment).ok_or_else(|| {
            PaymentError::Configuration(format!("no configuration for environment {environment}"))
        })?;

        let mut messages = HashMap::with_capacity(section.messages.len());
        for (code, message) in section.messages {
            let code = code.trim().parse::<u32>().map_err(|_| {
                PaymentError::Configuration(format!("message key is not an error code: {code}"))
            })?;
            messages.insert(code, message);
        }

        let mut config =
            Self::new(section.email, section.authenticity_token).with_messages(messages);

        if section.developer {
            let base = section
                .base
                .unwrap_or_else(|| DEFAULT_DEVELOPER_BASE.to_string());
            config = config.with_developer_base(base);
        }

        Ok(config)
    }

    /// Read a TOML file and take the section for `environment`
    pub fn from_file(path: impl AsRef<Path>, environment: &str) -> Result<Self, PaymentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content, environment)
    }

    /// Builder: route every endpoint to the developer stub at `base`
    pub fn with_developer_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim_end_matches('/');
        self.checkout_url = format!("{base}{DEVELOPER_CHECKOUT_PATH}");
        self.notification_url = format!("{base}{DEVELOPER_NOTIFICATION_PATH}");
        self.payment_url = format!("{base}{DEVELOPER_PAYMENT_PATH}");
        self.developer = true;
        self
    }

    /// Builder: custom checkout endpoint (for testing)
    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = url.into();
        self
    }

    /// Builder: custom notification endpoint (for testing)
    pub fn with_notification_url(mut self, url: impl Into<String>) -> Self {
        self.notification_url = url.into();
        self
    }

    /// Builder: custom payment page
    pub fn with_payment_url(mut self, url: impl Into<String>) -> Self {
        self.payment_url = url.into();
        self
    }

    /// Builder: localized messages by error code
    pub fn with_messages(mut self, messages: HashMap<u32, String>) -> Self {
        self.messages = messages;
        self
    }

    /// Builder: request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Buyer redirect for a checkout code
    pub fn payment_url_for(&self, checkout_code: &str) -> String {
        format!("{}?code={}", self.payment_url, checkout_code)
    }

    /// Lookup URL for a notification code.
    ///
    /// The code is appended as a single escaped path segment, so `/`, `?`
    /// and `#` in it cannot reach another endpoint.
    pub fn notification_url_for(&self, notification_code: &str) -> String {
        match Url::parse(&self.notification_url) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(notification_code);
                }
                url.into()
            }
            Err(_) => format!(
                "{}/{}",
                self.notification_url.trim_end_matches('/'),
                notification_code
            ),
        }
    }
}
