//! # Application State
//!
//! Shared state for the stub gateway: server configuration, the account the
//! stub accepts, its in-memory checkouts and transactions, and the gateway
//! client used by the sample notification receiver.

use pagseguro_client::{GatewayConfig, PagSeguroClient};
use pagseguro_core::{SharedPaymentGateway, TransactionStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public address of the stub (what clients use as developer base)
    pub base_url: String,
    /// Where payment notifications are posted, if anywhere
    pub notify_url: Option<String>,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            notify_url: std::env::var("NOTIFY_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Credentials the stub accepts
#[derive(Debug, Clone)]
pub struct StubAccount {
    pub email: String,
    pub token: String,
}

impl StubAccount {
    /// Email present and token matching
    pub fn accepts(&self, email: Option<&str>, token: Option<&str>) -> bool {
        let email_given = email.is_some_and(|e| !e.trim().is_empty());
        email_given && token == Some(self.token.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StubItem {
    pub id: String,
    pub description: String,
    pub amount: String,
    pub quantity: u32,
}

/// A checkout waiting for the buyer
#[derive(Debug, Clone, Serialize)]
pub struct PendingCheckout {
    pub code: String,
    pub reference: String,
    pub items: Vec<StubItem>,
    pub extra_amount: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
    pub redirect_url: Option<String>,
    pub created_at: String,
}

/// A paid checkout, retrievable by its notification code
#[derive(Debug, Clone)]
pub struct StubTransaction {
    pub code: String,
    pub notification_code: String,
    pub reference: String,
    pub status: TransactionStatus,
    pub gross_amount: String,
    pub items: Vec<StubItem>,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
    pub date: String,
    pub last_event_date: String,
}

/// In-memory records of the stub
#[derive(Debug, Default)]
pub struct DevStore {
    /// Pending checkouts by checkout code
    pub checkouts: HashMap<String, PendingCheckout>,
    /// Transactions by notification code
    pub transactions: HashMap<String, StubTransaction>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Account checked on every gateway call
    pub account: StubAccount,
    /// Gateway used by the sample notification receiver
    pub gateway: SharedPaymentGateway,
    /// Checkouts and transactions
    pub store: Arc<RwLock<DevStore>>,
    /// HTTP client for notification callbacks
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Build from environment variables.
    ///
    /// The account comes from `PAGSEGURO_EMAIL` / `PAGSEGURO_TOKEN`; the
    /// receiver's gateway always points back at this stub.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let gateway_config = GatewayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load gateway config: {}", e))?
            .with_developer_base(&config.base_url);

        Self::with_gateway_config(config, gateway_config)
    }

    /// Build with an explicit gateway configuration
    pub fn with_gateway_config(
        config: AppConfig,
        gateway_config: GatewayConfig,
    ) -> anyhow::Result<Self> {
        let account = StubAccount {
            email: gateway_config.email.clone(),
            token: gateway_config.token.clone(),
        };

        let gateway = PagSeguroClient::new(gateway_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize gateway client: {}", e))?;

        Ok(Self {
            config,
            account,
            gateway: Arc::new(gateway) as SharedPaymentGateway,
            store: Arc::new(RwLock::new(DevStore::default())),
            http_client: reqwest::Client::new(),
        })
    }
}
