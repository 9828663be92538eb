//! # Gateway Client
//!
//! reqwest-based implementation of [`PaymentGateway`] against the PagSeguro
//! v2 API (or the developer stub, depending on configuration).

use crate::config::GatewayConfig;
use crate::params::build_checkout_params;
use crate::response::{describe_errors, interpret_checkout, GatewayReply};
use async_trait::async_trait;
use pagseguro_core::{
    LookupCredentials, Notification, Order, PaymentError, PaymentGateway, PaymentResult,
    Submission,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

/// Content type of checkout requests
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

const PROVIDER: &str = "pagseguro";

/// Gateway notification codes: ASCII letters, digits and `-`
pub fn is_notification_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// PagSeguro API client
pub struct PagSeguroClient {
    config: GatewayConfig,
    client: Client,
}

impl PagSeguroClient {
    /// Create a client for `config`
    pub fn new(config: GatewayConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send a request and read the whole body.
    ///
    /// Status codes are not inspected: the gateway reports business errors
    /// as XML bodies on 4xx responses.
    async fn read_body(&self, request: reqwest::RequestBuilder) -> PaymentResult<String> {
        let response = request.send().await.map_err(|e| {
            error!("Gateway request failed: {}", e);
            PaymentError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        debug!("Gateway answered: status={}, bytes={}", status, body.len());
        Ok(body)
    }
}

#[async_trait]
impl PaymentGateway for PagSeguroClient {
    #[instrument(skip(self, order), fields(reference = %order.reference))]
    async fn create_checkout(&self, order: &Order) -> PaymentResult<Submission> {
        let params = build_checkout_params(order, &self.config)?;

        debug!(
            "Creating checkout: {} items, {} params, developer={}",
            order.items.len(),
            params.len(),
            self.config.developer
        );

        let form = serde_urlencoded::to_string(&params)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;

        let request = self
            .client
            .post(&self.config.checkout_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form);

        let body = self.read_body(request).await?;
        let submission = interpret_checkout(&body, &self.config.messages)?;

        match submission.checkout {
            Some(ref checkout) => info!(
                "Created checkout: code={}, date={}",
                checkout.code, checkout.date
            ),
            None => warn!(
                "Checkout rejected: {}",
                submission.errors.full_messages().join("; ")
            ),
        }

        Ok(submission)
    }

    #[instrument(skip(self, credentials))]
    async fn fetch_notification(
        &self,
        notification_code: &str,
        credentials: &LookupCredentials,
    ) -> PaymentResult<Notification> {
        if !is_notification_code(notification_code) {
            warn!("Rejecting notification code {:?}", notification_code);
            return Err(PaymentError::InvalidRequest(format!(
                "invalid notification code {notification_code:?}"
            )));
        }

        let email = credentials.email.as_deref().unwrap_or(&self.config.email);
        let token = credentials.token.as_deref().unwrap_or(&self.config.token);

        let request = self
            .client
            .get(self.notification_url(notification_code))
            .header(ACCEPT, "application/xml")
            .query(&[("email", email), ("token", token)]);

        let body = self.read_body(request).await?;

        let document = match GatewayReply::parse(&body)? {
            GatewayReply::Unauthorized => {
                warn!("Notification lookup unauthorized");
                return Err(PaymentError::Unauthorized);
            }
            GatewayReply::Document(document) => document,
        };

        if !document["errors"].is_null() {
            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: describe_errors(&document["errors"]),
            });
        }

        let transaction = match &document["transaction"] {
            serde_json::Value::Null => {
                return Err(PaymentError::MalformedResponse(
                    "notification response has no transaction".to_string(),
                ))
            }
            transaction => transaction.clone(),
        };

        let notification = Notification::new(notification_code, transaction);
        debug!(
            "Fetched notification: transaction={:?}, status={:?}",
            notification.transaction_code(),
            notification.status()
        );

        Ok(notification)
    }

    fn payment_url(&self, checkout_code: &str) -> String {
        self.config.payment_url_for(checkout_code)
    }

    fn notification_url(&self, notification_code: &str) -> String {
        self.config.notification_url_for(notification_code)
    }

    fn gateway_name(&self) -> &'static str {
        if self.config.developer {
            "pagseguro_developer"
        } else {
            PROVIDER
        }
    }
}
