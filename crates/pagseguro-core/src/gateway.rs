//! # Payment Gateway Trait
//!
//! The seam between the order model and the HTTP client. The order only
//! needs something that turns an [`Order`] into a [`Submission`]; the client
//! crate provides the real implementation and tests provide scripted ones.

use crate::error::PaymentResult;
use crate::notification::{LookupCredentials, Notification};
use crate::order::{Order, Submission};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations offered by the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Post the order and interpret the gateway's answer.
    ///
    /// Field errors reported by the gateway come back inside the
    /// `Submission`; `Err` is reserved for failures to get an answer at all.
    async fn create_checkout(&self, order: &Order) -> PaymentResult<Submission>;

    /// Look up the transaction behind a notification code.
    async fn fetch_notification(
        &self,
        notification_code: &str,
        credentials: &LookupCredentials,
    ) -> PaymentResult<Notification>;

    /// Where to send the buyer for a checkout code.
    fn payment_url(&self, checkout_code: &str) -> String;

    /// Lookup URL for a notification code.
    fn notification_url(&self, notification_code: &str) -> String;

    /// Gateway name (for logging)
    fn gateway_name(&self) -> &'static str {
        "pagseguro"
    }
}

/// Shared gateway handle (dynamic dispatch)
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
