//! # pagseguro-client
//!
//! PagSeguro gateway client for pagseguro-rs.
//!
//! This crate provides:
//! - `GatewayConfig`, loaded from the environment or a TOML file
//! - `PagSeguroClient`, the `PaymentGateway` implementation
//! - Checkout parameter mapping and response interpretation
//! - Framework-independent notification handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagseguro_client::PagSeguroClient;
//! use pagseguro_core::{LineItem, Order, PaymentGateway};
//!
//! let client = PagSeguroClient::from_env()?;
//!
//! let mut order = Order::new("I1001")
//!     .with_item(LineItem::new("1001", "Rails 3 e-Book", "10.00".parse()?));
//!
//! if order.submit(&client).await? {
//!     // Redirect the buyer
//!     let url = client.payment_url(order.checkout_code().unwrap());
//! }
//! ```
//!
//! ## Notifications
//!
//! ```rust,ignore
//! use pagseguro_client::notification::{dispatch_notification, InboundNotification, LoggingNotificationHandler};
//!
//! // In your notification endpoint:
//! let inbound = InboundNotification::from_form(method, &body)?;
//! dispatch_notification(&client, &LoggingNotificationHandler, &inbound, &Default::default()).await?;
//! ```

pub mod client;
pub mod config;
pub mod notification;
pub mod params;
pub mod response;
pub mod xml;

// Re-exports
pub use client::{is_notification_code, PagSeguroClient, FORM_CONTENT_TYPE};
pub use config::GatewayConfig;
pub use notification::{
    dispatch_notification, InboundNotification, LoggingNotificationHandler, NotificationHandler,
};
pub use params::{build_checkout_params, format_amount};
pub use response::{interpret_checkout, AMBIGUOUS_RESPONSE_MESSAGE, UNAUTHORIZED_MARKER};
