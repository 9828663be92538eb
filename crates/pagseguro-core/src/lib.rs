//! # pagseguro-core
//!
//! Core types and traits for the pagseguro-rs gateway client.
//!
//! This crate provides:
//! - `Order`, `LineItem` and `Submission` for the checkout flow
//! - `Billing` and the billing field table
//! - The gateway error-code table and `ValidationErrors`
//! - `Notification` for transaction status updates
//! - `PaymentGateway` trait implemented by the HTTP client
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pagseguro_core::{Billing, BillingField, LineItem, Order};
//!
//! let mut order = Order::new("I1001")
//!     .with_item(LineItem::new("1001", "Rails 3 e-Book", "10.00".parse()?))
//!     .with_billing(Billing::new().with(BillingField::Name, "John Doe"));
//!
//! if order.submit(&gateway).await? {
//!     let url = gateway.payment_url(order.checkout_code().unwrap());
//!     // redirect the buyer to `url`
//! } else {
//!     for line in order.errors().full_messages() {
//!         eprintln!("{line}");
//!     }
//! }
//! ```

pub mod billing;
pub mod error;
pub mod error_codes;
pub mod gateway;
pub mod notification;
pub mod order;
pub mod validation;

// Re-exports for convenience
pub use billing::{Billing, BillingField, BILLING_MAPPING};
pub use error::{PaymentError, PaymentResult};
pub use error_codes::{field_for_code, field_for_code_str, OrderField, ERROR_MAPPING};
pub use gateway::{PaymentGateway, SharedPaymentGateway};
pub use notification::{LookupCredentials, Notification, TransactionStatus};
pub use order::{Checkout, LineItem, Order, ShippingType, Submission, CURRENCY};
pub use validation::ValidationErrors;
