//! # Order Types
//!
//! The order sent to the gateway, its line items, and the result of a
//! checkout submission.

use crate::billing::Billing;
use crate::error::{PaymentError, PaymentResult};
use crate::error_codes::OrderField;
use crate::gateway::PaymentGateway;
use crate::validation::{ValidationErrors, NO_ERRORS};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Currency accepted by the gateway
pub const CURRENCY: &str = "BRL";

/// Upper bound for a line item quantity
pub const MAX_QUANTITY: u32 = 999;

/// Shortest lifetime, in seconds, a checkout code may be given
pub const MIN_MAX_AGE: u32 = 30;

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product id on the caller's side
    pub id: String,

    /// Text shown to the buyer
    pub description: String,

    /// Unit amount
    pub amount: Decimal,

    /// Quantity (1..=999)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Weight in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,

    /// Shipping cost for this item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<Decimal>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Create a line item with quantity 1
    pub fn new(id: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            quantity: default_quantity(),
            weight: None,
            shipping_cost: None,
        }
    }

    /// Builder: set quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder: set weight in grams
    pub fn with_weight(mut self, grams: u32) -> Self {
        self.weight = Some(grams);
        self
    }

    /// Builder: set shipping cost
    pub fn with_shipping_cost(mut self, cost: Decimal) -> Self {
        self.shipping_cost = Some(cost);
        self
    }

    fn validate(&self, position: usize) -> PaymentResult<()> {
        if self.quantity == 0 || self.quantity > MAX_QUANTITY {
            return Err(PaymentError::InvalidRequest(format!(
                "item {position}: quantity must be between 1 and {MAX_QUANTITY}, got {}",
                self.quantity
            )));
        }
        if self.amount.is_sign_negative() {
            return Err(PaymentError::InvalidRequest(format!(
                "item {position}: amount must not be negative"
            )));
        }
        if self.shipping_cost.is_some_and(|cost| cost.is_sign_negative()) {
            return Err(PaymentError::InvalidRequest(format!(
                "item {position}: shipping cost must not be negative"
            )));
        }
        Ok(())
    }
}

/// Shipping type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingType {
    /// Normal order (PAC)
    Normal,
    /// Express (SEDEX)
    Express,
    /// Unspecified type of shipping
    Unspecified,
}

impl ShippingType {
    /// Numeric code the gateway expects
    pub fn code(&self) -> u8 {
        match self {
            ShippingType::Normal => 1,
            ShippingType::Express => 2,
            ShippingType::Unspecified => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ShippingType::Normal),
            2 => Some(ShippingType::Express),
            3 => Some(ShippingType::Unspecified),
            _ => None,
        }
    }
}

/// Checkout created by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// Payment code; the buyer is redirected with it
    pub code: String,
    /// When the code was created
    pub date: DateTime<FixedOffset>,
}

/// Outcome of posting an order to the gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Present when the gateway created a checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<Checkout>,

    /// Field errors reported by (or derived from) the gateway
    #[serde(default, skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,

    /// Raw response body
    #[serde(default)]
    pub response: String,
}

impl Submission {
    pub fn created(checkout: Checkout, response: impl Into<String>) -> Self {
        Self {
            checkout: Some(checkout),
            errors: ValidationErrors::new(),
            response: response.into(),
        }
    }

    pub fn rejected(errors: ValidationErrors, response: impl Into<String>) -> Self {
        Self {
            checkout: None,
            errors,
            response: response.into(),
        }
    }

    /// True iff a checkout was created and nothing was rejected
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.checkout.is_some()
    }
}

/// An order to be checked out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier on the caller's side
    pub reference: String,

    /// Account email; configuration default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Account token; configuration default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_type: Option<ShippingType>,

    /// Dynamic redirect after payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    /// Added to (or, when negative, subtracted from) the total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_amount: Option<Decimal>,

    /// How many times the checkout code may be used (> 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,

    /// Lifetime of the checkout code in seconds (>= 30)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,

    /// Line items, in request order
    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub billing: Billing,

    /// Result of the last submit
    #[serde(skip)]
    last_submission: Option<Submission>,
}

impl Order {
    /// Create an empty order
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            email: None,
            token: None,
            shipping_type: None,
            redirect_url: None,
            extra_amount: None,
            max_uses: None,
            max_age: None,
            items: Vec::new(),
            billing: Billing::new(),
            last_submission: None,
        }
    }

    /// Add a line item
    pub fn add(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Builder: add a line item
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.add(item);
        self
    }

    /// Remove all line items
    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_shipping_type(mut self, shipping_type: ShippingType) -> Self {
        self.shipping_type = Some(shipping_type);
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_extra_amount(mut self, amount: Decimal) -> Self {
        self.extra_amount = Some(amount);
        self
    }

    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    pub fn with_max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_billing(mut self, billing: Billing) -> Self {
        self.billing = billing;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the constraints the gateway would otherwise reject
    pub fn validate(&self) -> PaymentResult<()> {
        if self.max_uses == Some(0) {
            return Err(PaymentError::InvalidRequest(
                "max_uses must be greater than 0".to_string(),
            ));
        }
        if let Some(age) = self.max_age.filter(|age| *age < MIN_MAX_AGE) {
            return Err(PaymentError::InvalidRequest(format!(
                "max_age must be at least {MIN_MAX_AGE} seconds, got {age}"
            )));
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate(i + 1)?;
        }
        Ok(())
    }

    /// Post the order through `gateway` and keep the result.
    ///
    /// Returns whether a checkout was created. Any previous result is
    /// replaced. Transport failures are returned as errors and leave the
    /// previous result untouched.
    pub async fn submit(&mut self, gateway: &dyn PaymentGateway) -> PaymentResult<bool> {
        let submission = gateway.create_checkout(self).await?;
        let valid = submission.is_valid();

        if valid {
            debug!(reference = %self.reference, "checkout created");
        } else {
            warn!(
                reference = %self.reference,
                errors = ?submission.errors.full_messages(),
                "checkout rejected"
            );
        }

        self.last_submission = Some(submission);
        Ok(valid)
    }

    /// Result of the last submit
    pub fn submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    pub fn checkout_code(&self) -> Option<&str> {
        self.checkout().map(|c| c.code.as_str())
    }

    pub fn checkout_date(&self) -> Option<DateTime<FixedOffset>> {
        self.checkout().map(|c| c.date)
    }

    fn checkout(&self) -> Option<&Checkout> {
        self.last_submission.as_ref().and_then(|s| s.checkout.as_ref())
    }

    /// Validation errors from the last submit (empty before any submit)
    pub fn errors(&self) -> &ValidationErrors {
        self.last_submission
            .as_ref()
            .map_or(&NO_ERRORS, |s| &s.errors)
    }

    /// Messages for one field from the last submit
    pub fn errors_on(&self, field: OrderField) -> &[String] {
        self.last_submission
            .as_ref()
            .map(|s| s.errors.get(field))
            .unwrap_or(&[])
    }

    /// Raw response body from the last submit
    pub fn response(&self) -> Option<&str> {
        self.last_submission.as_ref().map(|s| s.response.as_str())
    }

    /// Whether the last submit created a checkout
    pub fn is_valid(&self) -> bool {
        self.last_submission
            .as_ref()
            .is_some_and(Submission::is_valid)
    }
}
