//! # Notifications
//!
//! The gateway announces transaction changes by posting a notification code;
//! the transaction itself is fetched with a follow-up lookup. A
//! [`Notification`] wraps the fetched transaction payload.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transaction status as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    WaitingPayment,
    InAnalysis,
    Paid,
    Available,
    InDispute,
    Returned,
    Cancelled,
}

impl TransactionStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(TransactionStatus::WaitingPayment),
            2 => Some(TransactionStatus::InAnalysis),
            3 => Some(TransactionStatus::Paid),
            4 => Some(TransactionStatus::Available),
            5 => Some(TransactionStatus::InDispute),
            6 => Some(TransactionStatus::Returned),
            7 => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            TransactionStatus::WaitingPayment => 1,
            TransactionStatus::InAnalysis => 2,
            TransactionStatus::Paid => 3,
            TransactionStatus::Available => 4,
            TransactionStatus::InDispute => 5,
            TransactionStatus::Returned => 6,
            TransactionStatus::Cancelled => 7,
        }
    }

    /// Money has been received (possibly not yet released)
    pub fn is_paid(&self) -> bool {
        matches!(self, TransactionStatus::Paid | TransactionStatus::Available)
    }
}

/// Account credentials overriding the configured ones for a lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupCredentials {
    pub email: Option<String>,
    pub token: Option<String>,
}

impl LookupCredentials {
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// A transaction fetched for a notification code.
///
/// The payload keeps the gateway's structure with keys in snake_case
/// (`paymentMethod` becomes `payment_method`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Code the gateway posted
    pub code: String,
    /// Transaction payload
    pub transaction: Value,
}

impl Notification {
    pub fn new(code: impl Into<String>, transaction: Value) -> Self {
        Self {
            code: code.into(),
            transaction,
        }
    }

    /// Value at a `/`-separated path, e.g. `"sender/email"`
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('/')
            .try_fold(&self.transaction, |value, key| value.get(key))
    }

    /// String at a path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Gateway transaction code
    pub fn transaction_code(&self) -> Option<&str> {
        self.get_str("code")
    }

    /// Order reference given at checkout
    pub fn reference(&self) -> Option<&str> {
        self.get_str("reference")
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        self.get_str("status")
            .and_then(|s| s.trim().parse().ok())
            .and_then(TransactionStatus::from_code)
    }

    pub fn gross_amount(&self) -> Option<Decimal> {
        self.get_str("gross_amount").and_then(|s| s.trim().parse().ok())
    }

    /// Transaction creation date
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.get_str("date")
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
    }

    pub fn last_event_date(&self) -> Option<DateTime<FixedOffset>> {
        self.get_str("last_event_date")
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
    }

    pub fn sender_email(&self) -> Option<&str> {
        self.get_str("sender/email")
    }
}
