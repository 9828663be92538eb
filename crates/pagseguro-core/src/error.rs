//! # Payment Error Types
//!
//! Typed error handling for the pagseguro gateway client.
//! Operations that can fail outside the gateway's own validation return
//! `Result<T, PaymentError>`. Field errors reported by the gateway are not
//! errors in this sense: they come back inside a
//! [`Submission`](crate::order::Submission).

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing credentials, unreadable config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Order data rejected before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Billing field name outside the gateway's billing table
    #[error("Unknown billing field: {field}")]
    UnknownBillingField { field: String },

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body could not be decoded
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// Gateway answered with its bare `Unauthorized` marker
    #[error("Unauthorized by gateway")]
    Unauthorized,

    /// Gateway reported an error outside of a checkout submission
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Request encoding error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns true for failures of the transport itself, as opposed to
    /// anything the gateway decided.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_) | PaymentError::MalformedResponse(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::UnknownBillingField { .. } => 400,
            PaymentError::NetworkError(_) => 503,
            PaymentError::MalformedResponse(_) => 502,
            PaymentError::Unauthorized => 401,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;
