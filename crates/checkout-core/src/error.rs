//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Contract errors raised by the checkout core.
///
/// These indicate misuse of the API (unknown processor key, inconsistent
/// status transition, malformed session configuration). Declined payments
/// and other runtime failures are never represented here; they flow through
/// the transaction status machine as data.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// No processor registered under the requested key
    #[error("Payment processor not found: {0}")]
    ProcessorNotFound(String),

    /// A submission was attempted while another is still pending
    #[error("A payment is already being processed")]
    PaymentInFlight,

    /// Submission requested with no payment method selected
    #[error("No payment method selected")]
    NoPaymentMethodSelected,

    /// Selection of a payment method id that is not in the available set
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Invalid status value or a transition that would break the
    /// form/transaction coupling invariant
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Malformed session configuration (bad cart, duplicate method ids, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CheckoutError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::ProcessorNotFound(_) => {
                "This payment method is not available.".into()
            }
            CheckoutError::PaymentInFlight => {
                "Your payment is already being processed. Please wait.".into()
            }
            CheckoutError::NoPaymentMethodSelected => {
                "Please select a payment method.".into()
            }
            CheckoutError::UnknownPaymentMethod(_) => {
                "The selected payment method is not available.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(err: anyhow::Error) -> Self {
        CheckoutError::Other(err.to_string())
    }
}
