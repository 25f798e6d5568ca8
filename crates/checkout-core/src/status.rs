//! Form and Transaction Status
//!
//! The two lifecycle enums shared by every checkout session. The form
//! status tells the hosting UI whether input may be accepted; the
//! transaction status tracks the payment attempt itself. Both are owned
//! by the session reducer so they can be updated atomically.

use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// Whether the checkout form may accept input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    /// Host is still loading required data
    Loading,
    /// Form accepts input
    Ready,
    /// Field validation in progress
    Validating,
    /// A payment submission is in flight
    Submitting,
    /// Checkout finished successfully
    Complete,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Loading => "loading",
            FormStatus::Ready => "ready",
            FormStatus::Validating => "validating",
            FormStatus::Submitting => "submitting",
            FormStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FormStatus {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(FormStatus::Loading),
            "ready" => Ok(FormStatus::Ready),
            "validating" => Ok(FormStatus::Validating),
            "submitting" => Ok(FormStatus::Submitting),
            "complete" => Ok(FormStatus::Complete),
            other => Err(CheckoutError::InvalidStatus(format!(
                "unknown form status '{other}'"
            ))),
        }
    }
}

/// Lifecycle of a payment transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    /// No submission attempted yet (also the post-reset state)
    NotStarted,
    /// A processor call is in flight
    Pending,
    /// Processor reported success
    Complete,
    /// Processor requested an off-site redirect
    Redirecting,
    /// Processor reported a failure
    Error,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::NotStarted => "not-started",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Complete => "complete",
            TransactionStatus::Redirecting => "redirecting",
            TransactionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(TransactionStatus::NotStarted),
            "pending" => Ok(TransactionStatus::Pending),
            "complete" => Ok(TransactionStatus::Complete),
            "redirecting" => Ok(TransactionStatus::Redirecting),
            "error" => Ok(TransactionStatus::Error),
            other => Err(CheckoutError::InvalidStatus(format!(
                "unknown transaction status '{other}'"
            ))),
        }
    }
}
