//! Payment Methods
//!
//! Descriptors for the payment options a host offers. The set is
//! read-only once supplied; only the currently selected id is session
//! state. Replacements are compared by id set, not by reference or
//! order, since hosts typically rebuild the list on every refresh.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// One way to pay
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Stable identifier, e.g. "credit-card", "paypal", "free-purchase"
    pub id: String,

    /// Display label
    pub label: String,

    /// Label for the submit affordance, e.g. "Pay with PayPal"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,

    /// Screen-reader label; falls back to `label`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
}

impl PaymentMethod {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            submit_label: None,
            aria_label: None,
        }
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn accessible_label(&self) -> &str {
        self.aria_label.as_deref().unwrap_or(&self.label)
    }
}

/// Check that a set of payment methods is well formed: no empty ids or
/// labels, no duplicate ids.
pub fn validate_payment_methods(methods: &[PaymentMethod]) -> Result<()> {
    let mut seen = HashSet::new();
    for method in methods {
        if method.id.is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "payment method has an empty id".into(),
            ));
        }
        if method.label.is_empty() {
            return Err(CheckoutError::InvalidConfig(format!(
                "payment method '{}' has an empty label",
                method.id
            )));
        }
        if !seen.insert(method.id.as_str()) {
            return Err(CheckoutError::InvalidConfig(format!(
                "duplicate payment method id '{}'",
                method.id
            )));
        }
    }
    Ok(())
}

/// Whether two method lists offer the same ids, ignoring order.
pub(crate) fn same_id_set(a: &[PaymentMethod], b: &[PaymentMethod]) -> bool {
    let ids_a: HashSet<&str> = a.iter().map(|m| m.id.as_str()).collect();
    let ids_b: HashSet<&str> = b.iter().map(|m| m.id.as_str()).collect();
    ids_a == ids_b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessible_label_fallback() {
        let method = PaymentMethod::new("credit-card", "Credit Card");
        assert_eq!(method.accessible_label(), "Credit Card");

        let method = method.with_aria_label("Pay with a credit card");
        assert_eq!(method.accessible_label(), "Pay with a credit card");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let methods = vec![
            PaymentMethod::new("paypal", "PayPal"),
            PaymentMethod::new("paypal", "PayPal Express"),
        ];
        assert!(validate_payment_methods(&methods).is_err());
    }

    #[test]
    fn test_same_id_set_ignores_order_and_duplicates_of_fields() {
        let a = vec![
            PaymentMethod::new("a", "A"),
            PaymentMethod::new("b", "B"),
        ];
        let b = vec![
            PaymentMethod::new("b", "B (renamed)"),
            PaymentMethod::new("a", "A"),
        ];
        assert!(same_id_set(&a, &b));

        let c = vec![
            PaymentMethod::new("b", "B"),
            PaymentMethod::new("c", "C"),
        ];
        assert!(!same_id_set(&a, &c));
    }
}
