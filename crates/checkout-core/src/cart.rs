//! Line Items and Totals
//!
//! Priced cart contents supplied by the host. Read-only once a session is
//! built; the coordinator consumes them when building processor
//! submissions but never mutates them. Amounts are integer minor units
//! plus a preformatted display string (never floats for money).

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// A monetary amount in minor units with its display form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// ISO currency code, e.g. "usd"
    pub currency: String,

    /// Value in minor units (cents)
    pub value: i64,

    /// Preformatted value for display, e.g. "$29.00"
    pub display_value: String,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: i64, display_value: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            value,
            display_value: display_value.into(),
        }
    }
}

/// A single priced entry in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier within the cart
    pub id: String,

    /// Item kind, e.g. "plan", "domain", "credits", "tax", "total"
    pub kind: String,

    /// Display label
    pub label: String,

    /// Optional secondary label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sublabel: Option<String>,

    /// Price of this entry. Discounts and credits may be negative.
    pub amount: Amount,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: label.into(),
            sublabel: None,
            amount,
        }
    }

    pub fn with_sublabel(mut self, sublabel: impl Into<String>) -> Self {
        self.sublabel = Some(sublabel.into());
        self
    }
}

/// The priced items and computed total for one checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCart")]
pub struct Cart {
    items: Vec<LineItem>,
    total: LineItem,
}

/// Unvalidated wire form of [`Cart`]; deserialization routes through
/// [`Cart::new`] so malformed carts are rejected at the boundary.
#[derive(Deserialize)]
struct RawCart {
    #[serde(default)]
    items: Vec<LineItem>,
    total: LineItem,
}

impl TryFrom<RawCart> for Cart {
    type Error = CheckoutError;

    fn try_from(raw: RawCart) -> Result<Self> {
        Cart::new(raw.items, raw.total)
    }
}

impl Cart {
    /// Build a cart, validating items and total up front.
    ///
    /// Fails fast on malformed input: empty ids or currencies, duplicate
    /// item ids, a negative total, or items priced in a currency other
    /// than the total's.
    pub fn new(items: Vec<LineItem>, total: LineItem) -> Result<Self> {
        validate_line_item(&total, "total")?;
        if total.amount.value < 0 {
            return Err(CheckoutError::InvalidConfig(format!(
                "total must not be negative, got {}",
                total.amount.value
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for item in &items {
            validate_line_item(item, "line item")?;
            if item.amount.currency != total.amount.currency {
                return Err(CheckoutError::InvalidConfig(format!(
                    "line item '{}' is priced in {} but the total is in {}",
                    item.id, item.amount.currency, total.amount.currency
                )));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CheckoutError::InvalidConfig(format!(
                    "duplicate line item id '{}'",
                    item.id
                )));
            }
        }

        Ok(Self { items, total })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> &LineItem {
        &self.total
    }

    pub fn currency(&self) -> &str {
        &self.total.amount.currency
    }

    /// Whether this cart costs nothing (free purchases skip payment entry)
    pub fn is_free(&self) -> bool {
        self.total.amount.value == 0
    }
}

fn validate_line_item(item: &LineItem, context: &str) -> Result<()> {
    if item.id.is_empty() {
        return Err(CheckoutError::InvalidConfig(format!(
            "{context} has an empty id"
        )));
    }
    if item.label.is_empty() {
        return Err(CheckoutError::InvalidConfig(format!(
            "{context} '{}' has an empty label",
            item.id
        )));
    }
    if item.amount.currency.is_empty() {
        return Err(CheckoutError::InvalidConfig(format!(
            "{context} '{}' has an empty currency",
            item.id
        )));
    }
    if item.amount.display_value.is_empty() {
        return Err(CheckoutError::InvalidConfig(format!(
            "{context} '{}' has an empty display value",
            item.id
        )));
    }
    Ok(())
}
