//! Free Purchase Processor
//!
//! Settles carts that cost nothing (plan credits, 100% coupons). The
//! submission carries the cart so the processor can refuse a non-zero
//! total instead of silently "charging" nothing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use checkout_core::{Cart, PaymentProcessor, PaymentProcessorResponse};

/// Submission payload expected by [`FreePurchaseProcessor`]
#[derive(Debug, Deserialize)]
struct FreePurchaseRequest {
    cart: Cart,
}

/// Processor for zero-total purchases
#[derive(Default)]
pub struct FreePurchaseProcessor;

impl FreePurchaseProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProcessor for FreePurchaseProcessor {
    async fn process(&self, submit_data: &Value) -> PaymentProcessorResponse {
        let request: FreePurchaseRequest = match serde_json::from_value(submit_data.clone()) {
            Ok(r) => r,
            Err(e) => {
                return PaymentProcessorResponse::error(format!(
                    "invalid free purchase submission: {e}"
                ));
            }
        };

        if !request.cart.is_free() {
            tracing::warn!(
                total = request.cart.total().amount.value,
                "free purchase submitted for a non-zero total"
            );
            return PaymentProcessorResponse::error(
                "a free purchase was submitted for a cart with a non-zero total",
            );
        }

        tracing::info!(items = request.cart.items().len(), "free purchase settled");
        PaymentProcessorResponse::success(json!({
            "payment": "free-purchase",
            "item_ids": request.cart.items().iter().map(|i| i.id.clone()).collect::<Vec<_>>(),
        }))
    }
}
