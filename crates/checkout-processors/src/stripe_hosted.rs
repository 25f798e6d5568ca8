//! Stripe Hosted Checkout Processor
//!
//! Implements the "Stripe Checkout (Hosted)" approach: a processor call
//! creates a hosted checkout session and resolves to a redirect response
//! carrying the session URL. The actual card entry happens off-site.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency,
};

use checkout_core::{Cart, CheckoutError, PaymentProcessor, PaymentProcessorResponse, Result};

/// Submission payload expected by [`StripeHostedProcessor`]
#[derive(Debug, Deserialize)]
struct HostedCheckoutRequest {
    cart: Cart,
    customer_email: String,
    success_url: String,
    cancel_url: String,
}

/// Processor backed by Stripe's hosted checkout page
pub struct StripeHostedProcessor {
    client: Client,
}

impl StripeHostedProcessor {
    /// Create a new processor with a Stripe secret key
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| CheckoutError::InvalidConfig("STRIPE_SECRET_KEY not set".into()))?;
        Ok(Self::new(&secret_key))
    }
}

#[async_trait]
impl PaymentProcessor for StripeHostedProcessor {
    async fn process(&self, submit_data: &Value) -> PaymentProcessorResponse {
        let request: HostedCheckoutRequest = match serde_json::from_value(submit_data.clone()) {
            Ok(r) => r,
            Err(e) => {
                return PaymentProcessorResponse::error(format!(
                    "invalid hosted checkout submission: {e}"
                ));
            }
        };

        let currency: Currency =
            match serde_json::from_value(Value::String(request.cart.currency().to_lowercase())) {
                Ok(c) => c,
                Err(_) => {
                    return PaymentProcessorResponse::error(format!(
                        "unsupported currency '{}'",
                        request.cart.currency()
                    ));
                }
            };

        let total = request.cart.total();

        let mut params = CreateCheckoutSession::new();
        params.customer_email = Some(&request.customer_email);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);

        // Track which items the hosted session covers
        let mut metadata = std::collections::HashMap::new();
        metadata.insert(
            "line_items".to_string(),
            request
                .cart
                .items()
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
        );
        params.metadata = Some(metadata);

        // Credits and discounts may price individual items negative, so
        // the hosted session charges the computed total as one line.
        let description = request
            .cart
            .items()
            .iter()
            .map(|i| i.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(total.amount.value),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: total.label.clone(),
                    description: if description.is_empty() {
                        None
                    } else {
                        Some(description)
                    },
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = match StripeCheckoutSession::create(&self.client, params).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to create hosted checkout session");
                return PaymentProcessorResponse::error(format!("Stripe error: {e}"));
            }
        };

        match session.url {
            Some(url) => {
                tracing::info!(session_id = %session.id, "hosted checkout session created");
                PaymentProcessorResponse::redirect(url)
            }
            // Stripe sometimes omits the URL on misconfigured sessions;
            // surface it as a payment failure rather than a bare redirect
            None => PaymentProcessorResponse::error("no checkout URL returned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_malformed_submission_is_an_error_response() {
        let processor = StripeHostedProcessor::new("sk_test_unused");
        // Fails during parsing, before any network call
        assert!(matches!(
            processor.process(&json!({"cart": null})).await,
            PaymentProcessorResponse::Error(_)
        ));
    }
}
