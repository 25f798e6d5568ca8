//! Payment Processor Responses
//!
//! The contract every registered processor must honor: a processor call
//! never fails at the transport level. All four outcomes, including
//! failures, are variants of [`PaymentProcessorResponse`], so callers have
//! a single success path to await.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a payment processor call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum PaymentProcessorResponse {
    /// Payment settled; payload is the processor's receipt data
    Success(Value),
    /// Payment continues off-site; payload is the URL to send the user to
    Redirect(String),
    /// Processor requires host-specific follow-up; payload is opaque
    Manual(Value),
    /// Payment failed; payload is a displayable message
    Error(String),
}

impl PaymentProcessorResponse {
    /// Build a success response carrying the processor's receipt payload
    pub fn success(payload: impl Into<Value>) -> Self {
        PaymentProcessorResponse::Success(payload.into())
    }

    /// Build a redirect response carrying the off-site payment URL
    pub fn redirect(url: impl Into<String>) -> Self {
        PaymentProcessorResponse::Redirect(url.into())
    }

    /// Build a manual response; the host handles the payload out of band
    pub fn manual(payload: impl Into<Value>) -> Self {
        PaymentProcessorResponse::Manual(payload.into())
    }

    /// Build an error response carrying a displayable message
    pub fn error(message: impl Into<String>) -> Self {
        PaymentProcessorResponse::Error(message.into())
    }

    /// Discriminant name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentProcessorResponse::Success(_) => "success",
            PaymentProcessorResponse::Redirect(_) => "redirect",
            PaymentProcessorResponse::Manual(_) => "manual",
            PaymentProcessorResponse::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_tag_their_payloads() {
        let payload = json!({"receipt_id": 42});
        match PaymentProcessorResponse::success(payload.clone()) {
            PaymentProcessorResponse::Success(p) => assert_eq!(p, payload),
            other => panic!("expected success, got {}", other.kind()),
        }

        match PaymentProcessorResponse::redirect("https://pay.example/session") {
            PaymentProcessorResponse::Redirect(url) => {
                assert_eq!(url, "https://pay.example/session");
            }
            other => panic!("expected redirect, got {}", other.kind()),
        }

        match PaymentProcessorResponse::manual(json!({"instructions": "wire"})) {
            PaymentProcessorResponse::Manual(p) => {
                assert_eq!(p["instructions"], "wire");
            }
            other => panic!("expected manual, got {}", other.kind()),
        }

        match PaymentProcessorResponse::error("card declined") {
            PaymentProcessorResponse::Error(msg) => assert_eq!(msg, "card declined"),
            other => panic!("expected error, got {}", other.kind()),
        }
    }

    #[test]
    fn test_serde_tagging() {
        let response = PaymentProcessorResponse::redirect("https://pay.example");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "redirect");
        assert_eq!(json["payload"], "https://pay.example");

        let back: PaymentProcessorResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }
}
