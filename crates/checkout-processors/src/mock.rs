//! Mock Processor
//!
//! Scriptable processor for tests and local development: responds with a
//! queued response per call (falling back to a configured default) and
//! records every submission it receives.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use checkout_core::{PaymentProcessor, PaymentProcessorResponse};

/// In-memory processor with canned responses
pub struct MockProcessor {
    responses: Mutex<VecDeque<PaymentProcessorResponse>>,
    calls: Mutex<Vec<Value>>,
    fallback: PaymentProcessorResponse,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// Mock that answers success with a marker payload by default
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fallback: PaymentProcessorResponse::success(json!({"mock": true})),
        }
    }

    /// Change the response returned when the queue is empty
    pub fn with_fallback(mut self, fallback: PaymentProcessorResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue a response for the next call
    pub async fn push_response(&self, response: PaymentProcessorResponse) {
        self.responses.lock().await.push_back(response);
    }

    /// Submissions received so far
    pub async fn calls(&self) -> Vec<Value> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn process(&self, submit_data: &Value) -> PaymentProcessorResponse {
        self.calls.lock().await.push(submit_data.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
