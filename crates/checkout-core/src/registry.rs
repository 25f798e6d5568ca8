//! Payment Processor Registry
//!
//! Maps a processor key ("credit-card", "paypal", "free-purchase") to the
//! async function that performs the submission. Processors are registered
//! at session setup and looked up by the coordinator when a payment is
//! submitted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::{CheckoutError, Result};
use crate::response::PaymentProcessorResponse;

/// A payment processor - implement to add new payment backends.
///
/// `process` must never fail: transport errors, declines, and every other
/// failure are reported as [`PaymentProcessorResponse::Error`] so the
/// coordinator has a single success path to await.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Perform the submission described by `submit_data`.
    ///
    /// The payload shape is an agreement between the host and the
    /// processor; the coordinator passes it through opaquely.
    async fn process(&self, submit_data: &Value) -> PaymentProcessorResponse;
}

type ProcessorFn = Box<dyn Fn(Value) -> BoxFuture<'static, PaymentProcessorResponse> + Send + Sync>;

/// Adapter wrapping an async closure as a [`PaymentProcessor`].
///
/// Lets hosts and tests register processors without defining a struct:
///
/// ```rust,ignore
/// registry.register("free-purchase", FnProcessor::new(|_data| async {
///     PaymentProcessorResponse::success(serde_json::json!({"receipt": 1}))
/// }));
/// ```
pub struct FnProcessor {
    f: ProcessorFn,
}

impl FnProcessor {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = PaymentProcessorResponse> + Send + 'static,
    {
        Self {
            f: Box::new(move |data| Box::pin(f(data))),
        }
    }
}

#[async_trait]
impl PaymentProcessor for FnProcessor {
    async fn process(&self, submit_data: &Value) -> PaymentProcessorResponse {
        (self.f)(submit_data.clone()).await
    }
}

/// Registry of available payment processors
pub struct PaymentProcessorRegistry {
    processors: HashMap<String, Arc<dyn PaymentProcessor>>,
}

impl Default for PaymentProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Register a processor under a key
    pub fn register<P: PaymentProcessor + 'static>(&mut self, key: impl Into<String>, processor: P) {
        self.processors.insert(key.into(), Arc::new(processor));
    }

    /// Register an already-shared processor
    pub fn register_shared(&mut self, key: impl Into<String>, processor: Arc<dyn PaymentProcessor>) {
        self.processors.insert(key.into(), processor);
    }

    /// Look up a processor by key
    pub fn get(&self, key: &str) -> Result<Arc<dyn PaymentProcessor>> {
        self.processors
            .get(key)
            .cloned()
            .ok_or_else(|| CheckoutError::ProcessorNotFound(key.to_string()))
    }

    /// Look up and invoke a processor in one step
    pub async fn process(&self, key: &str, submit_data: &Value) -> Result<PaymentProcessorResponse> {
        let processor = self.get(key)?;
        Ok(processor.process(submit_data).await)
    }

    /// Registered processor keys
    pub fn keys(&self) -> Vec<&str> {
        self.processors.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}
