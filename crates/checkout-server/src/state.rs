//! Application State

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use checkout_core::{
    CheckoutHooks, CheckoutSession, PaymentFailure, PaymentOutcome, PaymentProcessorRegistry,
};

/// Active checkout sessions, keyed by session id
pub type SessionMap = Arc<RwLock<HashMap<String, Arc<CheckoutSession>>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Active checkout sessions
    pub sessions: SessionMap,

    /// Payment processors shared by every session
    pub processors: Arc<PaymentProcessorRegistry>,

    /// Hooks wired into every session
    pub hooks: Arc<dyn CheckoutHooks>,
}

/// Hooks implementation that reports payment outcomes to the log.
///
/// The HTTP facade never navigates a browser; redirect URLs are returned
/// to the API caller, so `redirect_to_url` only records the intent.
pub struct LoggingHooks;

impl CheckoutHooks for LoggingHooks {
    fn on_payment_complete(&self, outcome: &PaymentOutcome) {
        tracing::info!(
            payment_method = ?outcome.payment_method_id,
            "payment complete"
        );
    }

    fn on_payment_redirect(&self, outcome: &PaymentOutcome) {
        tracing::info!(
            payment_method = ?outcome.payment_method_id,
            "payment continuing off-site"
        );
    }

    fn on_payment_error(&self, failure: &PaymentFailure) {
        tracing::warn!(
            payment_method = ?failure.payment_method_id,
            error = %failure.error,
            "payment failed"
        );
    }

    fn redirect_to_url(&self, url: &str) {
        tracing::info!(%url, "redirect URL issued to client");
    }
}
