//! Checkout Session
//!
//! The coordinator at the center of a checkout: one reducer owning both
//! the form status and the transaction status so the two are always
//! updated together. Side effects (completion/error/redirect hooks) fire
//! on transition edges only, detected by comparing the current transaction
//! status against the previous one - never by a mutable "already called"
//! latch, which composes badly with resets.
//!
//! ```text
//!                    ┌──────────────┐
//!          ┌────────▶│  NotStarted  │◀──────── auto-reset
//!          │         └──────┬───────┘              │
//!        reset              │ pending              │
//!          │         ┌──────▼───────┐       ┌──────┴──────┐
//!          │         │   Pending    │──────▶│    Error    │
//!          │         └──────┬───────┘       └─────────────┘
//!          │                │
//!          │      ┌─────────┴──────────┐
//!          │ ┌────▼─────┐       ┌──────▼──────┐
//!          └─│ Complete │       │ Redirecting │
//!            └──────────┘       └─────────────┘
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CheckoutError, Result};
use crate::method::{self, PaymentMethod};
use crate::registry::PaymentProcessorRegistry;
use crate::response::PaymentProcessorResponse;
use crate::status::{FormStatus, TransactionStatus};

/// Message raised when a processor claims a redirect without a URL
const REDIRECT_ERROR_MESSAGE: &str = "redirect error occurred";

/// Unique checkout session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload handed to the completion and redirect hooks
#[derive(Clone, Debug)]
pub struct PaymentOutcome {
    /// Selected payment method at the time of the transition
    pub payment_method_id: Option<String>,

    /// Last processor response, if one was recorded
    pub response: Option<Value>,
}

/// Payload handed to the error hook
#[derive(Clone, Debug)]
pub struct PaymentFailure {
    /// Selected payment method at the time of the transition
    pub payment_method_id: Option<String>,

    /// Displayable error message
    pub error: String,
}

/// Host-side observers for payment outcomes.
///
/// All methods default to no-ops; implement only what the host cares
/// about. The session is the only caller - each hook fires exactly once
/// per transition edge, after the state has settled, outside the state
/// lock (re-entering the session from a hook is safe).
pub trait CheckoutHooks: Send + Sync {
    /// A payment settled successfully
    fn on_payment_complete(&self, _outcome: &PaymentOutcome) {}

    /// A payment is continuing off-site; fires before `redirect_to_url`
    fn on_payment_redirect(&self, _outcome: &PaymentOutcome) {}

    /// A payment failed; fires before the automatic reset
    fn on_payment_error(&self, _failure: &PaymentFailure) {}

    /// Navigate the user to an off-site payment page.
    ///
    /// The default implementation only records the intent; interactive
    /// hosts override this to drive the actual navigation.
    fn redirect_to_url(&self, url: &str) {
        tracing::info!(%url, "redirect requested");
    }
}

/// Hooks implementation that ignores every event
pub struct NoopHooks;

impl CheckoutHooks for NoopHooks {}

/// Configuration for building a [`CheckoutSession`]
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Priced items and total
    pub cart: Cart,

    /// Available payment methods
    pub payment_methods: Vec<PaymentMethod>,

    /// Method selected when the session starts, and again whenever the
    /// set of available methods changes
    pub initially_selected: Option<String>,

    /// Host is still loading required data
    pub is_loading: bool,

    /// Host-side validation in progress
    pub is_validating: bool,
}

impl SessionConfig {
    pub fn new(cart: Cart, payment_methods: Vec<PaymentMethod>) -> Self {
        Self {
            cart,
            payment_methods,
            initially_selected: None,
            is_loading: false,
            is_validating: false,
        }
    }

    pub fn with_initial_selection(mut self, id: impl Into<String>) -> Self {
        self.initially_selected = Some(id.into());
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn validating(mut self, is_validating: bool) -> Self {
        self.is_validating = is_validating;
        self
    }
}

/// Mutable state owned by the session reducer
struct SessionState {
    form_status: FormStatus,
    transaction_status: TransactionStatus,
    previous_transaction_status: TransactionStatus,
    last_response: Option<Value>,
    last_error: Option<String>,
    redirect_url: Option<String>,
    selected_method: Option<String>,
    methods: Vec<PaymentMethod>,
}

/// Side effects collected during a reducer pass, fired after unlock
enum Effect {
    Complete(PaymentOutcome),
    Redirect(PaymentOutcome, String),
    Error(PaymentFailure),
}

/// A single checkout attempt: line items, payment method selection, and
/// the combined form/transaction state machine.
pub struct CheckoutSession {
    id: SessionId,
    created_at: DateTime<Utc>,
    cart: Cart,
    initially_selected: Option<String>,
    processors: Arc<PaymentProcessorRegistry>,
    hooks: Arc<dyn CheckoutHooks>,
    state: Mutex<SessionState>,
}

impl CheckoutSession {
    /// Build a session, validating the configuration up front.
    ///
    /// Fails fast on contract violations: malformed payment methods, an
    /// initial selection that is not offered, or an empty processor
    /// registry. The cart is validated at [`Cart::new`].
    pub fn new(
        config: SessionConfig,
        processors: Arc<PaymentProcessorRegistry>,
        hooks: Arc<dyn CheckoutHooks>,
    ) -> Result<Self> {
        method::validate_payment_methods(&config.payment_methods)?;

        if let Some(ref initial) = config.initially_selected {
            if !config.payment_methods.iter().any(|m| &m.id == initial) {
                return Err(CheckoutError::InvalidConfig(format!(
                    "initially selected payment method '{initial}' is not offered"
                )));
            }
        }

        if processors.is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "no payment processors registered".into(),
            ));
        }

        let form_status = if config.is_loading {
            FormStatus::Loading
        } else if config.is_validating {
            FormStatus::Validating
        } else {
            FormStatus::Ready
        };

        let session = Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            cart: config.cart,
            initially_selected: config.initially_selected.clone(),
            processors,
            hooks,
            state: Mutex::new(SessionState {
                form_status,
                transaction_status: TransactionStatus::NotStarted,
                previous_transaction_status: TransactionStatus::NotStarted,
                last_response: None,
                last_error: None,
                redirect_url: None,
                selected_method: config.initially_selected,
                methods: config.payment_methods,
            }),
        };

        tracing::debug!(session_id = %session.id, form_status = %form_status, "checkout session created");
        Ok(session)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The priced items and total this session was built with
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn form_status(&self) -> FormStatus {
        self.state.lock().unwrap().form_status
    }

    pub fn transaction_status(&self) -> TransactionStatus {
        self.state.lock().unwrap().transaction_status
    }

    /// Transaction status immediately before the most recent mutation
    pub fn previous_transaction_status(&self) -> TransactionStatus {
        self.state.lock().unwrap().previous_transaction_status
    }

    /// Payload from the last successful processor call
    pub fn last_response(&self) -> Option<Value> {
        self.state.lock().unwrap().last_response.clone()
    }

    /// Last transaction error message.
    ///
    /// Stays readable through the automatic post-error reset so the host
    /// can display it; cleared when the next submission starts.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    /// URL of an in-progress off-site redirect
    pub fn redirect_url(&self) -> Option<String> {
        self.state.lock().unwrap().redirect_url.clone()
    }

    pub fn selected_payment_method(&self) -> Option<String> {
        self.state.lock().unwrap().selected_method.clone()
    }

    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.state.lock().unwrap().methods.clone()
    }

    // ------------------------------------------------------------------
    // Transaction mutators
    // ------------------------------------------------------------------

    /// Begin a submission attempt.
    ///
    /// Forces the form into `Submitting` and clears any prior outcome.
    /// Fails with [`CheckoutError::PaymentInFlight`] if a submission is
    /// already pending - double submission is rejected in-core rather
    /// than left to host-side button disabling.
    pub fn set_transaction_pending(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.transaction_status == TransactionStatus::Pending {
            return Err(CheckoutError::PaymentInFlight);
        }
        state.previous_transaction_status = state.transaction_status;
        state.transaction_status = TransactionStatus::Pending;
        state.form_status = FormStatus::Submitting;
        state.last_response = None;
        state.last_error = None;
        state.redirect_url = None;
        tracing::debug!(session_id = %self.id, "transaction pending");
        Ok(())
    }

    /// Record a successful processor response.
    ///
    /// Forces the form into `Complete`. The completion hook fires only on
    /// the edge into `Complete`; recording the same status twice updates
    /// the payload but does not re-fire the hook.
    pub fn set_transaction_complete(&self, payload: Value) {
        let mut effects = Vec::new();
        {
            let mut state = self.state.lock().unwrap();
            let entering = state.transaction_status != TransactionStatus::Complete;
            state.previous_transaction_status = state.transaction_status;
            state.transaction_status = TransactionStatus::Complete;
            state.form_status = FormStatus::Complete;
            state.last_response = Some(payload);
            if entering {
                effects.push(Effect::Complete(PaymentOutcome {
                    payment_method_id: state.selected_method.clone(),
                    response: state.last_response.clone(),
                }));
            }
            tracing::debug!(session_id = %self.id, entering, "transaction complete");
        }
        self.fire(effects);
    }

    /// Record a failed processor response.
    ///
    /// Notifies the error hook once, then automatically resets the
    /// machine to `NotStarted`/`Ready` within the same call so the user
    /// may retry. The message stays readable via [`Self::last_error`]
    /// until the next submission starts.
    pub fn set_transaction_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut effects = Vec::new();
        {
            let mut state = self.state.lock().unwrap();
            state.previous_transaction_status = state.transaction_status;
            state.transaction_status = TransactionStatus::Error;
            state.last_error = Some(message.clone());
            effects.push(Effect::Error(PaymentFailure {
                payment_method_id: state.selected_method.clone(),
                error: message,
            }));

            // Auto-reset: the error is surfaced once, then the machine
            // clears itself so the form is ready for another attempt.
            state.previous_transaction_status = state.transaction_status;
            state.transaction_status = TransactionStatus::NotStarted;
            state.form_status = FormStatus::Ready;
            state.last_response = None;
            state.redirect_url = None;
            tracing::debug!(session_id = %self.id, "transaction error, machine reset for retry");
        }
        self.fire(effects);
    }

    /// Record a redirect processor response.
    ///
    /// With a URL present, the redirect hooks fire once on the edge into
    /// `Redirecting`. A processor claiming a redirect without supplying a
    /// URL is an internal inconsistency: it is converted into a
    /// transaction error and the redirect hook is never invoked.
    pub fn set_transaction_redirecting(&self, url: Option<String>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            tracing::warn!(session_id = %self.id, "redirect requested without a url");
            self.set_transaction_error(REDIRECT_ERROR_MESSAGE);
            return;
        };

        let mut effects = Vec::new();
        {
            let mut state = self.state.lock().unwrap();
            let entering = state.transaction_status != TransactionStatus::Redirecting;
            state.previous_transaction_status = state.transaction_status;
            state.transaction_status = TransactionStatus::Redirecting;
            state.redirect_url = Some(url.clone());
            if entering {
                effects.push(Effect::Redirect(
                    PaymentOutcome {
                        payment_method_id: state.selected_method.clone(),
                        response: state.last_response.clone(),
                    },
                    url,
                ));
            }
            tracing::debug!(session_id = %self.id, entering, "transaction redirecting");
        }
        self.fire(effects);
    }

    /// Reset the machine to `NotStarted`/`Ready`, clearing all recorded
    /// outcomes. Used when the hosting checkout flow restarts.
    pub fn reset_transaction(&self) {
        let mut state = self.state.lock().unwrap();
        state.previous_transaction_status = state.transaction_status;
        state.transaction_status = TransactionStatus::NotStarted;
        state.form_status = FormStatus::Ready;
        state.last_response = None;
        state.last_error = None;
        state.redirect_url = None;
        tracing::debug!(session_id = %self.id, "transaction reset");
    }

    // ------------------------------------------------------------------
    // Form mutators
    // ------------------------------------------------------------------

    /// Set the form status directly.
    ///
    /// While a transaction is pending the form must stay `Submitting`,
    /// and once complete it must stay `Complete`; setting a conflicting
    /// value fails instead of silently diverging from the transaction.
    pub fn set_form_status(&self, status: FormStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.transaction_status {
            TransactionStatus::Pending if status != FormStatus::Submitting => {
                Err(CheckoutError::InvalidStatus(format!(
                    "cannot set form status to '{status}' while a payment is pending"
                )))
            }
            TransactionStatus::Complete if status != FormStatus::Complete => {
                Err(CheckoutError::InvalidStatus(format!(
                    "cannot set form status to '{status}' after the payment completed"
                )))
            }
            _ => {
                state.form_status = status;
                Ok(())
            }
        }
    }

    pub fn set_form_loading(&self) -> Result<()> {
        self.set_form_status(FormStatus::Loading)
    }

    pub fn set_form_ready(&self) -> Result<()> {
        self.set_form_status(FormStatus::Ready)
    }

    pub fn set_form_validating(&self) -> Result<()> {
        self.set_form_status(FormStatus::Validating)
    }

    pub fn set_form_submitting(&self) -> Result<()> {
        self.set_form_status(FormStatus::Submitting)
    }

    pub fn set_form_complete(&self) -> Result<()> {
        self.set_form_status(FormStatus::Complete)
    }

    // ------------------------------------------------------------------
    // Payment method selection
    // ------------------------------------------------------------------

    /// Select one of the offered payment methods
    pub fn select_payment_method(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.methods.iter().any(|m| m.id == id) {
            return Err(CheckoutError::UnknownPaymentMethod(id.to_string()));
        }
        state.selected_method = Some(id.to_string());
        tracing::debug!(session_id = %self.id, payment_method = %id, "payment method selected");
        Ok(())
    }

    /// Replace the set of offered payment methods.
    ///
    /// If the id set differs from the current one (compared as sets, not
    /// by order), the selection resets to the configured initial default,
    /// or to none if the default is no longer offered. A replacement with
    /// the same ids keeps the current selection.
    pub fn replace_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<()> {
        method::validate_payment_methods(&methods)?;
        let mut state = self.state.lock().unwrap();
        if !method::same_id_set(&state.methods, &methods) {
            let fallback = self
                .initially_selected
                .clone()
                .filter(|id| methods.iter().any(|m| &m.id == id));
            tracing::debug!(
                session_id = %self.id,
                selected = ?fallback,
                "available payment methods changed, selection reset"
            );
            state.selected_method = fallback;
        }
        state.methods = methods;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Processor invocation
    // ------------------------------------------------------------------

    /// Submit a payment through the processor registered under `key`.
    ///
    /// Marks the transaction pending, awaits the processor, applies the
    /// resolved variant, and returns the raw response:
    /// success completes the transaction, redirect drives the redirect
    /// hooks, error drives the error hook and auto-reset. A manual
    /// response resets the machine and hands the payload back - the host
    /// decides what manual handling means.
    ///
    /// Hosts that invoke processors themselves can skip this and call
    /// the status mutators directly with the settled result.
    pub async fn process_payment(
        &self,
        key: &str,
        submit_data: Value,
    ) -> Result<PaymentProcessorResponse> {
        let processor = self.processors.get(key)?;
        self.set_transaction_pending()?;
        tracing::info!(session_id = %self.id, processor = %key, "processing payment");

        let response = processor.process(&submit_data).await;
        tracing::info!(session_id = %self.id, processor = %key, outcome = response.kind(), "processor responded");

        match &response {
            PaymentProcessorResponse::Success(payload) => {
                self.set_transaction_complete(payload.clone());
            }
            PaymentProcessorResponse::Redirect(url) => {
                self.set_transaction_redirecting(Some(url.clone()));
            }
            PaymentProcessorResponse::Error(message) => {
                self.set_transaction_error(message.clone());
            }
            PaymentProcessorResponse::Manual(_) => {
                self.reset_transaction();
            }
        }

        Ok(response)
    }

    /// Submit a payment through the currently selected payment method,
    /// using its id as the processor key.
    pub async fn submit_payment(&self, submit_data: Value) -> Result<PaymentProcessorResponse> {
        let key = self
            .selected_payment_method()
            .ok_or(CheckoutError::NoPaymentMethodSelected)?;
        self.process_payment(&key, submit_data).await
    }

    // ------------------------------------------------------------------

    /// Invoke collected hooks, in transition order, outside the lock
    fn fire(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Complete(outcome) => self.hooks.on_payment_complete(&outcome),
                Effect::Redirect(outcome, url) => {
                    self.hooks.on_payment_redirect(&outcome);
                    self.hooks.redirect_to_url(&url);
                }
                Effect::Error(failure) => self.hooks.on_payment_error(&failure),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Amount, LineItem};
    use crate::registry::FnProcessor;
    use serde_json::json;

    /// Hooks implementation recording every invocation
    #[derive(Default)]
    struct RecordingHooks {
        completes: Mutex<Vec<PaymentOutcome>>,
        redirects: Mutex<Vec<PaymentOutcome>>,
        errors: Mutex<Vec<PaymentFailure>>,
        navigations: Mutex<Vec<String>>,
    }

    impl CheckoutHooks for RecordingHooks {
        fn on_payment_complete(&self, outcome: &PaymentOutcome) {
            self.completes.lock().unwrap().push(outcome.clone());
        }

        fn on_payment_redirect(&self, outcome: &PaymentOutcome) {
            self.redirects.lock().unwrap().push(outcome.clone());
        }

        fn on_payment_error(&self, failure: &PaymentFailure) {
            self.errors.lock().unwrap().push(failure.clone());
        }

        fn redirect_to_url(&self, url: &str) {
            self.navigations.lock().unwrap().push(url.to_string());
        }
    }

    fn cart() -> Cart {
        let plan = LineItem::new("plan", "plan", "Plan", Amount::new("usd", 2500, "$25.00"));
        let total = LineItem::new("total", "total", "Total", Amount::new("usd", 2500, "$25.00"));
        Cart::new(vec![plan], total).unwrap()
    }

    fn registry() -> Arc<PaymentProcessorRegistry> {
        let mut registry = PaymentProcessorRegistry::new();
        registry.register(
            "credits",
            FnProcessor::new(|_| async { PaymentProcessorResponse::success(json!({"receipt_id": 42})) }),
        );
        registry.register(
            "paypal",
            FnProcessor::new(|_| async {
                PaymentProcessorResponse::redirect("https://paypal.example/pay")
            }),
        );
        registry.register(
            "declined",
            FnProcessor::new(|_| async { PaymentProcessorResponse::error("card declined") }),
        );
        registry.register(
            "bank-transfer",
            FnProcessor::new(|_| async {
                PaymentProcessorResponse::manual(json!({"instructions": "wire us the money"}))
            }),
        );
        Arc::new(registry)
    }

    fn session_with(hooks: Arc<RecordingHooks>) -> CheckoutSession {
        let config = SessionConfig::new(
            cart(),
            vec![
                PaymentMethod::new("credits", "Credits"),
                PaymentMethod::new("paypal", "PayPal"),
            ],
        )
        .with_initial_selection("credits");
        CheckoutSession::new(config, registry(), hooks).unwrap()
    }

    #[test]
    fn test_mount_ready() {
        // Scenario: provider mounts with nothing loading
        let session = session_with(Arc::new(RecordingHooks::default()));
        assert_eq!(session.form_status(), FormStatus::Ready);
        assert_eq!(session.transaction_status(), TransactionStatus::NotStarted);
        assert_eq!(session.selected_payment_method().as_deref(), Some("credits"));
    }

    #[test]
    fn test_mount_loading() {
        let config = SessionConfig::new(cart(), vec![PaymentMethod::new("credits", "Credits")])
            .loading(true);
        let session =
            CheckoutSession::new(config, registry(), Arc::new(NoopHooks)).unwrap();
        assert_eq!(session.form_status(), FormStatus::Loading);
        session.set_form_ready().unwrap();
        assert_eq!(session.form_status(), FormStatus::Ready);
    }

    #[test]
    fn test_pending_forces_submitting() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        session.set_transaction_pending().unwrap();
        assert_eq!(session.transaction_status(), TransactionStatus::Pending);
        assert_eq!(session.form_status(), FormStatus::Submitting);
        assert_eq!(
            session.previous_transaction_status(),
            TransactionStatus::NotStarted
        );
    }

    #[test]
    fn test_double_submission_rejected() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        session.set_transaction_pending().unwrap();
        let err = session.set_transaction_pending().unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentInFlight));
    }

    #[test]
    fn test_complete_fires_hook_once_per_edge() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        session.set_transaction_pending().unwrap();
        session.set_transaction_complete(json!({"receipt_id": 42}));
        // A second call without an intervening reset must not re-fire
        session.set_transaction_complete(json!({"receipt_id": 42}));

        assert_eq!(session.transaction_status(), TransactionStatus::Complete);
        assert_eq!(session.form_status(), FormStatus::Complete);

        let completes = hooks.completes.lock().unwrap();
        assert_eq!(completes.len(), 1);
        assert_eq!(completes[0].payment_method_id.as_deref(), Some("credits"));
        assert_eq!(completes[0].response.as_ref().unwrap()["receipt_id"], 42);
    }

    #[test]
    fn test_complete_fires_again_after_reset() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        session.set_transaction_complete(json!({"attempt": 1}));
        session.reset_transaction();
        assert_eq!(session.form_status(), FormStatus::Ready);
        assert!(session.last_response().is_none());

        session.set_transaction_complete(json!({"attempt": 2}));
        assert_eq!(hooks.completes.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_error_notifies_then_resets() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        session.set_transaction_pending().unwrap();
        session.set_transaction_error("x");

        // Machine self-heals for retry within the same call
        assert_eq!(session.transaction_status(), TransactionStatus::NotStarted);
        assert_eq!(session.form_status(), FormStatus::Ready);
        assert_eq!(
            session.previous_transaction_status(),
            TransactionStatus::Error
        );

        let errors = hooks.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, "x");
        assert_eq!(errors[0].payment_method_id.as_deref(), Some("credits"));

        // Message stays readable until the next submission starts
        assert_eq!(session.last_error().as_deref(), Some("x"));
        session.set_transaction_pending().unwrap();
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_redirect_invokes_hooks_in_order() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());
        session.select_payment_method("paypal").unwrap();

        session.set_transaction_pending().unwrap();
        session.set_transaction_redirecting(Some("https://paypal.example/pay".into()));

        assert_eq!(session.transaction_status(), TransactionStatus::Redirecting);
        assert_eq!(
            session.redirect_url().as_deref(),
            Some("https://paypal.example/pay")
        );

        let redirects = hooks.redirects.lock().unwrap();
        assert_eq!(redirects.len(), 1);
        assert_eq!(redirects[0].payment_method_id.as_deref(), Some("paypal"));

        let navigations = hooks.navigations.lock().unwrap();
        assert_eq!(navigations.as_slice(), ["https://paypal.example/pay"]);
    }

    #[test]
    fn test_redirect_without_url_becomes_error() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        session.set_transaction_pending().unwrap();
        session.set_transaction_redirecting(None);

        assert!(hooks.navigations.lock().unwrap().is_empty());
        assert!(hooks.redirects.lock().unwrap().is_empty());

        let errors = hooks.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, "redirect error occurred");
        assert_eq!(session.last_error().as_deref(), Some("redirect error occurred"));

        // Empty string counts as missing too
        drop(errors);
        session.set_transaction_redirecting(Some(String::new()));
        assert_eq!(hooks.errors.lock().unwrap().len(), 2);
        assert!(hooks.navigations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_form_setter_cannot_break_coupling() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        session.set_transaction_pending().unwrap();

        let err = session.set_form_ready().unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidStatus(_)));
        assert_eq!(session.form_status(), FormStatus::Submitting);

        // Submitting is the one value that is consistent while pending
        session.set_form_submitting().unwrap();
    }

    #[test]
    fn test_select_unknown_method_fails() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        let err = session.select_payment_method("apple-pay").unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownPaymentMethod(_)));
    }

    #[test]
    fn test_method_set_change_resets_selection() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        session.select_payment_method("paypal").unwrap();

        // Same ids, different order and labels: selection is retained
        session
            .replace_payment_methods(vec![
                PaymentMethod::new("paypal", "PayPal Express"),
                PaymentMethod::new("credits", "Store Credits"),
            ])
            .unwrap();
        assert_eq!(session.selected_payment_method().as_deref(), Some("paypal"));

        // Different id set: selection resets to the initial default
        session
            .replace_payment_methods(vec![
                PaymentMethod::new("credits", "Credits"),
                PaymentMethod::new("apple-pay", "Apple Pay"),
            ])
            .unwrap();
        assert_eq!(session.selected_payment_method().as_deref(), Some("credits"));

        // Default gone too: selection clears
        session
            .replace_payment_methods(vec![PaymentMethod::new("apple-pay", "Apple Pay")])
            .unwrap();
        assert_eq!(session.selected_payment_method(), None);
    }

    #[test]
    fn test_initial_selection_must_be_offered() {
        let config = SessionConfig::new(cart(), vec![PaymentMethod::new("credits", "Credits")])
            .with_initial_selection("paypal");
        let err = CheckoutSession::new(config, registry(), Arc::new(NoopHooks)).err().unwrap();
        assert!(matches!(err, CheckoutError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let config = SessionConfig::new(cart(), vec![PaymentMethod::new("credits", "Credits")]);
        let err = CheckoutSession::new(
            config,
            Arc::new(PaymentProcessorRegistry::new()),
            Arc::new(NoopHooks),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CheckoutError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_process_payment_success() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        let response = session
            .process_payment("credits", json!({"cart_id": "abc"}))
            .await
            .unwrap();
        assert_eq!(response.kind(), "success");

        assert_eq!(session.transaction_status(), TransactionStatus::Complete);
        assert_eq!(session.form_status(), FormStatus::Complete);
        let completes = hooks.completes.lock().unwrap();
        assert_eq!(completes.len(), 1);
        assert_eq!(completes[0].response.as_ref().unwrap()["receipt_id"], 42);
    }

    #[tokio::test]
    async fn test_process_payment_redirect() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());
        session.select_payment_method("paypal").unwrap();

        let response = session.submit_payment(json!({})).await.unwrap();
        assert_eq!(response.kind(), "redirect");
        assert_eq!(
            hooks.navigations.lock().unwrap().as_slice(),
            ["https://paypal.example/pay"]
        );
        assert_eq!(hooks.redirects.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_process_payment_error_resets_for_retry() {
        let hooks = Arc::new(RecordingHooks::default());
        let session = session_with(hooks.clone());

        let response = session.process_payment("declined", json!({})).await.unwrap();
        assert_eq!(response.kind(), "error");
        assert_eq!(session.transaction_status(), TransactionStatus::NotStarted);
        assert_eq!(session.form_status(), FormStatus::Ready);
        assert_eq!(session.last_error().as_deref(), Some("card declined"));

        // The user can retry straight away
        let response = session.process_payment("credits", json!({})).await.unwrap();
        assert_eq!(response.kind(), "success");
    }

    #[tokio::test]
    async fn test_process_payment_manual_hands_payload_back() {
        let session = session_with(Arc::new(RecordingHooks::default()));

        let response = session
            .process_payment("bank-transfer", json!({}))
            .await
            .unwrap();
        match response {
            PaymentProcessorResponse::Manual(payload) => {
                assert_eq!(payload["instructions"], "wire us the money");
            }
            other => panic!("expected manual, got {}", other.kind()),
        }
        assert_eq!(session.transaction_status(), TransactionStatus::NotStarted);
        assert_eq!(session.form_status(), FormStatus::Ready);
    }

    #[tokio::test]
    async fn test_process_payment_unknown_processor() {
        let session = session_with(Arc::new(RecordingHooks::default()));
        let err = session
            .process_payment("apple-pay", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProcessorNotFound(_)));
        // Lookup failure never starts a transaction
        assert_eq!(session.transaction_status(), TransactionStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_submit_payment_requires_selection() {
        let config = SessionConfig::new(cart(), vec![PaymentMethod::new("credits", "Credits")]);
        let session = CheckoutSession::new(config, registry(), Arc::new(NoopHooks)).unwrap();
        let err = session.submit_payment(json!({})).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NoPaymentMethodSelected));
    }
}
