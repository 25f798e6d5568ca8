//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use checkout_core::{
    Cart, CheckoutError, CheckoutSession, FormStatus, PaymentMethod, PaymentProcessorResponse,
    SessionConfig, TransactionStatus,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub processors: Vec<String>,
    pub active_sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub cart: Cart,
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub initially_selected: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub form_status: FormStatus,
    pub transaction_status: TransactionStatus,
    pub selected_payment_method: Option<String>,
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectMethodRequest {
    pub payment_method_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Processor key; defaults to the selected payment method's id
    #[serde(default)]
    pub processor: Option<String>,

    /// Opaque submission payload forwarded to the processor
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: &'static str,
    pub form_status: FormStatus,
    pub transaction_status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn checkout_error(e: &CheckoutError) -> ApiError {
    let (status, code) = match e {
        CheckoutError::ProcessorNotFound(_) => (StatusCode::NOT_FOUND, "PROCESSOR_NOT_FOUND"),
        CheckoutError::PaymentInFlight => (StatusCode::CONFLICT, "PAYMENT_IN_FLIGHT"),
        CheckoutError::NoPaymentMethodSelected => (StatusCode::BAD_REQUEST, "NO_PAYMENT_METHOD"),
        CheckoutError::UnknownPaymentMethod(_) => {
            (StatusCode::BAD_REQUEST, "UNKNOWN_PAYMENT_METHOD")
        }
        CheckoutError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "INVALID_STATUS"),
        CheckoutError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
            code: code.into(),
        }),
    )
}

fn session_not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Checkout session {id} not found"),
            code: "SESSION_NOT_FOUND".into(),
        }),
    )
}

fn lookup_session(state: &AppState, id: &str) -> Result<Arc<CheckoutSession>, ApiError> {
    state
        .sessions
        .read()
        .unwrap()
        .get(id)
        .cloned()
        .ok_or_else(|| session_not_found(id))
}

fn status_response(session: &CheckoutSession) -> SessionStatusResponse {
    SessionStatusResponse {
        session_id: session.id().to_string(),
        form_status: session.form_status(),
        transaction_status: session.transaction_status(),
        selected_payment_method: session.selected_payment_method(),
        payment_methods: session.payment_methods(),
        last_error: session.last_error(),
        redirect_url: session.redirect_url(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        processors: state
            .processors
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect(),
        active_sessions: state.sessions.read().unwrap().len(),
    })
}

/// Create a checkout session from a cart and payment methods
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionStatusResponse>), ApiError> {
    // Cart deserialization already validated items and total
    let mut config =
        SessionConfig::new(payload.cart, payload.payment_methods).loading(payload.is_loading);
    config.initially_selected = payload.initially_selected;

    let session = CheckoutSession::new(config, state.processors.clone(), state.hooks.clone())
        .map_err(|e| checkout_error(&e))?;
    let session = Arc::new(session);

    let response = status_response(&session);
    state
        .sessions
        .write()
        .unwrap()
        .insert(session.id().to_string(), session.clone());

    tracing::info!(session_id = %session.id(), "checkout session created");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Read the current state of a checkout session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = lookup_session(&state, &id)?;
    Ok(Json(status_response(&session)))
}

/// Select a payment method for a session
pub async fn select_payment_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectMethodRequest>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = lookup_session(&state, &id)?;
    session
        .select_payment_method(&payload.payment_method_id)
        .map_err(|e| checkout_error(&e))?;
    Ok(Json(status_response(&session)))
}

/// Submit a payment through a registered processor
pub async fn submit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session = lookup_session(&state, &id)?;

    let response = match payload.processor {
        Some(key) => session.process_payment(&key, payload.data).await,
        None => session.submit_payment(payload.data).await,
    }
    .map_err(|e| checkout_error(&e))?;

    let (redirect_url, error, receipt) = match &response {
        PaymentProcessorResponse::Success(payload) => (None, None, Some(payload.clone())),
        PaymentProcessorResponse::Redirect(url) => (Some(url.clone()), None, None),
        PaymentProcessorResponse::Manual(payload) => (None, None, Some(payload.clone())),
        PaymentProcessorResponse::Error(message) => (None, Some(message.clone()), None),
    };

    Ok(Json(SubmitResponse {
        outcome: response.kind(),
        form_status: session.form_status(),
        transaction_status: session.transaction_status(),
        redirect_url,
        error,
        response: receipt,
    }))
}

/// Reset a session's transaction so the checkout can restart
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = lookup_session(&state, &id)?;
    session.reset_transaction();
    Ok(Json(status_response(&session)))
}
