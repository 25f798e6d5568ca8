//! checkout-server
//!
//! Axum-based REST facade over the checkout orchestration core. Hosts
//! create a session from a cart and payment methods, then drive it:
//! select a payment method, submit a payment, read the resulting
//! form/transaction status. Redirect URLs are returned to the caller
//! rather than navigated.

mod handlers;
mod state;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_core::{FnProcessor, PaymentProcessorRegistry, PaymentProcessorResponse};
use checkout_processors::{FreePurchaseProcessor, MockProcessor};

use crate::handlers::{
    create_session, get_session, health_check, reset_session, select_payment_method,
    submit_payment,
};
use crate::state::{AppState, LoggingHooks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Register payment processors
    let mut processors = PaymentProcessorRegistry::new();
    processors.register("free-purchase", FreePurchaseProcessor::new());
    processors.register(
        "bank-transfer",
        FnProcessor::new(|_data| async {
            PaymentProcessorResponse::manual(serde_json::json!({
                "instructions": "Transfer the order total to the account on your invoice.",
            }))
        }),
    );

    // Scriptable processor for local development
    if std::env::var("ENABLE_MOCK_PROCESSOR").is_ok() {
        processors.register("mock-pay", MockProcessor::new());
        tracing::warn!("⚠ Mock processor enabled - do not use in production");
    }

    #[cfg(feature = "stripe")]
    {
        match checkout_processors::StripeHostedProcessor::from_env() {
            Ok(stripe) => {
                processors.register("credit-card", stripe);
                tracing::info!("✓ Stripe hosted checkout configured");
            }
            Err(_) => {
                tracing::warn!("⚠ Stripe not configured - card payments disabled");
                tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            }
        }
    }

    tracing::info!("Registered {} payment processors:", processors.len());
    for key in processors.keys() {
        tracing::info!("  • {}", key);
    }

    // Build application state
    let state = AppState {
        sessions: Arc::new(RwLock::new(HashMap::new())),
        processors: Arc::new(processors),
        hooks: Arc::new(LoggingHooks),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/checkout", post(create_session))
        .route("/api/checkout/{id}", get(get_session))
        .route("/api/checkout/{id}/payment-method", post(select_payment_method))
        .route("/api/checkout/{id}/submit", post(submit_payment))
        .route("/api/checkout/{id}/reset", post(reset_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🛒 checkout-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                             - Health check");
    tracing::info!("  POST /api/checkout                       - Create checkout session");
    tracing::info!("  GET  /api/checkout/{{id}}                  - Session status");
    tracing::info!("  POST /api/checkout/{{id}}/payment-method   - Select payment method");
    tracing::info!("  POST /api/checkout/{{id}}/submit           - Submit payment");
    tracing::info!("  POST /api/checkout/{{id}}/reset            - Restart checkout");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
