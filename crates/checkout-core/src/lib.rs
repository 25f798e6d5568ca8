//! # checkout-core
//!
//! Checkout orchestration core: a state-machine-driven coordinator for
//! multi-step payment submission across pluggable payment processors.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CheckoutSession                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │  Form/Txn    │  │  Processor   │  │  CheckoutHooks     │  │
//! │  │  Reducer     │──│  Registry    │──│  (host callbacks)  │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One reducer owns both the form status and the transaction status so
//! the two can never diverge: a pending transaction forces the form into
//! submitting, a completed one forces it complete, and a reset returns it
//! to ready. Host callbacks fire on transition edges only, detected by
//! comparing against the previous transaction status.
//!
//! The [`PaymentProcessor`] trait enables swapping payment backends
//! (credit card, redirect wallets, free purchases) without changing the
//! coordination logic.

pub mod cart;
pub mod error;
pub mod method;
pub mod registry;
pub mod response;
pub mod session;
pub mod status;

pub use cart::{Amount, Cart, LineItem};
pub use error::{CheckoutError, Result};
pub use method::{PaymentMethod, validate_payment_methods};
pub use registry::{FnProcessor, PaymentProcessor, PaymentProcessorRegistry};
pub use response::PaymentProcessorResponse;
pub use session::{
    CheckoutHooks, CheckoutSession, NoopHooks, PaymentFailure, PaymentOutcome, SessionConfig,
    SessionId,
};
pub use status::{FormStatus, TransactionStatus};
