//! # checkout-processors
//!
//! Payment processor implementations for `checkout-core`:
//!
//! - [`FreePurchaseProcessor`] settles zero-total carts
//! - [`MockProcessor`] answers with scripted responses, for tests and
//!   local development
//! - `StripeHostedProcessor` (feature `stripe`) creates a Stripe hosted
//!   checkout session and resolves to a redirect response
//!
//! Every processor honors the registry contract: a call never fails at
//! the transport level; all failures are the error response variant.

pub mod free;
pub mod mock;

#[cfg(feature = "stripe")]
pub mod stripe_hosted;

pub use free::FreePurchaseProcessor;
pub use mock::MockProcessor;

#[cfg(feature = "stripe")]
pub use stripe_hosted::StripeHostedProcessor;
