//! Typed error definitions for the execution engine.
//!
//! Provides [`EngineError`] for domain-specific failures that callers are
//! expected to match on. All variants implement `std::error::Error` via
//! `thiserror`, so they integrate seamlessly with `anyhow::Result` at the
//! transport edges.

use std::time::Duration;

use thiserror::Error;

/// Domain-specific errors for the execution engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The price cache stayed empty past the configured wait.
    #[error("no price data received within {timeout:?}")]
    NoPriceData { timeout: Duration },

    /// The broker rejected order creation, or the response carried no
    /// order id.
    #[error("order placement failed: {0}")]
    Placement(String),

    /// Cancel was requested before any order was placed — a caller bug.
    #[error("no active order to cancel")]
    NoActiveOrder,

    /// The quote feed loop died on a transport error.
    #[error("price streaming failed: {0}")]
    Streaming(String),

    /// Graceful shutdown exceeded its grace period and was escalated to a
    /// forced abort.
    #[error("teardown exceeded grace period of {grace:?}, task was aborted")]
    TeardownTimeout { grace: Duration },

    /// A broker gateway call failed (transport, auth, or malformed
    /// response). Not retried inside the engine.
    #[error("gateway error: {0}")]
    Gateway(String),
}
