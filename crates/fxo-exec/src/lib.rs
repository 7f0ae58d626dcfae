//! # fxo-exec
//!
//! Order execution for the fxo engine: the broker gateway client, the
//! order lifecycle machine, the cancellation race coordinator, and the
//! trade journal.
//!
//! ## Lifecycle
//!
//! ```text
//! OandaClient ──► OrderManager.place_limit / place_market
//!                     └─► race::supervise ── poll_until_terminal
//!                                         └─ operator cancel listener
//! ```
//!
//! All order operations take `&self` so the status poll and the cancel path
//! can run from separate tasks; mutable state lives behind a
//! `tokio::sync::Mutex` and only ever moves forward through the status
//! state machine.

pub mod journal;
pub mod oanda;
pub mod order;
pub mod race;

use anyhow::Result;
use async_trait::async_trait;
use fxo_core::types::{OrderAck, OrderRequest, OrderSnapshot};

/// The broker operations the engine consumes.
///
/// Each call is a single fallible remote request. Failures are surfaced to
/// the caller untouched — the engine never retries transport errors on its
/// own (the fixed-interval status poll is a designed wait, not a retry).
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Current account balance, used once at session start for sizing.
    async fn fetch_account_balance(&self) -> Result<f64>;

    /// Create an order. The ack carries the broker order id and, when the
    /// broker executed synchronously, the fill detail.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderAck>;

    /// Fetch the current status snapshot of one order.
    async fn fetch_order(&self, order_id: &str) -> Result<OrderSnapshot>;

    /// Cancel an order. The broker rejects this for already-filled orders;
    /// that rejection is returned as an error, never swallowed.
    async fn cancel_order(&self, order_id: &str) -> Result<()>;
}
