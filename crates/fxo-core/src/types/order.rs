//! Order-related data structures — requests, broker responses, and the
//! single mutable order record the lifecycle machine owns.

use serde::{Deserialize, Serialize};

use super::enums::{OrderKind, OrderStatus, Side, TimeInForce};

// ---------------------------------------------------------------------------
// Request (lifecycle machine → gateway)
// ---------------------------------------------------------------------------

/// A fully-sized order request handed to the broker gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub kind: OrderKind,
    /// Broker symbol (e.g. `"EUR_USD"`).
    pub instrument: String,
    /// Signed position size; negative units open a short.
    pub units: i64,
    /// Limit price. `None` for market orders.
    pub price: Option<f64>,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub time_in_force: TimeInForce,
}

// ---------------------------------------------------------------------------
// Broker responses (gateway → lifecycle machine)
// ---------------------------------------------------------------------------

/// Fill information extracted from an order-fill transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillDetail {
    pub executed_price: f64,
    /// Broker-side fill timestamp (RFC 3339 string, passed through as-is).
    pub fill_time: String,
    pub half_spread_cost: f64,
    pub commission: f64,
    pub financing: f64,
    pub account_balance: f64,
    pub margin_required: f64,
    pub reason: String,
}

/// Acknowledgement of a create-order call.
///
/// `fill` is present when the broker executed the order synchronously
/// (market orders, marketable limit orders).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub create_time: String,
    pub fill: Option<FillDetail>,
}

/// A status snapshot of one order, as reported by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order_id: String,
    pub status: OrderStatus,
    pub instrument: String,
    pub units: i64,
    pub price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
}

// ---------------------------------------------------------------------------
// Order record
// ---------------------------------------------------------------------------

/// The single in-flight order the lifecycle machine tracks.
///
/// `id` is set exactly when the broker acknowledges creation, i.e. whenever
/// `status` has left [`OrderStatus::None`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Option<String>,
    pub instrument: String,
    pub side: Side,
    /// Price the operator asked for. `None` for market orders.
    pub requested_price: Option<f64>,
    pub units: i64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Fresh record with nothing placed yet.
    pub fn empty(instrument: &str, side: Side) -> Self {
        Self {
            id: None,
            instrument: instrument.to_string(),
            side,
            requested_price: None,
            units: 0,
            stop_loss_price: 0.0,
            take_profit_price: 0.0,
            status: OrderStatus::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal outcomes
// ---------------------------------------------------------------------------

/// Terminal result of watching one order, as a tagged value rather than an
/// error, so callers must handle both branches explicitly.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    /// Broker confirmed execution.
    Filled(OrderSnapshot),
    /// Broker cancelled the order out-of-band.
    Cancelled(OrderSnapshot),
}

/// Result of supervising a pending order: the status poll and the operator
/// cancel request race, and exactly one of these is produced.
#[derive(Debug, Clone)]
pub enum RaceOutcome {
    /// The poll won and the broker reported a fill.
    Filled(OrderSnapshot),
    /// The poll won and the broker reported an out-of-band cancellation.
    BrokerCancelled(OrderSnapshot),
    /// The operator's cancel request won and the cancel call succeeded.
    UserCancelled,
}
