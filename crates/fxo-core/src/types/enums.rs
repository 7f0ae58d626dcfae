//! Enumerations used throughout the execution engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Position side
// ---------------------------------------------------------------------------

/// Direction of the trade the operator wants to enter.
///
/// The side decides which half of a quote is the tradeable price (ask for
/// long, bid for short) and the sign of the position size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Parse the operator's one-letter shorthand (`l` / `s`).
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "long" => Some(Self::Long),
            "s" | "short" => Some(Self::Short),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Order kind / time-in-force
// ---------------------------------------------------------------------------

/// Kind of order sent to the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    Market,
}

impl OrderKind {
    /// Wire representation used by the v20 order endpoint.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
        }
    }
}

/// Time-in-force for order creation.
///
/// Limit entries rest good-till-cancelled; market entries are fill-or-kill
/// so a partial execution can never linger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    Gtc,
    Fok,
}

impl TimeInForce {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Fok => "FOK",
        }
    }
}

// ---------------------------------------------------------------------------
// Order status
// ---------------------------------------------------------------------------

/// Lifecycle status of the single in-flight order.
///
/// Transitions move forward only: `None → Pending → {Filled, Cancelled}`,
/// with a direct `None → Filled` shortcut when the broker fills at
/// placement time. `Filled` and `Cancelled` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// No order has been placed yet.
    None,
    /// Order acknowledged by the broker, not yet filled.
    Pending,
    /// Order executed — terminal.
    Filled,
    /// Order cancelled (by operator or broker) — terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }

    /// Map a v20 order-state string onto the engine's status vocabulary.
    ///
    /// `TRIGGERED` means the broker has armed the order but not executed it,
    /// so it is still pending from the engine's point of view.
    pub fn from_broker_state(s: &str) -> Option<Self> {
        match s {
            "PENDING" | "TRIGGERED" => Some(Self::Pending),
            "FILLED" => Some(Self::Filled),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Pending => write!(f, "PENDING"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
