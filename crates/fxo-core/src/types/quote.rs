//! Quote — one bid/ask snapshot from the pricing feed.

use serde::{Deserialize, Serialize};

use super::enums::Side;
use crate::time_util;

/// An immutable bid/ask snapshot.
///
/// The spread is derived once at construction and never recomputed; the
/// timestamp is the local receive time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    /// Local receive time (ms since epoch).
    pub timestamp_ms: u64,
    /// `|bid - ask|`, fixed at construction.
    pub spread: f64,
}

impl Quote {
    /// Build a quote stamped with the current time.
    pub fn new(bid: f64, ask: f64) -> Self {
        Self {
            bid,
            ask,
            timestamp_ms: time_util::now_ms(),
            spread: (bid - ask).abs(),
        }
    }

    /// The tradeable price for a given side: ask when buying, bid when
    /// selling.
    pub fn price_for(&self, side: Side) -> f64 {
        match side {
            Side::Long => self.ask,
            Side::Short => self.bid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_derived_at_construction() {
        let q = Quote::new(1.10000, 1.10012);
        assert!((q.spread - 0.00012).abs() < 1e-12);
    }

    #[test]
    fn price_for_side() {
        let q = Quote::new(1.1000, 1.1002);
        assert_eq!(q.price_for(Side::Long), 1.1002);
        assert_eq!(q.price_for(Side::Short), 1.1000);
    }
}
