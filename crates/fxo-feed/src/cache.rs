//! Bounded, insertion-ordered quote cache.

use std::collections::VecDeque;

use fxo_core::types::Quote;

/// Fixed-capacity ring of quotes plus an O(1) "latest" slot.
///
/// Inserting at capacity evicts the oldest entry. `latest` always mirrors
/// the most recent successful insertion, or `None` before the first one.
///
/// # Thread safety
///
/// Not thread-safe on its own; [`PriceFeed`](crate::feed::PriceFeed) wraps
/// it behind a lock with the streamer as the only writer.
#[derive(Debug)]
pub struct PriceCache {
    quotes: VecDeque<Quote>,
    capacity: usize,
    latest: Option<Quote>,
}

impl PriceCache {
    /// Create an empty cache holding at most `capacity` quotes. A zero
    /// capacity is clamped to one so the latest quote can always be stored.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            quotes: VecDeque::with_capacity(capacity),
            capacity,
            latest: None,
        }
    }

    /// Construct a quote (deriving its spread and timestamp) and insert it,
    /// evicting the oldest entry when full.
    pub fn add(&mut self, bid: f64, ask: f64) {
        let quote = Quote::new(bid, ask);
        while self.quotes.len() >= self.capacity {
            self.quotes.pop_front();
        }
        self.quotes.push_back(quote);
        self.latest = Some(quote);
    }

    /// The most recently inserted quote, if any.
    pub fn latest(&self) -> Option<Quote> {
        self.latest
    }

    /// Spread of the latest quote, or `0.0` while empty. Advisory telemetry
    /// only, so an empty cache is not an error here.
    pub fn spread(&self) -> f64 {
        self.latest.map(|q| q.spread).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
