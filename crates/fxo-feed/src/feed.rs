//! Shared handle over the price cache.
//!
//! [`PriceFeed`] is a cheaply clonable handle: the streamer task writes
//! through it while the order path reads the latest price synchronously.
//! A reader that arrives before the first quote suspends on a notifier
//! until the streamer delivers one or the configured wait expires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fxo_core::error::EngineError;
use fxo_core::types::{Quote, Side};
use tokio::sync::{Notify, RwLock};

use crate::cache::PriceCache;

struct FeedInner {
    cache: RwLock<PriceCache>,
    /// Woken on every insertion; readers only wait on it while the cache
    /// is still empty.
    quote_arrived: Notify,
    stopped: AtomicBool,
}

/// Clonable handle to the quote cache and the streamer stop signal.
#[derive(Clone)]
pub struct PriceFeed {
    inner: Arc<FeedInner>,
    price_wait: Duration,
}

impl PriceFeed {
    /// Create a feed with the given ring capacity and first-quote wait.
    pub fn new(capacity: usize, price_wait: Duration) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                cache: RwLock::new(PriceCache::new(capacity)),
                quote_arrived: Notify::new(),
                stopped: AtomicBool::new(false),
            }),
            price_wait,
        }
    }

    /// Insert a quote. Called by the streamer only.
    pub async fn add(&self, bid: f64, ask: f64) {
        self.inner.cache.write().await.add(bid, ask);
        self.inner.quote_arrived.notify_waiters();
    }

    /// The most recent quote, without waiting.
    pub async fn latest(&self) -> Option<Quote> {
        self.inner.cache.read().await.latest()
    }

    /// The tradeable price for `side` from the latest quote.
    ///
    /// Suspends until the first quote arrives; fails with
    /// [`EngineError::NoPriceData`] if none shows up within the configured
    /// wait. Never returns a price in the timeout case.
    pub async fn current_price(&self, side: Side) -> Result<f64, EngineError> {
        let deadline = tokio::time::Instant::now() + self.price_wait;
        loop {
            // Arm the notifier before checking, so an insertion between the
            // check and the await cannot be missed.
            let notified = self.inner.quote_arrived.notified();
            if let Some(quote) = self.latest().await {
                return Ok(quote.price_for(side));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(EngineError::NoPriceData {
                    timeout: self.price_wait,
                });
            }
        }
    }

    /// Spread of the latest quote, `0.0` while the cache is empty.
    pub async fn spread(&self) -> f64 {
        self.inner.cache.read().await.spread()
    }

    /// Number of quotes currently cached.
    pub async fn len(&self) -> usize {
        self.inner.cache.read().await.len()
    }

    /// Signal the streamer loop to exit at its next iteration boundary.
    /// Idempotent; does not interrupt an in-flight fetch.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
    }

    /// Whether [`stop`](Self::stop) has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn current_price_times_out_when_empty() {
        let feed = PriceFeed::new(30, Duration::from_secs(10));
        let err = feed.current_price(Side::Long).await.unwrap_err();
        assert!(matches!(err, EngineError::NoPriceData { .. }));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn current_price_wakes_on_first_quote() {
        let feed = PriceFeed::new(30, Duration::from_secs(10));
        let writer = feed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            writer.add(1.1000, 1.1002).await;
        });

        assert_eq!(feed.current_price(Side::Long).await.unwrap(), 1.1002);
        assert_eq!(feed.current_price(Side::Short).await.unwrap(), 1.1000);
    }

    #[tokio::test]
    async fn reads_track_most_recent_add() {
        let feed = PriceFeed::new(2, Duration::from_secs(1));
        feed.add(1.1, 1.2).await;
        feed.add(1.3, 1.4).await;
        feed.add(1.5, 1.6).await;
        assert_eq!(feed.len().await, 2);
        assert_eq!(feed.current_price(Side::Short).await.unwrap(), 1.5);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));
        assert!(!feed.is_stopped());
        feed.stop();
        feed.stop();
        assert!(feed.is_stopped());
    }
}
