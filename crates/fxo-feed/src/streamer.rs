//! The continuous quote-fetch loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fxo_core::config::InstrumentConfig;
use fxo_core::error::EngineError;
use fxo_core::sizing::round_to_precision;
use tracing::{error, info};

use crate::feed::PriceFeed;
use crate::source::QuoteSource;

/// Run the quote feed until [`PriceFeed::stop`] is signalled.
///
/// Each iteration fetches one quote from the source, rounds bid/ask to the
/// instrument's precision, inserts it into the feed, and yields for
/// `interval` to bound the request rate.
///
/// A single fetch failure terminates the loop with
/// [`EngineError::Streaming`] — a dead feed must surface instead of silently
/// freezing the latest price.
pub async fn run(
    feed: PriceFeed,
    source: Arc<dyn QuoteSource>,
    instrument: InstrumentConfig,
    interval: Duration,
) -> Result<(), EngineError> {
    let started = Instant::now();
    let mut tick_count: u64 = 0;

    info!("[feed] streaming {} every {:?}", instrument.symbol, interval);

    let result = loop {
        if feed.is_stopped() {
            break Ok(());
        }

        match source.fetch_quote(&instrument.symbol).await {
            Ok(raw) => {
                let bid = round_to_precision(raw.bid, instrument.precision);
                let ask = round_to_precision(raw.ask, instrument.precision);
                feed.add(bid, ask).await;
                tick_count += 1;
            }
            Err(e) => {
                error!("[feed] quote fetch failed for {}: {e}", instrument.symbol);
                break Err(EngineError::Streaming(e.to_string()));
            }
        }

        tokio::time::sleep(interval).await;
    };

    let elapsed = started.elapsed().as_secs_f64();
    let ticks_per_sec = if elapsed > 0.0 {
        tick_count as f64 / elapsed
    } else {
        0.0
    };
    info!("[feed] loop exited after {tick_count} ticks ({ticks_per_sec:.1}/s)");

    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use fxo_core::types::Side;

    use super::*;
    use crate::source::RawQuote;

    fn eurusd() -> InstrumentConfig {
        InstrumentConfig {
            symbol: "EUR_USD".to_string(),
            precision: 5,
            pip_value: 0.0001,
        }
    }

    /// Serves quotes with a drifting bid, optionally failing after N fetches.
    struct ScriptedSource {
        calls: AtomicU32,
        fail_after: Option<u32>,
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch_quote(&self, _symbol: &str) -> anyhow::Result<RawQuote> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = self.fail_after {
                if n >= limit {
                    return Err(anyhow!("connection reset"));
                }
            }
            Ok(RawQuote {
                bid: 1.100_001_3 + n as f64 * 0.0001,
                ask: 1.100_121_3 + n as f64 * 0.0001,
            })
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn stop_exits_within_one_interval() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));
        let source = Arc::new(ScriptedSource {
            calls: AtomicU32::new(0),
            fail_after: None,
        });

        let handle = tokio::spawn(run(
            feed.clone(),
            source,
            eurusd(),
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(55)).await;
        feed.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = handle.await.unwrap();
        assert!(result.is_ok());
        assert!(feed.len().await > 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn quotes_are_rounded_to_precision() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));
        let source = Arc::new(ScriptedSource {
            calls: AtomicU32::new(0),
            fail_after: None,
        });

        let handle = tokio::spawn(run(
            feed.clone(),
            source,
            eurusd(),
            Duration::from_millis(10),
        ));

        let price = feed.current_price(Side::Short).await.unwrap();
        assert_eq!(price, 1.10000); // 1.1000013 rounded to 5 dp

        feed.stop();
        let _ = handle.await.unwrap();
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn fetch_error_terminates_loop() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));
        let source = Arc::new(ScriptedSource {
            calls: AtomicU32::new(0),
            fail_after: Some(3),
        });

        let result = run(feed.clone(), source, eurusd(), Duration::from_millis(10)).await;
        assert!(matches!(result, Err(EngineError::Streaming(_))));
        // the quotes fetched before the failure are still served
        assert_eq!(feed.len().await, 3);
    }
}
