//! Transport seam for the pricing feed.

use anyhow::Result;
use async_trait::async_trait;

/// One raw bid/ask pair as delivered by the broker, before precision
/// rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawQuote {
    pub bid: f64,
    pub ask: f64,
}

/// Anything that can serve a current quote for an instrument.
///
/// Implemented by the live broker client; tests substitute scripted
/// implementations. A failed fetch is a transport error — the feed loop
/// treats it as fatal rather than retrying.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<RawQuote>;
}
