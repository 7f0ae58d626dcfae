//! # fxo-feed
//!
//! Live pricing for the execution engine.
//!
//! ## Architecture
//!
//! ```text
//! QuoteSource (broker transport)
//!     └─► streamer::run()     — fetch → round → add, every ~10ms
//!             └─► PriceFeed   — bounded quote ring + latest-price reads
//! ```
//!
//! The feed loop is the single writer; everything else reads through
//! [`PriceFeed`], which serves the latest quote in O(1) and suspends the
//! caller only while the cache is still empty.

pub mod cache;
pub mod feed;
pub mod source;
pub mod streamer;

pub use cache::PriceCache;
pub use feed::PriceFeed;
pub use source::{QuoteSource, RawQuote};
