//! Configuration parsing for the execution engine.
//!
//! A single JSON file loaded once at startup. The `instruments` table maps an
//! operator-facing alias to the broker symbol and its price metadata; the
//! `session` block carries engine timing defaults and may be omitted.
//!
//! # Example config
//!
//! ```json
//! {
//!   "instruments": {
//!     "EURUSD": { "symbol": "EUR_USD", "precision": 5, "pip_value": 0.0001 },
//!     "USDJPY": { "symbol": "USD_JPY", "precision": 3, "pip_value": 0.01 }
//!   },
//!   "session": { "cache_size": 30, "risk_reward": 1.0 }
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Instrument table keyed by operator alias (e.g. `"EURUSD"`).
    pub instruments: HashMap<String, InstrumentConfig>,

    /// Engine timing defaults.
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Look up an instrument by its operator alias (case-insensitive).
    pub fn instrument(&self, alias: &str) -> Option<&InstrumentConfig> {
        self.instruments.get(&alias.to_ascii_uppercase())
    }
}

/// Static per-instrument metadata, immutable for the session.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    /// Broker symbol (e.g. `"EUR_USD"`).
    pub symbol: String,
    /// Price precision in decimal places.
    pub precision: u32,
    /// Decimal weight of one pip (e.g. `0.0001` for non-JPY pairs).
    pub pip_value: f64,
}

/// Engine timing and sizing defaults. Every field has a sensible default so
/// the whole block can be left out of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quote ring-buffer capacity.
    pub cache_size: usize,
    /// How long a price read may wait for the first quote (seconds).
    pub price_wait_secs: u64,
    /// Order status poll interval (milliseconds).
    pub poll_interval_ms: u64,
    /// Pause between quote fetches in the feed loop (milliseconds).
    pub feed_interval_ms: u64,
    /// Grace period for streamer shutdown before forced abort (seconds).
    pub teardown_grace_secs: u64,
    /// Take-profit distance as a multiple of the stop-loss distance.
    pub risk_reward: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_size: 30,
            price_wait_secs: 10,
            poll_interval_ms: 1000,
            feed_interval_ms: 10,
            teardown_grace_secs: 2,
            risk_reward: 1.0,
        }
    }
}

impl SessionConfig {
    pub fn price_wait(&self) -> Duration {
        Duration::from_secs(self.price_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }

    pub fn teardown_grace(&self) -> Duration {
        Duration::from_secs(self.teardown_grace_secs)
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
