//! # fxo-core
//!
//! Core crate for the fxo single-trade execution engine, providing:
//!
//! - **Types** (`types`) — enums, quotes, order records and outcomes
//! - **Configuration** (`config`) — JSON instrument/session config
//! - **Error types** (`error`) — domain-specific `EngineError` via thiserror
//! - **Sizing** (`sizing`) — position-size and TP/SL price arithmetic
//! - **Time utilities** (`time_util`) — millisecond timestamps
//! - **Logging** (`logging`) — tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod sizing;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use types::*;
