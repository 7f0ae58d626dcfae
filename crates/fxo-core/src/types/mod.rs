//! Shared data structures for the execution engine.

pub mod enums;
pub mod order;
pub mod quote;

pub use enums::*;
pub use order::*;
pub use quote::*;
