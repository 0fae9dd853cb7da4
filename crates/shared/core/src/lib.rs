//! Swapflow Core Domain
//!
//! Pure domain types for the swap trade stream engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod format;
pub mod tenor;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Alert, AlertKind, Severity, Strategy, StrategyKind, StrategyStructure, Trade, TradeAction,
};
pub use format::format_notional;
pub use values::{Notional, Rate, StrategyId, Timestamp, TradeId};
