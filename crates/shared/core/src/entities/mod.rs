mod alert;
mod strategy;
mod trade;

pub use alert::{Alert, AlertKind, Severity};
pub use strategy::{Strategy, StrategyKind, StrategyStructure};
pub use trade::{Trade, TradeAction};
