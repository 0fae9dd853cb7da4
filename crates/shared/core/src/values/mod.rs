use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Notional amount - uses Decimal for precision
pub type Notional = Decimal;

/// Fixed rate as a raw decimal (0.0325 = 3.25%)
pub type Rate = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Upstream trade identifier
pub type TradeId = String;

/// Strategy identifier (`PKG-...` or `CUST-...`)
pub type StrategyId = String;
