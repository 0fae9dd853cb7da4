//! Swapflow Analytics
//!
//! Point-in-time analytics over the trades currently held by the ledger.
//! Each snapshot is recomputed from scratch; only the rate and volume
//! histories persist between calls.
//!
//! # Sections
//!
//! - **Curve**: per-tenor notional, count and mean fixed rate, named spreads
//! - **Flow**: action breakdown, platform share, flow direction
//! - **Risk**: DV01 proxy, size histogram, percentiles, HHI, top-5 share
//! - **Real-time**: rolling volumes, liquidity score, rate velocity
//! - **Currency**: per-currency totals and currency x tenor heatmap
//! - **Strategies**: averages and preferences per strategy structure
//! - **Market maker**: per-window tenor detail, spreads, order flow,
//!   execution quality, price impact, curve shape and micro-alerts
//! - **Delta**: shortest vs longest market-maker window
//!
//! A section that fails is reported as `None`; the others are unaffected.

pub mod aggregator;
pub mod config;
pub mod currency;
pub mod curve;
pub mod delta;
pub mod error;
pub mod flow;
pub mod history;
pub mod market_maker;
pub mod realtime;
pub mod risk;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod strategies;

pub use aggregator::AnalyticsAggregator;
pub use config::{AnalyticsConfig, ReferenceSpread};
pub use error::{AnalyticsError, Result};
pub use market_maker::MarketMakerMetrics;
pub use risk::hhi;
pub use session::{SessionStats, SessionSummary};
pub use snapshot::{AnalyticsSnapshot, SnapshotInput};
