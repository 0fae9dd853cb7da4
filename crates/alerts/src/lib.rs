//! Swapflow Alert Engine
//!
//! Watches normalized flow for three conditions:
//! - a single trade at or above a notional threshold
//! - a newly detected strategy whose combined notional crosses the same ladder
//! - total volume over a rolling window above a trend threshold
//!
//! Trade and strategy alerts fire at most once per id for the life of the
//! engine, including across restarts when the engine is seeded from replay.
//! Trend alerts are rate limited by a cooldown.

mod config;
mod engine;
mod normalizer;
mod trend;

pub use config::{AlertConfig, AlertThresholds};
pub use engine::{AlertEngine, EvaluatedState};
pub use normalizer::EurNormalizer;
pub use trend::VolumeTrendMonitor;
