//! Swapflow Runner - Pipeline Orchestration
//!
//! Wires the stages into one tick-driven pipeline:
//!
//! - **Feed**: batches of raw trades, polled or synthetic
//! - **Pipeline**: ledger, alerts, classifier and analytics in a fixed order
//! - **Runner**: single task that serializes ticks until shutdown
//! - **Sinks**: where alerts, strategies and snapshots go
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────┐
//!                    │   Trade Feed    │
//!                    │ (poll/synthetic)│
//!                    └────────┬────────┘
//!                             │ batches
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      PIPELINE (one tick)                 │
//! │                                                          │
//! │  ┌──────────────┐   new trades   ┌──────────────────┐    │
//! │  │ Trade Ledger │───────────────▶│   Alert Engine   │    │
//! │  └──────┬───────┘                │ (EUR, thresholds)│    │
//! │         │ recent window          └────────▲─────────┘    │
//! │         ▼                                 │ strategies   │
//! │  ┌──────────────┐                         │              │
//! │  │  Strategy    │─────────────────────────┘              │
//! │  │  Classifier  │                                        │
//! │  └──────┬───────┘                                        │
//! │         ▼                                                │
//! │  ┌──────────────────────┐                                │
//! │  │ Analytics Aggregator │                                │
//! │  └──────────┬───────────┘                                │
//! └─────────────┼────────────────────────────────────────────┘
//!               │ alerts / strategies / snapshots
//!               ▼
//!      ┌─────────────────┐
//!      │   EngineSink    │
//!      └─────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod rates;
pub mod replay;
pub mod service;
pub mod sink;

// Re-export main types
pub use config::{ConfigError, EngineConfig};
pub use error::{Result, RunnerError};
pub use feed::{FeedBatch, SyntheticFeed, SyntheticFeedConfig, TradeFeed, VecFeed};
pub use pipeline::{Pipeline, TickOutcome};
pub use rates::RateTable;
pub use replay::FileReplay;
pub use service::{PipelineRunner, RunReport};
pub use sink::{AlertForwarder, BroadcastSink, CollectingSink, EngineEvent, EngineSink, NullSink};
