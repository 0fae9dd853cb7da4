//! Swapflow Strategy Detection
//!
//! Turns individual swap executions into the multi-leg strategies a
//! trader would recognise:
//! - Upstream packages (legs sharing a package key)
//! - Custom spreads, butterflies and curves inferred from same-underlying,
//!   multi-tenor flow inside a short window
//! - Display grouping of a batch for the blotter view
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swapflow_strategy::{ClassifierConfig, StrategyClassifier};
//!
//! let mut classifier = StrategyClassifier::new(ClassifierConfig::default());
//! let recent: Vec<Trade> = ledger.recent_window(now, classifier.window()).cloned().collect();
//! for update in classifier.classify(&new_trades, &recent) {
//!     println!("{} ({} legs)", update.strategy.label, update.strategy.leg_count());
//! }
//! ```

pub mod classifier;
pub mod grouping;

// Re-export main types
pub use classifier::{ClassifierConfig, StrategyClassifier, StrategyUpdate};
pub use grouping::TradeGrouper;
