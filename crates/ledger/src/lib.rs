//! Trade Ledger
//!
//! First stage of the pipeline. Upstream feeds are polled and re-send the
//! same executions, so the ledger:
//! - drops trade ids it has already seen
//! - keeps the most recent trades in arrival order, up to a capacity
//! - forgets the ids of evicted trades so a later re-send is accepted again
//! - answers "which trades executed in the last N seconds"

mod ledger;

pub use ledger::{LedgerConfig, TradeLedger};
