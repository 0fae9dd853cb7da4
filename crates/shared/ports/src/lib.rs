//! Swapflow Ports
//!
//! Port definitions (traits) for the swap trade stream engine.
//! These define the boundaries between pipeline logic and infrastructure:
//! time, exchange rates, replay storage and event emission.

mod clock;
mod error;
mod rates;
mod replay;
mod sink;

pub use clock::Clock;
pub use error::{PortError, PortResult};
pub use rates::RateLookup;
pub use replay::{ReplayData, ReplaySource};
pub use sink::AlertSink;
