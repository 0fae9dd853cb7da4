use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use swapflow_core::Timestamp;
use swapflow_ports::Clock;

/// Clock frozen at a fixed instant that only moves when advanced or set
pub struct ManualClock {
    current: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn starting_at(start: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(start),
        })
    }

    /// Create a clock frozen at the current wall time
    pub fn frozen_now() -> Arc<Self> {
        Self::starting_at(Utc::now())
    }

    /// Move time forward (or backward with a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write();
        *current += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, at: Timestamp) {
        *self.current.write() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
