//! Swapflow Clock Infrastructure
//!
//! Time sources for the pipeline:
//!
//! - [`SystemClock`] returns wall-clock time and is what the binary runs on.
//! - [`ManualClock`] only moves when told to, which makes window and
//!   cooldown behaviour reproducible in tests and replays.
//!
//! ```ignore
//! use swapflow_clock::ManualClock;
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_at(start);
//! clock.advance(Duration::minutes(5));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use swapflow_ports::Clock;
