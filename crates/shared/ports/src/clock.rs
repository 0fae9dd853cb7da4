use swapflow_core::Timestamp;

/// Port for time abstraction
///
/// Every window in the pipeline is measured against this clock, so tests
/// can pin time with a manual clock while production uses wall time.
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
