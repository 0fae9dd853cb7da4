use swapflow_core::Alert;

/// Receives every alert the alert engine emits
pub trait AlertSink: Send + Sync {
    fn on_alert(&self, alert: &Alert);
}
