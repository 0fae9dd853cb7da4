use chrono::Duration;
use rust_decimal_macros::dec;
use swapflow_core::{Notional, Severity};

/// Notional ladder mapping EUR size to severity
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    pub critical: Notional,
    pub high: Notional,
    pub medium: Notional,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            critical: dec!(2_000_000_000),
            high: dec!(1_000_000_000),
            medium: dec!(500_000_000),
        }
    }
}

impl AlertThresholds {
    /// Highest severity whose threshold the notional reaches (inclusive)
    pub fn classify(&self, notional: Notional) -> Option<Severity> {
        if notional >= self.critical {
            Some(Severity::Critical)
        } else if notional >= self.high {
            Some(Severity::High)
        } else if notional >= self.medium {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}

/// Configuration for the alert engine
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Ladder applied to single trades and new strategies
    pub thresholds: AlertThresholds,
    /// Rolling volume above which a trend alert fires (exclusive)
    pub trend_threshold: Notional,
    /// Length of the rolling volume window
    pub trend_window: Duration,
    /// Minimum time between two trend alerts
    pub trend_cooldown: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
            trend_threshold: dec!(5_000_000_000),
            trend_window: Duration::minutes(5),
            trend_cooldown: Duration::minutes(5),
        }
    }
}
