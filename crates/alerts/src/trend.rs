use std::collections::VecDeque;

use chrono::Duration;
use rust_decimal::Decimal;
use swapflow_core::{Notional, Timestamp, Trade};

/// Rolling EUR volume log with a cooldown between alerts
#[derive(Debug)]
pub struct VolumeTrendMonitor {
    window: Duration,
    cooldown: Duration,
    entries: VecDeque<(Timestamp, Notional)>,
    last_alert: Option<Timestamp>,
}

impl VolumeTrendMonitor {
    pub fn new(window: Duration, cooldown: Duration) -> Self {
        Self {
            window,
            cooldown,
            entries: VecDeque::new(),
            last_alert: None,
        }
    }

    /// Append normalized trades; trades without an EUR notional are skipped
    pub fn record(&mut self, trades: &[Trade]) {
        for trade in trades {
            if let Some(notional) = trade.notional_eur {
                self.entries.push_back((trade.executed_at, notional));
            }
        }
    }

    /// Keep entries strictly newer than `now - window`
    pub fn prune(&mut self, now: Timestamp) {
        let cutoff = now - self.window;
        self.entries.retain(|(at, _)| *at > cutoff);
    }

    pub fn window_volume(&self) -> Notional {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, (_, notional)| acc + notional)
    }

    /// No alert yet, or at least `cooldown` since the last one
    pub fn cooldown_elapsed(&self, now: Timestamp) -> bool {
        self.last_alert
            .is_none_or(|last| now - last >= self.cooldown)
    }

    pub fn mark_alerted(&mut self, at: Timestamp) {
        self.last_alert = Some(at);
    }

    pub fn last_alert(&self) -> Option<Timestamp> {
        self.last_alert
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
