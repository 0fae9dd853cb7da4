use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swapflow_core::{Alert, Notional, Strategy, Timestamp, Trade};

use crate::currency::CurrencyMetrics;
use crate::curve::CurveMetrics;
use crate::delta::MarketMakerDelta;
use crate::flow::FlowMetrics;
use crate::market_maker::MarketMakerMetrics;
use crate::realtime::RealTimeMetrics;
use crate::risk::RiskMetrics;
use crate::session::{SessionStats, SessionSummary};
use crate::strategies::StrategyMetrics;

/// What the aggregator reads for one snapshot
#[derive(Debug, Clone, Copy)]
pub struct SnapshotInput<'a> {
    pub now: Timestamp,
    pub trades: &'a [Trade],
    pub strategies: &'a [Strategy],
    /// Recently emitted alerts, for the last-hour count
    pub alerts: &'a [Alert],
    pub session: Option<&'a SessionStats>,
}

impl<'a> SnapshotInput<'a> {
    pub fn new(now: Timestamp, trades: &'a [Trade], strategies: &'a [Strategy]) -> Self {
        Self {
            now,
            trades,
            strategies,
            alerts: &[],
            session: None,
        }
    }

    pub fn with_alerts(mut self, alerts: &'a [Alert]) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_session(mut self, session: &'a SessionStats) -> Self {
        self.session = Some(session);
        self
    }
}

/// Point-in-time analytics; a section that failed to compute is `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub generated_at: Timestamp,
    pub trade_count: usize,
    #[serde(rename = "totalNotionalEUR")]
    pub total_notional_eur: Notional,
    pub curve: Option<CurveMetrics>,
    pub flow: Option<FlowMetrics>,
    pub risk: Option<RiskMetrics>,
    pub realtime: Option<RealTimeMetrics>,
    pub currency: Option<CurrencyMetrics>,
    pub strategies: Option<StrategyMetrics>,
    /// Keyed by window length in minutes
    pub market_maker: BTreeMap<u32, Option<MarketMakerMetrics>>,
    pub delta: Option<MarketMakerDelta>,
    pub session: Option<SessionSummary>,
}
