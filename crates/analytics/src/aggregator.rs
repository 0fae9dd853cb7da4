use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swapflow_core::Trade;

use crate::config::AnalyticsConfig;
use crate::currency::currency_metrics;
use crate::curve::curve_metrics;
use crate::delta::{MarketMakerDelta, market_maker_delta};
use crate::error::Result;
use crate::flow::flow_metrics;
use crate::history::{RateHistory, VolumeHistory};
use crate::market_maker::{MarketMakerMetrics, market_maker_metrics};
use crate::realtime::realtime_metrics;
use crate::risk::risk_metrics;
use crate::snapshot::{AnalyticsSnapshot, SnapshotInput};
use crate::stats::checked_sum;
use crate::strategies::strategy_metrics;

/// Builds analytics snapshots
///
/// Every section is recomputed from the input on each call. Only the rate
/// and volume histories carry over between snapshots.
pub struct AnalyticsAggregator {
    config: AnalyticsConfig,
    rate_history: RateHistory,
    volume_history: VolumeHistory,
}

impl AnalyticsAggregator {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            rate_history: RateHistory::new(config.history_capacity),
            volume_history: VolumeHistory::new(config.history_capacity),
            config,
        }
    }

    pub fn snapshot(&mut self, input: SnapshotInput<'_>) -> AnalyticsSnapshot {
        let SnapshotInput {
            now,
            trades,
            strategies,
            alerts,
            session,
        } = input;

        let curve = section("curve", curve_metrics(trades, now));
        if let Some(curve) = &curve {
            self.rate_history.push(curve.rate_sample.clone());
        }

        let realtime = section(
            "realtime",
            realtime_metrics(trades, alerts, now, &self.rate_history, &self.volume_history),
        );
        if let Some(rt) = &realtime {
            self.volume_history.push(now, rt.volume_5m);
        }

        let percentile = section(
            "volatility",
            self.rate_history.volatility_percentile(self.config.min_volatility_moves),
        )
        .unwrap_or(dec!(50));

        let market_maker: BTreeMap<u32, Option<MarketMakerMetrics>> = self
            .config
            .windows_minutes
            .iter()
            .map(|&minutes| {
                let metrics = section(
                    "market_maker",
                    market_maker_metrics(trades, now, minutes, percentile, &self.config),
                );
                (minutes, metrics)
            })
            .collect();

        let delta = self.delta(&market_maker);

        let total_notional_eur = section(
            "totals",
            checked_sum(trades.iter().map(Trade::notional_eur_or_zero), "totals"),
        )
        .unwrap_or(Decimal::ZERO);

        debug!(
            "Snapshot over {} trades and {} strategies",
            trades.len(),
            strategies.len()
        );

        AnalyticsSnapshot {
            generated_at: now,
            trade_count: trades.len(),
            total_notional_eur,
            curve,
            flow: section("flow", flow_metrics(trades)),
            risk: section("risk", risk_metrics(trades)),
            realtime,
            currency: section("currency", currency_metrics(trades)),
            strategies: section("strategies", strategy_metrics(strategies)),
            market_maker,
            delta,
            session: session.map(|s| s.summary(now)),
        }
    }

    /// Shortest configured window against the longest
    fn delta(
        &self,
        market_maker: &BTreeMap<u32, Option<MarketMakerMetrics>>,
    ) -> Option<MarketMakerDelta> {
        let shortest = self.config.windows_minutes.iter().min()?;
        let longest = self.config.windows_minutes.iter().max()?;
        if shortest == longest {
            return None;
        }
        let short = market_maker.get(shortest)?.as_ref()?;
        let long = market_maker.get(longest)?.as_ref()?;
        section("delta", market_maker_delta(short, long))
    }

    pub fn rate_history(&self) -> &RateHistory {
        &self.rate_history
    }

    pub fn volume_history(&self) -> &VolumeHistory {
        &self.volume_history
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

/// Failed sections are logged and dropped
fn section<T>(name: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Analytics section {} skipped: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use swapflow_core::{Timestamp, TradeAction};

    use crate::session::SessionStats;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
    }

    fn swap(id: &str, minutes_ago: i64, tenor: &str, rate: Decimal) -> Trade {
        Trade::new(id, TradeAction::New, now() - Duration::minutes(minutes_ago), "EUR-EURIBOR-6M")
            .with_leg1(dec!(200_000_000), "EUR")
            .with_notional_eur(dec!(200_000_000))
            .with_tenor(tenor)
            .with_fixed_rate(rate)
    }

    #[test]
    fn test_empty_snapshot() {
        let mut aggregator = AnalyticsAggregator::default();
        let snapshot = aggregator.snapshot(SnapshotInput::new(now(), &[], &[]));

        assert_eq!(snapshot.trade_count, 0);
        assert_eq!(snapshot.total_notional_eur, Decimal::ZERO);
        assert!(snapshot.curve.is_some());
        assert!(snapshot.risk.as_ref().is_some_and(|r| r.percentiles.is_none()));
        assert_eq!(snapshot.market_maker.len(), 5);
        assert!(snapshot.market_maker.values().all(Option::is_some));
        assert!(snapshot.delta.is_some());
        assert!(snapshot.session.is_none());
        // Empty rate samples are not recorded
        assert!(aggregator.rate_history().is_empty());
    }

    #[test]
    fn test_histories_advance_per_snapshot() {
        let mut aggregator = AnalyticsAggregator::default();
        let trades = vec![swap("A", 1, "2Y", dec!(0.025)), swap("B", 2, "10Y", dec!(0.03))];

        aggregator.snapshot(SnapshotInput::new(now(), &trades, &[]));
        aggregator.snapshot(SnapshotInput::new(now() + Duration::seconds(5), &trades, &[]));

        assert_eq!(aggregator.rate_history().len(), 2);
        assert_eq!(aggregator.volume_history().len(), 2);
    }

    #[test]
    fn test_snapshot_sections() {
        let mut aggregator = AnalyticsAggregator::default();
        let trades = vec![swap("A", 1, "2Y", dec!(0.025)), swap("B", 2, "10Y", dec!(0.03))];
        let mut session = SessionStats::new();
        trades.iter().for_each(|t| session.record_trade(t));

        let snapshot = aggregator.snapshot(
            SnapshotInput::new(now(), &trades, &[]).with_session(&session),
        );

        assert_eq!(snapshot.trade_count, 2);
        assert_eq!(snapshot.total_notional_eur, dec!(400_000_000));
        let curve = snapshot.curve.unwrap();
        assert_eq!(curve.tenor_spreads_bps["10Y-2Y"], dec!(50));
        assert_eq!(snapshot.realtime.unwrap().trades_5m, 2);
        assert_eq!(snapshot.session.unwrap().total_trades, 2);

        let ten_minute = snapshot.market_maker[&10].as_ref().unwrap();
        assert_eq!(ten_minute.spreads["2Y-10Y"].current_bps, dec!(50));
    }

    #[test]
    fn test_snapshot_serializes_with_contract_names() {
        let mut aggregator = AnalyticsAggregator::default();
        let trades = vec![swap("A", 1, "5Y", dec!(0.027))];
        let snapshot = aggregator.snapshot(SnapshotInput::new(now(), &trades, &[]));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("totalNotionalEUR").is_some());
        assert!(json.get("generatedAt").is_some());
        assert!(json["marketMaker"].get("10").is_some());
    }
}
