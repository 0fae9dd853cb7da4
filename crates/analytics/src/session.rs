//! Running totals since the engine started

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapflow_core::{Notional, Strategy, StrategyId, Timestamp, Trade};

use crate::stats::ratio;

const TOP_UNDERLYINGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingVolume {
    pub underlying: String,
    pub notional: Notional,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_trades: usize,
    #[serde(rename = "totalNotionalEUR")]
    pub total_notional_eur: Notional,
    pub average_size: Notional,
    pub largest_size: Notional,
    pub strategy_count: usize,
    /// Ten largest underlyings by EUR notional
    pub top_underlyings: Vec<UnderlyingVolume>,
    /// Trades per elapsed hour, at least one hour assumed
    pub trades_per_hour: Decimal,
    /// Strategy count per structure
    pub strategy_distribution: BTreeMap<String, usize>,
}

/// Totals over every trade and strategy the engine has accepted
#[derive(Debug, Default)]
pub struct SessionStats {
    total_trades: usize,
    total_notional: Notional,
    largest: Notional,
    first_trade_at: Option<Timestamp>,
    underlyings: HashMap<String, (Notional, usize)>,
    strategies: HashMap<StrategyId, String>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(&mut self, trade: &Trade) {
        let notional = trade.notional_eur_or_zero();
        self.total_trades += 1;
        self.total_notional = self.total_notional.saturating_add(notional);
        self.largest = self.largest.max(notional);
        self.first_trade_at = Some(match self.first_trade_at {
            Some(first) => first.min(trade.executed_at),
            None => trade.executed_at,
        });

        let entry = self.underlyings.entry(trade.underlying.clone()).or_default();
        entry.0 = entry.0.saturating_add(notional);
        entry.1 += 1;
    }

    /// Record a created or updated strategy; updates keep one entry per id
    pub fn record_strategy(&mut self, strategy: &Strategy) {
        self.strategies
            .insert(strategy.id.clone(), strategy.structure.as_str().to_string());
    }

    pub fn summary(&self, now: Timestamp) -> SessionSummary {
        let mut top_underlyings: Vec<UnderlyingVolume> = self
            .underlyings
            .iter()
            .map(|(underlying, (notional, count))| UnderlyingVolume {
                underlying: underlying.clone(),
                notional: *notional,
                count: *count,
            })
            .collect();
        top_underlyings.sort_by(|a, b| {
            b.notional
                .cmp(&a.notional)
                .then_with(|| a.underlying.cmp(&b.underlying))
        });
        top_underlyings.truncate(TOP_UNDERLYINGS);

        let mut strategy_distribution = BTreeMap::new();
        for structure in self.strategies.values() {
            *strategy_distribution.entry(structure.clone()).or_insert(0) += 1;
        }

        let elapsed_hours = self
            .first_trade_at
            .map(|first| Decimal::from((now - first).num_seconds().max(0)) / Decimal::from(3600))
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ONE);

        SessionSummary {
            total_trades: self.total_trades,
            total_notional_eur: self.total_notional,
            average_size: ratio(self.total_notional, Decimal::from(self.total_trades)),
            largest_size: self.largest,
            strategy_count: self.strategies.len(),
            top_underlyings,
            trades_per_hour: Decimal::from(self.total_trades) / elapsed_hours,
            strategy_distribution,
        }
    }

    pub fn total_trades(&self) -> usize {
        self.total_trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use swapflow_core::{StrategyKind, StrategyStructure, TradeAction};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    fn trade(id: &str, underlying: &str, notional: Decimal) -> Trade {
        Trade::new(id, TradeAction::New, start(), underlying).with_notional_eur(notional)
    }

    #[test]
    fn test_summary_totals() {
        let mut stats = SessionStats::new();
        stats.record_trade(&trade("A", "EUR-EURIBOR-6M", dec!(100)));
        stats.record_trade(&trade("B", "USD-SOFR", dec!(300)));
        stats.record_trade(&trade("C", "EUR-EURIBOR-6M", dec!(50)));

        let summary = stats.summary(start() + Duration::hours(3));
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.total_notional_eur, dec!(450));
        assert_eq!(summary.average_size, dec!(150));
        assert_eq!(summary.largest_size, dec!(300));
        assert_eq!(summary.trades_per_hour, dec!(1));
        assert_eq!(summary.top_underlyings[0].underlying, "USD-SOFR");
        assert_eq!(summary.top_underlyings[1].count, 2);
    }

    #[test]
    fn test_short_sessions_count_as_one_hour() {
        let mut stats = SessionStats::new();
        stats.record_trade(&trade("A", "X", dec!(1)));
        stats.record_trade(&trade("B", "X", dec!(1)));

        let summary = stats.summary(start() + Duration::minutes(5));
        assert_eq!(summary.trades_per_hour, dec!(2));
    }

    #[test]
    fn test_strategy_updates_are_counted_once() {
        let mut stats = SessionStats::new();
        let mut strategy = Strategy::new("CUST-A", StrategyKind::Custom, "X", start());
        strategy.structure = StrategyStructure::Spread;
        stats.record_strategy(&strategy);
        strategy.structure = StrategyStructure::Butterfly;
        stats.record_strategy(&strategy);

        let summary = stats.summary(start());
        assert_eq!(summary.strategy_count, 1);
        assert_eq!(summary.strategy_distribution["Butterfly"], 1);
        assert!(!summary.strategy_distribution.contains_key("Spread"));
    }

    #[test]
    fn test_empty_session() {
        let summary = SessionStats::new().summary(start());
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.average_size, Decimal::ZERO);
        assert_eq!(summary.trades_per_hour, Decimal::ZERO);
    }
}
