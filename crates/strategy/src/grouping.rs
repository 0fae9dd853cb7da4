//! Display grouping
//!
//! Groups the trades of a batch so related executions render together.
//! Rules are tried in order and the first group to take a trade keeps it:
//! strategy id, package key, underlying within the same second, and finally
//! any trades executed in the same second. Groups accumulate across batches.

use std::collections::{BTreeMap, HashMap};

use swapflow_core::{Trade, TradeId};

#[derive(Debug, Default)]
pub struct TradeGrouper {
    groups: BTreeMap<String, Vec<TradeId>>,
    assigned: HashMap<TradeId, String>,
    next_underlying_group: usize,
}

impl TradeGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a batch and return the groups that gained trades, by group id
    pub fn group_batch(&mut self, trades: &[Trade]) -> BTreeMap<String, Vec<TradeId>> {
        let mut touched: BTreeMap<String, Vec<TradeId>> = BTreeMap::new();

        // Strategy id
        for trade in trades {
            if let Some(strategy_id) = &trade.strategy_id {
                self.assign(format!("STRATEGY_{strategy_id}"), trade, &mut touched);
            }
        }

        // Package key
        for trade in trades.iter().filter(|t| t.is_package_leg()) {
            if let Some(key) = &trade.package_key {
                self.assign(format!("PACKAGE_{key}"), trade, &mut touched);
            }
        }

        // Underlying + second
        let mut by_underlying: BTreeMap<(&str, i64), Vec<&Trade>> = BTreeMap::new();
        for trade in trades.iter().filter(|t| !self.assigned.contains_key(&t.id)) {
            by_underlying
                .entry((trade.underlying.as_str(), trade.executed_at.timestamp()))
                .or_default()
                .push(trade);
        }
        for bucket in by_underlying.into_values().filter(|b| b.len() > 1) {
            self.next_underlying_group += 1;
            let group_id = format!("UNDERLYING_{}", self.next_underlying_group);
            for trade in bucket {
                self.assign(group_id.clone(), trade, &mut touched);
            }
        }

        // Same second
        let mut by_second: BTreeMap<i64, Vec<&Trade>> = BTreeMap::new();
        for trade in trades.iter().filter(|t| !self.assigned.contains_key(&t.id)) {
            by_second
                .entry(trade.executed_at.timestamp())
                .or_default()
                .push(trade);
        }
        for (second, bucket) in by_second.into_iter().filter(|(_, b)| b.len() > 1) {
            let group_id = format!("TIME_{second}");
            for trade in bucket {
                self.assign(group_id.clone(), trade, &mut touched);
            }
        }

        touched
    }

    fn assign(
        &mut self,
        group_id: String,
        trade: &Trade,
        touched: &mut BTreeMap<String, Vec<TradeId>>,
    ) {
        if self.assigned.contains_key(&trade.id) {
            return;
        }
        self.assigned.insert(trade.id.clone(), group_id.clone());
        self.groups
            .entry(group_id.clone())
            .or_default()
            .push(trade.id.clone());
        touched.entry(group_id).or_default().push(trade.id.clone());
    }

    /// Group a trade was placed in
    pub fn group_of(&self, trade_id: &str) -> Option<&str> {
        self.assigned.get(trade_id).map(String::as_str)
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<TradeId>> {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use swapflow_core::{Timestamp, TradeAction};

    fn at(offset_ms: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap() + Duration::milliseconds(offset_ms)
    }

    fn trade(id: &str, underlying: &str, offset_ms: i64) -> Trade {
        Trade::new(id, TradeAction::New, at(offset_ms), underlying)
    }

    #[test]
    fn test_strategy_group_wins() {
        let mut grouper = TradeGrouper::new();
        let mut a = trade("A", "USD-SOFR", 0);
        a.strategy_id = Some("CUST-A".into());
        let b = trade("B", "USD-SOFR", 100);

        grouper.group_batch(&[a, b]);

        assert_eq!(grouper.group_of("A"), Some("STRATEGY_CUST-A"));
        // B is alone in its remaining buckets
        assert_eq!(grouper.group_of("B"), None);
    }

    #[test]
    fn test_underlying_before_same_second() {
        let mut grouper = TradeGrouper::new();
        let batch = vec![
            trade("A", "USD-SOFR", 0),
            trade("B", "USD-SOFR", 200),
            trade("C", "EUR-ESTR", 300),
            trade("D", "GBP-SONIA", 400),
        ];

        let touched = grouper.group_batch(&batch);

        assert_eq!(grouper.group_of("A"), Some("UNDERLYING_1"));
        assert_eq!(grouper.group_of("B"), Some("UNDERLYING_1"));
        let time_group = format!("TIME_{}", at(0).timestamp());
        assert_eq!(grouper.group_of("C"), Some(time_group.as_str()));
        assert_eq!(touched.len(), 2);
    }

    #[test]
    fn test_package_key_groups() {
        let mut grouper = TradeGrouper::new();
        let batch = vec![
            trade("A", "USD-SOFR", 0).with_package("PK"),
            trade("B", "EUR-ESTR", 5_000).with_package("PK"),
        ];

        grouper.group_batch(&batch);
        assert_eq!(grouper.group_of("B"), Some("PACKAGE_PK"));
        assert_eq!(grouper.groups()["PACKAGE_PK"], vec!["A", "B"]);
    }
}
