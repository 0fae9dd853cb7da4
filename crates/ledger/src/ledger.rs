use std::collections::{HashSet, VecDeque};

use chrono::Duration;
use log::debug;
use swapflow_core::{StrategyId, Timestamp, Trade, TradeId};

/// Configuration for the trade ledger
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum number of trades kept in the buffer
    pub max_trades: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { max_trades: 1000 }
    }
}

/// Bounded, deduplicating buffer of recently received trades
///
/// Every buffered trade id is in the seen set and every id in the seen set
/// is buffered; eviction removes both together.
pub struct TradeLedger {
    config: LedgerConfig,
    buffer: VecDeque<Trade>,
    seen: HashSet<TradeId>,
}

impl TradeLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            buffer: VecDeque::with_capacity(config.max_trades.saturating_add(1)),
            seen: HashSet::new(),
            config,
        }
    }

    /// Admit unseen trades, preserving input order
    ///
    /// Returns copies of the admitted trades. Ids already seen, including
    /// repeats within the same batch, are dropped. May evict.
    pub fn ingest<I>(&mut self, trades: I) -> Vec<Trade>
    where
        I: IntoIterator<Item = Trade>,
    {
        let mut admitted = Vec::new();
        let mut dropped = 0usize;

        for trade in trades {
            if !self.seen.insert(trade.id.clone()) {
                dropped += 1;
                continue;
            }
            admitted.push(trade.clone());
            self.buffer.push_back(trade);
        }

        if dropped > 0 {
            debug!("Ledger dropped {} already seen trades", dropped);
        }

        self.evict_if_over_capacity();
        admitted
    }

    /// Load persisted trades without reporting them as new
    pub fn seed<I>(&mut self, trades: I)
    where
        I: IntoIterator<Item = Trade>,
    {
        for trade in trades {
            if self.seen.insert(trade.id.clone()) {
                self.buffer.push_back(trade);
            }
        }
        self.evict_if_over_capacity();
    }

    /// Drop the oldest trades beyond capacity and forget their ids
    ///
    /// Returns the ids that were evicted.
    pub fn evict_if_over_capacity(&mut self) -> Vec<TradeId> {
        let excess = self.buffer.len().saturating_sub(self.config.max_trades);
        if excess == 0 {
            return Vec::new();
        }

        let evicted: Vec<TradeId> = self
            .buffer
            .drain(..excess)
            .map(|trade| {
                self.seen.remove(&trade.id);
                trade.id
            })
            .collect();

        debug!(
            "Ledger evicted {} trades (capacity {})",
            evicted.len(),
            self.config.max_trades
        );
        evicted
    }

    /// Trades executed at or after `now - window`
    ///
    /// The lower bound is inclusive. Trades stamped after `now` are included.
    pub fn recent_window(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> impl Iterator<Item = &Trade> + '_ {
        let cutoff = now - window;
        self.buffer.iter().filter(move |t| t.executed_at >= cutoff)
    }

    /// Record the strategy a buffered trade was assigned to
    pub fn assign_strategy(&mut self, trade_id: &str, strategy_id: &StrategyId) -> bool {
        match self.get_mut(trade_id) {
            Some(trade) => {
                trade.strategy_id = Some(strategy_id.clone());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, trade_id: &str) -> Option<&Trade> {
        self.buffer.iter().rev().find(|t| t.id == trade_id)
    }

    pub fn get_mut(&mut self, trade_id: &str) -> Option<&mut Trade> {
        self.buffer.iter_mut().rev().find(|t| t.id == trade_id)
    }

    /// Buffered trades, oldest first
    pub fn trades(&self) -> impl Iterator<Item = &Trade> + '_ {
        self.buffer.iter()
    }

    pub fn has_seen(&self, trade_id: &str) -> bool {
        self.seen.contains(trade_id)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_trades
    }
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use swapflow_core::TradeAction;

    fn base() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn trade(id: &str, offset_secs: i64) -> Trade {
        Trade::new(
            id,
            TradeAction::New,
            base() + Duration::seconds(offset_secs),
            "EUR-EURIBOR-6M",
        )
        .with_leg1(dec!(100_000_000), "EUR")
        .with_tenor("5Y")
    }

    #[test]
    fn test_ingest_drops_seen_ids() {
        let mut ledger = TradeLedger::default();

        let first = ledger.ingest(vec![trade("A", 0), trade("B", 1)]);
        assert_eq!(first.len(), 2);

        let second = ledger.ingest(vec![trade("B", 1), trade("C", 2)]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, "C");
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_ingest_drops_repeats_within_batch() {
        let mut ledger = TradeLedger::default();
        let admitted = ledger.ingest(vec![trade("A", 0), trade("A", 0), trade("B", 1)]);

        let ids: Vec<_> = admitted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_ingest_preserves_input_order() {
        let mut ledger = TradeLedger::default();
        ledger.ingest(vec![trade("Z", 5), trade("A", 0), trade("M", 3)]);

        let ids: Vec<_> = ledger.trades().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_eviction_forgets_ids() {
        let mut ledger = TradeLedger::new(LedgerConfig { max_trades: 2 });
        ledger.ingest(vec![trade("A", 0), trade("B", 1), trade("C", 2)]);

        assert_eq!(ledger.len(), 2);
        assert!(!ledger.has_seen("A"));
        assert!(ledger.has_seen("B"));
        assert!(ledger.get("A").is_none());

        // An evicted id is accepted again on re-send
        let readmitted = ledger.ingest(vec![trade("A", 0)]);
        assert_eq!(readmitted.len(), 1);
        assert!(!ledger.has_seen("B"));
    }

    #[test]
    fn test_seen_set_matches_buffer() {
        let mut ledger = TradeLedger::new(LedgerConfig { max_trades: 3 });
        for i in 0..10 {
            ledger.ingest(vec![trade(&format!("T{i}"), i)]);
        }

        assert_eq!(ledger.len(), 3);
        for t in ledger.trades() {
            assert!(ledger.has_seen(&t.id));
        }
        for i in 0..7 {
            assert!(!ledger.has_seen(&format!("T{i}")));
        }
    }

    #[test]
    fn test_recent_window_bounds() {
        let mut ledger = TradeLedger::default();
        ledger.ingest(vec![trade("OLD", 0), trade("EDGE", 10), trade("IN", 25)]);

        let now = base() + Duration::seconds(30);
        let ids: Vec<_> = ledger
            .recent_window(now, Duration::seconds(20))
            .map(|t| t.id.as_str())
            .collect();

        // EDGE sits exactly on the lower bound and is included
        assert_eq!(ids, vec!["EDGE", "IN"]);
    }

    #[test]
    fn test_recent_window_is_restartable() {
        let mut ledger = TradeLedger::default();
        ledger.ingest(vec![trade("A", 0), trade("B", 1)]);
        let now = base() + Duration::seconds(2);

        assert_eq!(ledger.recent_window(now, Duration::seconds(20)).count(), 2);
        assert_eq!(ledger.recent_window(now, Duration::seconds(20)).count(), 2);
    }

    #[test]
    fn test_seed_does_not_report_new() {
        let mut ledger = TradeLedger::default();
        ledger.seed(vec![trade("A", 0)]);

        assert!(ledger.has_seen("A"));
        assert!(ledger.ingest(vec![trade("A", 0)]).is_empty());
    }

    #[test]
    fn test_assign_strategy() {
        let mut ledger = TradeLedger::default();
        ledger.ingest(vec![trade("A", 0)]);

        assert!(ledger.assign_strategy("A", &"CUST-A".to_string()));
        assert_eq!(
            ledger.get("A").and_then(|t| t.strategy_id.as_deref()),
            Some("CUST-A")
        );
        assert!(!ledger.assign_strategy("missing", &"CUST-A".to_string()));
    }
}
