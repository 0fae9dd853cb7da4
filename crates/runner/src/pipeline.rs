//! Per-tick pipeline
//!
//! Owns one instance of every stage and runs them in a fixed order for
//! each batch:
//!
//! 1. ledger ingest (dedup, eviction)
//! 2. EUR normalization and large-trade alerts
//! 3. strategy classification and strategy alerts
//! 4. volume trend
//! 5. display grouping and analytics snapshot

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use log::{debug, info};
use swapflow_alerts::AlertEngine;
use swapflow_analytics::{AnalyticsAggregator, AnalyticsSnapshot, SessionStats, SnapshotInput};
use swapflow_core::{Alert, Trade, TradeId};
use swapflow_ledger::TradeLedger;
use swapflow_ports::{Clock, RateLookup, ReplayData, ReplaySource};
use swapflow_strategy::{StrategyClassifier, StrategyUpdate, TradeGrouper};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::feed::FeedBatch;
use crate::sink::{AlertForwarder, EngineSink};

/// Everything a single tick produced
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Admitted trades after normalization and strategy assignment
    pub new_trades: Vec<Trade>,
    pub strategies: Vec<StrategyUpdate>,
    pub alerts: Vec<Alert>,
    /// Display groups for the admitted trades
    pub groups: BTreeMap<String, Vec<TradeId>>,
    /// `None` when the batch contained nothing new
    pub snapshot: Option<AnalyticsSnapshot>,
}

impl TickOutcome {
    pub fn is_empty(&self) -> bool {
        self.new_trades.is_empty()
    }
}

/// The four stages wired together
pub struct Pipeline {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EngineSink>,
    ledger: TradeLedger,
    classifier: StrategyClassifier,
    alerts: AlertEngine,
    grouper: TradeGrouper,
    aggregator: AnalyticsAggregator,
    session: SessionStats,
    recent_alerts: VecDeque<Alert>,
    recent_alert_capacity: usize,
    ticks: u64,
}

impl Pipeline {
    pub fn new(
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
        rates: Arc<dyn RateLookup>,
        sink: Arc<dyn EngineSink>,
    ) -> Self {
        let alerts = AlertEngine::new(config.alerts(), rates, clock.clone())
            .with_sink(Arc::new(AlertForwarder::new(sink.clone())));

        Self {
            clock,
            sink,
            ledger: TradeLedger::new(config.ledger()),
            classifier: StrategyClassifier::new(config.classifier()),
            alerts,
            grouper: TradeGrouper::new(),
            aggregator: AnalyticsAggregator::new(config.analytics()),
            session: SessionStats::new(),
            recent_alerts: VecDeque::with_capacity(config.recent_alert_capacity),
            recent_alert_capacity: config.recent_alert_capacity,
            ticks: 0,
        }
    }

    /// Restore state persisted by a previous run
    ///
    /// Replayed trades are buffered and normalized but never alert, and
    /// replayed strategies are never reported as new. Session statistics
    /// only count trades received by this process.
    pub fn seed(&mut self, replay: ReplayData) {
        let ReplayData {
            mut trades,
            strategies,
        } = replay;

        self.alerts.seed_trades(trades.iter().map(|t| t.id.clone()));
        self.alerts
            .seed_strategies(strategies.iter().map(|s| s.id.clone()));

        for trade in trades.iter_mut() {
            self.alerts.evaluate_trade(trade, false);
        }

        self.classifier.seed(&strategies, &trades);
        self.ledger.seed(trades);

        for strategy in self.classifier.strategies() {
            for leg in &strategy.leg_ids {
                self.ledger.assign_strategy(leg, &strategy.id);
            }
        }

        info!(
            "Pipeline seeded with {} trades and {} strategies",
            self.ledger.len(),
            self.classifier.len()
        );
    }

    /// Load and apply a replay
    pub fn seed_from(&mut self, source: &dyn ReplaySource) -> Result<()> {
        let replay = source.load_replay()?;
        self.seed(replay);
        Ok(())
    }

    /// Run one batch through every stage
    ///
    /// A batch with no unseen trades changes nothing and produces no
    /// snapshot.
    pub fn process_tick(&mut self, batch: FeedBatch) -> TickOutcome {
        let FeedBatch {
            trades,
            strategies: upstream,
        } = batch;
        let received = trades.len();

        let admitted = self.ledger.ingest(trades);
        if admitted.is_empty() {
            debug!("Tick skipped, {} received trades already seen", received);
            return TickOutcome::default();
        }

        self.ticks += 1;
        let now = self.clock.now();
        let mut alerts = Vec::new();

        let mut new_trades = Vec::with_capacity(admitted.len());
        for mut trade in admitted {
            // An evicted trade sent again is admitted again but was already counted
            let counted = self.alerts.is_trade_evaluated(&trade.id);
            // Trades evicted by this same ingest are evaluated on the copy
            let alert = match self.ledger.get_mut(&trade.id) {
                Some(buffered) => {
                    let alert = self.alerts.evaluate_trade(buffered, true);
                    trade = buffered.clone();
                    alert
                }
                None => self.alerts.evaluate_trade(&mut trade, true),
            };
            alerts.extend(alert);
            if !counted {
                self.session.record_trade(&trade);
            }
            new_trades.push(trade);
        }

        let recent: Vec<Trade> = self
            .ledger
            .recent_window(now, self.classifier.window())
            .cloned()
            .collect();
        let updates = self.classifier.classify_tick(upstream, &new_trades, &recent);

        for update in &updates {
            let strategy = &update.strategy;
            for leg in &strategy.leg_ids {
                self.ledger.assign_strategy(leg, &strategy.id);
            }
            for trade in new_trades.iter_mut() {
                if strategy.contains_leg(&trade.id) {
                    trade.strategy_id = Some(strategy.id.clone());
                }
            }

            alerts.extend(self.alerts.evaluate_strategy(strategy, update.is_new));
            if update.is_new {
                self.session.record_strategy(strategy);
            }
            self.sink.on_strategy(strategy, update.is_new);
        }

        alerts.extend(self.alerts.evaluate_volume_trend(&new_trades));

        for alert in &alerts {
            self.recent_alerts.push_back(alert.clone());
        }
        while self.recent_alerts.len() > self.recent_alert_capacity {
            self.recent_alerts.pop_front();
        }

        let groups = self.grouper.group_batch(&new_trades);

        let buffered: Vec<Trade> = self.ledger.trades().cloned().collect();
        let input = SnapshotInput::new(now, &buffered, self.classifier.strategies())
            .with_alerts(self.recent_alerts.make_contiguous())
            .with_session(&self.session);
        let snapshot = self.aggregator.snapshot(input);
        self.sink.on_snapshot(&snapshot);

        info!(
            "Tick {}: {} new trades, {} strategy updates, {} alerts, ledger {}",
            self.ticks,
            new_trades.len(),
            updates.len(),
            alerts.len(),
            self.ledger.len()
        );

        TickOutcome {
            new_trades,
            strategies: updates,
            alerts,
            groups,
            snapshot: Some(snapshot),
        }
    }

    /// Current state in the shape a replay source returns
    pub fn replay_data(&self) -> ReplayData {
        ReplayData {
            trades: self.ledger.trades().cloned().collect(),
            strategies: self.classifier.strategies().to_vec(),
        }
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn classifier(&self) -> &StrategyClassifier {
        &self.classifier
    }

    pub fn alert_engine(&self) -> &AlertEngine {
        &self.alerts
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn recent_alerts(&self) -> impl Iterator<Item = &Alert> + '_ {
        self.recent_alerts.iter()
    }

    /// Ticks that admitted at least one trade
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}
