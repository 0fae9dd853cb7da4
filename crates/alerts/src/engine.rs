use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use swapflow_core::{Alert, Strategy, StrategyId, Timestamp, Trade, TradeId};
use swapflow_ports::{AlertSink, Clock, RateLookup};

use crate::config::AlertConfig;
use crate::normalizer::EurNormalizer;
use crate::trend::VolumeTrendMonitor;

/// Persistable record of what the engine has already alerted on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedState {
    pub trade_ids: Vec<TradeId>,
    pub strategy_ids: Vec<StrategyId>,
    #[serde(default)]
    pub last_trend_alert: Option<Timestamp>,
}

/// Evaluates trades, strategies and rolling volume against alert thresholds
///
/// Evaluated ids are kept for the life of the engine and are never touched
/// by ledger eviction, so a re-sent trade cannot alert twice.
pub struct AlertEngine {
    config: AlertConfig,
    normalizer: EurNormalizer,
    clock: Arc<dyn Clock>,
    evaluated_trades: HashSet<TradeId>,
    evaluated_strategies: HashSet<StrategyId>,
    trend: VolumeTrendMonitor,
    sink: Option<Arc<dyn AlertSink>>,
}

impl AlertEngine {
    pub fn new(config: AlertConfig, rates: Arc<dyn RateLookup>, clock: Arc<dyn Clock>) -> Self {
        let trend = VolumeTrendMonitor::new(config.trend_window, config.trend_cooldown);
        Self {
            config,
            normalizer: EurNormalizer::new(rates),
            clock,
            evaluated_trades: HashSet::new(),
            evaluated_strategies: HashSet::new(),
            trend,
            sink: None,
        }
    }

    /// Register the callback every emitted alert is handed to
    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Normalize the trade to EUR and alert if it is large
    ///
    /// `notional_eur` is written whenever a rate is available. Trades that
    /// were already evaluated, or that are not newly received, are only
    /// normalized. A trade that cannot be normalized is left unevaluated so
    /// a later re-send can still alert.
    pub fn evaluate_trade(&mut self, trade: &mut Trade, is_new_trade: bool) -> Option<Alert> {
        match self.normalizer.to_eur(trade) {
            Ok(notional) => trade.notional_eur = Some(notional),
            Err(e) => {
                warn!("Cannot normalize trade {} to EUR: {}", trade.id, e);
                return None;
            }
        }

        if !is_new_trade || self.evaluated_trades.contains(&trade.id) {
            return None;
        }
        self.evaluated_trades.insert(trade.id.clone());

        let notional = trade.notional_eur_or_zero();
        let severity = self.config.thresholds.classify(notional)?;

        let alert = Alert::large_trade(
            trade.id.clone(),
            &trade.underlying,
            trade.tenor.as_deref(),
            notional,
            severity,
            self.clock.now(),
        );
        Some(self.emit(alert))
    }

    /// Alert on a newly created strategy whose total crosses the ladder
    pub fn evaluate_strategy(&mut self, strategy: &Strategy, is_new_strategy: bool) -> Option<Alert> {
        if !is_new_strategy || self.evaluated_strategies.contains(&strategy.id) {
            return None;
        }
        self.evaluated_strategies.insert(strategy.id.clone());

        let severity = self
            .config
            .thresholds
            .classify(strategy.total_notional_eur)?;

        let alert = Alert::strategy_package(
            strategy.id.clone(),
            &strategy.label,
            strategy.leg_count(),
            strategy.total_notional_eur,
            severity,
            self.clock.now(),
        );
        Some(self.emit(alert))
    }

    /// Add the tick's trades to the rolling log and alert on a volume spike
    pub fn evaluate_volume_trend(&mut self, new_trades: &[Trade]) -> Option<Alert> {
        let now = self.clock.now();
        self.trend.record(new_trades);
        self.trend.prune(now);

        let volume = self.trend.window_volume();
        if volume <= self.config.trend_threshold {
            return None;
        }
        if !self.trend.cooldown_elapsed(now) {
            debug!("Volume trend {} above threshold but cooling down", volume);
            return None;
        }

        self.trend.mark_alerted(now);
        let alert = Alert::volume_trend(volume, self.trend.window(), now);
        Some(self.emit(alert))
    }

    /// Pre-mark replayed trades as evaluated
    pub fn seed_trades<I>(&mut self, trade_ids: I)
    where
        I: IntoIterator<Item = TradeId>,
    {
        self.evaluated_trades.extend(trade_ids);
    }

    /// Pre-mark replayed strategies as evaluated
    pub fn seed_strategies<I>(&mut self, strategy_ids: I)
    where
        I: IntoIterator<Item = StrategyId>,
    {
        self.evaluated_strategies.extend(strategy_ids);
    }

    /// Restore a previously captured state on top of the current one
    pub fn restore(&mut self, state: EvaluatedState) {
        self.seed_trades(state.trade_ids);
        self.seed_strategies(state.strategy_ids);
        if let Some(at) = state.last_trend_alert {
            self.trend.mark_alerted(at);
        }
    }

    /// Capture the evaluated sets and trend cooldown for persistence
    pub fn evaluated_state(&self) -> EvaluatedState {
        let mut trade_ids: Vec<TradeId> = self.evaluated_trades.iter().cloned().collect();
        let mut strategy_ids: Vec<StrategyId> =
            self.evaluated_strategies.iter().cloned().collect();
        trade_ids.sort();
        strategy_ids.sort();
        EvaluatedState {
            trade_ids,
            strategy_ids,
            last_trend_alert: self.trend.last_alert(),
        }
    }

    pub fn is_trade_evaluated(&self, trade_id: &str) -> bool {
        self.evaluated_trades.contains(trade_id)
    }

    pub fn is_strategy_evaluated(&self, strategy_id: &str) -> bool {
        self.evaluated_strategies.contains(strategy_id)
    }

    fn emit(&self, alert: Alert) -> Alert {
        info!(
            "[{:?}] {:?} alert {}: {}",
            alert.severity, alert.kind, alert.id, alert.message
        );
        if let Some(sink) = &self.sink {
            sink.on_alert(&alert);
        }
        alert
    }
}
