//! Strategy classification
//!
//! Two rules run on every tick, package rule first:
//!
//! 1. **Package**: NEW trades flagged `is_package` with a package key. All
//!    recent NEW trades sharing the key form one strategy (`PKG-{key}`).
//! 2. **Custom**: recent NEW trades grouped by underlying. A group with at
//!    least two distinct tenors whose executions span no more than the
//!    strategy window becomes a strategy (`CUST-{first leg id}`), or extends
//!    the custom strategy one of its trades already belongs to.
//!
//! A trade is claimed by at most one strategy, ever. Strategies are never
//! removed; leg details are retained after the ledger evicts the trade so
//! totals stay correct.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Duration;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use swapflow_core::tenor::sort_tenors;
use swapflow_core::{
    Notional, Strategy, StrategyId, StrategyKind, StrategyStructure, Timestamp, Trade, TradeId,
};

/// Configuration for the strategy classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Maximum execution span of a custom strategy candidate group
    pub strategy_window: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy_window: Duration::seconds(20),
        }
    }
}

/// A strategy created or extended during one classification pass
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyUpdate {
    /// Strategy state after the pass
    pub strategy: Strategy,
    /// Created during this pass
    pub is_new: bool,
    /// Trade ids claimed during this pass, in claim order
    pub added_legs: Vec<TradeId>,
}

/// What the classifier remembers about a claimed leg
#[derive(Debug, Clone)]
struct LegInfo {
    notional_eur: Option<Notional>,
    tenor: Option<String>,
    executed_at: Timestamp,
}

impl From<&Trade> for LegInfo {
    fn from(trade: &Trade) -> Self {
        Self {
            notional_eur: trade.notional_eur,
            tenor: trade.tenor.clone(),
            executed_at: trade.executed_at,
        }
    }
}

/// Values carried over from a strategy loaded from replay or upstream,
/// covering legs whose trades were never seen locally
#[derive(Debug, Clone)]
struct Anchor {
    carried_notional: Notional,
    start: Timestamp,
    end: Timestamp,
    tenors: Vec<String>,
}

#[derive(Default)]
struct TickChanges {
    touched: Vec<StrategyId>,
    created: HashSet<StrategyId>,
    added: HashMap<StrategyId, Vec<TradeId>>,
}

impl TickChanges {
    fn touch(&mut self, strategy_id: &StrategyId) {
        if !self.touched.contains(strategy_id) {
            self.touched.push(strategy_id.clone());
        }
    }

    fn record_leg(&mut self, strategy_id: &StrategyId, trade_id: &TradeId) {
        self.touch(strategy_id);
        self.added
            .entry(strategy_id.clone())
            .or_default()
            .push(trade_id.clone());
    }
}

/// Groups related trades into multi-leg strategies
pub struct StrategyClassifier {
    config: ClassifierConfig,
    strategies: Vec<Strategy>,
    index: HashMap<StrategyId, usize>,
    by_package: HashMap<String, StrategyId>,
    trade_to_strategy: HashMap<TradeId, StrategyId>,
    legs: HashMap<TradeId, LegInfo>,
    anchors: HashMap<StrategyId, Anchor>,
}

impl StrategyClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            strategies: Vec::new(),
            index: HashMap::new(),
            by_package: HashMap::new(),
            trade_to_strategy: HashMap::new(),
            legs: HashMap::new(),
            anchors: HashMap::new(),
        }
    }

    /// Window used for both the custom-rule span check and the recent slice
    pub fn window(&self) -> Duration {
        self.config.strategy_window
    }

    /// Run both rules over this tick's new trades and the recent window
    ///
    /// `new_trades` are the trades the ledger admitted this tick and
    /// `recent` is the ledger's recent window, which normally contains them.
    pub fn classify(&mut self, new_trades: &[Trade], recent: &[Trade]) -> Vec<StrategyUpdate> {
        self.classify_tick(Vec::new(), new_trades, recent)
    }

    /// Adopt upstream-declared strategies, then run both rules
    pub fn classify_tick(
        &mut self,
        upstream: Vec<Strategy>,
        new_trades: &[Trade],
        recent: &[Trade],
    ) -> Vec<StrategyUpdate> {
        let mut tick = TickChanges::default();

        if !upstream.is_empty() {
            let known: HashMap<&str, &Trade> = recent
                .iter()
                .chain(new_trades.iter())
                .map(|t| (t.id.as_str(), t))
                .collect();
            for strategy in upstream {
                self.adopt(strategy, &known, &mut tick);
            }
        }

        self.apply_package_rule(new_trades, recent, &mut tick);
        self.apply_custom_rule(recent, &mut tick);

        self.finish(tick)
    }

    /// Load persisted strategies without reporting them as new
    ///
    /// `trades` supplies leg details where available.
    pub fn seed(&mut self, strategies: &[Strategy], trades: &[Trade]) {
        let known: HashMap<&str, &Trade> = trades.iter().map(|t| (t.id.as_str(), t)).collect();
        let mut tick = TickChanges::default();
        for strategy in strategies {
            self.adopt(strategy.clone(), &known, &mut tick);
        }
        debug!("Classifier seeded with {} strategies", self.strategies.len());
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn get(&self, strategy_id: &str) -> Option<&Strategy> {
        self.index.get(strategy_id).map(|&i| &self.strategies[i])
    }

    /// Strategy that claimed the trade, if any
    pub fn strategy_for_trade(&self, trade_id: &str) -> Option<&StrategyId> {
        self.trade_to_strategy.get(trade_id)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn apply_package_rule(&mut self, new_trades: &[Trade], recent: &[Trade], tick: &mut TickChanges) {
        let mut keys: Vec<&str> = Vec::new();
        for trade in new_trades.iter().filter(|t| t.is_new() && t.is_package_leg()) {
            if let Some(key) = trade.package_key.as_deref()
                && !keys.contains(&key)
            {
                keys.push(key);
            }
        }

        for key in keys {
            let same_key = |t: &&Trade| {
                t.is_new() && t.is_package_leg() && t.package_key.as_deref() == Some(key)
            };

            let mut candidates: Vec<&Trade> = recent.iter().filter(same_key).collect();
            for trade in new_trades.iter().filter(same_key) {
                if !candidates.iter().any(|c| c.id == trade.id) {
                    candidates.push(trade);
                }
            }

            let unclaimed: Vec<&Trade> = candidates
                .into_iter()
                .filter(|t| !self.trade_to_strategy.contains_key(&t.id))
                .collect();
            let Some(first) = unclaimed.first() else {
                continue;
            };

            let strategy_id = match self.by_package.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let strategy = Strategy::new(
                        format!("PKG-{key}"),
                        StrategyKind::Package,
                        first.underlying.clone(),
                        first.executed_at,
                    )
                    .with_package_key(key);
                    self.insert(strategy, tick)
                }
            };

            for trade in unclaimed {
                self.claim(&strategy_id, &trade.id, Some(trade), tick);
            }
        }
    }

    fn apply_custom_rule(&mut self, recent: &[Trade], tick: &mut TickChanges) {
        let mut groups: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
        for trade in recent.iter().filter(|t| t.is_new() && !t.underlying.is_empty()) {
            groups.entry(trade.underlying.as_str()).or_default().push(trade);
        }

        for (underlying, group) in groups {
            if group.len() < 2 || distinct_tenors(&group) < 2 {
                continue;
            }
            if !within_span(&group, self.config.strategy_window) {
                continue;
            }

            let existing = group.iter().find_map(|t| {
                self.trade_to_strategy
                    .get(&t.id)
                    .filter(|sid| self.kind_of(sid) == Some(StrategyKind::Custom))
                    .cloned()
            });

            let mut unclaimed: Vec<&Trade> = group
                .into_iter()
                .filter(|t| !self.trade_to_strategy.contains_key(&t.id))
                .collect();
            if unclaimed.is_empty() {
                continue;
            }

            let strategy_id = match existing {
                Some(sid) => sid,
                None => {
                    if unclaimed.len() < 2 || distinct_tenors(&unclaimed) < 2 {
                        continue;
                    }
                    unclaimed.sort_by(|a, b| {
                        a.executed_at
                            .cmp(&b.executed_at)
                            .then_with(|| a.id.cmp(&b.id))
                    });
                    let first = unclaimed[0];
                    let strategy = Strategy::new(
                        format!("CUST-{}", first.id),
                        StrategyKind::Custom,
                        underlying,
                        first.executed_at,
                    );
                    self.insert(strategy, tick)
                }
            };

            for trade in unclaimed {
                self.claim(&strategy_id, &trade.id, Some(trade), tick);
            }
        }
    }

    /// Register a strategy declared outside the rules (replay or upstream)
    fn adopt(&mut self, strategy: Strategy, known: &HashMap<&str, &Trade>, tick: &mut TickChanges) {
        if self.index.contains_key(&strategy.id) {
            let strategy_id = strategy.id.clone();
            for leg in &strategy.leg_ids {
                self.claim(&strategy_id, leg, known.get(leg.as_str()).copied(), tick);
            }
            return;
        }

        let mut leg_ids: Vec<TradeId> = Vec::new();
        for leg in &strategy.leg_ids {
            if self.trade_to_strategy.contains_key(leg) {
                warn!(
                    "Strategy {} declares leg {} already claimed by {:?}",
                    strategy.id,
                    leg,
                    self.trade_to_strategy.get(leg)
                );
            } else if !leg_ids.contains(leg) {
                leg_ids.push(leg.clone());
            }
        }
        if leg_ids.is_empty() {
            return;
        }

        let known_notional: Notional = leg_ids
            .iter()
            .filter_map(|id| known.get(id.as_str()))
            .map(|t| t.notional_eur_or_zero())
            .sum();
        let anchor = Anchor {
            carried_notional: (strategy.total_notional_eur - known_notional).max(Decimal::ZERO),
            start: strategy.execution_start,
            end: strategy.execution_end,
            tenors: strategy.tenors.clone(),
        };

        let mut shell = strategy;
        shell.leg_ids.clear();
        let strategy_id = shell.id.clone();
        self.anchors.insert(strategy_id.clone(), anchor);
        self.insert(shell, tick);

        for leg in &leg_ids {
            self.claim(&strategy_id, leg, known.get(leg.as_str()).copied(), tick);
        }
    }

    fn insert(&mut self, strategy: Strategy, tick: &mut TickChanges) -> StrategyId {
        let strategy_id = strategy.id.clone();
        if let Some(key) = &strategy.package_key {
            self.by_package
                .entry(key.clone())
                .or_insert_with(|| strategy_id.clone());
        }
        self.index.insert(strategy_id.clone(), self.strategies.len());
        self.strategies.push(strategy);
        tick.created.insert(strategy_id.clone());
        tick.touch(&strategy_id);
        strategy_id
    }

    fn claim(
        &mut self,
        strategy_id: &StrategyId,
        trade_id: &TradeId,
        trade: Option<&Trade>,
        tick: &mut TickChanges,
    ) -> bool {
        if self.trade_to_strategy.contains_key(trade_id) {
            return false;
        }
        let Some(&idx) = self.index.get(strategy_id) else {
            return false;
        };

        self.trade_to_strategy
            .insert(trade_id.clone(), strategy_id.clone());
        if let Some(trade) = trade {
            self.legs.insert(trade_id.clone(), LegInfo::from(trade));
        }
        self.strategies[idx].leg_ids.push(trade_id.clone());
        tick.record_leg(strategy_id, trade_id);
        true
    }

    fn kind_of(&self, strategy_id: &str) -> Option<StrategyKind> {
        self.get(strategy_id).map(|s| s.kind)
    }

    /// Recompute derived fields from leg details
    fn refresh(&mut self, strategy_id: &str) {
        let Some(&idx) = self.index.get(strategy_id) else {
            return;
        };
        let anchor = self.anchors.get(strategy_id);
        let strategy = &mut self.strategies[idx];

        let mut total = anchor.map_or(Decimal::ZERO, |a| a.carried_notional);
        let mut start = anchor.map(|a| a.start);
        let mut end = anchor.map(|a| a.end);
        let mut tenors: Vec<&str> = anchor
            .map(|a| a.tenors.iter().map(String::as_str).collect())
            .unwrap_or_default();

        for leg in &strategy.leg_ids {
            let Some(info) = self.legs.get(leg) else {
                continue;
            };
            total += info.notional_eur.unwrap_or(Decimal::ZERO);
            start = Some(start.map_or(info.executed_at, |s| s.min(info.executed_at)));
            end = Some(end.map_or(info.executed_at, |e| e.max(info.executed_at)));
            if let Some(tenor) = info.tenor.as_deref() {
                tenors.push(tenor);
            }
        }

        let tenors = sort_tenors(tenors);
        let instrument = (!tenors.is_empty()).then(|| tenors.join("/"));
        let structure = StrategyStructure::from_leg_count(strategy.leg_ids.len());

        strategy.total_notional_eur = total;
        if let Some(start) = start {
            strategy.execution_start = start;
        }
        if let Some(end) = end {
            strategy.execution_end = end;
        }
        strategy.tenors = tenors;
        strategy.structure = structure;
        strategy.label = match &instrument {
            Some(label) => format!("{label} {}", structure.as_str()),
            None => structure.as_str().to_string(),
        };
        strategy.instrument_label = instrument;
    }

    fn finish(&mut self, mut tick: TickChanges) -> Vec<StrategyUpdate> {
        let mut updates = Vec::with_capacity(tick.touched.len());
        for strategy_id in std::mem::take(&mut tick.touched) {
            self.refresh(&strategy_id);
            let Some(strategy) = self.get(&strategy_id).cloned() else {
                continue;
            };
            let is_new = tick.created.contains(&strategy_id);
            let added_legs = tick.added.remove(&strategy_id).unwrap_or_default();

            if is_new {
                info!(
                    "Strategy detected: {} {} ({} legs, EUR {})",
                    strategy.id,
                    strategy.label,
                    strategy.leg_count(),
                    strategy.total_notional_eur
                );
            } else {
                debug!(
                    "Strategy {} extended by {} legs",
                    strategy.id,
                    added_legs.len()
                );
            }

            updates.push(StrategyUpdate {
                strategy,
                is_new,
                added_legs,
            });
        }
        updates
    }
}

impl Default for StrategyClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn distinct_tenors(trades: &[&Trade]) -> usize {
    let tenors: HashSet<&str> = trades.iter().filter_map(|t| t.tenor.as_deref()).collect();
    tenors.len()
}

/// Execution span of the group is at most `window` (inclusive)
fn within_span(trades: &[&Trade], window: Duration) -> bool {
    let first = trades.iter().map(|t| t.executed_at).min();
    let last = trades.iter().map(|t| t.executed_at).max();
    match (first, last) {
        (Some(first), Some(last)) => last - first <= window,
        _ => false,
    }
}
