//! Trade feeds
//!
//! A feed yields batches of raw trades (and optionally upstream-declared
//! strategies) in the shape the pipeline consumes. Feed schema
//! normalization happens here, before the core.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use swapflow_core::{Strategy, Trade, TradeAction};
use swapflow_ports::Clock;

/// One poll of the upstream source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedBatch {
    pub trades: Vec<Trade>,
    /// Strategies already classified upstream
    pub strategies: Vec<Strategy>,
}

impl FeedBatch {
    pub fn from_trades(trades: Vec<Trade>) -> Self {
        Self {
            trades,
            strategies: Vec::new(),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.strategies.is_empty()
    }
}

/// Source of trade batches; `None` means the feed is exhausted
#[async_trait]
pub trait TradeFeed: Send {
    async fn next_batch(&mut self) -> Option<FeedBatch>;
}

/// Replays a fixed list of batches
#[derive(Debug, Default)]
pub struct VecFeed {
    batches: VecDeque<FeedBatch>,
}

impl VecFeed {
    pub fn new(batches: impl IntoIterator<Item = FeedBatch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

#[async_trait]
impl TradeFeed for VecFeed {
    async fn next_batch(&mut self) -> Option<FeedBatch> {
        self.batches.pop_front()
    }
}

/// (underlying, currency of its notional)
const UNDERLYINGS: [(&str, &str); 5] = [
    ("EUR-EURIBOR-6M", "EUR"),
    ("EUR-ESTR", "EUR"),
    ("USD-SOFR", "USD"),
    ("GBP-SONIA", "GBP"),
    ("JPY-TONA", "JPY"),
];

/// (tenor, mid fixed rate in bps)
const TENOR_LEVELS: [(&str, i64); 8] = [
    ("1Y", 240),
    ("2Y", 235),
    ("3Y", 238),
    ("5Y", 245),
    ("7Y", 252),
    ("10Y", 262),
    ("20Y", 270),
    ("30Y", 268),
];

const PLATFORMS: [&str; 4] = ["TRADEWEB", "BLOOMBERG", "MARKETAXESS", "VOICE"];

/// Configuration for the synthetic feed
#[derive(Debug, Clone)]
pub struct SyntheticFeedConfig {
    /// Trades per batch, inclusive range
    pub min_trades: usize,
    pub max_trades: usize,
    /// Probability that a batch re-sends trades from the previous batch
    pub duplicate_probability: f64,
    /// Probability that a batch contains a 2-4 leg package
    pub package_probability: f64,
    /// Probability that a single trade is a multi-billion block
    pub block_probability: f64,
    /// Number of batches to produce, unbounded when `None`
    pub batches: Option<usize>,
    /// Pause before each batch
    pub interval: Option<std::time::Duration>,
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            min_trades: 1,
            max_trades: 6,
            duplicate_probability: 0.2,
            package_probability: 0.15,
            block_probability: 0.05,
            batches: None,
            interval: None,
        }
    }
}

/// Generates plausible swap flow stamped against the injected clock
pub struct SyntheticFeed {
    config: SyntheticFeedConfig,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    next_id: u64,
    next_package: u64,
    produced: usize,
    previous: Vec<Trade>,
}

impl SyntheticFeed {
    pub fn new(config: SyntheticFeedConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_rng(config, clock, StdRng::from_entropy())
    }

    /// Create with a specific seed for reproducible runs
    pub fn with_seed(config: SyntheticFeedConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::from_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: SyntheticFeedConfig, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        Self {
            config,
            clock,
            rng,
            next_id: 1,
            next_package: 1,
            produced: 0,
            previous: Vec::new(),
        }
    }

    /// Generate the next batch without pacing
    pub fn generate(&mut self) -> FeedBatch {
        let mut trades = Vec::new();

        if !self.previous.is_empty() && self.rng.gen_bool(self.config.duplicate_probability) {
            let resend = self.rng.gen_range(1..=self.previous.len());
            trades.extend(self.previous.iter().take(resend).cloned());
        }

        let count = self
            .rng
            .gen_range(self.config.min_trades..=self.config.max_trades.max(self.config.min_trades));
        let fresh_start = trades.len();
        for _ in 0..count {
            let underlying = UNDERLYINGS[self.rng.gen_range(0..UNDERLYINGS.len())];
            let tenor = TENOR_LEVELS[self.rng.gen_range(0..TENOR_LEVELS.len())];
            trades.push(self.trade(underlying, tenor, None));
        }

        if self.rng.gen_bool(self.config.package_probability) {
            let underlying = UNDERLYINGS[self.rng.gen_range(0..UNDERLYINGS.len())];
            let legs = self.rng.gen_range(2..=4);
            let first = self.rng.gen_range(0..=TENOR_LEVELS.len() - legs);
            let key = format!("PKG{:05}", self.next_package);
            self.next_package += 1;
            for tenor in TENOR_LEVELS.iter().skip(first).take(legs) {
                trades.push(self.trade(underlying, *tenor, Some(key.as_str())));
            }
        }

        self.previous = trades[fresh_start..].to_vec();
        FeedBatch::from_trades(trades)
    }

    fn trade(
        &mut self,
        (underlying, currency): (&str, &str),
        (tenor, level): (&str, i64),
        package: Option<&str>,
    ) -> Trade {
        let id = format!("SYN{:08}", self.next_id);
        self.next_id += 1;

        let action = match self.rng.gen_range(0..100) {
            0..=89 => TradeAction::New,
            90..=96 => TradeAction::Modify,
            _ => TradeAction::Terminate,
        };

        // Notional in millions
        let millions: i64 = if self.rng.gen_bool(self.config.block_probability) {
            self.rng.gen_range(2_000..=8_000)
        } else {
            self.rng.gen_range(2..=120) * 5
        };
        let notional = Decimal::from(millions) * Decimal::from(1_000_000);

        let rate_bps = level + self.rng.gen_range(-6..=6);
        let executed_at = self.clock.now() - Duration::milliseconds(self.rng.gen_range(0..3_000));
        let platform = PLATFORMS[self.rng.gen_range(0..PLATFORMS.len())];

        let trade = Trade::new(id, action, executed_at, underlying)
            .with_leg1(notional, currency)
            .with_leg2(notional, currency)
            .with_tenor(tenor)
            .with_fixed_rate(Decimal::new(rate_bps, 4))
            .with_platform(platform);

        match package {
            Some(key) => trade.with_package(key),
            None => trade,
        }
    }
}

#[async_trait]
impl TradeFeed for SyntheticFeed {
    async fn next_batch(&mut self) -> Option<FeedBatch> {
        if self.config.batches.is_some_and(|limit| self.produced >= limit) {
            return None;
        }
        if let Some(interval) = self.config.interval {
            tokio::time::sleep(interval).await;
        }
        self.produced += 1;
        Some(self.generate())
    }
}
