//! Bounded histories kept between snapshots

use std::collections::{BTreeMap, VecDeque};

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swapflow_core::{Notional, Timestamp};

use crate::curve::RateSample;
use crate::error::Result;
use crate::stats::{mean, percentile_rank};

/// Rate samples appended once per snapshot, oldest dropped beyond capacity
#[derive(Debug)]
pub struct RateHistory {
    capacity: usize,
    samples: VecDeque<RateSample>,
}

impl RateHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::new(),
        }
    }

    /// Append a sample; samples without any rate are ignored
    pub fn push(&mut self, sample: RateSample) {
        if sample.rates.is_empty() {
            return;
        }
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Per-tenor change in bps between the latest sample and the most recent
    /// sample at least `lookback` older
    pub fn velocity_bps(&self, lookback: Duration) -> BTreeMap<String, Decimal> {
        let mut velocity = BTreeMap::new();
        let Some(current) = self.samples.back() else {
            return velocity;
        };

        let reference = self
            .samples
            .iter()
            .rev()
            .skip(1)
            .find(|s| current.timestamp - s.timestamp >= lookback);

        if let Some(reference) = reference {
            for (tenor, rate) in &current.rates {
                if let Some(old) = reference.rates.get(tenor) {
                    velocity.insert(tenor.clone(), (rate - old) * dec!(10000));
                }
            }
        }
        velocity
    }

    /// Absolute changes of the cross-tenor mean rate between consecutive samples
    pub fn mean_rate_moves(&self) -> Result<Vec<Decimal>> {
        let mut means = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            means.extend(sample.mean_rate()?);
        }
        Ok(means.windows(2).map(|w| (w[1] - w[0]).abs()).collect())
    }

    /// Percentile rank of the latest move among all moves
    ///
    /// Heuristic. Neutral 50 until `min_moves` moves are available.
    pub fn volatility_percentile(&self, min_moves: usize) -> Result<Decimal> {
        let moves = self.mean_rate_moves()?;
        Ok(match moves.last() {
            Some(latest) if moves.len() >= min_moves => percentile_rank(&moves, *latest),
            _ => dec!(50),
        })
    }

    pub fn latest(&self) -> Option<&RateSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Short-window volume per snapshot, used for momentum
#[derive(Debug)]
pub struct VolumeHistory {
    capacity: usize,
    samples: VecDeque<(Timestamp, Notional)>,
}

impl VolumeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::new(),
        }
    }

    pub fn push(&mut self, at: Timestamp, volume: Notional) {
        self.samples.push_back((at, volume));
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn mean(&self) -> Result<Option<Notional>> {
        let volumes: Vec<Notional> = self.samples.iter().map(|(_, v)| *v).collect();
        mean(&volumes, "realtime")
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
