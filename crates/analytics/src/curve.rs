//! Tenor distribution and curve levels

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::tenor::compare_tenors;
use swapflow_core::{Notional, Rate, Timestamp, Trade};

use crate::error::Result;
use crate::stats::{checked_sum, mean};

/// Activity in one tenor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenorBucket {
    pub tenor: String,
    pub notional: Notional,
    pub count: usize,
    /// Mean fixed rate (raw decimal) of trades carrying one
    pub avg_rate: Option<Rate>,
}

/// Mean fixed rate per tenor at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    pub timestamp: Timestamp,
    pub rates: BTreeMap<String, Rate>,
}

impl RateSample {
    /// Mean across tenors, `None` for an empty sample
    pub fn mean_rate(&self) -> Result<Option<Rate>> {
        let rates: Vec<Rate> = self.rates.values().copied().collect();
        mean(&rates, "curve")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveMetrics {
    /// Buckets in canonical tenor order
    pub tenor_distribution: Vec<TenorBucket>,
    /// "10Y-2Y" and "30Y-10Y" mean-rate spreads in bps, when both tenors traded
    pub tenor_spreads_bps: BTreeMap<String, Decimal>,
    pub average_rate_by_tenor: BTreeMap<String, Rate>,
    /// Sample appended to the rate history
    pub rate_sample: RateSample,
}

/// Tenor distribution over trades that carry a tenor and a non-zero EUR notional
pub fn curve_metrics(trades: &[Trade], now: Timestamp) -> Result<CurveMetrics> {
    let mut notionals: HashMap<&str, Vec<Notional>> = HashMap::new();
    let mut rates: HashMap<&str, Vec<Rate>> = HashMap::new();

    for trade in trades {
        let (Some(tenor), Some(notional)) = (trade.tenor.as_deref(), trade.notional_eur) else {
            continue;
        };
        if notional.is_zero() {
            continue;
        }
        notionals.entry(tenor).or_default().push(notional);
        if let Some(rate) = trade.fixed_rate {
            rates.entry(tenor).or_default().push(rate);
        }
    }

    let mut tenor_distribution = Vec::with_capacity(notionals.len());
    let mut average_rate_by_tenor = BTreeMap::new();
    for (tenor, values) in &notionals {
        let avg_rate = match rates.get(tenor) {
            Some(r) => mean(r, "curve")?,
            None => None,
        };
        if let Some(avg) = avg_rate {
            average_rate_by_tenor.insert(tenor.to_string(), avg);
        }
        tenor_distribution.push(TenorBucket {
            tenor: tenor.to_string(),
            notional: checked_sum(values.iter().copied(), "curve")?,
            count: values.len(),
            avg_rate,
        });
    }
    tenor_distribution.sort_by(|a, b| compare_tenors(&a.tenor, &b.tenor));

    let mut tenor_spreads_bps = BTreeMap::new();
    for (short, long) in [("2Y", "10Y"), ("10Y", "30Y")] {
        if let (Some(s), Some(l)) = (average_rate_by_tenor.get(short), average_rate_by_tenor.get(long)) {
            tenor_spreads_bps.insert(format!("{long}-{short}"), (l - s) * dec!(10000));
        }
    }

    Ok(CurveMetrics {
        tenor_distribution,
        tenor_spreads_bps,
        rate_sample: RateSample {
            timestamp: now,
            rates: average_rate_by_tenor.clone(),
        },
        average_rate_by_tenor,
    })
}
