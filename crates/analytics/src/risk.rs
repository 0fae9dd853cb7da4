//! Risk and concentration

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::tenor::{DEFAULT_DURATION, duration_estimate};
use swapflow_core::{Notional, Trade};

use crate::error::{AnalyticsError, Result};
use crate::stats::{checked_mul, checked_sum, nearest_rank, percent};

const BASIS_POINT: Decimal = dec!(0.0001);
const MAX_HHI: Decimal = dec!(10000);

/// Size histogram bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionalBucket {
    pub label: String,
    pub count: usize,
    pub notional: Notional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionalPercentiles {
    pub p50: Notional,
    pub p75: Notional,
    pub p90: Notional,
    pub p95: Notional,
    pub p99: Notional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// Sum of notional x duration x 1bp, EUR per basis point
    pub total_dv01: Decimal,
    pub notional_distribution: Vec<NotionalBucket>,
    /// Herfindahl-Hirschman index over per-underlying notional, 0-10000
    pub concentration_hhi: Decimal,
    /// Share of notional in the five largest underlyings, 0-100
    pub top5_concentration: Decimal,
    /// Nearest-rank percentiles of EUR notional, `None` without priced trades
    pub percentiles: Option<NotionalPercentiles>,
}

/// (label, lower bound inclusive, upper bound exclusive)
const BUCKETS: [(&str, Decimal, Option<Decimal>); 5] = [
    ("<100M", Decimal::ZERO, Some(dec!(100_000_000))),
    ("100M-500M", dec!(100_000_000), Some(dec!(500_000_000))),
    ("500M-1B", dec!(500_000_000), Some(dec!(1_000_000_000))),
    ("1B-5B", dec!(1_000_000_000), Some(dec!(5_000_000_000))),
    (">5B", dec!(5_000_000_000), None),
];

/// Herfindahl-Hirschman index of `volumes`
///
/// `sum((v / total)^2) * 10000`, capped at 10000. Non-positive volumes are
/// ignored; an empty input yields 0.
pub fn hhi<I>(volumes: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let volumes: Vec<Decimal> = volumes
        .into_iter()
        .filter(|v| *v > Decimal::ZERO)
        .collect();
    if volumes.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let total = checked_sum(volumes.iter().copied(), "risk")?;
    let squared_shares = volumes
        .iter()
        .map(|v| {
            let share = v.checked_div(total).ok_or(AnalyticsError::Overflow("risk"))?;
            checked_mul(share, share, "risk")
        })
        .collect::<Result<Vec<_>>>()?;
    let index = checked_mul(checked_sum(squared_shares, "risk")?, MAX_HHI, "risk")?;
    // share rounding must not push a split market past a monopoly
    Ok(index.min(MAX_HHI))
}

pub fn risk_metrics(trades: &[Trade]) -> Result<RiskMetrics> {
    let priced: Vec<&Trade> = trades.iter().filter(|t| t.notional_eur.is_some()).collect();

    let mut total_dv01 = Decimal::ZERO;
    for trade in &priced {
        let duration = trade
            .tenor
            .as_deref()
            .map(duration_estimate)
            .unwrap_or(DEFAULT_DURATION);
        let dv01 = checked_mul(
            checked_mul(trade.notional_eur_or_zero(), duration, "risk")?,
            BASIS_POINT,
            "risk",
        )?;
        total_dv01 = checked_sum([total_dv01, dv01], "risk")?;
    }

    let mut notional_distribution: Vec<NotionalBucket> = BUCKETS
        .iter()
        .map(|(label, _, _)| NotionalBucket {
            label: label.to_string(),
            count: 0,
            notional: Decimal::ZERO,
        })
        .collect();
    for trade in &priced {
        let notional = trade.notional_eur_or_zero();
        let slot = BUCKETS
            .iter()
            .position(|(_, low, high)| notional >= *low && high.is_none_or(|h| notional < h));
        if let Some(bucket) = slot.and_then(|i| notional_distribution.get_mut(i)) {
            bucket.count += 1;
            bucket.notional = checked_sum([bucket.notional, notional], "risk")?;
        }
    }

    let mut by_underlying: HashMap<&str, Decimal> = HashMap::new();
    for trade in &priced {
        let slot = by_underlying.entry(trade.underlying.as_str()).or_default();
        *slot = checked_sum([*slot, trade.notional_eur_or_zero()], "risk")?;
    }
    let mut volumes: Vec<Decimal> = by_underlying.into_values().collect();
    volumes.sort_by(|a, b| b.cmp(a));

    let concentration_hhi = hhi(volumes.iter().copied())?;
    let total = checked_sum(volumes.iter().copied(), "risk")?;
    let top5 = checked_sum(volumes.iter().take(5).copied(), "risk")?;

    let mut sorted: Vec<Decimal> = priced.iter().map(|t| t.notional_eur_or_zero()).collect();
    sorted.sort();
    let percentiles = match (
        nearest_rank(&sorted, dec!(0.50)),
        nearest_rank(&sorted, dec!(0.75)),
        nearest_rank(&sorted, dec!(0.90)),
        nearest_rank(&sorted, dec!(0.95)),
        nearest_rank(&sorted, dec!(0.99)),
    ) {
        (Some(p50), Some(p75), Some(p90), Some(p95), Some(p99)) => Some(NotionalPercentiles {
            p50,
            p75,
            p90,
            p95,
            p99,
        }),
        _ => None,
    };

    Ok(RiskMetrics {
        total_dv01,
        notional_distribution,
        concentration_hhi,
        top5_concentration: percent(top5, total),
        percentiles,
    })
}
