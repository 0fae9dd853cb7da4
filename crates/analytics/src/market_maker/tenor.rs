//! Per-tenor price statistics

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::{Notional, Rate, Trade};

use crate::error::{AnalyticsError, Result};
use crate::stats::{checked_mul, checked_sum, mean, ratio, sample_std_dev};

/// sqrt(252), trading days per year
const SQRT_TRADING_DAYS: Decimal = dec!(15.874507866387544);
const SMALL_TRADE: Notional = dec!(100_000_000);
const LARGE_TRADE: Notional = dec!(500_000_000);
/// Scales the large vs small gap from a 500M trade down to 100M
const IMPACT_SCALE: Decimal = dec!(0.2);
const SECTION: &str = "market_maker";

/// Price statistics for one tenor within a window. Rates are in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenorDetail {
    pub tenor: String,
    pub high: Rate,
    pub low: Rate,
    /// (high + low) / 2
    pub mid: Rate,
    /// Notional-weighted rate, simple mean when no notional is known
    pub vwap: Rate,
    /// Rate of the latest execution
    pub last: Rate,
    /// First-to-last change of the raw fixed rate in execution order
    pub rate_trend: Rate,
    pub volume: Notional,
    pub count: usize,
    pub avg_size: Notional,
    /// Annualized standard deviation of the rate, in percent
    pub volatility: Decimal,
    /// Heuristic bid/ask width from rate dispersion, in bps. Needs two rates.
    pub bid_ask_bps: Option<Decimal>,
    /// Heuristic impact of a 100M trade, in bps
    ///
    /// Gap between the mean rate of >=500M trades and of <100M trades,
    /// scaled down by 500M/100M. Needs both buckets populated.
    pub price_impact_bps: Option<Decimal>,
}

fn to_percent(rate: Rate) -> Result<Rate> {
    checked_mul(rate, dec!(100), SECTION)
}

fn price_impact(priced: &[(&Trade, Rate)]) -> Result<Option<Decimal>> {
    if priced.len() < 2 {
        return Ok(None);
    }
    let bucket = |keep: fn(Notional) -> bool| -> Vec<Rate> {
        priced
            .iter()
            .filter(|(t, _)| keep(t.notional_eur_or_zero()))
            .map(|(_, r)| *r)
            .collect()
    };
    let small = bucket(|n| n < SMALL_TRADE);
    let large = bucket(|n| n >= LARGE_TRADE);

    let (Some(large), Some(small)) = (mean(&large, SECTION)?, mean(&small, SECTION)?) else {
        return Ok(None);
    };
    let gap = large.checked_sub(small).ok_or(AnalyticsError::Overflow(SECTION))?;
    let bps = checked_mul(gap.abs(), dec!(10000), SECTION)?;
    Ok(Some(checked_mul(bps, IMPACT_SCALE, SECTION)?))
}

/// Statistics over `trades`, all of one tenor and carrying a fixed rate
///
/// `trades` must be in execution order. `None` when no trade has a rate.
pub fn tenor_detail(tenor: &str, trades: &[&Trade]) -> Result<Option<TenorDetail>> {
    let priced: Vec<(&Trade, Rate)> = trades
        .iter()
        .filter_map(|t| t.fixed_rate.map(|r| (*t, r)))
        .collect();
    let (Some((_, first)), Some((_, last))) = (priced.first(), priced.last()) else {
        return Ok(None);
    };

    let raw: Vec<Rate> = priced.iter().map(|(_, r)| *r).collect();
    let percent = raw
        .iter()
        .map(|r| to_percent(*r))
        .collect::<Result<Vec<Rate>>>()?;

    let high = percent.iter().copied().max().unwrap_or_default();
    let low = percent.iter().copied().min().unwrap_or_default();
    let mid = checked_sum([high, low], SECTION)? / dec!(2);

    let volume = checked_sum(priced.iter().map(|(t, _)| t.notional_eur_or_zero()), SECTION)?;
    let weighted = priced
        .iter()
        .map(|(t, r)| checked_mul(t.notional_eur_or_zero(), to_percent(*r)?, SECTION))
        .collect::<Result<Vec<_>>>()?;
    let vwap = if volume.is_zero() {
        mean(&percent, SECTION)?.unwrap_or_default()
    } else {
        checked_sum(weighted, SECTION)? / volume
    };

    let std_dev = sample_std_dev(&raw, SECTION)?;
    let volatility = match std_dev {
        Some(sd) => to_percent(checked_mul(sd, SQRT_TRADING_DAYS, SECTION)?)?,
        None => Decimal::ZERO,
    };
    let bid_ask_bps = std_dev
        .map(|sd| checked_mul(sd, dec!(10000), SECTION))
        .transpose()?;

    Ok(Some(TenorDetail {
        tenor: tenor.to_string(),
        high,
        low,
        mid,
        vwap,
        last: to_percent(*last)?,
        rate_trend: last.checked_sub(*first).ok_or(AnalyticsError::Overflow(SECTION))?,
        volume,
        count: priced.len(),
        avg_size: ratio(volume, Decimal::from(priced.len())),
        volatility,
        bid_ask_bps,
        price_impact_bps: price_impact(&priced)?,
    }))
}
