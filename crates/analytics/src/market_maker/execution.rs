//! Execution quality and price impact against the window's tenor levels
//!
//! Both are heuristics: there is no order book, so each fill is measured
//! against its tenor's mid, VWAP and dispersion-based bid/ask width, and
//! impact comes from the tenor's large vs small rate gap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::{Notional, Trade, TradeId};

use super::tenor::TenorDetail;
use crate::error::{AnalyticsError, Result};
use crate::stats::{checked_mul, mean, ratio};

const NEUTRAL_SCORE: Decimal = dec!(50);
/// Score points lost per bp of slippage or VWAP deviation
const SCORE_PENALTY: Decimal = dec!(10);
const IMPACT_REFERENCE: Notional = dec!(100_000_000);
const SECTION: &str = "market_maker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQuality {
    /// Mean |rate - mid|, in bps
    pub avg_slippage_bps: Decimal,
    /// Fills outside half the bid/ask width, percent of window trades
    pub spread_crossing_rate: Decimal,
    /// Mean bid/ask estimate of the tenors filled, in bps
    pub effective_spread_bps: Decimal,
    /// Mean |rate - VWAP|, in bps
    pub vwap_deviation_bps: Decimal,
    /// Mean of the slippage and VWAP-deviation scores, 0-100. 50 without fills.
    pub score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactBucket {
    pub label: String,
    pub count: usize,
    /// Mean tenor impact estimate over the bucket's trades, zero without one
    pub avg_impact_bps: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactTrade {
    pub trade_id: TradeId,
    pub tenor: String,
    pub notional: Notional,
    pub impact_bps: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceImpact {
    pub by_bucket: Vec<ImpactBucket>,
    /// Tenor impact scaled by size, largest first wins
    pub max_impact: Option<ImpactTrade>,
}

/// A priced trade measured against its tenor
#[derive(Debug, Clone)]
pub(crate) struct Fill {
    slippage_bps: Decimal,
    vwap_deviation_bps: Decimal,
    bid_ask_bps: Option<Decimal>,
    crossed: bool,
}

fn bps_from(rate_pct: Decimal, level_pct: Decimal) -> Result<Decimal> {
    let gap = rate_pct
        .checked_sub(level_pct)
        .ok_or(AnalyticsError::Overflow(SECTION))?;
    checked_mul(gap.abs(), dec!(100), SECTION)
}

fn detail_for<'a>(tenors: &'a [TenorDetail], trade: &Trade) -> Option<&'a TenorDetail> {
    let tenor = trade.tenor.as_deref()?;
    tenors.iter().find(|d| d.tenor == tenor)
}

pub(crate) fn fills(trades: &[&Trade], tenors: &[TenorDetail]) -> Result<Vec<Fill>> {
    let mut fills = Vec::with_capacity(trades.len());
    for trade in trades {
        let (Some(detail), Some(rate)) = (detail_for(tenors, trade), trade.fixed_rate) else {
            continue;
        };
        let rate = checked_mul(rate, dec!(100), SECTION)?;
        let slippage_bps = bps_from(rate, detail.mid)?;
        fills.push(Fill {
            slippage_bps,
            vwap_deviation_bps: bps_from(rate, detail.vwap)?,
            bid_ask_bps: detail.bid_ask_bps,
            crossed: detail
                .bid_ask_bps
                .is_some_and(|width| slippage_bps > width / dec!(2)),
        });
    }
    Ok(fills)
}

fn component_score(bps: Decimal) -> Result<Decimal> {
    let penalty = checked_mul(bps, SCORE_PENALTY, SECTION)?;
    Ok((dec!(100) - penalty).max(Decimal::ZERO))
}

/// `window_trades` is the number of trades in the window, priced or not
pub(crate) fn execution_quality(fills: &[Fill], window_trades: usize) -> Result<ExecutionQuality> {
    if fills.is_empty() {
        return Ok(ExecutionQuality {
            avg_slippage_bps: Decimal::ZERO,
            spread_crossing_rate: Decimal::ZERO,
            effective_spread_bps: Decimal::ZERO,
            vwap_deviation_bps: Decimal::ZERO,
            score: NEUTRAL_SCORE,
        });
    }

    let slippage: Vec<Decimal> = fills.iter().map(|f| f.slippage_bps).collect();
    let deviation: Vec<Decimal> = fills.iter().map(|f| f.vwap_deviation_bps).collect();
    let widths: Vec<Decimal> = fills.iter().filter_map(|f| f.bid_ask_bps).collect();

    let avg_slippage_bps = mean(&slippage, SECTION)?.unwrap_or_default();
    let vwap_deviation_bps = mean(&deviation, SECTION)?.unwrap_or_default();
    let effective_spread_bps = mean(&widths, SECTION)?.unwrap_or_default();
    let crossings = fills.iter().filter(|f| f.crossed).count();
    let spread_crossing_rate = ratio(Decimal::from(crossings), Decimal::from(window_trades)) * dec!(100);

    let score = (component_score(avg_slippage_bps)? + component_score(vwap_deviation_bps)?) / dec!(2);

    Ok(ExecutionQuality {
        avg_slippage_bps,
        spread_crossing_rate,
        effective_spread_bps,
        vwap_deviation_bps,
        score,
    })
}

const IMPACT_BUCKETS: [(&str, Decimal, Option<Decimal>); 3] = [
    ("<100M", Decimal::ZERO, Some(dec!(100_000_000))),
    ("100M-500M", dec!(100_000_000), Some(dec!(500_000_000))),
    (">500M", dec!(500_000_000), None),
];

/// Impact by size bucket over trades with a tenor and a non-zero EUR notional
pub(crate) fn price_impact(trades: &[&Trade], tenors: &[TenorDetail]) -> Result<PriceImpact> {
    let sized: Vec<(&Trade, Notional, Option<&TenorDetail>)> = trades
        .iter()
        .filter(|t| t.tenor.is_some())
        .filter_map(|t| {
            let notional = t.notional_eur.filter(|n| !n.is_zero())?;
            Some((*t, notional, detail_for(tenors, t)))
        })
        .collect();

    let mut by_bucket = Vec::with_capacity(IMPACT_BUCKETS.len());
    for (label, low, high) in IMPACT_BUCKETS {
        let members: Vec<_> = sized
            .iter()
            .filter(|(_, n, _)| *n >= low && high.is_none_or(|h| *n < h))
            .collect();
        let impacts: Vec<Decimal> = members
            .iter()
            .filter_map(|(_, _, d)| d.and_then(|d| d.price_impact_bps))
            .collect();
        by_bucket.push(ImpactBucket {
            label: label.to_string(),
            count: members.len(),
            avg_impact_bps: mean(&impacts, SECTION)?.unwrap_or_default(),
        });
    }

    let mut max_impact: Option<ImpactTrade> = None;
    for (trade, notional, detail) in &sized {
        let Some((tenor, impact)) = detail.and_then(|d| Some((&d.tenor, d.price_impact_bps?))) else {
            continue;
        };
        let scaled = checked_mul(impact, *notional / IMPACT_REFERENCE, SECTION)?;
        let current = max_impact.as_ref().map_or(Decimal::ZERO, |m| m.impact_bps);
        if scaled > current {
            max_impact = Some(ImpactTrade {
                trade_id: trade.id.clone(),
                tenor: tenor.clone(),
                notional: *notional,
                impact_bps: scaled,
            });
        }
    }

    Ok(PriceImpact {
        by_bucket,
        max_impact,
    })
}
