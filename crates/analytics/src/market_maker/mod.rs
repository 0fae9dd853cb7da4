//! Market-maker view of one time window
//!
//! Trades are selected by window (lower bound inclusive), preferring trades
//! whose first leg is in the configured currency and falling back to every
//! trade in the window when none match.

mod alerts;
mod execution;
mod order_flow;
mod spreads;
mod tenor;

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapflow_core::tenor::compare_tenors;
use swapflow_core::{Timestamp, Trade};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::stats::mean;

pub use alerts::{MicroAlert, MicroAlertKind};
pub use execution::{ExecutionQuality, ImpactBucket, ImpactTrade, PriceImpact};
pub use order_flow::{FlowPressure, NetDirection, OrderFlow, TenorFlow};
pub use spreads::{CurveShape, SPREAD_PAIRS, SpreadDetail};
pub use tenor::TenorDetail;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityMetrics {
    /// Mean annualized volatility across tenors, in percent
    pub realized: Decimal,
    pub by_tenor: BTreeMap<String, Decimal>,
    /// Percentile of the latest mean-rate move in the rate history
    pub percentile: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMakerMetrics {
    pub window_minutes: u32,
    pub trade_count: usize,
    /// Tenors in canonical order
    pub tenors: Vec<TenorDetail>,
    pub spreads: BTreeMap<String, SpreadDetail>,
    pub order_flow: OrderFlow,
    pub volatility: VolatilityMetrics,
    pub execution: ExecutionQuality,
    pub price_impact: PriceImpact,
    pub curve_shape: CurveShape,
    pub alerts: Vec<MicroAlert>,
}

/// Trades executed at or after `now - window`, in execution order
pub fn window_trades<'a>(
    trades: &'a [Trade],
    now: Timestamp,
    window: Duration,
    preferred_currency: Option<&str>,
) -> Vec<&'a Trade> {
    let cutoff = now - window;
    let mut inside: Vec<&Trade> = trades.iter().filter(|t| t.executed_at >= cutoff).collect();
    inside.sort_by_key(|t| t.executed_at);

    if let Some(currency) = preferred_currency {
        let preferred: Vec<&Trade> = inside
            .iter()
            .copied()
            .filter(|t| t.notional_leg1_currency == currency)
            .collect();
        if !preferred.is_empty() {
            return preferred;
        }
    }
    inside
}

pub fn market_maker_metrics(
    trades: &[Trade],
    now: Timestamp,
    window_minutes: u32,
    volatility_percentile: Decimal,
    config: &AnalyticsConfig,
) -> Result<MarketMakerMetrics> {
    let window = window_trades(
        trades,
        now,
        Duration::minutes(i64::from(window_minutes)),
        config.preferred_currency.as_deref(),
    );

    let mut by_tenor: HashMap<&str, Vec<&Trade>> = HashMap::new();
    for trade in &window {
        if let Some(tenor) = trade.tenor.as_deref() {
            by_tenor.entry(tenor).or_default().push(*trade);
        }
    }

    let mut tenors = Vec::with_capacity(by_tenor.len());
    for (tenor, legs) in &by_tenor {
        if let Some(detail) = tenor::tenor_detail(tenor, legs)? {
            tenors.push(detail);
        }
    }
    tenors.sort_by(|a, b| compare_tenors(&a.tenor, &b.tenor));

    let spreads = spreads::spread_details(&tenors);
    let curve_shape = CurveShape::from_spread(spreads.get("2Y-10Y").map(|s| s.current_bps));

    let new_trades_count = window.iter().filter(|t| t.is_new()).count();
    let large_block_count = window
        .iter()
        .filter(|t| t.notional_eur_or_zero() > config.large_block_threshold)
        .count();
    let order_flow = order_flow::order_flow(
        &tenors,
        config.neutral_band,
        new_trades_count,
        large_block_count,
    );

    let by_tenor_vol: BTreeMap<String, Decimal> = tenors
        .iter()
        .map(|t| (t.tenor.clone(), t.volatility))
        .collect();
    let vols: Vec<Decimal> = by_tenor_vol.values().copied().collect();
    let volatility = VolatilityMetrics {
        realized: mean(&vols, "market_maker")?.unwrap_or_default(),
        by_tenor: by_tenor_vol,
        percentile: volatility_percentile,
    };

    let fills = execution::fills(&window, &tenors)?;
    let execution = execution::execution_quality(&fills, window.len())?;
    let price_impact = execution::price_impact(&window, &tenors)?;

    let alerts = alerts::micro_alerts(&window, &spreads, volatility_percentile, config, now);

    Ok(MarketMakerMetrics {
        window_minutes,
        trade_count: window.len(),
        tenors,
        spreads,
        order_flow,
        volatility,
        execution,
        price_impact,
        curve_shape,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use swapflow_core::TradeAction;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
    }

    fn swap(id: &str, minutes_ago: i64, currency: &str, tenor: &str, rate: Decimal) -> Trade {
        Trade::new(id, TradeAction::New, now() - Duration::minutes(minutes_ago), "IRS")
            .with_leg1(dec!(100_000_000), currency)
            .with_notional_eur(dec!(100_000_000))
            .with_tenor(tenor)
            .with_fixed_rate(rate)
    }

    #[test]
    fn test_window_prefers_currency() {
        let trades = vec![
            swap("EUR1", 1, "EUR", "5Y", dec!(0.025)),
            swap("USD1", 2, "USD", "5Y", dec!(0.04)),
            swap("EUR_EDGE", 10, "EUR", "5Y", dec!(0.025)),
            swap("EUR_OLD", 11, "EUR", "5Y", dec!(0.025)),
        ];

        let ids: Vec<_> = window_trades(&trades, now(), Duration::minutes(10), Some("EUR"))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["EUR_EDGE", "EUR1"]);

        let fallback = window_trades(&trades, now(), Duration::minutes(10), Some("GBP"));
        assert_eq!(fallback.len(), 3);
    }

    #[test]
    fn test_window_metrics() {
        let trades = vec![
            swap("A", 9, "EUR", "2Y", dec!(0.0250)),
            swap("B", 8, "EUR", "10Y", dec!(0.0310)),
            swap("C", 2, "EUR", "10Y", dec!(0.0300)),
            swap("D", 30, "EUR", "30Y", dec!(0.0330)),
        ];

        let mm = market_maker_metrics(&trades, now(), 10, dec!(50), &AnalyticsConfig::default())
            .unwrap();

        assert_eq!(mm.window_minutes, 10);
        assert_eq!(mm.trade_count, 3);
        let tenors: Vec<_> = mm.tenors.iter().map(|t| t.tenor.as_str()).collect();
        assert_eq!(tenors, vec!["2Y", "10Y"]);

        // 10Y mid 3.05% vs 2Y 2.50%
        assert_eq!(mm.spreads["2Y-10Y"].current_bps, dec!(55));
        assert_eq!(mm.curve_shape, CurveShape::Normal);

        // 10Y fell from 3.10% to 3.00%
        let ten_year = mm.order_flow.by_tenor.iter().find(|f| f.tenor == "10Y").unwrap();
        assert_eq!(ten_year.pressure, FlowPressure::BuyPressure);
        assert_eq!(mm.order_flow.net_direction, NetDirection::Buying);
        assert_eq!(mm.order_flow.new_trades_count, 3);
        assert_eq!(mm.order_flow.dominant_tenor.as_deref(), Some("10Y"));

        assert!(mm.volatility.by_tenor.contains_key("10Y"));
        assert_eq!(mm.volatility.percentile, dec!(50));
        assert!(mm.alerts.is_empty());
    }

    #[test]
    fn test_empty_window() {
        let mm = market_maker_metrics(&[], now(), 60, dec!(50), &AnalyticsConfig::default()).unwrap();
        assert_eq!(mm.trade_count, 0);
        assert!(mm.tenors.is_empty());
        assert!(mm.spreads.is_empty());
        assert_eq!(mm.curve_shape, CurveShape::Normal);
        assert_eq!(mm.execution.score, dec!(50));
        assert_eq!(mm.volatility.realized, Decimal::ZERO);
    }
}
