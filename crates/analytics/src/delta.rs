//! Change between a short and a long market-maker window

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::tenor::sort_tenors;

use crate::error::{AnalyticsError, Result};
use crate::market_maker::MarketMakerMetrics;
use crate::stats::percent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenorDelta {
    pub tenor: String,
    /// Short-window mid minus long-window mid in bps, when both windows traded the tenor
    pub mid_change_bps: Option<Decimal>,
    /// Short-window volume relative to the long window, in percent
    pub volume_change_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMakerDelta {
    pub from_window: u32,
    pub to_window: u32,
    pub tenors: Vec<TenorDelta>,
    /// Spread change in bps, for spreads present in both windows
    pub spread_changes_bps: BTreeMap<String, Decimal>,
    pub direction_changed: bool,
    pub intensity_change: Decimal,
}

/// Compare the `short` window against the `long` one
pub fn market_maker_delta(
    short: &MarketMakerMetrics,
    long: &MarketMakerMetrics,
) -> Result<MarketMakerDelta> {
    if short.window_minutes == long.window_minutes {
        return Err(AnalyticsError::InsufficientData("delta"));
    }

    let all_tenors = sort_tenors(
        short
            .tenors
            .iter()
            .chain(long.tenors.iter())
            .map(|t| t.tenor.as_str()),
    );

    let tenors = all_tenors
        .into_iter()
        .map(|tenor| {
            let s = short.tenors.iter().find(|t| t.tenor == tenor);
            let l = long.tenors.iter().find(|t| t.tenor == tenor);
            let mid_change_bps = match (s, l) {
                (Some(s), Some(l)) => Some((s.mid - l.mid) * dec!(100)),
                _ => None,
            };
            let short_volume = s.map(|t| t.volume).unwrap_or_default();
            let long_volume = l.map(|t| t.volume).unwrap_or_default();
            TenorDelta {
                tenor,
                mid_change_bps,
                volume_change_pct: percent(short_volume - long_volume, long_volume),
            }
        })
        .collect();

    let spread_changes_bps = short
        .spreads
        .iter()
        .filter_map(|(name, s)| {
            long.spreads
                .get(name)
                .map(|l| (name.clone(), s.current_bps - l.current_bps))
        })
        .collect();

    Ok(MarketMakerDelta {
        from_window: long.window_minutes,
        to_window: short.window_minutes,
        tenors,
        spread_changes_bps,
        direction_changed: short.order_flow.net_direction != long.order_flow.net_direction,
        intensity_change: short.order_flow.intensity - long.order_flow.intensity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::market_maker::market_maker_metrics;
    use chrono::{Duration, TimeZone, Utc};
    use swapflow_core::{Timestamp, Trade, TradeAction};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
    }

    fn swap(id: &str, minutes_ago: i64, tenor: &str, rate: Decimal) -> Trade {
        Trade::new(id, TradeAction::New, now() - Duration::minutes(minutes_ago), "IRS")
            .with_leg1(dec!(100), "EUR")
            .with_notional_eur(dec!(100))
            .with_tenor(tenor)
            .with_fixed_rate(rate)
    }

    #[test]
    fn test_delta_between_windows() {
        let trades = vec![
            swap("A", 50, "10Y", dec!(0.0300)),
            swap("B", 5, "10Y", dec!(0.0310)),
            swap("C", 40, "2Y", dec!(0.0250)),
        ];
        let config = AnalyticsConfig::default();
        let short = market_maker_metrics(&trades, now(), 10, dec!(50), &config).unwrap();
        let long = market_maker_metrics(&trades, now(), 60, dec!(50), &config).unwrap();

        let delta = market_maker_delta(&short, &long).unwrap();
        assert_eq!((delta.from_window, delta.to_window), (60, 10));

        let two = &delta.tenors[0];
        assert_eq!(two.tenor, "2Y");
        assert_eq!(two.mid_change_bps, None);
        assert_eq!(two.volume_change_pct, dec!(-100));

        let ten = &delta.tenors[1];
        // short mid 3.10% vs long mid 3.05%
        assert_eq!(ten.mid_change_bps, Some(dec!(5)));
        assert_eq!(ten.volume_change_pct, dec!(-50));

        // the 2Y-10Y spread only exists in the long window
        assert!(delta.spread_changes_bps.is_empty());
        assert!(delta.direction_changed);
    }

    #[test]
    fn test_same_window_is_rejected() {
        let config = AnalyticsConfig::default();
        let mm = market_maker_metrics(&[], now(), 10, dec!(50), &config).unwrap();
        assert_eq!(
            market_maker_delta(&mm, &mm),
            Err(AnalyticsError::InsufficientData("delta"))
        );
    }
}
