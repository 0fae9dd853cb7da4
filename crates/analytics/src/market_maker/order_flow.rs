//! Order-flow imbalance inferred from rate direction

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::Notional;
use swapflow_core::tenor::tenor_rank;

use super::tenor::TenorDetail;

/// Side pressing a tenor, from the sign of its rate trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPressure {
    /// Rates falling: receivers lifting the tenor
    BuyPressure,
    /// Rates rising: payers hitting the tenor
    SellPressure,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetDirection {
    Buying,
    Selling,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenorFlow {
    pub tenor: String,
    pub pressure: FlowPressure,
    pub volume: Notional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFlow {
    pub by_tenor: Vec<TenorFlow>,
    pub buy_volume: Notional,
    pub sell_volume: Notional,
    /// buy - sell
    pub imbalance: Notional,
    /// buy / (buy + sell), 0.5 without directional volume
    pub buy_ratio: Decimal,
    pub net_direction: NetDirection,
    /// |buy - sell| relative to directional volume, 0-100
    pub intensity: Decimal,
    /// Tenor with the most volume, canonical order breaking ties
    pub dominant_tenor: Option<String>,
    pub new_trades_count: usize,
    pub large_block_count: usize,
}

/// One side must exceed the other by this factor to set a net direction
const DIRECTION_RATIO: Decimal = dec!(1.2);

pub fn pressure(rate_trend: Decimal, neutral_band: Decimal) -> FlowPressure {
    if rate_trend < -neutral_band {
        FlowPressure::BuyPressure
    } else if rate_trend > neutral_band {
        FlowPressure::SellPressure
    } else {
        FlowPressure::Balanced
    }
}

pub fn order_flow(
    tenors: &[TenorDetail],
    neutral_band: Decimal,
    new_trades_count: usize,
    large_block_count: usize,
) -> OrderFlow {
    let by_tenor: Vec<TenorFlow> = tenors
        .iter()
        .map(|t| TenorFlow {
            tenor: t.tenor.clone(),
            pressure: pressure(t.rate_trend, neutral_band),
            volume: t.volume,
        })
        .collect();

    let side_volume = |side: FlowPressure| -> Notional {
        by_tenor
            .iter()
            .filter(|f| f.pressure == side)
            .map(|f| f.volume)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    };
    let buy_volume = side_volume(FlowPressure::BuyPressure);
    let sell_volume = side_volume(FlowPressure::SellPressure);
    let directional = buy_volume.saturating_add(sell_volume);

    let buy_ratio = if directional.is_zero() {
        dec!(0.5)
    } else {
        buy_volume / directional
    };

    let net_direction = if buy_volume > sell_volume * DIRECTION_RATIO {
        NetDirection::Buying
    } else if sell_volume > buy_volume * DIRECTION_RATIO {
        NetDirection::Selling
    } else {
        NetDirection::Neutral
    };

    let imbalance = buy_volume - sell_volume;
    let intensity = (imbalance.abs() / directional.max(Decimal::ONE) * dec!(100)).min(dec!(100));

    let dominant_tenor = tenors
        .iter()
        .max_by(|a, b| {
            a.volume.cmp(&b.volume).then_with(|| {
                // Earlier canonical tenor wins a tie
                let rank = |t: &TenorDetail| tenor_rank(&t.tenor).unwrap_or(usize::MAX);
                rank(b).cmp(&rank(a))
            })
        })
        .map(|t| t.tenor.clone());

    OrderFlow {
        by_tenor,
        buy_volume,
        sell_volume,
        imbalance,
        buy_ratio,
        net_direction,
        intensity,
        dominant_tenor,
        new_trades_count,
        large_block_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(tenor: &str, trend: Decimal, volume: Decimal) -> TenorDetail {
        TenorDetail {
            tenor: tenor.to_string(),
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            mid: Decimal::ZERO,
            vwap: Decimal::ZERO,
            last: Decimal::ZERO,
            rate_trend: trend,
            volume,
            count: 1,
            avg_size: volume,
            volatility: Decimal::ZERO,
            bid_ask_bps: None,
            price_impact_bps: None,
        }
    }

    #[test]
    fn test_neutral_band() {
        let band = dec!(0.0001);
        assert_eq!(pressure(dec!(-0.0002), band), FlowPressure::BuyPressure);
        assert_eq!(pressure(dec!(-0.0001), band), FlowPressure::Balanced);
        assert_eq!(pressure(dec!(0.0001), band), FlowPressure::Balanced);
        assert_eq!(pressure(dec!(0.0002), band), FlowPressure::SellPressure);
    }

    #[test]
    fn test_buying_flow() {
        // 2Y rallying on more volume than the 10Y sells off
        let tenors = vec![
            detail("2Y", dec!(-0.0005), dec!(300)),
            detail("10Y", dec!(0.0005), dec!(100)),
            detail("30Y", Decimal::ZERO, dec!(900)),
        ];

        let flow = order_flow(&tenors, dec!(0.0001), 3, 0);
        assert_eq!(flow.buy_volume, dec!(300));
        assert_eq!(flow.sell_volume, dec!(100));
        assert_eq!(flow.imbalance, dec!(200));
        assert_eq!(flow.buy_ratio, dec!(0.75));
        assert_eq!(flow.net_direction, NetDirection::Buying);
        assert_eq!(flow.intensity, dec!(50));
        assert_eq!(flow.dominant_tenor.as_deref(), Some("30Y"));
        assert_eq!(flow.by_tenor[0].pressure, FlowPressure::BuyPressure);
        assert_eq!(flow.by_tenor[1].pressure, FlowPressure::SellPressure);
    }

    #[test]
    fn test_within_ratio_is_neutral() {
        let tenors = vec![
            detail("2Y", dec!(-0.0005), dec!(110)),
            detail("10Y", dec!(0.0005), dec!(100)),
        ];
        assert_eq!(
            order_flow(&tenors, dec!(0.0001), 0, 0).net_direction,
            NetDirection::Neutral
        );
    }

    #[test]
    fn test_no_directional_volume() {
        let flow = order_flow(&[], dec!(0.0001), 0, 0);
        assert_eq!(flow.buy_ratio, dec!(0.5));
        assert_eq!(flow.intensity, Decimal::ZERO);
        assert_eq!(flow.net_direction, NetDirection::Neutral);
        assert_eq!(flow.dominant_tenor, None);
    }

    #[test]
    fn test_dominant_tenor_tie_prefers_shorter() {
        let tenors = vec![
            detail("10Y", Decimal::ZERO, dec!(100)),
            detail("2Y", Decimal::ZERO, dec!(100)),
        ];
        let flow = order_flow(&tenors, dec!(0.0001), 0, 0);
        assert_eq!(flow.dominant_tenor.as_deref(), Some("2Y"));
    }
}
