//! Named curve spreads and curve shape

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::tenor::TenorDetail;

/// (short tenor, long tenor) pairs reported when both sides traded
pub const SPREAD_PAIRS: [(&str, &str); 5] = [
    ("2Y", "5Y"),
    ("5Y", "10Y"),
    ("10Y", "30Y"),
    ("2Y", "10Y"),
    ("2Y", "30Y"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadDetail {
    /// Long mid minus short mid, in bps
    pub current_bps: Decimal,
    /// Heuristic band of +/-10% around the current level
    pub high_bps: Decimal,
    pub low_bps: Decimal,
}

impl SpreadDetail {
    fn new(current_bps: Decimal) -> Self {
        let a = current_bps * dec!(1.1);
        let b = current_bps * dec!(0.9);
        Self {
            current_bps,
            high_bps: a.max(b),
            low_bps: a.min(b),
        }
    }
}

/// Heuristic forward-curve tag from the 2Y-10Y spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurveShape {
    Inverted,
    Flat,
    Normal,
    Steep,
}

impl CurveShape {
    pub fn from_spread(spread_bps: Option<Decimal>) -> Self {
        match spread_bps {
            None => CurveShape::Normal,
            Some(s) if s < dec!(-5) => CurveShape::Inverted,
            Some(s) if s <= dec!(5) => CurveShape::Flat,
            Some(s) if s > dec!(100) => CurveShape::Steep,
            Some(_) => CurveShape::Normal,
        }
    }
}

/// Spreads between tenor mids, keyed "SHORT-LONG"
pub fn spread_details(tenors: &[TenorDetail]) -> BTreeMap<String, SpreadDetail> {
    let mid = |tenor: &str| tenors.iter().find(|t| t.tenor == tenor).map(|t| t.mid);

    SPREAD_PAIRS
        .iter()
        .filter_map(|(short, long)| {
            let (s, l) = (mid(*short)?, mid(*long)?);
            Some((format!("{short}-{long}"), SpreadDetail::new((l - s) * dec!(100))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(tenor: &str, mid: Decimal) -> TenorDetail {
        TenorDetail {
            tenor: tenor.to_string(),
            high: mid,
            low: mid,
            mid,
            vwap: mid,
            last: mid,
            rate_trend: Decimal::ZERO,
            volume: Decimal::ZERO,
            count: 1,
            avg_size: Decimal::ZERO,
            volatility: Decimal::ZERO,
            bid_ask_bps: None,
            price_impact_bps: None,
        }
    }

    #[test]
    fn test_spreads_need_both_tenors() {
        let tenors = vec![detail("2Y", dec!(2.50)), detail("10Y", dec!(3.10))];
        let spreads = spread_details(&tenors);

        assert_eq!(spreads.len(), 1);
        let s = &spreads["2Y-10Y"];
        assert_eq!(s.current_bps, dec!(60));
        assert_eq!(s.high_bps, dec!(66));
        assert_eq!(s.low_bps, dec!(54));
    }

    #[test]
    fn test_negative_spread_band() {
        let tenors = vec![detail("2Y", dec!(3.00)), detail("10Y", dec!(2.80))];
        let s = &spread_details(&tenors)["2Y-10Y"];
        assert_eq!(s.current_bps, dec!(-20));
        assert_eq!(s.high_bps, dec!(-18));
        assert_eq!(s.low_bps, dec!(-22));
    }

    #[test]
    fn test_curve_shape() {
        assert_eq!(CurveShape::from_spread(None), CurveShape::Normal);
        assert_eq!(CurveShape::from_spread(Some(dec!(-20))), CurveShape::Inverted);
        assert_eq!(CurveShape::from_spread(Some(dec!(-5))), CurveShape::Flat);
        assert_eq!(CurveShape::from_spread(Some(dec!(5))), CurveShape::Flat);
        assert_eq!(CurveShape::from_spread(Some(dec!(60))), CurveShape::Normal);
        assert_eq!(CurveShape::from_spread(Some(dec!(100))), CurveShape::Normal);
        assert_eq!(CurveShape::from_spread(Some(dec!(120))), CurveShape::Steep);
    }
}
