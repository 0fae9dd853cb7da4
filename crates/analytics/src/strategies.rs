//! Strategy mix

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapflow_core::tenor::compare_tenors;
use swapflow_core::{Notional, Strategy, StrategyKind};

use crate::error::Result;
use crate::stats::{checked_sum, ratio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenorCount {
    pub tenor: String,
    pub count: usize,
}

/// Activity per instrument label, e.g. "2Y/10Y"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentStats {
    pub instrument: String,
    pub count: usize,
    pub total_notional: Notional,
    pub avg_notional: Notional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetrics {
    /// Mean EUR notional per structure ("Spread", "Butterfly", ...)
    pub average_notional_by_structure: BTreeMap<String, Notional>,
    /// Leg tenor usage per structure, canonical tenor order
    pub tenor_preference: BTreeMap<String, Vec<TenorCount>>,
    pub package_count: usize,
    pub custom_count: usize,
    /// Instruments by strategy count, most active first
    pub instruments: Vec<InstrumentStats>,
}

pub fn strategy_metrics(strategies: &[Strategy]) -> Result<StrategyMetrics> {
    let mut notionals: BTreeMap<&str, Vec<Notional>> = BTreeMap::new();
    let mut tenors: BTreeMap<&str, HashMap<&str, usize>> = BTreeMap::new();
    let mut instruments: HashMap<&str, Vec<Notional>> = HashMap::new();
    let mut package_count = 0;
    let mut custom_count = 0;

    for strategy in strategies {
        let structure = strategy.structure.as_str();
        notionals
            .entry(structure)
            .or_default()
            .push(strategy.total_notional_eur);

        let usage = tenors.entry(structure).or_default();
        for tenor in &strategy.tenors {
            *usage.entry(tenor.as_str()).or_insert(0) += 1;
        }

        match strategy.kind {
            StrategyKind::Package => package_count += 1,
            StrategyKind::Custom => custom_count += 1,
        }

        if let Some(instrument) = strategy.instrument_label.as_deref() {
            instruments
                .entry(instrument)
                .or_default()
                .push(strategy.total_notional_eur);
        }
    }

    let mut average_notional_by_structure = BTreeMap::new();
    for (structure, values) in &notionals {
        let total = checked_sum(values.iter().copied(), "strategies")?;
        average_notional_by_structure.insert(
            structure.to_string(),
            ratio(total, Decimal::from(values.len())),
        );
    }

    let tenor_preference = tenors
        .into_iter()
        .map(|(structure, usage)| {
            let mut counts: Vec<TenorCount> = usage
                .into_iter()
                .map(|(tenor, count)| TenorCount {
                    tenor: tenor.to_string(),
                    count,
                })
                .collect();
            counts.sort_by(|a, b| compare_tenors(&a.tenor, &b.tenor));
            (structure.to_string(), counts)
        })
        .collect();

    let mut instrument_stats = Vec::with_capacity(instruments.len());
    for (instrument, values) in instruments {
        let total_notional = checked_sum(values.iter().copied(), "strategies")?;
        instrument_stats.push(InstrumentStats {
            instrument: instrument.to_string(),
            count: values.len(),
            total_notional,
            avg_notional: ratio(total_notional, Decimal::from(values.len())),
        });
    }
    instrument_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.instrument.cmp(&b.instrument))
    });

    Ok(StrategyMetrics {
        average_notional_by_structure,
        tenor_preference,
        package_count,
        custom_count,
        instruments: instrument_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use swapflow_core::StrategyStructure;

    fn strategy(id: &str, kind: StrategyKind, tenors: &[&str], notional: Decimal) -> Strategy {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let mut s = Strategy::new(id, kind, "EUR-EURIBOR-6M", at);
        s.tenors = tenors.iter().map(|t| t.to_string()).collect();
        s.leg_ids = (0..tenors.len()).map(|i| format!("{id}-{i}")).collect();
        s.structure = StrategyStructure::from_leg_count(tenors.len());
        s.instrument_label = Some(s.tenors.join("/"));
        s.total_notional_eur = notional;
        s
    }

    #[test]
    fn test_strategy_mix() {
        let strategies = vec![
            strategy("S1", StrategyKind::Custom, &["10Y", "2Y"], dec!(100)),
            strategy("S2", StrategyKind::Package, &["10Y", "2Y"], dec!(300)),
            strategy("S3", StrategyKind::Custom, &["2Y", "5Y", "10Y"], dec!(600)),
        ];

        let metrics = strategy_metrics(&strategies).unwrap();
        assert_eq!(metrics.average_notional_by_structure["Spread"], dec!(200));
        assert_eq!(metrics.average_notional_by_structure["Butterfly"], dec!(600));
        assert_eq!((metrics.package_count, metrics.custom_count), (1, 2));

        let spread_tenors: Vec<_> = metrics.tenor_preference["Spread"]
            .iter()
            .map(|t| (t.tenor.as_str(), t.count))
            .collect();
        assert_eq!(spread_tenors, vec![("2Y", 2), ("10Y", 2)]);

        let top = &metrics.instruments[0];
        assert_eq!(top.instrument, "10Y/2Y");
        assert_eq!(top.count, 2);
        assert_eq!(top.avg_notional, dec!(200));
    }

    #[test]
    fn test_no_strategies() {
        let metrics = strategy_metrics(&[]).unwrap();
        assert!(metrics.average_notional_by_structure.is_empty());
        assert!(metrics.instruments.is_empty());
    }
}
