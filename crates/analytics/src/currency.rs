//! Currency breakdown and currency x tenor heatmap

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use swapflow_core::tenor::compare_tenors;
use swapflow_core::{Notional, Trade};

use crate::error::Result;
use crate::stats::{checked_sum, percent};

const UNKNOWN_CURRENCY: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyBreakdown {
    pub currency: String,
    pub notional: Notional,
    pub count: usize,
    /// Share of total EUR notional, 0-100
    pub percentage: Notional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub currency: String,
    pub tenor: String,
    pub notional: Notional,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyMetrics {
    /// Currencies by EUR notional, largest first
    pub breakdown: Vec<CurrencyBreakdown>,
    /// Cells ordered by currency, then canonical tenor
    pub heatmap: Vec<HeatmapCell>,
}

/// Bucketed by leg-1 currency
pub fn currency_metrics(trades: &[Trade]) -> Result<CurrencyMetrics> {
    let mut currencies: HashMap<&str, Vec<Notional>> = HashMap::new();
    let mut cells: HashMap<(&str, &str), Vec<Notional>> = HashMap::new();

    for trade in trades {
        let currency = match trade.notional_leg1_currency.as_str() {
            "" => UNKNOWN_CURRENCY,
            c => c,
        };
        currencies
            .entry(currency)
            .or_default()
            .push(trade.notional_eur_or_zero());
        if let Some(tenor) = trade.tenor.as_deref() {
            cells
                .entry((currency, tenor))
                .or_default()
                .push(trade.notional_eur_or_zero());
        }
    }

    let total = checked_sum(trades.iter().map(Trade::notional_eur_or_zero), "currency")?;

    let mut breakdown = Vec::with_capacity(currencies.len());
    for (currency, notionals) in currencies {
        let notional = checked_sum(notionals.iter().copied(), "currency")?;
        breakdown.push(CurrencyBreakdown {
            currency: currency.to_string(),
            notional,
            count: notionals.len(),
            percentage: percent(notional, total),
        });
    }
    breakdown.sort_by(|a, b| {
        b.notional
            .cmp(&a.notional)
            .then_with(|| a.currency.cmp(&b.currency))
    });

    let mut heatmap = Vec::with_capacity(cells.len());
    for ((currency, tenor), notionals) in cells {
        heatmap.push(HeatmapCell {
            currency: currency.to_string(),
            tenor: tenor.to_string(),
            notional: checked_sum(notionals.iter().copied(), "currency")?,
            count: notionals.len(),
        });
    }
    heatmap.sort_by(|a, b| {
        a.currency
            .cmp(&b.currency)
            .then_with(|| compare_tenors(&a.tenor, &b.tenor))
    });

    Ok(CurrencyMetrics { breakdown, heatmap })
}
