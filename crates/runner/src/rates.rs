//! Currency to EUR rate table

use std::sync::Arc;

use dashmap::DashMap;
use log::warn;
use rust_decimal::Decimal;
use swapflow_ports::RateLookup;

const EUR: &str = "EUR";

/// Concurrent currency -> EUR multipliers
///
/// EUR is always 1. Rates can be replaced while the pipeline reads them.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Arc<DashMap<String, Decimal>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from quotes of the form "1 EUR = q units of currency"
    ///
    /// Zero or negative quotes are skipped.
    pub fn from_eur_quotes<I, S>(quotes: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let table = Self::new();
        for (currency, quote) in quotes {
            table.set_eur_quote(currency, quote);
        }
        table
    }

    /// Set the multiplier converting one unit of `currency` into EUR
    pub fn set_rate(&self, currency: impl Into<String>, rate: Decimal) {
        let currency = currency.into();
        if currency == EUR {
            return;
        }
        self.rates.insert(currency, rate);
    }

    /// Set from an EUR-based quote by inversion
    pub fn set_eur_quote(&self, currency: impl Into<String>, quote: Decimal) {
        let currency = currency.into();
        if quote <= Decimal::ZERO {
            warn!("Ignoring non-positive EUR quote {} for {}", quote, currency);
            return;
        }
        self.set_rate(currency, Decimal::ONE / quote);
    }

    pub fn remove(&self, currency: &str) {
        self.rates.remove(currency);
    }

    /// Number of non-EUR currencies with a rate
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateLookup for RateTable {
    fn rate_to_eur(&self, currency: &str) -> Option<Decimal> {
        if currency == EUR {
            return Some(Decimal::ONE);
        }
        self.rates.get(currency).map(|r| *r)
    }
}
