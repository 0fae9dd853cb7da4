use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swapflow_core::Notional;

/// Typical level of a named spread, used by the abnormal-spread check
#[derive(Debug, Clone)]
pub struct ReferenceSpread {
    pub short_tenor: String,
    pub long_tenor: String,
    /// Typical spread in bps
    pub typical_bps: Decimal,
}

impl ReferenceSpread {
    pub fn new(short_tenor: &str, long_tenor: &str, typical_bps: Decimal) -> Self {
        Self {
            short_tenor: short_tenor.to_string(),
            long_tenor: long_tenor.to_string(),
            typical_bps,
        }
    }

    /// Spread name, e.g. "5Y-10Y"
    pub fn name(&self) -> String {
        format!("{}-{}", self.short_tenor, self.long_tenor)
    }
}

/// Configuration for the analytics aggregator
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Market-maker windows, in minutes
    pub windows_minutes: Vec<u32>,
    /// Capacity of the rate and volume histories
    pub history_capacity: usize,
    /// Rate change (raw decimal) below which a tenor's flow is balanced
    pub neutral_band: Decimal,
    /// Typical spreads checked by the abnormal-spread micro-alert
    pub reference_spreads: Vec<ReferenceSpread>,
    /// Single-trade EUR notional above which a block micro-alert fires
    pub block_threshold: Notional,
    /// Single-trade EUR notional above which order flow counts a large block
    pub large_block_threshold: Notional,
    /// Volatility percentile above which a spike micro-alert fires
    pub spike_percentile: Decimal,
    /// Minimum number of history moves before the percentile is meaningful
    pub min_volatility_moves: usize,
    /// Leg-1 currency preferred for market-maker windows, falling back to all trades
    pub preferred_currency: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            windows_minutes: vec![10, 15, 20, 30, 60],
            history_capacity: 1000,
            neutral_band: dec!(0.0001),
            reference_spreads: vec![
                ReferenceSpread::new("5Y", "10Y", dec!(25)),
                ReferenceSpread::new("10Y", "30Y", dec!(38)),
                ReferenceSpread::new("2Y", "10Y", dec!(50)),
            ],
            block_threshold: dec!(5_000_000_000),
            large_block_threshold: dec!(500_000_000),
            spike_percentile: dec!(95),
            min_volatility_moves: 20,
            preferred_currency: Some("EUR".to_string()),
        }
    }
}
