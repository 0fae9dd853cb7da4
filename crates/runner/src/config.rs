//! Engine configuration
//!
//! Loaded from JSON. Every field has a default, so a partial file (or `{}`)
//! is valid. Durations are in seconds.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_alerts::{AlertConfig, AlertThresholds};
use swapflow_analytics::AnalyticsConfig;
use swapflow_ledger::LedgerConfig;
use swapflow_strategy::ClassifierConfig;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Ledger capacity
    pub max_trades: usize,
    /// Custom-strategy window and recent-slice width
    pub strategy_window_secs: i64,

    pub critical_threshold: Decimal,
    pub high_threshold: Decimal,
    pub medium_threshold: Decimal,
    pub trend_threshold: Decimal,
    pub trend_window_secs: i64,
    pub trend_cooldown_secs: i64,

    /// Market-maker windows
    pub analytics_windows_minutes: Vec<u32>,
    pub history_capacity: usize,
    pub neutral_band: Decimal,
    pub block_threshold: Decimal,
    pub preferred_currency: Option<String>,

    /// Alerts kept for the last-hour count
    pub recent_alert_capacity: usize,
    /// Units of currency per 1 EUR, e.g. `"USD": 1.08`
    pub eur_quotes: BTreeMap<String, Decimal>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let alerts = AlertConfig::default();
        let analytics = AnalyticsConfig::default();
        Self {
            max_trades: LedgerConfig::default().max_trades,
            strategy_window_secs: ClassifierConfig::default().strategy_window.num_seconds(),
            critical_threshold: alerts.thresholds.critical,
            high_threshold: alerts.thresholds.high,
            medium_threshold: alerts.thresholds.medium,
            trend_threshold: alerts.trend_threshold,
            trend_window_secs: alerts.trend_window.num_seconds(),
            trend_cooldown_secs: alerts.trend_cooldown.num_seconds(),
            analytics_windows_minutes: analytics.windows_minutes,
            history_capacity: analytics.history_capacity,
            neutral_band: analytics.neutral_band,
            block_threshold: analytics.block_threshold,
            preferred_currency: analytics.preferred_currency,
            recent_alert_capacity: 1000,
            eur_quotes: BTreeMap::from([
                ("USD".to_string(), dec!(1.08)),
                ("GBP".to_string(), dec!(0.85)),
                ("JPY".to_string(), dec!(162.5)),
                ("CHF".to_string(), dec!(0.95)),
            ]),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_trades == 0 {
            return Err(ConfigError::Invalid("maxTrades must be positive".into()));
        }
        if !(self.medium_threshold <= self.high_threshold
            && self.high_threshold <= self.critical_threshold)
        {
            return Err(ConfigError::Invalid(
                "alert thresholds must satisfy medium <= high <= critical".into(),
            ));
        }
        for (name, secs) in [
            ("strategyWindowSecs", self.strategy_window_secs),
            ("trendWindowSecs", self.trend_window_secs),
            ("trendCooldownSecs", self.trend_cooldown_secs),
        ] {
            if secs <= 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.analytics_windows_minutes.iter().any(|w| *w == 0) {
            return Err(ConfigError::Invalid(
                "analytics windows must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn ledger(&self) -> LedgerConfig {
        LedgerConfig {
            max_trades: self.max_trades,
        }
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            strategy_window: Duration::seconds(self.strategy_window_secs),
        }
    }

    pub fn alerts(&self) -> AlertConfig {
        AlertConfig {
            thresholds: AlertThresholds {
                critical: self.critical_threshold,
                high: self.high_threshold,
                medium: self.medium_threshold,
            },
            trend_threshold: self.trend_threshold,
            trend_window: Duration::seconds(self.trend_window_secs),
            trend_cooldown: Duration::seconds(self.trend_cooldown_secs),
        }
    }

    pub fn analytics(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            windows_minutes: self.analytics_windows_minutes.clone(),
            history_capacity: self.history_capacity,
            neutral_band: self.neutral_band,
            block_threshold: self.block_threshold,
            preferred_currency: self.preferred_currency.clone(),
            ..AnalyticsConfig::default()
        }
    }
}
