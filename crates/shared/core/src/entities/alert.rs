use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::format_notional;
use crate::values::{Notional, StrategyId, Timestamp, TradeId};

/// Which rule produced the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    LargeTrade,
    StrategyPackage,
    VolumeTrend,
}

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// Alert emitted by the alert engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub timestamp: Timestamp,
    pub message: String,
    #[serde(default)]
    pub trade_id: Option<TradeId>,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
    #[serde(rename = "notionalEUR", default)]
    pub notional_eur: Option<Notional>,
}

impl Alert {
    fn new(kind: AlertKind, severity: Severity, timestamp: Timestamp, message: String) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("ALERT_{}", &uuid[..8].to_uppercase()),
            kind,
            severity,
            timestamp,
            message,
            trade_id: None,
            strategy_id: None,
            notional_eur: None,
        }
    }

    pub fn large_trade(
        trade_id: impl Into<TradeId>,
        underlying: &str,
        tenor: Option<&str>,
        notional: Notional,
        severity: Severity,
        timestamp: Timestamp,
    ) -> Self {
        let trade_id = trade_id.into();
        let message = match tenor {
            Some(tenor) => format!(
                "Large trade {trade_id}: EUR {} {underlying} {tenor}",
                format_notional(notional)
            ),
            None => format!(
                "Large trade {trade_id}: EUR {} {underlying}",
                format_notional(notional)
            ),
        };
        let mut alert = Self::new(AlertKind::LargeTrade, severity, timestamp, message);
        alert.trade_id = Some(trade_id);
        alert.notional_eur = Some(notional);
        alert
    }

    pub fn strategy_package(
        strategy_id: impl Into<StrategyId>,
        label: &str,
        legs: usize,
        notional: Notional,
        severity: Severity,
        timestamp: Timestamp,
    ) -> Self {
        let strategy_id = strategy_id.into();
        let message = format!(
            "Strategy {label} ({legs} legs): EUR {} total",
            format_notional(notional)
        );
        let mut alert = Self::new(AlertKind::StrategyPackage, severity, timestamp, message);
        alert.strategy_id = Some(strategy_id);
        alert.notional_eur = Some(notional);
        alert
    }

    pub fn volume_trend(volume: Notional, window: Duration, timestamp: Timestamp) -> Self {
        let message = format!(
            "Volume spike: EUR {} traded in the last {} minutes",
            format_notional(volume),
            window.num_minutes()
        );
        let mut alert = Self::new(AlertKind::VolumeTrend, Severity::High, timestamp, message);
        alert.notional_eur = Some(volume);
        alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
    }

    #[test]
    fn test_large_trade_alert_fields() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let alert = Alert::large_trade(
            "T1",
            "EUR-EURIBOR-6M",
            Some("10Y"),
            dec!(2_500_000_000),
            Severity::Critical,
            at,
        );

        assert!(alert.id.starts_with("ALERT_"));
        assert_eq!(alert.id.len(), "ALERT_".len() + 8);
        assert_eq!(alert.trade_id.as_deref(), Some("T1"));
        assert!(alert.message.contains("2.50B"));
        assert!(alert.message.contains("10Y"));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
