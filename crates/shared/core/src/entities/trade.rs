use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Notional, Rate, StrategyId, Timestamp, TradeId};

/// Lifecycle action carried by an upstream trade record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    New,
    Modify,
    Terminate,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::New => "NEW",
            TradeAction::Modify => "MODIFY",
            TradeAction::Terminate => "TERMINATE",
        }
    }
}

/// A single swap execution as reported by the upstream feed.
///
/// `notional_eur` is filled in by the alert engine once a rate is known and
/// `strategy_id` by the classifier once the trade is claimed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub action: TradeAction,
    pub executed_at: Timestamp,
    #[serde(default)]
    pub underlying: String,
    #[serde(default)]
    pub notional_leg1_amount: Decimal,
    #[serde(default)]
    pub notional_leg1_currency: String,
    #[serde(default)]
    pub notional_leg2_amount: Decimal,
    #[serde(default)]
    pub notional_leg2_currency: String,
    #[serde(rename = "notionalEUR", default)]
    pub notional_eur: Option<Notional>,
    #[serde(default)]
    pub tenor: Option<String>,
    #[serde(default)]
    pub fixed_rate: Option<Rate>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub is_package: bool,
    #[serde(default)]
    pub package_key: Option<String>,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
}

impl Trade {
    /// Create a trade with no legs, tenor or package information
    pub fn new(
        id: impl Into<TradeId>,
        action: TradeAction,
        executed_at: Timestamp,
        underlying: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action,
            executed_at,
            underlying: underlying.into(),
            notional_leg1_amount: Decimal::ZERO,
            notional_leg1_currency: String::new(),
            notional_leg2_amount: Decimal::ZERO,
            notional_leg2_currency: String::new(),
            notional_eur: None,
            tenor: None,
            fixed_rate: None,
            platform: None,
            is_package: false,
            package_key: None,
            strategy_id: None,
        }
    }

    pub fn with_leg1(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.notional_leg1_amount = amount;
        self.notional_leg1_currency = currency.into();
        self
    }

    pub fn with_leg2(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.notional_leg2_amount = amount;
        self.notional_leg2_currency = currency.into();
        self
    }

    pub fn with_tenor(mut self, tenor: impl Into<String>) -> Self {
        self.tenor = Some(tenor.into());
        self
    }

    pub fn with_fixed_rate(mut self, rate: Rate) -> Self {
        self.fixed_rate = Some(rate);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Mark the trade as one leg of an upstream-declared package
    pub fn with_package(mut self, package_key: impl Into<String>) -> Self {
        self.is_package = true;
        self.package_key = Some(package_key.into());
        self
    }

    pub fn with_notional_eur(mut self, notional: Notional) -> Self {
        self.notional_eur = Some(notional);
        self
    }

    pub fn is_new(&self) -> bool {
        self.action == TradeAction::New
    }

    /// Package flag set and a non-empty package key present
    pub fn is_package_leg(&self) -> bool {
        self.is_package && self.package_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// EUR notional, zero when not yet normalized
    pub fn notional_eur_or_zero(&self) -> Notional {
        self.notional_eur.unwrap_or(Decimal::ZERO)
    }

    /// Currency of the first leg that carries both an amount and a currency
    pub fn primary_currency(&self) -> Option<&str> {
        if !self.notional_leg1_amount.is_zero() && !self.notional_leg1_currency.is_empty() {
            Some(&self.notional_leg1_currency)
        } else if !self.notional_leg2_amount.is_zero() && !self.notional_leg2_currency.is_empty() {
            Some(&self.notional_leg2_currency)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_package_leg_requires_key() {
        let mut trade = Trade::new("T1", TradeAction::New, at(), "EUR-EURIBOR-6M");
        trade.is_package = true;
        assert!(!trade.is_package_leg());

        let trade = trade.with_package("PKG1");
        assert!(trade.is_package_leg());
    }

    #[test]
    fn test_primary_currency_falls_back_to_leg2() {
        let trade = Trade::new("T1", TradeAction::New, at(), "USD-SOFR")
            .with_leg1(Decimal::ZERO, "USD")
            .with_leg2(dec!(100_000_000), "USD");
        assert_eq!(trade.primary_currency(), Some("USD"));

        let bare = Trade::new("T2", TradeAction::New, at(), "USD-SOFR");
        assert_eq!(bare.primary_currency(), None);
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let trade = Trade::new("T1", TradeAction::Terminate, at(), "EUR-EURIBOR-6M")
            .with_leg1(dec!(250_000_000), "EUR")
            .with_tenor("10Y")
            .with_notional_eur(dec!(250_000_000));

        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["action"], "TERMINATE");
        assert_eq!(json["notionalLeg1Currency"], "EUR");
        assert!(json.get("notionalEUR").is_some());

        let back: Trade = serde_json::from_value(json).unwrap();
        assert_eq!(back, trade);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "id": "T9",
            "action": "NEW",
            "executedAt": "2025-03-14T09:30:00Z",
            "underlying": "GBP-SONIA",
            "notionalLeg1Amount": 50000000,
            "notionalLeg1Currency": "GBP"
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert!(trade.is_new());
        assert_eq!(trade.tenor, None);
        assert!(!trade.is_package);
        assert_eq!(trade.notional_leg1_amount, dec!(50000000));
    }
}
