use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Notional, StrategyId, Timestamp, TradeId};

/// How the strategy was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Upstream flagged the legs with a shared package key
    Package,
    /// Inferred from same-underlying, multi-tenor flow
    Custom,
}

/// Structure implied by the number of legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyStructure {
    Spread,
    Butterfly,
    Curve,
    Package,
}

impl StrategyStructure {
    /// 2 legs = Spread, 3 = Butterfly, 4+ = Curve, anything else = Package
    pub fn from_leg_count(legs: usize) -> Self {
        match legs {
            2 => StrategyStructure::Spread,
            3 => StrategyStructure::Butterfly,
            n if n >= 4 => StrategyStructure::Curve,
            _ => StrategyStructure::Package,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyStructure::Spread => "Spread",
            StrategyStructure::Butterfly => "Butterfly",
            StrategyStructure::Curve => "Curve",
            StrategyStructure::Package => "Package",
        }
    }
}

/// A multi-leg strategy assembled from related trades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: StrategyId,
    pub kind: StrategyKind,
    pub structure: StrategyStructure,
    /// Display label, e.g. "2Y/5Y/10Y Butterfly"
    pub label: String,
    pub underlying: String,
    pub leg_ids: Vec<TradeId>,
    #[serde(rename = "totalNotionalEUR")]
    pub total_notional_eur: Notional,
    pub execution_start: Timestamp,
    pub execution_end: Timestamp,
    /// Canonically ordered tenors joined by "/"
    #[serde(default)]
    pub instrument_label: Option<String>,
    /// Canonically ordered distinct leg tenors
    #[serde(default)]
    pub tenors: Vec<String>,
    #[serde(default)]
    pub package_key: Option<String>,
}

impl Strategy {
    /// Create an empty strategy; legs and derived fields are filled by the classifier
    pub fn new(
        id: impl Into<StrategyId>,
        kind: StrategyKind,
        underlying: impl Into<String>,
        started_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            structure: StrategyStructure::Package,
            label: String::new(),
            underlying: underlying.into(),
            leg_ids: Vec::new(),
            total_notional_eur: Decimal::ZERO,
            execution_start: started_at,
            execution_end: started_at,
            instrument_label: None,
            tenors: Vec::new(),
            package_key: None,
        }
    }

    pub fn with_package_key(mut self, key: impl Into<String>) -> Self {
        self.package_key = Some(key.into());
        self
    }

    pub fn leg_count(&self) -> usize {
        self.leg_ids.len()
    }

    pub fn contains_leg(&self, trade_id: &str) -> bool {
        self.leg_ids.iter().any(|id| id == trade_id)
    }
}
