//! Micro-alerts raised from a market-maker window

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapflow_core::{Severity, Timestamp, Trade, format_notional};

use super::spreads::SpreadDetail;
use crate::config::AnalyticsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MicroAlertKind {
    LargeBlock,
    AbnormalSpread,
    VolatilitySpike,
}

/// Informational alert attached to a snapshot; not routed to the alert sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroAlert {
    pub id: String,
    pub kind: MicroAlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: Timestamp,
}

pub fn micro_alerts(
    trades: &[&Trade],
    spreads: &BTreeMap<String, SpreadDetail>,
    volatility_percentile: Decimal,
    config: &AnalyticsConfig,
    now: Timestamp,
) -> Vec<MicroAlert> {
    let mut alerts = Vec::new();

    for trade in trades {
        let notional = trade.notional_eur_or_zero();
        if notional > config.block_threshold {
            alerts.push(MicroAlert {
                id: format!("large_block_{}", trade.id),
                kind: MicroAlertKind::LargeBlock,
                severity: Severity::High,
                message: format!(
                    "Large block: EUR {} {} {}",
                    format_notional(notional),
                    trade.underlying,
                    trade.tenor.as_deref().unwrap_or("")
                )
                .trim_end()
                .to_string(),
                timestamp: now,
            });
        }
    }

    for reference in &config.reference_spreads {
        let name = reference.name();
        let Some(spread) = spreads.get(&name) else {
            continue;
        };
        if spread.current_bps.abs() > reference.typical_bps.abs() * Decimal::TWO {
            alerts.push(MicroAlert {
                id: format!("abnormal_spread_{name}"),
                kind: MicroAlertKind::AbnormalSpread,
                severity: Severity::Medium,
                message: format!(
                    "{name} spread at {:.1}bp vs typical {}bp",
                    spread.current_bps, reference.typical_bps
                ),
                timestamp: now,
            });
        }
    }

    if volatility_percentile > config.spike_percentile {
        alerts.push(MicroAlert {
            id: "volatility_spike".to_string(),
            kind: MicroAlertKind::VolatilitySpike,
            severity: Severity::High,
            message: format!("Rate volatility in the {:.0}th percentile", volatility_percentile),
            timestamp: now,
        });
    }

    alerts
}
