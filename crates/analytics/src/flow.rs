//! Action and venue flow

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use swapflow_core::{Notional, Trade, TradeAction};

use crate::error::Result;
use crate::stats::{checked_sum, percent, ratio};

/// Share of flow executed on one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformShare {
    /// Platform id, "Unknown" when the trade carried none
    pub platform: String,
    /// EUR notional executed on the platform
    pub notional: Notional,
    /// Share of total EUR notional, 0-100
    pub percentage: Notional,
    pub trade_count: usize,
    /// Mean EUR notional per trade
    pub avg_size: Notional,
}

/// NEW / MODIFY / TERMINATE counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDirection {
    pub new: usize,
    pub modified: usize,
    pub terminated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetrics {
    /// Trade count per action
    pub action_breakdown: BTreeMap<String, usize>,
    /// Platforms by notional, largest first
    pub platform_share: Vec<PlatformShare>,
    pub flow_direction: FlowDirection,
}

const UNKNOWN_PLATFORM: &str = "Unknown";

pub fn flow_metrics(trades: &[Trade]) -> Result<FlowMetrics> {
    let mut action_breakdown = BTreeMap::new();
    let mut flow_direction = FlowDirection::default();
    let mut platforms: HashMap<&str, (Vec<Notional>, usize)> = HashMap::new();

    for trade in trades {
        *action_breakdown
            .entry(trade.action.as_str().to_string())
            .or_insert(0) += 1;

        match trade.action {
            TradeAction::New => flow_direction.new += 1,
            TradeAction::Modify => flow_direction.modified += 1,
            TradeAction::Terminate => flow_direction.terminated += 1,
        }

        let platform = trade.platform.as_deref().unwrap_or(UNKNOWN_PLATFORM);
        let entry = platforms.entry(platform).or_default();
        entry.0.push(trade.notional_eur_or_zero());
        entry.1 += 1;
    }

    let total = checked_sum(trades.iter().map(Trade::notional_eur_or_zero), "flow")?;

    let mut platform_share = Vec::with_capacity(platforms.len());
    for (platform, (notionals, count)) in platforms {
        let notional = checked_sum(notionals, "flow")?;
        platform_share.push(PlatformShare {
            platform: platform.to_string(),
            notional,
            percentage: percent(notional, total),
            trade_count: count,
            avg_size: ratio(notional, count.into()),
        });
    }
    platform_share.sort_by(|a, b| {
        b.notional
            .cmp(&a.notional)
            .then_with(|| a.platform.cmp(&b.platform))
    });

    Ok(FlowMetrics {
        action_breakdown,
        platform_share,
        flow_direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn trade(id: &str, action: TradeAction, platform: Option<&str>, notional: Decimal) -> Trade {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let trade = Trade::new(id, action, at, "USD-SOFR").with_notional_eur(notional);
        match platform {
            Some(p) => trade.with_platform(p),
            None => trade,
        }
    }

    #[test]
    fn test_flow_breakdown() {
        let trades = vec![
            trade("A", TradeAction::New, Some("BBG"), dec!(300)),
            trade("B", TradeAction::New, Some("TW"), dec!(100)),
            trade("C", TradeAction::Modify, Some("BBG"), dec!(100)),
            trade("D", TradeAction::Terminate, None, Decimal::ZERO),
        ];

        let flow = flow_metrics(&trades).unwrap();
        assert_eq!(flow.action_breakdown["NEW"], 2);
        assert_eq!(flow.action_breakdown["MODIFY"], 1);
        assert_eq!(
            flow.flow_direction,
            FlowDirection {
                new: 2,
                modified: 1,
                terminated: 1
            }
        );

        let bbg = &flow.platform_share[0];
        assert_eq!(bbg.platform, "BBG");
        assert_eq!(bbg.notional, dec!(400));
        assert_eq!(bbg.percentage, dec!(80));
        assert_eq!(bbg.avg_size, dec!(200));

        let unknown = flow
            .platform_share
            .iter()
            .find(|p| p.platform == UNKNOWN_PLATFORM)
            .unwrap();
        assert_eq!(unknown.trade_count, 1);
        assert_eq!(unknown.percentage, Decimal::ZERO);
    }

    #[test]
    fn test_empty_flow() {
        let flow = flow_metrics(&[]).unwrap();
        assert!(flow.action_breakdown.is_empty());
        assert!(flow.platform_share.is_empty());
        assert_eq!(flow.flow_direction, FlowDirection::default());
    }
}
