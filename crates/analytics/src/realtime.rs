//! Rolling short-horizon activity

use std::collections::BTreeMap;

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use swapflow_core::{Alert, Notional, Timestamp, Trade};

use crate::error::Result;
use crate::history::{RateHistory, VolumeHistory};
use crate::stats::{checked_sum, percent};

const LIQUIDITY_TRADE_SCALE: Decimal = dec!(100);
const LIQUIDITY_VOLUME_SCALE: Decimal = dec!(10_000_000_000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeMetrics {
    pub volume_5m: Notional,
    pub volume_15m: Notional,
    pub volume_60m: Notional,
    pub trades_5m: usize,
    pub trades_15m: usize,
    pub trades_60m: usize,
    /// 0-100, half from 5-minute trade count and half from 5-minute volume
    pub liquidity_score: Decimal,
    pub alert_count_last_hour: usize,
    /// Per-tenor mean rate change against the sample one hour back, in bps
    pub rate_velocity_bps: BTreeMap<String, Decimal>,
    /// Heuristic: 5-minute volume against its running mean, in percent
    pub volume_momentum_pct: Decimal,
}

/// Activity strictly inside the last `window` before `now`
fn window_activity(trades: &[Trade], now: Timestamp, window: Duration) -> Result<(Notional, usize)> {
    let inside: Vec<&Trade> = trades
        .iter()
        .filter(|t| now - t.executed_at < window)
        .collect();
    let volume = checked_sum(inside.iter().map(|t| t.notional_eur_or_zero()), "realtime")?;
    Ok((volume, inside.len()))
}

pub fn liquidity_score(trades_5m: usize, volume_5m: Notional) -> Decimal {
    let by_count = (Decimal::from(trades_5m) / LIQUIDITY_TRADE_SCALE).min(Decimal::ONE);
    let by_volume = (volume_5m / LIQUIDITY_VOLUME_SCALE).min(Decimal::ONE);
    by_count * dec!(50) + by_volume * dec!(50)
}

pub fn realtime_metrics(
    trades: &[Trade],
    alerts: &[Alert],
    now: Timestamp,
    rates: &RateHistory,
    volumes: &VolumeHistory,
) -> Result<RealTimeMetrics> {
    let (volume_5m, trades_5m) = window_activity(trades, now, Duration::minutes(5))?;
    let (volume_15m, trades_15m) = window_activity(trades, now, Duration::minutes(15))?;
    let (volume_60m, trades_60m) = window_activity(trades, now, Duration::minutes(60))?;

    let alert_count_last_hour = alerts
        .iter()
        .filter(|a| now - a.timestamp < Duration::hours(1))
        .count();

    let volume_momentum_pct = match volumes.mean()? {
        Some(avg) => percent(volume_5m - avg, avg),
        None => Decimal::ZERO,
    };

    Ok(RealTimeMetrics {
        volume_5m,
        volume_15m,
        volume_60m,
        trades_5m,
        trades_15m,
        trades_60m,
        liquidity_score: liquidity_score(trades_5m, volume_5m),
        alert_count_last_hour,
        rate_velocity_bps: rates.velocity_bps(Duration::hours(1)),
        volume_momentum_pct,
    })
}
