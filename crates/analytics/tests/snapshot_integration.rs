//! Analytics Snapshot Integration Test
//!
//! Builds snapshots over a realistic EUR swap session and checks that a
//! section failure stays contained.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swapflow_analytics::market_maker::{CurveShape, MicroAlertKind};
use swapflow_analytics::{AnalyticsAggregator, AnalyticsConfig, SessionStats, SnapshotInput};
use swapflow_core::{Strategy, StrategyKind, StrategyStructure, Timestamp, Trade, TradeAction};

fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 14, 11, 0, 0).unwrap()
}

fn swap(id: &str, seconds_ago: i64, tenor: &str, rate: Decimal, notional: Decimal) -> Trade {
    Trade::new(
        id,
        TradeAction::New,
        now() - Duration::seconds(seconds_ago),
        "EUR-EURIBOR-6M",
    )
    .with_leg1(notional, "EUR")
    .with_notional_eur(notional)
    .with_tenor(tenor)
    .with_fixed_rate(rate)
    .with_platform("TRADEWEB")
}

fn butterfly(trades: &[Trade]) -> Strategy {
    let mut strategy = Strategy::new(
        format!("CUST-{}", trades[0].id),
        StrategyKind::Custom,
        "EUR-EURIBOR-6M",
        trades[0].executed_at,
    );
    strategy.leg_ids = trades.iter().map(|t| t.id.clone()).collect();
    strategy.structure = StrategyStructure::Butterfly;
    strategy.tenors = vec!["2Y".into(), "5Y".into(), "10Y".into()];
    strategy.instrument_label = Some("2Y/5Y/10Y".into());
    strategy.label = "2Y/5Y/10Y Butterfly".into();
    strategy.total_notional_eur = trades.iter().map(|t| t.notional_eur_or_zero()).sum();
    strategy
}

#[test]
fn test_session_snapshot() {
    let _ = env_logger::builder().is_test(true).try_init();

    let trades = vec![
        swap("T1", 30, "2Y", dec!(0.0245), dec!(300_000_000)),
        swap("T2", 25, "5Y", dec!(0.0262), dec!(250_000_000)),
        swap("T3", 20, "10Y", dec!(0.0281), dec!(150_000_000)),
        swap("T4", 600, "30Y", dec!(0.0290), dec!(6_000_000_000)),
    ];
    let strategies = vec![butterfly(&trades[..3])];
    let mut session = SessionStats::new();
    trades.iter().for_each(|t| session.record_trade(t));
    strategies.iter().for_each(|s| session.record_strategy(s));

    let mut aggregator = AnalyticsAggregator::new(AnalyticsConfig::default());
    let snapshot = aggregator.snapshot(
        SnapshotInput::new(now(), &trades, &strategies).with_session(&session),
    );

    assert_eq!(snapshot.trade_count, 4);
    assert_eq!(snapshot.total_notional_eur, dec!(6_700_000_000));

    let curve = snapshot.curve.as_ref().unwrap();
    let tenors: Vec<_> = curve
        .tenor_distribution
        .iter()
        .map(|b| b.tenor.as_str())
        .collect();
    assert_eq!(tenors, vec!["2Y", "5Y", "10Y", "30Y"]);
    assert_eq!(curve.tenor_spreads_bps["10Y-2Y"], dec!(36));

    let risk = snapshot.risk.as_ref().unwrap();
    assert_eq!(risk.concentration_hhi, dec!(10000));

    let strategies = snapshot.strategies.as_ref().unwrap();
    assert_eq!(strategies.custom_count, 1);
    assert_eq!(
        strategies.average_notional_by_structure["Butterfly"],
        dec!(700_000_000)
    );

    // The 30Y block sits exactly on the 10-minute lower bound
    let ten = snapshot.market_maker[&10].as_ref().unwrap();
    assert_eq!(ten.trade_count, 4);
    assert!(ten.alerts.iter().any(|a| a.kind == MicroAlertKind::LargeBlock));
    assert_eq!(ten.curve_shape, CurveShape::Normal);

    let session = snapshot.session.as_ref().unwrap();
    assert_eq!(session.strategy_count, 1);
    assert_eq!(session.largest_size, dec!(6_000_000_000));
}

#[test]
fn test_failed_section_is_isolated() {
    let _ = env_logger::builder().is_test(true).try_init();

    // DV01 on this notional overflows; every other section still fits
    let trades = vec![
        swap("HUGE", 10, "30Y", dec!(0.028), dec!(10_000_000_000_000_000_000_000_000_000)),
        swap("SMALL", 5, "2Y", dec!(0.024), dec!(100_000_000)),
    ];

    let mut aggregator = AnalyticsAggregator::default();
    let snapshot = aggregator.snapshot(SnapshotInput::new(now(), &trades, &[]));

    assert!(snapshot.risk.is_none());
    assert!(snapshot.curve.is_some());
    assert!(snapshot.flow.is_some());
    assert!(snapshot.realtime.is_some());
    assert!(snapshot.currency.is_some());
    assert!(snapshot.strategies.is_some());
    assert!(snapshot.market_maker.values().all(Option::is_some));
    assert_eq!(snapshot.trade_count, 2);
}

#[test]
fn test_repeated_snapshots_track_rate_history() {
    let mut aggregator = AnalyticsAggregator::default();
    let base = vec![
        swap("A", 5, "2Y", dec!(0.0240), dec!(100_000_000)),
        swap("B", 4, "10Y", dec!(0.0280), dec!(100_000_000)),
    ];
    aggregator.snapshot(SnapshotInput::new(now() - Duration::minutes(61), &base, &[]));

    let later = vec![
        swap("C", 5, "2Y", dec!(0.0250), dec!(100_000_000)),
        swap("D", 4, "10Y", dec!(0.0285), dec!(100_000_000)),
    ];
    let snapshot = aggregator.snapshot(SnapshotInput::new(now(), &later, &[]));

    let velocity = &snapshot.realtime.as_ref().unwrap().rate_velocity_bps;
    assert_eq!(velocity["2Y"], dec!(10));
    assert_eq!(velocity["10Y"], dec!(5));
}
