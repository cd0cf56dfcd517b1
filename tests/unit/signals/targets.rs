//! Unit tests for the target calculator

use chrono::{TimeZone, Utc};
use tradepulse::models::indicators::IndicatorSnapshot;
use tradepulse::models::market::{Interval, SymbolKey};
use tradepulse::models::signal::{Side, Signal, StrategyId, TimeToTarget};
use tradepulse::signals::targets::TargetCalculator;

fn signal(side: Side, entry: f64) -> Signal {
    Signal {
        key: SymbolKey::new("AAPL", Interval::M5),
        strategy: StrategyId::ProMtf,
        side,
        entry_price: entry,
        rsi: 60.0,
        atr: Some(2.0),
        confidence: 68.0,
        timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        target: None,
    }
}

fn snapshot_with_atr(atr: Option<f64>, velocity: Option<f64>) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::empty(
        Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        100.0,
        1000.0,
    );
    snap.atr14 = atr;
    snap.atr_per_bar = velocity;
    snap
}

#[test]
fn buy_levels_are_one_and_two_atr() {
    let target = TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(Some(2.0), Some(2.0)),
        Interval::M5,
    )
    .unwrap();

    assert_eq!(target.tp1, 102.0);
    assert_eq!(target.tp2, 104.0);
    assert_eq!(target.sl, 98.0);
    // Ordering invariant for BUY.
    assert!(target.tp2 > target.tp1);
    assert!(target.tp1 > 100.0);
    assert!(100.0 > target.sl);
}

#[test]
fn sell_levels_mirror_buy() {
    let target = TargetCalculator::compute(
        &signal(Side::Sell, 100.0),
        &snapshot_with_atr(Some(2.0), Some(2.0)),
        Interval::M5,
    )
    .unwrap();

    assert_eq!(target.tp1, 98.0);
    assert_eq!(target.tp2, 96.0);
    assert_eq!(target.sl, 102.0);
    // Ordering invariant for SELL.
    assert!(target.sl > 100.0);
    assert!(100.0 > target.tp1);
    assert!(target.tp1 > target.tp2);
}

#[test]
fn undefined_atr_leaves_the_target_pending() {
    assert!(TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(None, None),
        Interval::M5,
    )
    .is_none());
}

#[test]
fn eta_uses_atr_velocity_with_buffer() {
    // Distance to TP1 is one ATR (2.0); velocity 1.0 per bar ->
    // 2 * 1.4 = 2.8 bars -> 14 minutes on 5m bars.
    let target = TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(Some(2.0), Some(1.0)),
        Interval::M5,
    )
    .unwrap();
    assert_eq!(target.eta, TimeToTarget::Within { minutes: 14 });
}

#[test]
fn eta_is_floored_at_the_minimum() {
    // Huge velocity: raw estimate is under one bar, floored to one bar and
    // then to the minimum reportable duration.
    let target = TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(Some(2.0), Some(1000.0)),
        Interval::M1,
    )
    .unwrap();
    assert_eq!(target.eta, TimeToTarget::Within { minutes: 5 });
}

#[test]
fn glacial_velocity_reports_unbounded() {
    let target = TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(Some(2.0), Some(0.0001)),
        Interval::M5,
    )
    .unwrap();
    assert_eq!(target.eta, TimeToTarget::Unbounded);

    let zero = TargetCalculator::compute(
        &signal(Side::Buy, 100.0),
        &snapshot_with_atr(Some(2.0), Some(0.0)),
        Interval::M5,
    )
    .unwrap();
    assert_eq!(zero.eta, TimeToTarget::Unbounded);
}
