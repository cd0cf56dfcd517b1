//! Unit tests for the incremental indicator engine

use chrono::{DateTime, Duration, TimeZone, Utc};
use tradepulse::indicators::engine::IndicatorEngine;
use tradepulse::models::market::{Bar, Interval, SymbolKey};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap()
}

fn key() -> SymbolKey {
    SymbolKey::new("AAPL", Interval::M5)
}

fn sealed_bar(index: i64, close: f64) -> Bar {
    Bar {
        open_time: base_time() + Duration::minutes(index * 5),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000.0,
        sealed: true,
    }
}

fn trending_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + i as f64 * 0.3 + ((i % 7) as f64 - 3.0) * 0.8)
        .collect()
}

#[test]
fn warm_up_boundaries_are_exact() {
    let mut engine = IndicatorEngine::new(key());
    let mut last = None;
    for (i, close) in trending_closes(250).into_iter().enumerate() {
        let snap = engine.on_close(&sealed_bar(i as i64, close));
        let bars = i + 1;

        assert_eq!(snap.ema9.is_some(), bars >= 9, "ema9 at bar {}", bars);
        assert_eq!(snap.ema21.is_some(), bars >= 21, "ema21 at bar {}", bars);
        assert_eq!(snap.ema200.is_some(), bars >= 200, "ema200 at bar {}", bars);
        assert_eq!(snap.rsi14.is_some(), bars >= 14, "rsi at bar {}", bars);
        assert_eq!(snap.atr14.is_some(), bars >= 14, "atr at bar {}", bars);
        assert_eq!(snap.bollinger.is_some(), bars >= 20, "bb at bar {}", bars);
        // MACD needs the slow EMA (26) plus the 9-period signal seed.
        assert_eq!(snap.macd.is_some(), bars >= 34, "macd at bar {}", bars);
        assert_eq!(snap.supertrend.is_some(), bars >= 10, "st at bar {}", bars);
        assert_eq!(
            snap.supertrend_fast.is_some(),
            bars >= 7,
            "fast st at bar {}",
            bars
        );
        last = Some(snap);
    }
    let last = last.unwrap();
    assert!(last.vwap.is_some());
    assert!(last.volume_ma20.is_some());
    assert!(last.momentum_5bar_pct.is_some());
}

#[test]
fn two_hundred_constant_closes_give_exact_ema200() {
    let mut engine = IndicatorEngine::new(key());
    let mut snap = None;
    for i in 0..200 {
        snap = Some(engine.on_close(&sealed_bar(i, 50.0)));
    }
    let ema200 = snap.unwrap().ema200.unwrap();
    assert!((ema200 - 50.0).abs() < 1e-9);
}

#[test]
fn replay_is_deterministic() {
    let closes = trending_closes(300);

    let mut a = IndicatorEngine::new(key());
    let mut b = IndicatorEngine::new(key());
    for (i, close) in closes.iter().enumerate() {
        a.on_close(&sealed_bar(i as i64, *close));
    }
    for (i, close) in closes.iter().enumerate() {
        b.on_close(&sealed_bar(i as i64, *close));
    }

    assert_eq!(a.confirmed(), b.confirmed());
    assert_eq!(a.previous(), b.previous());
}

#[test]
fn peek_leaves_confirmed_state_untouched() {
    let mut engine = IndicatorEngine::new(key());
    for (i, close) in trending_closes(60).into_iter().enumerate() {
        engine.on_close(&sealed_bar(i as i64, close));
    }
    let confirmed = engine.confirmed().cloned().unwrap();

    let mut live = sealed_bar(60, 130.0);
    live.sealed = false;
    let first = engine.peek(&live);
    live.close = 90.0;
    let second = engine.peek(&live);

    assert!(first.live && second.live);
    assert_ne!(first.ema9, second.ema9);
    assert_eq!(engine.confirmed(), Some(&confirmed));
}

#[test]
fn live_peek_takes_one_tentative_ema_step() {
    let mut engine = IndicatorEngine::new(key());
    for i in 0..20 {
        engine.on_close(&sealed_bar(i, 100.0));
    }
    let mut live = sealed_bar(20, 109.0);
    live.sealed = false;
    let snap = engine.peek(&live);

    // ema9 k = 0.2: 109 * 0.2 + 100 * 0.8 = 101.8.
    let ema9 = snap.ema9.unwrap();
    assert!((ema9 - 101.8).abs() < 1e-9);
    // Band and range indicators report confirmed values only.
    assert_eq!(snap.atr14, engine.confirmed().unwrap().atr14);
}

#[test]
fn momentum_is_five_bar_change() {
    let mut engine = IndicatorEngine::new(key());
    let mut snap = None;
    for i in 0..10 {
        snap = Some(engine.on_close(&sealed_bar(i, 100.0 + i as f64)));
    }
    // Close 109 against close 104 five bars earlier.
    let momentum = snap.unwrap().momentum_5bar_pct.unwrap();
    assert!((momentum - (109.0 / 104.0 - 1.0) * 100.0).abs() < 1e-9);
}
