//! Unit tests for the prediction engine

use chrono::{TimeZone, Utc};
use tradepulse::config::PredictionConfig;
use tradepulse::models::indicators::{IndicatorSnapshot, MacdValue, SupertrendValue, TrendDirection};
use tradepulse::models::market::{Interval, SymbolKey};
use tradepulse::models::signal::{PredictionDirection, Side, Signal, StrategyId};
use tradepulse::signals::prediction::PredictionEngine;

fn engine() -> PredictionEngine {
    PredictionEngine::new(PredictionConfig::default())
}

fn signal(side: Side, confidence: f64) -> Signal {
    Signal {
        key: SymbolKey::new("AAPL", Interval::M5),
        strategy: StrategyId::MacdCross,
        side,
        entry_price: 100.0,
        rsi: 60.0,
        atr: Some(2.0),
        confidence,
        timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        target: None,
    }
}

#[test]
fn equal_weights_fuse_technical_and_sentiment() {
    // Agreement score +20 (buy weight 60 vs sell weight 40), sentiment +80:
    // combined = (20 + 80) / 2 = 50 -> BULLISH above the default band.
    let signals = vec![signal(Side::Buy, 60.0), signal(Side::Sell, 40.0)];
    let result = engine().predict("AAPL", &signals, None, Some(80.0));

    assert!((result.technical_score - 20.0).abs() < 1e-9);
    assert_eq!(result.sentiment_score, 80.0);
    assert_eq!(result.direction, PredictionDirection::Bullish);
    assert!((result.confidence - 50.0).abs() < 1e-9);
}

#[test]
fn missing_sentiment_reads_neutral() {
    let result = engine().predict("AAPL", &[], None, None);
    assert_eq!(result.sentiment_score, 0.0);
    assert_eq!(result.technical_score, 0.0);
    assert_eq!(result.direction, PredictionDirection::Neutral);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn unanimous_sells_with_bad_news_read_bearish() {
    let signals = vec![signal(Side::Sell, 80.0), signal(Side::Sell, 70.0)];
    let result = engine().predict("AAPL", &signals, None, Some(-60.0));

    assert!((result.technical_score + 100.0).abs() < 1e-9);
    assert_eq!(result.direction, PredictionDirection::Bearish);
    assert!((result.confidence - 80.0).abs() < 1e-9);
    assert!(!result.bear_reasons.is_empty());
}

#[test]
fn sentiment_is_clamped_to_range() {
    let result = engine().predict("AAPL", &[], None, Some(500.0));
    assert_eq!(result.sentiment_score, 100.0);
}

#[test]
fn indicator_bias_drives_technical_score_without_signals() {
    let mut snap = IndicatorSnapshot::empty(
        Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        102.0,
        1000.0,
    );
    snap.ema9 = Some(101.0);
    snap.ema21 = Some(100.0);
    snap.ema50 = Some(99.0);
    snap.ema200 = Some(95.0);
    snap.rsi14 = Some(60.0);
    snap.supertrend = Some(SupertrendValue {
        value: 98.0,
        direction: TrendDirection::Bullish,
    });
    snap.macd = Some(MacdValue {
        line: 0.5,
        signal: 0.2,
        histogram: 0.3,
    });

    // Stack 28 + ema200 20 + rsi 10 + supertrend 20 + macd 16 = 94 -> clamp 90.
    let result = engine().predict("AAPL", &[], Some(&snap), None);
    assert!((result.technical_score - 90.0).abs() < 1e-9);
    assert_eq!(result.direction, PredictionDirection::Bullish);
    assert!(result
        .bull_reasons
        .iter()
        .any(|r| r.contains("EMA 9 > 21 > 50")));
}

#[test]
fn neutral_band_holds_small_scores() {
    let config = PredictionConfig {
        technical_weight: 0.5,
        sentiment_weight: 0.5,
        neutral_band: 20.0,
    };
    let engine = PredictionEngine::new(config);
    let result = engine.predict("AAPL", &[], None, Some(30.0));
    // Combined = 15, inside the +/-20 band.
    assert_eq!(result.direction, PredictionDirection::Neutral);
    assert!((result.confidence - 15.0).abs() < 1e-9);
}
