//! Unit tests for the streaming RSI

use tradepulse::indicators::momentum::rsi::RsiState;

#[test]
fn undefined_until_period_boundary() {
    let mut rsi = RsiState::new(14);
    for i in 0..13 {
        assert_eq!(rsi.update(100.0 + i as f64), None, "bar {}", i + 1);
    }
    // Defined exactly at the 14th sealed close.
    assert!(rsi.update(113.0).is_some());
}

#[test]
fn all_gains_pin_to_one_hundred() {
    let mut rsi = RsiState::new(14);
    let mut value = None;
    for i in 0..20 {
        value = rsi.update(100.0 + i as f64);
    }
    assert_eq!(value, Some(100.0));
}

#[test]
fn all_losses_pin_to_zero() {
    let mut rsi = RsiState::new(14);
    let mut value = None;
    for i in 0..20 {
        value = rsi.update(100.0 - i as f64);
    }
    assert_eq!(value, Some(0.0));
}

#[test]
fn mixed_series_stays_in_band() {
    let mut rsi = RsiState::new(14);
    let mut value = None;
    for i in 0..50 {
        // Upward drift with pullbacks: gains outweigh losses.
        let close = 100.0 + i as f64 * 0.5 + if i % 2 == 0 { 1.0 } else { -1.0 };
        value = rsi.update(close);
    }
    let value = value.unwrap();
    assert!(value > 0.0 && value < 100.0);
    // Net-up series leans bullish.
    assert!(value > 50.0);
}

#[test]
fn peek_does_not_mutate() {
    let mut rsi = RsiState::new(14);
    for i in 0..15 {
        rsi.update(100.0 + ((i * 3) % 5) as f64);
    }
    let confirmed = rsi.value();
    let peeked = rsi.peek(200.0);
    assert!(peeked.is_some());
    assert_ne!(peeked, confirmed);
    assert_eq!(rsi.value(), confirmed);
}
