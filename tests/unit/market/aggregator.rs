//! Unit tests for the bar aggregator

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tradepulse::error::TickRejection;
use tradepulse::market::aggregator::BarAggregator;
use tradepulse::market::clock::ExchangeClock;
use tradepulse::models::market::{BarEvent, Interval, SymbolKey, Tick};

fn session_open() -> DateTime<Utc> {
    // Monday 2026-01-05, 09:30 New York == 14:30 UTC.
    Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap()
}

fn aggregator(retention: usize) -> BarAggregator {
    BarAggregator::new(
        SymbolKey::new("AAPL", Interval::M5),
        retention,
        Arc::new(ExchangeClock),
    )
}

fn tick_at(price: f64, volume: f64, offset_secs: i64) -> Tick {
    Tick::new(
        "AAPL",
        price,
        volume,
        session_open() + Duration::seconds(offset_secs),
    )
}

#[test]
fn four_ticks_build_one_bar() {
    let mut agg = aggregator(250);
    for (i, price) in [100.0, 102.0, 99.0, 101.0].iter().enumerate() {
        let event = agg.ingest(&tick_at(*price, 10.0, i as i64 * 60)).unwrap();
        let BarEvent::Updated { bar } = event else {
            panic!("expected UPDATED inside one window");
        };
        assert_eq!(bar.open, 100.0);
        assert!(!bar.sealed);
    }

    // Next window seals the bar: open 100, high 102, low 99, close 101.
    let event = agg.ingest(&tick_at(105.0, 10.0, 5 * 60)).unwrap();
    let BarEvent::Closed { sealed, opened } = event else {
        panic!("expected CLOSED on window rollover");
    };
    assert!(sealed.sealed);
    assert_eq!(sealed.open, 100.0);
    assert_eq!(sealed.high, 102.0);
    assert_eq!(sealed.low, 99.0);
    assert_eq!(sealed.close, 101.0);
    assert_eq!(sealed.volume, 40.0);
    assert_eq!(sealed.open_time, session_open());

    assert_eq!(opened.open, 105.0);
    assert_eq!(opened.open_time, session_open() + Duration::minutes(5));
    assert_eq!(agg.history().len(), 1);
}

#[test]
fn duplicate_tick_is_dropped() {
    let mut agg = aggregator(250);
    agg.ingest(&tick_at(100.0, 10.0, 0)).unwrap();
    let err = agg.ingest(&tick_at(100.0, 10.0, 0)).unwrap_err();
    assert!(matches!(err, TickRejection::Duplicate(_)));
    assert!(err.is_recoverable());
    // One mutation, not two.
    assert_eq!(agg.live_bar().unwrap().volume, 10.0);
}

#[test]
fn out_of_order_tick_leaves_state_unchanged() {
    let mut agg = aggregator(250);
    agg.ingest(&tick_at(100.0, 10.0, 60)).unwrap();
    let before = agg.live_bar().unwrap().clone();

    let err = agg.ingest(&tick_at(250.0, 99.0, 30)).unwrap_err();
    assert!(matches!(err, TickRejection::OutOfOrder { .. }));
    assert!(err.is_recoverable());
    assert_eq!(agg.live_bar().unwrap(), &before);
    assert!(agg.history().is_empty());
}

#[test]
fn malformed_ticks_are_tagged() {
    let mut agg = aggregator(250);
    let err = agg.ingest(&tick_at(-1.0, 10.0, 0)).unwrap_err();
    assert!(matches!(err, TickRejection::NonPositivePrice(_)));
    assert!(!err.is_recoverable());

    let err = agg.ingest(&tick_at(100.0, -5.0, 0)).unwrap_err();
    assert!(matches!(err, TickRejection::NegativeVolume(_)));

    let err = agg.ingest(&tick_at(f64::NAN, 10.0, 0)).unwrap_err();
    assert!(matches!(err, TickRejection::NonFinite));

    // Rejections never opened a bar.
    assert!(agg.live_bar().is_none());
}

#[test]
fn gaps_are_not_backfilled() {
    let mut agg = aggregator(250);
    agg.ingest(&tick_at(100.0, 10.0, 0)).unwrap();

    // Next tick three windows later: exactly one sealed bar, no synthetic
    // bars for the two empty windows.
    let event = agg.ingest(&tick_at(101.0, 10.0, 15 * 60)).unwrap();
    let BarEvent::Closed { opened, .. } = event else {
        panic!("expected CLOSED across the gap");
    };
    assert_eq!(opened.open_time, session_open() + Duration::minutes(15));
    assert_eq!(agg.history().len(), 1);
}

#[test]
fn sealed_bars_satisfy_ohlc_invariants() {
    let mut agg = aggregator(250);
    let mut price = 100.0;
    for i in 0..600 {
        // Deterministic walk with both up and down moves.
        price += ((i * 7 + 3) % 11) as f64 - 5.0;
        let _ = agg.ingest(&tick_at(price.max(1.0), 5.0, i * 60));
    }
    assert!(!agg.history().is_empty());
    for bar in agg.history() {
        assert!(bar.sealed);
        assert!(bar.low <= bar.open && bar.open <= bar.high);
        assert!(bar.low <= bar.close && bar.close <= bar.high);
    }
}

#[test]
fn history_is_bounded_by_retention() {
    let mut agg = aggregator(10);
    // One tick per window: each new window seals the previous bar.
    for i in 0..16 {
        agg.ingest(&tick_at(100.0 + i as f64, 1.0, i * 300)).unwrap();
    }
    assert_eq!(agg.history().len(), 10);
    // Oldest sealed bars were evicted: the front is window #5.
    assert_eq!(
        agg.history().front().unwrap().open_time,
        session_open() + Duration::minutes(25)
    );
}

#[test]
fn flush_seals_the_live_bar() {
    let mut agg = aggregator(250);
    agg.ingest(&tick_at(100.0, 10.0, 0)).unwrap();
    let sealed = agg.flush().unwrap();
    assert!(sealed.sealed);
    assert_eq!(agg.history().len(), 1);
    assert!(agg.live_bar().is_none());
    assert!(agg.flush().is_none());
}

#[test]
fn intraday_windows_align_to_session_open() {
    let mut agg = aggregator(250);
    // 14:33 UTC sits in the window opened at the 14:30 session open, not at
    // a UTC-midnight-aligned boundary.
    let event = agg.ingest(&tick_at(100.0, 1.0, 3 * 60)).unwrap();
    assert_eq!(event.live_bar().open_time, session_open());
}

#[test]
fn weekend_ticks_fall_back_to_utc_alignment() {
    let mut agg = aggregator(250);
    // Saturday: no session, so the window truncates on the UTC grid.
    let saturday = Utc.with_ymd_and_hms(2026, 1, 3, 10, 3, 0).unwrap();
    let event = agg
        .ingest(&Tick::new("AAPL", 100.0, 1.0, saturday))
        .unwrap();
    assert_eq!(
        event.live_bar().open_time,
        Utc.with_ymd_and_hms(2026, 1, 3, 10, 0, 0).unwrap()
    );
}
