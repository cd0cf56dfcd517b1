//! Bar aggregator: one live-bar state machine per (symbol, interval) key
//!
//! Owns the only mutable bar state for its key. Downstream components receive
//! sealed bars and cloned snapshots, never references into the live bar.

use crate::error::TickRejection;
use crate::market::clock::{Exchange, MarketCalendar};
use crate::models::market::{Bar, BarEvent, Interval, SymbolKey, Tick};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct BarAggregator {
    key: SymbolKey,
    exchange: Exchange,
    calendar: Arc<dyn MarketCalendar>,
    live: Option<Bar>,
    history: VecDeque<Bar>,
    last_tick_at: Option<DateTime<Utc>>,
    retention: usize,
}

impl BarAggregator {
    pub fn new(key: SymbolKey, retention: usize, calendar: Arc<dyn MarketCalendar>) -> Self {
        let exchange = Exchange::for_symbol(&key.symbol);
        Self {
            key,
            exchange,
            calendar,
            live: None,
            history: VecDeque::with_capacity(retention),
            last_tick_at: None,
            retention,
        }
    }

    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Ordered, append-only sealed-bar history (bounded to the retention
    /// window). Timestamps are ordered but not necessarily contiguous -
    /// quiet windows are not back-filled.
    pub fn history(&self) -> &VecDeque<Bar> {
        &self.history
    }

    pub fn live_bar(&self) -> Option<&Bar> {
        self.live.as_ref()
    }

    /// Seed sealed history from the bar-history collaborator on startup.
    /// Bars are assumed ordered by open time; anything beyond retention is
    /// dropped from the old end.
    pub fn seed_history(&mut self, bars: impl IntoIterator<Item = Bar>) {
        for bar in bars {
            self.history.push_back(bar.into_sealed());
        }
        while self.history.len() > self.retention {
            self.history.pop_front();
        }
    }

    /// Apply one tick. Returns the resulting bar event, or the tagged reason
    /// the tick was not applied. Rejections leave all state untouched.
    pub fn ingest(&mut self, tick: &Tick) -> Result<BarEvent, TickRejection> {
        if !tick.price.is_finite() || !tick.volume.is_finite() {
            return Err(TickRejection::NonFinite);
        }
        if tick.price <= 0.0 {
            return Err(TickRejection::NonPositivePrice(tick.price));
        }
        if tick.volume < 0.0 {
            return Err(TickRejection::NegativeVolume(tick.volume));
        }
        if let Some(last) = self.last_tick_at {
            if tick.timestamp == last {
                return Err(TickRejection::Duplicate(last));
            }
            if tick.timestamp < last {
                return Err(TickRejection::OutOfOrder {
                    last,
                    got: tick.timestamp,
                });
            }
        }

        let window = self.window_start(tick.timestamp);
        self.last_tick_at = Some(tick.timestamp);

        match self.live.take() {
            None => {
                let bar = Bar::open_at(window, tick.price, tick.volume);
                self.live = Some(bar.clone());
                Ok(BarEvent::Updated { bar })
            }
            Some(mut bar) if window <= bar.open_time => {
                bar.apply_tick(tick.price, tick.volume);
                self.live = Some(bar.clone());
                Ok(BarEvent::Updated { bar })
            }
            Some(bar) => {
                // Tick belongs to a later window: seal the current bar and
                // open its successor from this tick. Skipped windows stay
                // absent from history.
                let sealed = bar.into_sealed();
                self.history.push_back(sealed.clone());
                while self.history.len() > self.retention {
                    self.history.pop_front();
                }
                let opened = Bar::open_at(window, tick.price, tick.volume);
                self.live = Some(opened.clone());
                Ok(BarEvent::Closed { sealed, opened })
            }
        }
    }

    /// Seal the live bar without waiting for the next window's tick.
    pub fn flush(&mut self) -> Option<Bar> {
        let sealed = self.live.take()?.into_sealed();
        self.history.push_back(sealed.clone());
        while self.history.len() > self.retention {
            self.history.pop_front();
        }
        Some(sealed)
    }

    /// Window start for a tick: session-open-aligned truncation for intraday
    /// intervals, exchange-local day/week truncation otherwise. Falls back to
    /// plain UTC truncation outside known sessions.
    fn window_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self.key.interval.wall_minutes() {
            Some(mins) => {
                let width = mins * 60;
                if let Some(open) = self.calendar.session_open_instant(self.exchange, ts) {
                    if ts >= open {
                        let elapsed = (ts - open).num_seconds();
                        return open + Duration::seconds(elapsed - elapsed % width);
                    }
                }
                let secs = ts.timestamp();
                DateTime::<Utc>::from_timestamp(secs - secs.rem_euclid(width), 0).unwrap_or(ts)
            }
            None => {
                let offset = self.exchange.utc_offset();
                let local = ts.with_timezone(&offset);
                let mut date = local.date_naive();
                if self.key.interval == Interval::W1 {
                    date -= Duration::days(local.weekday().num_days_from_monday() as i64);
                }
                date.and_hms_opt(0, 0, 0)
                    .and_then(|naive| offset.from_local_datetime(&naive).single())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(ts)
            }
        }
    }
}
