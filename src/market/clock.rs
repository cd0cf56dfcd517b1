//! Market clock: exchange sessions and local time-of-day
//!
//! Stateless: every query recomputes from the instant. Offsets are fixed per
//! exchange; DST-accurate holiday calendars belong to the market-calendar
//! collaborator, which can replace [`ExchangeClock`] behind [`MarketCalendar`].

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Nse,
    Nyse,
    Nasdaq,
    Lse,
}

impl Exchange {
    /// Map a symbol to its home exchange by suffix convention.
    pub fn for_symbol(symbol: &str) -> Exchange {
        if symbol.ends_with(".NS")
            || symbol.ends_with(".BO")
            || matches!(symbol, "^NSEI" | "^NSEBANK" | "^BSESN")
        {
            Exchange::Nse
        } else if symbol.ends_with(".L") {
            Exchange::Lse
        } else {
            Exchange::Nyse
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        let secs = match self {
            Exchange::Nse => 5 * 3600 + 1800,
            Exchange::Nyse | Exchange::Nasdaq => -5 * 3600,
            Exchange::Lse => 0,
        };
        FixedOffset::east_opt(secs).expect("offset in range")
    }

    /// Regular session bounds as local (hour, minute) pairs.
    fn session_bounds(&self) -> ((u32, u32), (u32, u32)) {
        match self {
            Exchange::Nse => ((9, 15), (15, 30)),
            Exchange::Nyse | Exchange::Nasdaq => ((9, 30), (16, 0)),
            Exchange::Lse => ((8, 0), (16, 30)),
        }
    }
}

/// Recomputed per query; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSession {
    pub exchange: Exchange,
    pub is_open: bool,
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
}

/// Seam for the market-calendar collaborator.
pub trait MarketCalendar: Send + Sync {
    /// Whether the exchange is open at `instant`, plus the local time-of-day.
    fn session(&self, exchange: Exchange, instant: DateTime<Utc>) -> MarketSession;

    /// UTC instant of the session open on `instant`'s local trading day.
    /// None on weekends.
    fn session_open_instant(
        &self,
        exchange: Exchange,
        instant: DateTime<Utc>,
    ) -> Option<DateTime<Utc>>;

    fn is_open(&self, exchange: Exchange, instant: DateTime<Utc>) -> bool {
        self.session(exchange, instant).is_open
    }
}

/// Built-in fixed-offset session table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeClock;

impl MarketCalendar for ExchangeClock {
    fn session(&self, exchange: Exchange, instant: DateTime<Utc>) -> MarketSession {
        let local = instant.with_timezone(&exchange.utc_offset());
        let weekday = local.weekday();
        let ((oh, om), (ch, cm)) = exchange.session_bounds();

        let minute_of_day = local.hour() * 60 + local.minute();
        let is_weekday = !matches!(weekday, Weekday::Sat | Weekday::Sun);
        let is_open =
            is_weekday && minute_of_day >= oh * 60 + om && minute_of_day <= ch * 60 + cm;

        MarketSession {
            exchange,
            is_open,
            hour: local.hour(),
            minute: local.minute(),
            weekday,
        }
    }

    fn session_open_instant(
        &self,
        exchange: Exchange,
        instant: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let offset = exchange.utc_offset();
        let local = instant.with_timezone(&offset);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return None;
        }
        let ((oh, om), _) = exchange.session_bounds();
        let open_naive = local.date_naive().and_hms_opt(oh, om, 0)?;
        offset
            .from_local_datetime(&open_naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
