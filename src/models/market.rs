use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval. Closed set: every streaming lane is keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1wk")]
    W1,
}

impl Interval {
    /// Wall-clock width of one intraday bar window, in minutes.
    /// Daily and weekly bars are calendar-aligned, not fixed-width.
    pub fn wall_minutes(&self) -> Option<i64> {
        match self {
            Interval::M1 => Some(1),
            Interval::M2 => Some(2),
            Interval::M5 => Some(5),
            Interval::M15 => Some(15),
            Interval::M30 => Some(30),
            Interval::H1 => Some(60),
            Interval::D1 | Interval::W1 => None,
        }
    }

    /// Expected trading minutes covered by one bar. Daily bars span one
    /// regular session (390 min), weekly bars five.
    pub fn trading_minutes(&self) -> u64 {
        match self {
            Interval::M1 => 1,
            Interval::M2 => 2,
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::M30 => 30,
            Interval::H1 => 60,
            Interval::D1 => 390,
            Interval::W1 => 1950,
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.wall_minutes().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M2 => "2m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::M1),
            "2m" => Ok(Interval::M2),
            "5m" => Ok(Interval::M5),
            "15m" => Ok(Interval::M15),
            "30m" => Ok(Interval::M30),
            "1h" | "60m" => Ok(Interval::H1),
            "1d" => Ok(Interval::D1),
            "1wk" => Ok(Interval::W1),
            other => Err(format!("unknown interval '{}'", other)),
        }
    }
}

/// Identifies one streaming pipeline instance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolKey {
    pub symbol: String,
    pub interval: Interval,
}

impl SymbolKey {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
        }
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.interval)
    }
}

/// One price update from the data source collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, volume: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            timestamp,
        }
    }
}

/// One OHLC candle. `open` is fixed once set; a sealed bar is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub sealed: bool,
}

impl Bar {
    /// Open a fresh bar from the first tick inside a new window.
    pub fn open_at(open_time: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            open_time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
            sealed: false,
        }
    }

    /// Fold a tick into the live bar. Maintains `low <= {open, close} <= high`.
    pub fn apply_tick(&mut self, price: f64, volume: f64) {
        debug_assert!(!self.sealed, "sealed bars are immutable");
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        self.volume += volume;
    }

    /// Consume the live bar into its sealed, immutable form.
    pub fn into_sealed(mut self) -> Self {
        self.sealed = true;
        self
    }
}

/// Output of one `ingest` call on the bar aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum BarEvent {
    /// The tick fell inside the current window and mutated the live bar.
    Updated { bar: Bar },
    /// The tick opened a new window: the previous bar is sealed and the
    /// successor bar (seeded from this tick) is already live.
    Closed { sealed: Bar, opened: Bar },
}

impl BarEvent {
    /// The bar downstream consumers should treat as "current" after this event.
    pub fn live_bar(&self) -> &Bar {
        match self {
            BarEvent::Updated { bar } => bar,
            BarEvent::Closed { opened, .. } => opened,
        }
    }
}
