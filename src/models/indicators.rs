use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sticky trend direction produced by the Supertrend overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupertrendValue {
    /// The active band: lower band while bullish, upper band while bearish.
    pub value: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Immutable value-set snapshot of every indicator for one key at one instant.
///
/// Fields stay `None` until the indicator's warm-up is satisfied; nothing is
/// fabricated from insufficient history. Safe to serialize verbatim for the
/// transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Open time of the bar this snapshot is aligned to.
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
    /// True when derived from the live partial bar rather than a sealed one.
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema9: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema21: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr14: Option<f64>,
    /// Mean ATR over the recent lookback: the price-velocity proxy used for
    /// time-to-target estimation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr_per_bar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supertrend: Option<SupertrendValue>,
    /// Fast Supertrend(2.0, 7): feeds the scalper strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supertrend_fast: Option<SupertrendValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_5bar_pct: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn empty(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
            live: false,
            ema9: None,
            ema21: None,
            ema50: None,
            ema200: None,
            rsi14: None,
            atr14: None,
            atr_per_bar: None,
            macd: None,
            bollinger: None,
            vwap: None,
            volume_ma20: None,
            supertrend: None,
            supertrend_fast: None,
            momentum_5bar_pct: None,
        }
    }
}
