//! Signal, target and prediction data models

use crate::models::market::SymbolKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of built-in strategies. New strategies extend this
/// enumeration: there is no ad hoc registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    ProMtf,
    VwapEma,
    RsiReversal,
    BollingerBreakout,
    MacdCross,
    SupertrendScalper,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::ProMtf,
        StrategyId::VwapEma,
        StrategyId::RsiReversal,
        StrategyId::BollingerBreakout,
        StrategyId::MacdCross,
        StrategyId::SupertrendScalper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyId::ProMtf => "Pro MTF",
            StrategyId::VwapEma => "VWAP + EMA",
            StrategyId::RsiReversal => "RSI Reversal",
            StrategyId::BollingerBreakout => "Bollinger Breakout",
            StrategyId::MacdCross => "MACD Crossover",
            StrategyId::SupertrendScalper => "ST Scalper",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyId::ProMtf => {
                "EMA 9/21 cross + RSI + EMA 200 trend + Supertrend. Best for swing trading."
            }
            StrategyId::VwapEma => {
                "Price vs VWAP crossover + EMA 9/21 direction + RSI. Classic intraday."
            }
            StrategyId::RsiReversal => {
                "RSI exits oversold (<30) or overbought (>70) zones with EMA 50 filter."
            }
            StrategyId::BollingerBreakout => {
                "Price breaks Bollinger Band + RSI momentum + volume spike confirmation."
            }
            StrategyId::MacdCross => "MACD crosses Signal line + histogram confirms + RSI filter.",
            StrategyId::SupertrendScalper => {
                "Fast Supertrend(2,7) direction flip + RSI confirmation. Most signals."
            }
        }
    }

    pub fn signals_per_day(&self) -> &'static str {
        match self {
            StrategyId::ProMtf => "1-3",
            StrategyId::VwapEma => "4-6",
            StrategyId::RsiReversal => "3-6",
            StrategyId::BollingerBreakout => "4-6",
            StrategyId::MacdCross => "4-6",
            StrategyId::SupertrendScalper => "6-12",
        }
    }

    pub fn style(&self) -> &'static str {
        match self {
            StrategyId::ProMtf => "Swing",
            StrategyId::VwapEma => "Intraday",
            StrategyId::RsiReversal => "Mean Reversion",
            StrategyId::BollingerBreakout => "Breakout",
            StrategyId::MacdCross => "Trend",
            StrategyId::SupertrendScalper => "Scalping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Estimated time until TP1 is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeToTarget {
    Within { minutes: u64 },
    /// Velocity too low for the distance: no bounded estimate is reported.
    Unbounded,
}

/// Profit/stop levels attached to exactly one signal, computed once at
/// emission time from entry price and current ATR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub tp1: f64,
    pub tp2: f64,
    pub sl: f64,
    pub eta: TimeToTarget,
}

/// One emitted strategy signal. Immutable once emitted; superseded, never
/// mutated, by a later signal for the same key + strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub key: SymbolKey,
    pub strategy: StrategyId,
    pub side: Side,
    pub entry_price: f64,
    pub rsi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    /// 0-100, derived from RSI distance from neutral.
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    /// None when ATR history is insufficient: the signal is target-pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// Fused technical + sentiment forecast. Derived, recomputed on demand,
/// never authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub symbol: String,
    pub direction: PredictionDirection,
    /// 0-100.
    pub confidence: f64,
    /// Contributing technical score in [-100, 100].
    pub technical_score: f64,
    /// Contributing sentiment score in [-100, 100]; 0 when missing or stale.
    pub sentiment_score: f64,
    pub bull_reasons: Vec<String>,
    pub bear_reasons: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
