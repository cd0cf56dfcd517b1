//! Strategy evaluation engine
//!
//! Each strategy is a pure function of one sealed bar plus the aligned
//! (previous, current) indicator snapshots: no strategy holds state of its
//! own, so replaying the same history always yields the same signals. A
//! strategy fires at most once per bar close and never on intra-bar updates.

use crate::models::indicators::{IndicatorSnapshot, TrendDirection};
use crate::models::market::{Bar, SymbolKey};
use crate::models::signal::{Side, Signal, StrategyId};

/// Already-aligned inputs for one sealed-bar evaluation. The engine is the
/// single point responsible for temporal alignment; strategies never
/// re-resolve timestamps themselves.
pub struct StrategyContext<'a> {
    pub key: &'a SymbolKey,
    pub bar: &'a Bar,
    pub current: &'a IndicatorSnapshot,
    pub previous: &'a IndicatorSnapshot,
}

fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}

pub struct StrategyEngine;

impl StrategyEngine {
    /// Evaluate all six strategies against one sealed bar. Strategies are
    /// independent: several may fire on the same bar and none suppresses
    /// another.
    pub fn evaluate(ctx: &StrategyContext<'_>) -> Vec<Signal> {
        StrategyId::ALL
            .iter()
            .filter_map(|&strategy| {
                Self::fire(strategy, ctx).map(|side| Self::build_signal(ctx, strategy, side))
            })
            .collect()
    }

    fn fire(strategy: StrategyId, ctx: &StrategyContext<'_>) -> Option<Side> {
        match strategy {
            StrategyId::ProMtf => Self::pro_mtf(ctx),
            StrategyId::VwapEma => Self::vwap_ema(ctx),
            StrategyId::RsiReversal => Self::rsi_reversal(ctx),
            StrategyId::BollingerBreakout => Self::bollinger_breakout(ctx),
            StrategyId::MacdCross => Self::macd_cross(ctx),
            StrategyId::SupertrendScalper => Self::supertrend_scalper(ctx),
        }
    }

    /// EMA 9/21 crossover + RSI 50 + EMA 200 trend + Supertrend confirm.
    fn pro_mtf(ctx: &StrategyContext<'_>) -> Option<Side> {
        let cur = ctx.current;
        let prev = ctx.previous;
        let (e9, e21, e200) = (cur.ema9?, cur.ema21?, cur.ema200?);
        let (p9, p21) = (prev.ema9?, prev.ema21?);
        let rsi = cur.rsi14?;
        let trend = cur.supertrend?.direction;
        let close = ctx.bar.close;

        if crossed_above(p9, p21, e9, e21)
            && rsi > 50.0
            && close > e200
            && trend == TrendDirection::Bullish
        {
            Some(Side::Buy)
        } else if crossed_below(p9, p21, e9, e21)
            && rsi < 50.0
            && close < e200
            && trend == TrendDirection::Bearish
        {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Price vs VWAP crossover + EMA 9/21 direction + RSI momentum.
    fn vwap_ema(ctx: &StrategyContext<'_>) -> Option<Side> {
        let cur = ctx.current;
        let prev = ctx.previous;
        let (vwap, prev_vwap) = (cur.vwap?, prev.vwap?);
        let (e9, e21) = (cur.ema9?, cur.ema21?);
        let rsi = cur.rsi14?;
        let close = ctx.bar.close;

        if crossed_above(prev.close, prev_vwap, close, vwap) && e9 > e21 && rsi > 50.0 {
            Some(Side::Buy)
        } else if crossed_below(prev.close, prev_vwap, close, vwap) && e9 < e21 && rsi < 50.0 {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// RSI re-crosses back through an extreme after being beyond it, with an
    /// EMA 50 trend filter.
    fn rsi_reversal(ctx: &StrategyContext<'_>) -> Option<Side> {
        let cur = ctx.current;
        let rsi = cur.rsi14?;
        let prev_rsi = ctx.previous.rsi14?;
        let e50 = cur.ema50?;
        let close = ctx.bar.close;

        if prev_rsi < 30.0 && rsi >= 30.0 && close > e50 {
            Some(Side::Buy)
        } else if prev_rsi > 70.0 && rsi <= 70.0 && close < e50 {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Close breaks outside a Bollinger band + RSI momentum + volume spike.
    fn bollinger_breakout(ctx: &StrategyContext<'_>) -> Option<Side> {
        let cur = ctx.current;
        let prev = ctx.previous;
        let bands = cur.bollinger?;
        let prev_bands = prev.bollinger?;
        let rsi = cur.rsi14?;
        let volume_ma = cur.volume_ma20?;
        let close = ctx.bar.close;
        let volume_ok = ctx.bar.volume > volume_ma * 1.3;

        if prev.close <= prev_bands.upper && close > bands.upper && rsi > 55.0 && volume_ok {
            Some(Side::Buy)
        } else if prev.close >= prev_bands.lower && close < bands.lower && rsi < 45.0 && volume_ok
        {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// MACD crosses its signal line + histogram confirms + RSI filter.
    fn macd_cross(ctx: &StrategyContext<'_>) -> Option<Side> {
        let macd = ctx.current.macd?;
        let prev_macd = ctx.previous.macd?;
        let rsi = ctx.current.rsi14?;

        if crossed_above(prev_macd.line, prev_macd.signal, macd.line, macd.signal)
            && macd.histogram > 0.0
            && rsi > 50.0
        {
            Some(Side::Buy)
        } else if crossed_below(prev_macd.line, prev_macd.signal, macd.line, macd.signal)
            && macd.histogram < 0.0
            && rsi < 50.0
        {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Fast Supertrend(2, 7) direction flip + RSI confirmation.
    fn supertrend_scalper(ctx: &StrategyContext<'_>) -> Option<Side> {
        let cur = ctx.current.supertrend_fast?.direction;
        let prev = ctx.previous.supertrend_fast?.direction;
        let rsi = ctx.current.rsi14?;

        if prev == TrendDirection::Bearish && cur == TrendDirection::Bullish && rsi > 45.0 {
            Some(Side::Buy)
        } else if prev == TrendDirection::Bullish && cur == TrendDirection::Bearish && rsi < 55.0 {
            Some(Side::Sell)
        } else {
            None
        }
    }

    fn build_signal(ctx: &StrategyContext<'_>, strategy: StrategyId, side: Side) -> Signal {
        let rsi = ctx.current.rsi14.unwrap_or(50.0);
        Signal {
            key: ctx.key.clone(),
            strategy,
            side,
            entry_price: ctx.bar.close,
            rsi,
            atr: ctx.current.atr14,
            confidence: Self::confidence(rsi, side),
            // Data-derived so identical histories emit identical signals.
            timestamp: ctx.bar.open_time,
            target: None,
        }
    }

    /// Confidence 0-100 from RSI distance to neutral: further past 50 in the
    /// trade direction means higher conviction, capped at 95.
    fn confidence(rsi: f64, side: Side) -> f64 {
        let dist = match side {
            Side::Buy => (rsi - 50.0).max(0.0),
            Side::Sell => (50.0 - rsi).max(0.0),
        };
        (50.0 + dist * 1.8).min(95.0)
    }
}
