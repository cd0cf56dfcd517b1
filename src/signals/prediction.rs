//! Prediction engine: fuses the technical read with external sentiment
//!
//! The technical score combines recent strategy agreement with an indicator
//! bias derived from the latest snapshot; sentiment arrives from the news
//! collaborator as a score in [-100, 100]. Missing or stale sentiment is
//! neutral, never an error. Results are recomputed fresh on every request.

use crate::config::PredictionConfig;
use crate::models::indicators::{IndicatorSnapshot, TrendDirection};
use crate::models::signal::{PredictionDirection, PredictionResult, Side, Signal};
use chrono::Utc;

pub struct PredictionEngine {
    config: PredictionConfig,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    /// Fuse recent signals, the indicator snapshot and sentiment into a
    /// directional prediction with confidence.
    pub fn predict(
        &self,
        symbol: &str,
        recent_signals: &[Signal],
        snapshot: Option<&IndicatorSnapshot>,
        sentiment: Option<f64>,
    ) -> PredictionResult {
        let mut bull_reasons = Vec::new();
        let mut bear_reasons = Vec::new();

        let agreement = Self::agreement_score(recent_signals, &mut bull_reasons, &mut bear_reasons);
        let bias = snapshot
            .map(|snap| Self::indicator_bias(snap, &mut bull_reasons, &mut bear_reasons));

        let technical = match (agreement, bias) {
            (Some(a), Some(b)) => (a + b) / 2.0,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => 0.0,
        };

        let sentiment_score = sentiment.unwrap_or(0.0).clamp(-100.0, 100.0);
        if sentiment_score > 30.0 {
            bull_reasons.push("News sentiment strongly positive".to_string());
        } else if sentiment_score > 10.0 {
            bull_reasons.push("News sentiment mildly positive".to_string());
        } else if sentiment_score < -30.0 {
            bear_reasons.push("News sentiment strongly negative".to_string());
        } else if sentiment_score < -10.0 {
            bear_reasons.push("News sentiment mildly negative".to_string());
        }

        let weight_sum = self.config.technical_weight + self.config.sentiment_weight;
        let combined = if weight_sum > 0.0 {
            (technical * self.config.technical_weight
                + sentiment_score * self.config.sentiment_weight)
                / weight_sum
        } else {
            0.0
        };

        let direction = if combined > self.config.neutral_band {
            PredictionDirection::Bullish
        } else if combined < -self.config.neutral_band {
            PredictionDirection::Bearish
        } else {
            PredictionDirection::Neutral
        };

        PredictionResult {
            symbol: symbol.to_string(),
            direction,
            confidence: combined.abs().clamp(0.0, 100.0),
            technical_score: technical,
            sentiment_score,
            bull_reasons,
            bear_reasons,
            timestamp: Utc::now(),
        }
    }

    /// Confidence-weighted BUY vs SELL agreement over the trailing signal
    /// window, mapped to [-100, 100]. None when no signals exist yet.
    fn agreement_score(
        signals: &[Signal],
        bull_reasons: &mut Vec<String>,
        bear_reasons: &mut Vec<String>,
    ) -> Option<f64> {
        if signals.is_empty() {
            return None;
        }
        let mut buy_weight = 0.0;
        let mut sell_weight = 0.0;
        let mut buys = 0usize;
        for signal in signals {
            match signal.side {
                Side::Buy => {
                    buy_weight += signal.confidence;
                    buys += 1;
                }
                Side::Sell => sell_weight += signal.confidence,
            }
        }
        let total = buy_weight + sell_weight;
        if total <= 0.0 {
            return None;
        }
        let score = (buy_weight - sell_weight) / total * 100.0;
        if score > 0.0 {
            bull_reasons.push(format!(
                "{} of {} recent strategy signals are BUY",
                buys,
                signals.len()
            ));
        } else if score < 0.0 {
            bear_reasons.push(format!(
                "{} of {} recent strategy signals are SELL",
                signals.len() - buys,
                signals.len()
            ));
        }
        Some(score)
    }

    /// Indicator-alignment bias in [-90, 90]. Each component that has warmed
    /// up contributes; missing values simply do not vote.
    fn indicator_bias(
        snap: &IndicatorSnapshot,
        bull_reasons: &mut Vec<String>,
        bear_reasons: &mut Vec<String>,
    ) -> f64 {
        let mut score: f64 = 0.0;
        let close = snap.close;

        if let (Some(e9), Some(e21)) = (snap.ema9, snap.ema21) {
            match snap.ema50 {
                Some(e50) if e9 > e21 && e21 > e50 => {
                    score += 28.0;
                    bull_reasons.push("EMA 9 > 21 > 50, strong uptrend alignment".to_string());
                }
                Some(e50) if e9 < e21 && e21 < e50 => {
                    score -= 28.0;
                    bear_reasons.push("EMA 9 < 21 < 50, strong downtrend alignment".to_string());
                }
                _ if e9 > e21 => {
                    score += 14.0;
                    bull_reasons.push("EMA 9 above EMA 21, short-term bullish".to_string());
                }
                _ => {
                    score -= 14.0;
                    bear_reasons.push("EMA 9 below EMA 21, short-term bearish".to_string());
                }
            }
        }

        if let Some(e200) = snap.ema200 {
            if close > e200 {
                score += 20.0;
                bull_reasons.push("Price above EMA 200, long-term uptrend".to_string());
            } else {
                score -= 20.0;
                bear_reasons.push("Price below EMA 200, long-term downtrend".to_string());
            }
        }

        if let Some(rsi) = snap.rsi14 {
            if rsi > 65.0 {
                score += 20.0;
                bull_reasons.push(format!("RSI {:.0}, strong bullish momentum", rsi));
            } else if rsi > 55.0 {
                score += 10.0;
                bull_reasons.push(format!("RSI {:.0}, moderate bullish momentum", rsi));
            } else if rsi < 35.0 {
                score -= 20.0;
                bear_reasons.push(format!("RSI {:.0}, oversold / bearish momentum", rsi));
            } else if rsi < 45.0 {
                score -= 10.0;
                bear_reasons.push(format!("RSI {:.0}, moderate bearish momentum", rsi));
            }
        }

        if let Some(st) = snap.supertrend {
            match st.direction {
                TrendDirection::Bullish => {
                    score += 20.0;
                    bull_reasons.push("Supertrend bullish, price above support line".to_string());
                }
                TrendDirection::Bearish => {
                    score -= 20.0;
                    bear_reasons.push("Supertrend bearish, price below resistance line".to_string());
                }
            }
        }

        if let Some(macd) = snap.macd {
            if macd.line > macd.signal {
                score += 16.0;
                bull_reasons.push("MACD above Signal line, bullish crossover".to_string());
            } else {
                score -= 16.0;
                bear_reasons.push("MACD below Signal line, bearish crossover".to_string());
            }
        }

        if let Some(bands) = snap.bollinger {
            let span = (bands.upper - bands.lower).max(0.01);
            let position = (close - bands.lower) / span;
            if position > 0.8 {
                bull_reasons.push("Price in upper Bollinger zone, strong momentum".to_string());
            } else if position < 0.2 {
                bear_reasons.push("Price in lower Bollinger zone, selling pressure".to_string());
            }
        }

        if let Some(chg) = snap.momentum_5bar_pct {
            if chg > 1.5 {
                score += 10.0;
                bull_reasons.push(format!("Strong 5-bar momentum +{:.1}%", chg));
            } else if chg < -1.5 {
                score -= 10.0;
                bear_reasons.push(format!("Weak 5-bar momentum {:.1}%", chg));
            }
        }

        if let Some(volume_ma) = snap.volume_ma20 {
            if snap.volume > volume_ma * 1.4 {
                if score > 0.0 {
                    bull_reasons.push("Volume spike confirms bullish move".to_string());
                } else {
                    bear_reasons.push("Volume spike on bearish move, warning".to_string());
                }
            }
        }

        score.clamp(-90.0, 90.0)
    }
}
