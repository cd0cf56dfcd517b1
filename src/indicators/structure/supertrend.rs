//! SuperTrend indicator
//!
//! ATR-band trend overlay. Bands ratchet: the lower band only tightens
//! upward, the upper band only tightens downward (releasing when the prior
//! close already sat beyond it). Direction is sticky: it flips only when
//! the close strictly crosses the opposite band, never on a touch.

use crate::indicators::volatility::atr::AtrState;
use crate::models::indicators::{SupertrendValue, TrendDirection};

#[derive(Debug, Clone, PartialEq)]
pub struct SupertrendState {
    multiplier: f64,
    atr: AtrState,
    upper: f64,
    lower: f64,
    direction: Option<TrendDirection>,
    prev_close: Option<f64>,
}

impl SupertrendState {
    pub fn new(multiplier: f64, atr_period: usize) -> Self {
        Self {
            multiplier,
            atr: AtrState::new(atr_period),
            upper: 0.0,
            lower: 0.0,
            direction: None,
            prev_close: None,
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<SupertrendValue> {
        let atr = self.atr.update(high, low, close);
        let Some(atr) = atr else {
            self.prev_close = Some(close);
            return None;
        };

        let hl2 = (high + low) / 2.0;
        let raw_upper = hl2 + self.multiplier * atr;
        let raw_lower = hl2 - self.multiplier * atr;

        match (self.direction, self.prev_close) {
            (Some(direction), Some(prev_close)) => {
                if raw_lower > self.lower || prev_close < self.lower {
                    self.lower = raw_lower;
                }
                if raw_upper < self.upper || prev_close > self.upper {
                    self.upper = raw_upper;
                }
                let next = match direction {
                    TrendDirection::Bearish if close > self.upper => TrendDirection::Bullish,
                    TrendDirection::Bullish if close < self.lower => TrendDirection::Bearish,
                    unchanged => unchanged,
                };
                self.direction = Some(next);
            }
            _ => {
                // First bar with a defined ATR: bearish until proven otherwise.
                self.upper = raw_upper;
                self.lower = raw_lower;
                self.direction = Some(TrendDirection::Bearish);
            }
        }

        self.prev_close = Some(close);
        self.value()
    }

    pub fn value(&self) -> Option<SupertrendValue> {
        self.direction.map(|direction| SupertrendValue {
            value: match direction {
                TrendDirection::Bullish => self.lower,
                TrendDirection::Bearish => self.upper,
            },
            direction,
        })
    }
}
