//! ATR (Average True Range) indicator
//!
//! Wilder smoothing of True Range = max(high - low, |high - prevClose|,
//! |low - prevClose|). Reported only once `period` sealed bars exist. Also
//! keeps a short rolling mean of confirmed values as the price-velocity
//! proxy for time-to-target estimates.

use std::collections::VecDeque;

const VELOCITY_LOOKBACK: usize = 20;

pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtrState {
    period: usize,
    prev_close: Option<f64>,
    atr: Option<f64>,
    bars_seen: usize,
    recent: VecDeque<f64>,
}

impl AtrState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            atr: None,
            bars_seen: 0,
            recent: VecDeque::with_capacity(VELOCITY_LOOKBACK),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        self.bars_seen += 1;
        if let Some(prev) = self.prev_close {
            let tr = true_range(high, low, prev);
            self.atr = Some(match self.atr {
                Some(atr) => (atr * (self.period as f64 - 1.0) + tr) / self.period as f64,
                None => tr,
            });
        }
        self.prev_close = Some(close);

        let value = self.value();
        if let Some(v) = value {
            self.recent.push_back(v);
            if self.recent.len() > VELOCITY_LOOKBACK {
                self.recent.pop_front();
            }
        }
        value
    }

    pub fn value(&self) -> Option<f64> {
        if self.bars_seen < self.period {
            return None;
        }
        self.atr
    }

    /// Mean confirmed ATR over the recent lookback: expected price movement
    /// per bar.
    pub fn velocity(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        Some(self.recent.iter().sum::<f64>() / self.recent.len() as f64)
    }
}
