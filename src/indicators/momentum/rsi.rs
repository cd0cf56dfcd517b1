//! RSI (Relative Strength Index) indicator
//!
//! Wilder smoothing of average gains/losses: each average follows
//! `avg_t = (avg_{t-1} * (period - 1) + x_t) / period` from the first delta.
//! The value is reported only once `period` sealed closes exist.

/// Incremental RSI state over sealed closes.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiState {
    period: usize,
    prev_close: Option<f64>,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    bars_seen: usize,
}

impl RsiState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            avg_gain: None,
            avg_loss: None,
            bars_seen: 0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        self.bars_seen += 1;
        if let Some(prev) = self.prev_close {
            let delta = close - prev;
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            self.avg_gain = Some(self.smooth(self.avg_gain, gain));
            self.avg_loss = Some(self.smooth(self.avg_loss, loss));
        }
        self.prev_close = Some(close);
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.bars_seen < self.period {
            return None;
        }
        Self::rsi_from(self.avg_gain?, self.avg_loss?)
    }

    /// Tentative value with the live bar's close as one more delta.
    /// Confirmed state is untouched.
    pub fn peek(&self, live_close: f64) -> Option<f64> {
        if self.bars_seen < self.period {
            return None;
        }
        let prev = self.prev_close?;
        let delta = live_close - prev;
        let gain = self.smooth(self.avg_gain, delta.max(0.0));
        let loss = self.smooth(self.avg_loss, (-delta).max(0.0));
        Self::rsi_from(gain, loss)
    }

    fn smooth(&self, prev: Option<f64>, x: f64) -> f64 {
        match prev {
            Some(avg) => (avg * (self.period as f64 - 1.0) + x) / self.period as f64,
            None => x,
        }
    }

    fn rsi_from(avg_gain: f64, avg_loss: f64) -> Option<f64> {
        if avg_loss == 0.0 {
            // No losses in the lookback: momentum is fully one-sided.
            return Some(100.0);
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}
