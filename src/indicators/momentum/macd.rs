//! MACD (Moving Average Convergence Divergence) indicator
//!
//! MACD = EMA(fast) - EMA(slow); Signal = EMA(signal) of MACD;
//! Histogram = MACD - Signal.

use crate::indicators::trend::ema::EmaState;
use crate::models::indicators::MacdValue;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdState {
    fast: EmaState,
    slow: EmaState,
    signal: EmaState,
    last: Option<MacdValue>,
}

impl MacdState {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: EmaState::new(fast),
            slow: EmaState::new(slow),
            signal: EmaState::new(signal),
            last: None,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<MacdValue> {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        if let (Some(fast), Some(slow)) = (fast, slow) {
            let line = fast - slow;
            if let Some(signal) = self.signal.update(line) {
                self.last = Some(MacdValue {
                    line,
                    signal,
                    histogram: line - signal,
                });
            }
        }
        self.last
    }

    pub fn value(&self) -> Option<MacdValue> {
        self.last
    }

    /// Tentative MACD with the live close. Confirmed state is untouched.
    pub fn peek(&self, live_close: f64) -> Option<MacdValue> {
        let line = self.fast.peek(live_close)? - self.slow.peek(live_close)?;
        let signal = self.signal.peek(line)?;
        Some(MacdValue {
            line,
            signal,
            histogram: line - signal,
        })
    }
}
