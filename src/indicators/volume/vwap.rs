//! Session VWAP: volume-weighted average of typical price
//!
//! Cumulative over one exchange-local trading day; resets when a bar opens
//! on a new local date.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct VwapState {
    cum_pv: f64,
    cum_volume: f64,
    session_date: Option<NaiveDate>,
}

impl VwapState {
    pub fn new() -> Self {
        Self {
            cum_pv: 0.0,
            cum_volume: 0.0,
            session_date: None,
        }
    }

    pub fn update(
        &mut self,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        session_date: NaiveDate,
    ) -> Option<f64> {
        if self.session_date != Some(session_date) {
            self.cum_pv = 0.0;
            self.cum_volume = 0.0;
            self.session_date = Some(session_date);
        }
        let typical = (high + low + close) / 3.0;
        self.cum_pv += typical * volume;
        self.cum_volume += volume;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.cum_volume > 0.0 {
            Some(self.cum_pv / self.cum_volume)
        } else {
            None
        }
    }
}

impl Default for VwapState {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain rolling mean, used for the volume moving average.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingMean {
    window: usize,
    values: std::collections::VecDeque<f64>,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: std::collections::VecDeque::with_capacity(window),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.window {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}
