//! Bollinger Bands indicator
//!
//! Rolling mean of closes ± `k` sample standard deviations.

use crate::models::indicators::BollingerBands;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerState {
    period: usize,
    k: f64,
    closes: VecDeque<f64>,
}

impl BollingerState {
    pub fn new(period: usize, k: f64) -> Self {
        Self {
            period,
            k,
            closes: VecDeque::with_capacity(period),
        }
    }

    pub fn update(&mut self, close: f64) -> Option<BollingerBands> {
        self.closes.push_back(close);
        if self.closes.len() > self.period {
            self.closes.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<BollingerBands> {
        if self.closes.len() < self.period {
            return None;
        }
        let n = self.closes.len() as f64;
        let mean = self.closes.iter().sum::<f64>() / n;
        let var = self
            .closes
            .iter()
            .map(|c| (c - mean) * (c - mean))
            .sum::<f64>()
            / (n - 1.0);
        let std = var.sqrt();
        Some(BollingerBands {
            upper: mean + self.k * std,
            middle: mean,
            lower: mean - self.k * std,
        })
    }
}
