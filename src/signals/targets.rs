//! Target calculator: TP1/TP2/SL levels and estimated time-to-target
//!
//! Levels are sized from the current ATR at emission time. The time estimate
//! treats the recent mean ATR as expected movement per bar.

use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::Interval;
use crate::models::signal::{Side, Signal, Target, TimeToTarget};

/// Slack multiplier on the raw bars-to-target estimate.
const ETA_BUFFER: f64 = 1.4;
/// Shortest reportable estimate.
const MIN_ETA_MINUTES: u64 = 5;
/// Beyond one week the estimate is reported as unbounded.
const MAX_ETA_MINUTES: u64 = 7 * 24 * 60;

pub struct TargetCalculator;

impl TargetCalculator {
    /// Compute levels and ETA for a signal. Returns None when ATR is still
    /// undefined: the signal is emitted target-pending rather than with
    /// fabricated levels.
    pub fn compute(
        signal: &Signal,
        snapshot: &IndicatorSnapshot,
        interval: Interval,
    ) -> Option<Target> {
        let atr = snapshot.atr14?;
        if atr <= 0.0 {
            return None;
        }

        let entry = signal.entry_price;
        let (tp1, tp2, sl) = match signal.side {
            Side::Buy => (entry + atr, entry + 2.0 * atr, entry - atr),
            Side::Sell => (entry - atr, entry - 2.0 * atr, entry + atr),
        };

        let velocity = snapshot.atr_per_bar.unwrap_or(atr);
        let eta = Self::estimate_eta((tp1 - entry).abs(), velocity, interval);

        Some(Target { tp1, tp2, sl, eta })
    }

    fn estimate_eta(distance: f64, velocity: f64, interval: Interval) -> TimeToTarget {
        if velocity <= 0.0 {
            return TimeToTarget::Unbounded;
        }
        let bars = (distance / velocity * ETA_BUFFER).max(1.0);
        let minutes = (bars * interval.trading_minutes() as f64).round() as u64;
        if minutes > MAX_ETA_MINUTES {
            TimeToTarget::Unbounded
        } else {
            TimeToTarget::Within {
                minutes: minutes.max(MIN_ETA_MINUTES),
            }
        }
    }
}
