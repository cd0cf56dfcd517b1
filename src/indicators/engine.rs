//! Incremental indicator engine: one instance per (symbol, interval) key
//!
//! Sealed bars advance the confirmed streaming state; live (partial) bars
//! only produce tentative peek snapshots that are discarded on the next
//! update. Recomputing from the same bar sequence always yields the same
//! values: there is no hidden external state.

use crate::indicators::momentum::macd::MacdState;
use crate::indicators::momentum::rsi::RsiState;
use crate::indicators::structure::supertrend::SupertrendState;
use crate::indicators::trend::ema::EmaState;
use crate::indicators::volatility::atr::AtrState;
use crate::indicators::volatility::bollinger::BollingerState;
use crate::indicators::volume::vwap::{RollingMean, VwapState};
use crate::market::clock::Exchange;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::{Bar, BarEvent, SymbolKey};
use std::collections::VecDeque;

const MOMENTUM_LOOKBACK: usize = 5;

pub struct IndicatorEngine {
    key: SymbolKey,
    exchange: Exchange,
    ema9: EmaState,
    ema21: EmaState,
    ema50: EmaState,
    ema200: EmaState,
    rsi14: RsiState,
    atr14: AtrState,
    macd: MacdState,
    bollinger: BollingerState,
    supertrend: SupertrendState,
    supertrend_fast: SupertrendState,
    vwap: VwapState,
    volume_ma: RollingMean,
    prior_closes: VecDeque<f64>,
    confirmed: Option<IndicatorSnapshot>,
    previous: Option<IndicatorSnapshot>,
}

impl IndicatorEngine {
    pub fn new(key: SymbolKey) -> Self {
        let exchange = Exchange::for_symbol(&key.symbol);
        Self {
            key,
            exchange,
            ema9: EmaState::new(9),
            ema21: EmaState::new(21),
            ema50: EmaState::new(50),
            ema200: EmaState::new(200),
            rsi14: RsiState::new(14),
            atr14: AtrState::new(14),
            macd: MacdState::new(12, 26, 9),
            bollinger: BollingerState::new(20, 2.0),
            supertrend: SupertrendState::new(3.0, 10),
            supertrend_fast: SupertrendState::new(2.0, 7),
            vwap: VwapState::new(),
            volume_ma: RollingMean::new(20),
            prior_closes: VecDeque::with_capacity(MOMENTUM_LOOKBACK + 1),
            confirmed: None,
            previous: None,
        }
    }

    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    /// Snapshot confirmed through the last sealed bar.
    pub fn confirmed(&self) -> Option<&IndicatorSnapshot> {
        self.confirmed.as_ref()
    }

    /// Snapshot confirmed through the sealed bar before that: strategies
    /// use the (previous, current) pair for cross detection.
    pub fn previous(&self) -> Option<&IndicatorSnapshot> {
        self.previous.as_ref()
    }

    /// Route one bar event: sealed bars mutate confirmed state, live bars
    /// only derive a tentative snapshot.
    pub fn apply(&mut self, event: &BarEvent) -> IndicatorSnapshot {
        match event {
            BarEvent::Closed { sealed, .. } => self.on_close(sealed),
            BarEvent::Updated { bar } => self.peek(bar),
        }
    }

    /// Advance every indicator with one sealed bar and return the new
    /// confirmed snapshot.
    pub fn on_close(&mut self, bar: &Bar) -> IndicatorSnapshot {
        let session_date = bar
            .open_time
            .with_timezone(&self.exchange.utc_offset())
            .date_naive();

        let momentum = if self.prior_closes.len() >= MOMENTUM_LOOKBACK {
            self.prior_closes
                .front()
                .map(|oldest| (bar.close / oldest - 1.0) * 100.0)
        } else {
            None
        };
        self.prior_closes.push_back(bar.close);
        if self.prior_closes.len() > MOMENTUM_LOOKBACK {
            self.prior_closes.pop_front();
        }

        let snapshot = IndicatorSnapshot {
            timestamp: bar.open_time,
            close: bar.close,
            volume: bar.volume,
            live: false,
            ema9: self.ema9.update(bar.close),
            ema21: self.ema21.update(bar.close),
            ema50: self.ema50.update(bar.close),
            ema200: self.ema200.update(bar.close),
            rsi14: self.rsi14.update(bar.close),
            atr14: self.atr14.update(bar.high, bar.low, bar.close),
            atr_per_bar: self.atr14.velocity(),
            macd: self.macd.update(bar.close),
            bollinger: self.bollinger.update(bar.close),
            vwap: self
                .vwap
                .update(bar.high, bar.low, bar.close, bar.volume, session_date),
            volume_ma20: self.volume_ma.update(bar.volume),
            supertrend: self.supertrend.update(bar.high, bar.low, bar.close),
            supertrend_fast: self.supertrend_fast.update(bar.high, bar.low, bar.close),
            momentum_5bar_pct: momentum,
        };

        self.previous = self.confirmed.take();
        self.confirmed = Some(snapshot.clone());
        snapshot
    }

    /// Tentative snapshot for a live partial bar: smoothing indicators take
    /// one non-persisted step with the live close; band and range indicators
    /// report their confirmed values.
    pub fn peek(&self, live: &Bar) -> IndicatorSnapshot {
        IndicatorSnapshot {
            timestamp: live.open_time,
            close: live.close,
            volume: live.volume,
            live: true,
            ema9: self.ema9.peek(live.close),
            ema21: self.ema21.peek(live.close),
            ema50: self.ema50.peek(live.close),
            ema200: self.ema200.peek(live.close),
            rsi14: self.rsi14.peek(live.close),
            atr14: self.atr14.value(),
            atr_per_bar: self.atr14.velocity(),
            macd: self.macd.peek(live.close),
            bollinger: self.bollinger.value(),
            vwap: self.vwap.value(),
            volume_ma20: self.volume_ma.value(),
            supertrend: self.supertrend.value(),
            supertrend_fast: self.supertrend_fast.value(),
            momentum_5bar_pct: self
                .prior_closes
                .front()
                .filter(|_| self.prior_closes.len() >= MOMENTUM_LOOKBACK)
                .map(|oldest| (live.close / oldest - 1.0) * 100.0),
        }
    }

    /// Rebuild confirmed state by replaying a sealed-bar history (startup
    /// bootstrap: indicator state is never persisted across restarts).
    pub fn seed(&mut self, bars: impl IntoIterator<Item = Bar>) {
        for bar in bars {
            self.on_close(&bar);
        }
    }
}
