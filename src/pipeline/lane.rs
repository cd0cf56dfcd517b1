//! Symbol lane: the independent processing unit for one (symbol, interval)
//!
//! A lane is a single tokio task that exclusively owns its key's aggregator
//! and indicator state, so all mutation is single-writer and strictly in
//! tick-arrival order. Consumers only ever see cloned immutable snapshots
//! handed off through watch/broadcast channels.

use crate::config::Config;
use crate::error::PipelineError;
use crate::indicators::engine::IndicatorEngine;
use crate::market::aggregator::BarAggregator;
use crate::market::clock::MarketCalendar;
use crate::metrics::PipelineMetrics;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::{Bar, BarEvent, SymbolKey, Tick};
use crate::models::signal::Signal;
use crate::signals::targets::TargetCalculator;
use crate::strategies::evaluator::{StrategyContext, StrategyEngine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};

const TICK_CHANNEL_CAPACITY: usize = 256;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One per-tick emission to the transport collaborator: the bar event, the
/// indicator values at that instant, and any signals the close produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneEvent {
    pub key: SymbolKey,
    pub event: BarEvent,
    pub indicators: IndicatorSnapshot,
    pub signals: Vec<Signal>,
}

/// Latest state of a lane, readable at any time without touching the lane's
/// mutable internals.
#[derive(Debug, Clone)]
pub struct LaneSnapshot {
    pub key: SymbolKey,
    pub bar: Option<Bar>,
    pub indicators: Option<IndicatorSnapshot>,
    pub recent_signals: Vec<Signal>,
    /// Set when the quiet period lapsed with the market open; cleared by the
    /// next accepted tick.
    pub stale: bool,
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl LaneSnapshot {
    fn empty(key: SymbolKey) -> Self {
        Self {
            key,
            bar: None,
            indicators: None,
            recent_signals: Vec::new(),
            stale: false,
            last_tick_at: None,
        }
    }
}

pub struct SymbolLane {
    key: SymbolKey,
    ticks: mpsc::Sender<Tick>,
    snapshot: watch::Receiver<LaneSnapshot>,
    events: broadcast::Sender<LaneEvent>,
    handle: tokio::task::JoinHandle<()>,
}

impl SymbolLane {
    /// Spawn the lane task, optionally seeded with historical sealed bars so
    /// indicators start warm.
    pub fn spawn(
        key: SymbolKey,
        config: &Config,
        calendar: Arc<dyn MarketCalendar>,
        metrics: Arc<PipelineMetrics>,
        seed: Vec<Bar>,
    ) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(LaneSnapshot::empty(key.clone()));

        let mut aggregator = BarAggregator::new(key.clone(), config.history_retention, calendar.clone());
        let mut engine = IndicatorEngine::new(key.clone());
        if !seed.is_empty() {
            debug!(key = %key, bars = seed.len(), "seeding lane with historical bars");
            aggregator.seed_history(seed.clone());
            engine.seed(seed);
        }

        let worker = LaneWorker {
            key: key.clone(),
            aggregator,
            engine,
            recent_signals: VecDeque::with_capacity(config.recent_signal_window),
            recent_signal_window: config.recent_signal_window,
            quiet_period: config.quiet_period,
            calendar,
            metrics,
            snapshot_tx,
            event_tx: event_tx.clone(),
        };
        let handle = tokio::spawn(worker.run(tick_rx));

        Self {
            key,
            ticks: tick_tx,
            snapshot: snapshot_rx,
            events: event_tx,
            handle,
        }
    }

    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    /// Queue a tick for this lane. Fails only once the lane has shut down.
    pub async fn ingest(&self, tick: Tick) -> Result<(), PipelineError> {
        self.ticks
            .send(tick)
            .await
            .map_err(|_| PipelineError::LaneClosed(self.key.to_string()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LaneEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> LaneSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Stop accepting ticks and wait for in-flight work to finish.
    pub async fn shutdown(self) {
        drop(self.ticks);
        if let Err(err) = self.handle.await {
            warn!(key = %self.key, error = %err, "lane task ended abnormally");
        }
    }
}

struct LaneWorker {
    key: SymbolKey,
    aggregator: BarAggregator,
    engine: IndicatorEngine,
    recent_signals: VecDeque<Signal>,
    recent_signal_window: usize,
    quiet_period: std::time::Duration,
    calendar: Arc<dyn MarketCalendar>,
    metrics: Arc<PipelineMetrics>,
    snapshot_tx: watch::Sender<LaneSnapshot>,
    event_tx: broadcast::Sender<LaneEvent>,
}

impl LaneWorker {
    async fn run(mut self, mut ticks: mpsc::Receiver<Tick>) {
        debug!(key = %self.key, "lane started");
        loop {
            match timeout(self.quiet_period, ticks.recv()).await {
                Err(_) => self.on_quiet_period(),
                Ok(None) => break,
                Ok(Some(tick)) => self.on_tick(tick),
            }
        }
        debug!(key = %self.key, "lane shut down");
    }

    /// No tick for the whole quiet period. If the market is open, the lane
    /// marks itself stale; the live bar is not force-closed.
    fn on_quiet_period(&mut self) {
        let exchange = self.aggregator.exchange();
        if self.calendar.is_open(exchange, Utc::now()) {
            self.metrics.lane_stale_total.inc();
            warn!(key = %self.key, "no ticks within quiet period while market open, marking lane stale");
            self.snapshot_tx.send_modify(|snap| snap.stale = true);
        }
    }

    fn on_tick(&mut self, tick: Tick) {
        let event = match self.aggregator.ingest(&tick) {
            Ok(event) => event,
            Err(rejection) => {
                if rejection.is_recoverable() {
                    self.metrics.ticks_out_of_order_total.inc();
                    debug!(key = %self.key, reason = %rejection, "tick dropped");
                } else {
                    self.metrics.ticks_invalid_total.inc();
                    warn!(key = %self.key, reason = %rejection, "tick rejected");
                }
                return;
            }
        };
        self.metrics.ticks_ingested_total.inc();

        let indicators = self.engine.apply(&event);

        let mut signals = Vec::new();
        if let BarEvent::Closed { sealed, .. } = &event {
            self.metrics.bars_sealed_total.inc();
            signals = self.evaluate_close(sealed);
        }

        let live_bar = event.live_bar().clone();
        self.snapshot_tx.send_modify(|snap| {
            snap.bar = Some(live_bar);
            snap.indicators = Some(indicators.clone());
            snap.stale = false;
            snap.last_tick_at = Some(tick.timestamp);
            snap.recent_signals = self.recent_signals.iter().cloned().collect();
        });

        // At-least-once: losing a slow subscriber's backlog is acceptable,
        // consumers overwrite idempotently by key.
        let _ = self.event_tx.send(LaneEvent {
            key: self.key.clone(),
            event,
            indicators,
            signals,
        });
    }

    /// Strategies run on sealed bars only, with the engine-aligned
    /// (previous, current) snapshot pair.
    fn evaluate_close(&mut self, sealed: &Bar) -> Vec<Signal> {
        let (Some(current), Some(previous)) = (self.engine.confirmed(), self.engine.previous())
        else {
            return Vec::new();
        };

        let ctx = StrategyContext {
            key: &self.key,
            bar: sealed,
            current,
            previous,
        };
        let mut signals = StrategyEngine::evaluate(&ctx);

        for signal in &mut signals {
            let target = TargetCalculator::compute(signal, current, self.key.interval);
            signal.target = target;
            if signal.target.is_none() {
                self.metrics.targets_pending_total.inc();
            }
            info!(
                key = %self.key,
                strategy = signal.strategy.name(),
                side = ?signal.side,
                entry = signal.entry_price,
                confidence = signal.confidence,
                pending = signal.target.is_none(),
                "signal emitted"
            );
        }
        self.metrics
            .signals_emitted_total
            .inc_by(signals.len() as u64);

        for signal in &signals {
            self.recent_signals.push_back(signal.clone());
            while self.recent_signals.len() > self.recent_signal_window {
                self.recent_signals.pop_front();
            }
        }
        signals
    }
}
