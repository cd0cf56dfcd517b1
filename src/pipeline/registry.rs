//! Lane registry: explicit lifecycle for per-key processing lanes
//!
//! The registry is the only map from SymbolKey to mutable lane state; lanes
//! are created and destroyed through add/remove, never through ambient
//! globals. Cross-lane reads (snapshots, predictions) go through immutable
//! copies.

use crate::config::Config;
use crate::error::PipelineError;
use crate::market::clock::MarketCalendar;
use crate::metrics::PipelineMetrics;
use crate::models::market::{SymbolKey, Tick};
use crate::models::signal::PredictionResult;
use crate::pipeline::lane::{LaneEvent, LaneSnapshot, SymbolLane};
use crate::pipeline::providers::{BarHistoryProvider, SentimentProvider, WatchlistProvider};
use crate::signals::prediction::PredictionEngine;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

pub struct LaneRegistry {
    config: Config,
    calendar: Arc<dyn MarketCalendar>,
    metrics: Arc<PipelineMetrics>,
    history: Arc<dyn BarHistoryProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    prediction: PredictionEngine,
    lanes: RwLock<HashMap<SymbolKey, SymbolLane>>,
}

impl LaneRegistry {
    pub fn new(
        config: Config,
        calendar: Arc<dyn MarketCalendar>,
        metrics: Arc<PipelineMetrics>,
        history: Arc<dyn BarHistoryProvider>,
        sentiment: Arc<dyn SentimentProvider>,
    ) -> Self {
        let prediction = PredictionEngine::new(config.prediction);
        Self {
            config,
            calendar,
            metrics,
            history,
            sentiment,
            prediction,
            lanes: RwLock::new(HashMap::new()),
        }
    }

    /// Spawn a lane for every key the watchlist collaborator reports.
    pub async fn init_watchlist(&self, watchlist: &dyn WatchlistProvider) {
        for key in watchlist.watchlist() {
            if let Err(err) = self.add_symbol(key.clone()).await {
                warn!(key = %key, error = %err, "skipping watchlist entry");
            }
        }
    }

    /// Create and start the lane for a key, seeded from the bar-history
    /// collaborator when it has data.
    pub async fn add_symbol(&self, key: SymbolKey) -> Result<(), PipelineError> {
        {
            let lanes = self.lanes.read().await;
            if lanes.contains_key(&key) {
                return Err(PipelineError::AlreadyWatched(key.to_string()));
            }
        }

        let seed = match self
            .history
            .recent_bars(&key, self.config.history_retention)
            .await
        {
            Ok(bars) => bars,
            Err(err) => {
                // Cold start is degraded, not fatal: indicators warm up live.
                warn!(key = %key, error = %err, "bar history unavailable, starting cold");
                Vec::new()
            }
        };

        let lane = SymbolLane::spawn(
            key.clone(),
            &self.config,
            self.calendar.clone(),
            self.metrics.clone(),
            seed,
        );

        let mut lanes = self.lanes.write().await;
        if lanes.contains_key(&key) {
            lane.shutdown().await;
            return Err(PipelineError::AlreadyWatched(key.to_string()));
        }
        lanes.insert(key.clone(), lane);
        self.metrics.lanes_active.set(lanes.len() as i64);
        info!(key = %key, "lane added");
        Ok(())
    }

    /// Stop the lane for a key. In-flight computation finishes; no new ticks
    /// are accepted afterwards.
    pub async fn remove_symbol(&self, key: &SymbolKey) -> Result<(), PipelineError> {
        let lane = {
            let mut lanes = self.lanes.write().await;
            let lane = lanes
                .remove(key)
                .ok_or_else(|| PipelineError::UnknownSymbol(key.to_string()))?;
            self.metrics.lanes_active.set(lanes.len() as i64);
            lane
        };
        lane.shutdown().await;
        info!(key = %key, "lane removed");
        Ok(())
    }

    /// Route one tick to every lane watching its symbol (all intervals).
    /// Returns how many lanes received it.
    pub async fn dispatch(&self, tick: Tick) -> Result<usize, PipelineError> {
        let lanes = self.lanes.read().await;
        let mut delivered = 0;
        for (key, lane) in lanes.iter() {
            if key.symbol == tick.symbol {
                lane.ingest(tick.clone()).await?;
                delivered += 1;
            }
        }
        if delivered == 0 {
            return Err(PipelineError::UnknownSymbol(tick.symbol));
        }
        Ok(delivered)
    }

    /// Subscribe to a lane's event stream (bar updates, indicators, signals).
    pub async fn subscribe(
        &self,
        key: &SymbolKey,
    ) -> Result<broadcast::Receiver<LaneEvent>, PipelineError> {
        let lanes = self.lanes.read().await;
        lanes
            .get(key)
            .map(|lane| lane.subscribe())
            .ok_or_else(|| PipelineError::UnknownSymbol(key.to_string()))
    }

    /// Latest immutable snapshot for a key.
    pub async fn snapshot(&self, key: &SymbolKey) -> Result<LaneSnapshot, PipelineError> {
        let lanes = self.lanes.read().await;
        lanes
            .get(key)
            .map(|lane| lane.snapshot())
            .ok_or_else(|| PipelineError::UnknownSymbol(key.to_string()))
    }

    pub async fn watched_keys(&self) -> Vec<SymbolKey> {
        self.lanes.read().await.keys().cloned().collect()
    }

    /// Fuse the key's latest technical state with the sentiment collaborator's
    /// score into a fresh prediction.
    pub async fn predict(&self, key: &SymbolKey) -> Result<PredictionResult, PipelineError> {
        let snapshot = self.snapshot(key).await?;
        let sentiment = self.fresh_sentiment(&key.symbol);
        self.metrics.predictions_total.inc();
        Ok(self.prediction.predict(
            &key.symbol,
            &snapshot.recent_signals,
            snapshot.indicators.as_ref(),
            sentiment,
        ))
    }

    /// A missing or stale score reads as neutral (None), never as an error.
    fn fresh_sentiment(&self, symbol: &str) -> Option<f64> {
        let score = self.sentiment.sentiment(symbol)?;
        let age = Utc::now().signed_duration_since(score.timestamp);
        if age.num_seconds() > self.config.sentiment_max_age.as_secs() as i64 {
            return None;
        }
        Some(score.score.clamp(-100.0, 100.0))
    }

    /// Drain every lane; used on shutdown.
    pub async fn shutdown(&self) {
        let lanes: Vec<SymbolLane> = {
            let mut map = self.lanes.write().await;
            self.metrics.lanes_active.set(0);
            map.drain().map(|(_, lane)| lane).collect()
        };
        for lane in lanes {
            lane.shutdown().await;
        }
    }
}
