//! Collaborator seams for external data
//!
//! The core never fetches anything itself: bar history, sentiment scores and
//! the startup watchlist are supplied through these traits. Placeholder
//! implementations keep the pipeline runnable without any collaborator wired.

use crate::models::market::{Bar, SymbolKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Historical sealed bars used to rebuild indicator state on startup.
#[async_trait]
pub trait BarHistoryProvider: Send + Sync {
    async fn recent_bars(
        &self,
        key: &SymbolKey,
        limit: usize,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Starts every lane cold; indicators warm up from live ticks only.
pub struct NoHistory;

#[async_trait]
impl BarHistoryProvider for NoHistory {
    async fn recent_bars(
        &self,
        _key: &SymbolKey,
        _limit: usize,
    ) -> Result<Vec<Bar>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Vec::new())
    }
}

/// Latest sentiment score for a symbol, in [-100, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Read-only view of the news collaborator's latest per-symbol score.
/// Treated as an eventually-consistent snapshot; staleness handling is the
/// caller's concern.
pub trait SentimentProvider: Send + Sync {
    fn sentiment(&self, symbol: &str) -> Option<SentimentScore>;
}

/// No news collaborator: every symbol reads as neutral.
pub struct NeutralSentiment;

impl SentimentProvider for NeutralSentiment {
    fn sentiment(&self, _symbol: &str) -> Option<SentimentScore> {
        None
    }
}

/// The set of keys to initialize lanes for on startup. Persistence of the
/// watchlist itself belongs to the collaborator.
pub trait WatchlistProvider: Send + Sync {
    fn watchlist(&self) -> Vec<SymbolKey>;
}

pub struct StaticWatchlist(pub Vec<SymbolKey>);

impl WatchlistProvider for StaticWatchlist {
    fn watchlist(&self) -> Vec<SymbolKey> {
        self.0.clone()
    }
}
