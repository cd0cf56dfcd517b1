//! Error taxonomy for the streaming core
//!
//! Rejections are handled locally by the owning lane and surfaced as
//! counters/log events: they never halt other lanes.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a tick was not applied to a lane's live bar.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TickRejection {
    #[error("tick timestamp {got} is older than last applied {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        got: DateTime<Utc>,
    },
    #[error("duplicate tick at {0}")]
    Duplicate(DateTime<Utc>),
    #[error("non-positive price {0}")]
    NonPositivePrice(f64),
    #[error("negative volume {0}")]
    NegativeVolume(f64),
    #[error("non-finite price or volume")]
    NonFinite,
}

impl TickRejection {
    /// Recoverable-and-dropped rejections are expected stream noise;
    /// the rest indicate malformed input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TickRejection::OutOfOrder { .. } | TickRejection::Duplicate(_)
        )
    }
}

/// Registry-level failures. None of these are fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("{0} is not in the watchlist")]
    UnknownSymbol(String),
    #[error("{0} is already watched")]
    AlreadyWatched(String),
    #[error("lane for {0} has shut down")]
    LaneClosed(String),
}
