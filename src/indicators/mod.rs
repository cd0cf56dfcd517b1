//! Incremental technical indicators, grouped by category

pub mod engine;
pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;
