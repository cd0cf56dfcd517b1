//! Per-key processing lanes and their registry

pub mod lane;
pub mod providers;
pub mod registry;
