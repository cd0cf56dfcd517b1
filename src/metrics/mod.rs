//! Prometheus counters for the anomaly taxonomy
//!
//! Recoverable drops, invalid input and staleness never raise errors; they
//! only move these counters.

use prometheus::{IntCounter, IntGauge, Opts, Registry};

pub struct PipelineMetrics {
    pub registry: Registry,
    pub ticks_ingested_total: IntCounter,
    pub ticks_out_of_order_total: IntCounter,
    pub ticks_invalid_total: IntCounter,
    pub bars_sealed_total: IntCounter,
    pub signals_emitted_total: IntCounter,
    pub targets_pending_total: IntCounter,
    pub predictions_total: IntCounter,
    pub lane_stale_total: IntCounter,
    pub lanes_active: IntGauge,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ticks_ingested_total = IntCounter::with_opts(Opts::new(
            "ticks_ingested_total",
            "Ticks applied to a live bar",
        ))?;
        let ticks_out_of_order_total = IntCounter::with_opts(Opts::new(
            "ticks_out_of_order_total",
            "Out-of-order or duplicate ticks dropped",
        ))?;
        let ticks_invalid_total = IntCounter::with_opts(Opts::new(
            "ticks_invalid_total",
            "Malformed ticks rejected at the lane boundary",
        ))?;
        let bars_sealed_total = IntCounter::with_opts(Opts::new(
            "bars_sealed_total",
            "Bars sealed and appended to history",
        ))?;
        let signals_emitted_total = IntCounter::with_opts(Opts::new(
            "signals_emitted_total",
            "Strategy signals emitted",
        ))?;
        let targets_pending_total = IntCounter::with_opts(Opts::new(
            "targets_pending_total",
            "Signals emitted without a target (ATR undefined)",
        ))?;
        let predictions_total = IntCounter::with_opts(Opts::new(
            "predictions_total",
            "Prediction requests served",
        ))?;
        let lane_stale_total = IntCounter::with_opts(Opts::new(
            "lane_stale_total",
            "Quiet-period expiries while the market was open",
        ))?;
        let lanes_active =
            IntGauge::with_opts(Opts::new("lanes_active", "Currently running lanes"))?;

        registry.register(Box::new(ticks_ingested_total.clone()))?;
        registry.register(Box::new(ticks_out_of_order_total.clone()))?;
        registry.register(Box::new(ticks_invalid_total.clone()))?;
        registry.register(Box::new(bars_sealed_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(targets_pending_total.clone()))?;
        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(lane_stale_total.clone()))?;
        registry.register(Box::new(lanes_active.clone()))?;

        Ok(Self {
            registry,
            ticks_ingested_total,
            ticks_out_of_order_total,
            ticks_invalid_total,
            bars_sealed_total,
            signals_emitted_total,
            targets_pending_total,
            predictions_total,
            lane_stale_total,
            lanes_active,
        })
    }
}
