//! Environment-driven runtime configuration

use std::env;
use std::time::Duration;

/// Resolve the deployment environment ("production", "sandbox", ...).
/// Loads `.env` on first use so local runs pick up overrides.
pub fn get_environment() -> String {
    let _ = dotenvy::dotenv();
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Weights and thresholds for the prediction fusion step.
#[derive(Debug, Clone, Copy)]
pub struct PredictionConfig {
    /// Weight of the technical score in the combined score.
    pub technical_weight: f64,
    /// Weight of the sentiment score in the combined score.
    pub sentiment_weight: f64,
    /// Combined score magnitude below which the direction is NEUTRAL.
    pub neutral_band: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            technical_weight: 0.5,
            sentiment_weight: 0.5,
            neutral_band: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sealed-bar history retained per key. Floor is the 200-period EMA
    /// lookback plus safety margin.
    pub history_retention: usize,
    /// A lane with no tick for this long while its market is open marks
    /// itself stale.
    pub quiet_period: Duration,
    /// Sentiment older than this is treated as neutral.
    pub sentiment_max_age: Duration,
    /// Trailing window of signals feeding the prediction's agreement score.
    pub recent_signal_window: usize,
    pub prediction: PredictionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_retention: 250,
            quiet_period: Duration::from_secs(300),
            sentiment_max_age: Duration::from_secs(900),
            recent_signal_window: 20,
            prediction: PredictionConfig::default(),
        }
    }
}

impl Config {
    /// Read configuration from `TRADEPULSE_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Config::default();
        let technical_weight = env_f64(
            "TRADEPULSE_TECH_WEIGHT",
            defaults.prediction.technical_weight,
        );
        Self {
            history_retention: env_u64(
                "TRADEPULSE_HISTORY_RETENTION",
                defaults.history_retention as u64,
            )
            .max(250) as usize,
            quiet_period: Duration::from_secs(env_u64("TRADEPULSE_QUIET_PERIOD_SECS", 300)),
            sentiment_max_age: Duration::from_secs(env_u64("TRADEPULSE_SENTIMENT_MAX_AGE_SECS", 900)),
            recent_signal_window: env_u64(
                "TRADEPULSE_RECENT_SIGNAL_WINDOW",
                defaults.recent_signal_window as u64,
            ) as usize,
            prediction: PredictionConfig {
                technical_weight,
                sentiment_weight: env_f64("TRADEPULSE_SENTIMENT_WEIGHT", 1.0 - technical_weight),
                neutral_band: env_f64(
                    "TRADEPULSE_NEUTRAL_BAND",
                    defaults.prediction.neutral_band,
                ),
            },
        }
    }
}
