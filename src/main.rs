use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tradepulse::config::Config;
use tradepulse::logging::init_logging;
use tradepulse::market::clock::ExchangeClock;
use tradepulse::metrics::PipelineMetrics;
use tradepulse::models::market::{BarEvent, Interval, SymbolKey, Tick};
use tradepulse::pipeline::providers::{
    NoHistory, SentimentProvider, SentimentScore, StaticWatchlist,
};
use tradepulse::pipeline::registry::LaneRegistry;

/// Stand-in for the news collaborator: one constant score for every symbol.
struct FixedSentiment(f64);

impl SentimentProvider for FixedSentiment {
    fn sentiment(&self, _symbol: &str) -> Option<SentimentScore> {
        Some(SentimentScore {
            score: self.0,
            timestamp: Utc::now(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging();

    let config = Config::from_env();
    let metrics = Arc::new(PipelineMetrics::new()?);
    let registry = LaneRegistry::new(
        config,
        Arc::new(ExchangeClock),
        metrics.clone(),
        Arc::new(NoHistory),
        Arc::new(FixedSentiment(40.0)),
    );

    let key = SymbolKey::new("AAPL", Interval::M5);
    registry
        .init_watchlist(&StaticWatchlist(vec![key.clone()]))
        .await;

    let mut events = registry.subscribe(&key).await?;
    let consumer = tokio::spawn(async move {
        let mut sealed = 0usize;
        let mut signals = 0usize;
        loop {
            match events.recv().await {
                Ok(event) => {
                    if matches!(event.event, BarEvent::Closed { .. }) {
                        sealed += 1;
                    }
                    for signal in &event.signals {
                        println!(
                            "signal: {} {} {:?} @ {:.2} (confidence {:.0}%)",
                            signal.key,
                            signal.strategy.name(),
                            signal.side,
                            signal.entry_price,
                            signal.confidence
                        );
                    }
                    signals += event.signals.len();
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        (sealed, signals)
    });

    // Synthetic session: one tick per minute from the NYSE open, a slow
    // drift with a sine wave on top so crossovers actually happen.
    let session_open = Utc
        .with_ymd_and_hms(2026, 1, 5, 14, 30, 0)
        .single()
        .ok_or("bad session open")?;
    for i in 0..600i64 {
        let wave = (i as f64 / 12.0).sin() * 4.0;
        let drift = i as f64 * 0.02;
        let tick = Tick::new(
            "AAPL",
            190.0 + drift + wave,
            1_000.0 + (i % 7) as f64 * 150.0,
            session_open + Duration::minutes(i),
        );
        registry.dispatch(tick).await?;
    }

    // Let the lane drain before reading results.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let snapshot = registry.snapshot(&key).await?;
    if let Some(indicators) = &snapshot.indicators {
        println!(
            "latest: close {:.2}, rsi {:?}, atr {:?}, supertrend {:?}",
            indicators.close,
            indicators.rsi14,
            indicators.atr14,
            indicators.supertrend.map(|st| st.direction)
        );
    }

    let prediction = registry.predict(&key).await?;
    println!(
        "{}: {:?} ({:.0}% confidence, technical {:.0}, sentiment {:.0})",
        prediction.symbol,
        prediction.direction,
        prediction.confidence,
        prediction.technical_score,
        prediction.sentiment_score
    );

    registry.shutdown().await;
    let (sealed, signal_count) = consumer.await?;
    println!("{} bars sealed, {} signals emitted", sealed, signal_count);

    Ok(())
}
