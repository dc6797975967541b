//! Example 02: Live Dashboard Feed
//!
//! This example demonstrates how to:
//! - Attach a push channel (and optionally an HTTP endpoint) to a live feed
//! - Subscribe to published windows and render trend badges
//! - Read feed counters and shut the feed down cleanly
//!
//! Run with an endpoint to poll it alongside the simulated device:
//! `cargo run --example 02_live_dashboard -- https://api.example.com/api/v1/telemetry/latest`

use std::time::Duration;

use livetrend_core::ingest::TelemetryPayload;
use livetrend_core::time::SystemTime;
use livetrend_core::{TimeSource, WindowConfig};
use livetrend_feed::{push_channel, FeedConfig, FeedError, HttpConfig, HttpPoller, LiveFeed};

#[tokio::main]
async fn main() -> Result<(), FeedError> {
    println!("=== livetrend Live Dashboard ===\n");

    let config = FeedConfig::new()
        .tick_secs(1)
        .window(WindowConfig::new().with_window_secs(5));

    let (pusher, source) = push_channel(64);
    let mut feed = LiveFeed::new(config).source(source);

    if let Some(url) = std::env::args().nth(1) {
        println!("Polling {}", url);
        feed = feed.source(HttpPoller::new(HttpConfig::new(url).timeout_secs(5))?);
    }

    let feed = feed.spawn();

    // Simulated device: a pump warming up, then settling
    let producer = tokio::spawn(async move {
        let clock = SystemTime;
        for step in 0..40u32 {
            let temperature = 60.0 + 8.0 * (1.0 - (-(step as f64) / 10.0).exp());
            let payload = TelemetryPayload::new("pump-07", Some(clock.now().into()))
                .with_variable("temperature", temperature)
                .with_variable("vibration", 4.0 + (step % 3) as f64 * 0.1);
            if pusher.push(payload.into()).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    let mut updates = feed.subscribe();
    let render = async {
        while updates.changed().await.is_ok() {
            let window = updates.borrow_and_update().clone();
            println!("-- {} series, {} points", window.series_count(), window.total_points());
            for series in window.snapshot() {
                println!(
                    "  {:<24} {} {:>6.2}%  latest {:.2}",
                    series.series_key,
                    series.trend.direction.symbol(),
                    series.trend.percent_change,
                    series.latest.map(|r| r.value).unwrap_or_default()
                );
            }
        }
    };
    let _ = tokio::time::timeout(Duration::from_secs(9), render).await;

    let stats = feed.stats();
    println!(
        "\nTicks: {}, batches: {}, accepted: {}, duplicate: {}, rejected: {}, failed fetches: {}",
        stats.ticks,
        stats.batches,
        stats.samples_accepted,
        stats.samples_duplicate,
        stats.samples_rejected,
        stats.fetch_failures
    );
    if let Some(error) = stats.last_error {
        println!("Last error: {}", error);
    }

    producer.abort();
    feed.shutdown().await
}
