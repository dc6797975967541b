//! Example 01: Window Basics
//!
//! This example demonstrates how to:
//! - Merge unordered batches with reconnect replays into a window
//! - Read chart values and trend badges per series
//! - Watch readings age out of the trailing window
//! - Collect buffer statistics

use livetrend_core::{
    buffer::WindowedSeriesBuffer,
    ingest::{sanitize, IncomingRecord, RawSample, RawTimestamp, TelemetryPayload},
    Sample, WindowConfig,
};

const TICK_MS: u64 = 30_000;

fn main() {
    println!("=== livetrend Window Basics ===\n");

    let mut buffer = WindowedSeriesBuffer::new(WindowConfig::new().with_window_secs(120));

    // Tick 1: out-of-order delivery
    let batch = vec![
        Sample::new("boiler", 20_000, 71.0),
        Sample::new("boiler", 0, 70.0),
        Sample::new("boiler", 10_000, 70.4),
        Sample::new("chiller", 0, 6.0),
    ];
    let (_, report) = buffer.ingest_with_report(&batch, TICK_MS);
    println!("Tick 1: {} accepted, {} duplicate", report.accepted, report.duplicates);
    print_badges(&buffer);

    // Tick 2: reconnect replays the last reading with a different value
    let batch = vec![
        Sample::new("boiler", 20_000, 99.9),
        Sample::new("boiler", 40_000, 72.5),
        Sample::new("chiller", 40_000, 5.2),
    ];
    let (_, report) = buffer.ingest_with_report(&batch, 2 * TICK_MS);
    println!("\nTick 2: {} accepted, {} duplicate", report.accepted, report.duplicates);
    print_badges(&buffer);

    // Raw platform payloads go through the ingestion boundary first
    let records: Vec<IncomingRecord> = vec![
        TelemetryPayload::new("boiler", Some(RawTimestamp::Millis(70_000)))
            .with_variable("temperature", 73.0)
            .into(),
        RawSample::new("chiller", RawTimestamp::Text("1970-01-01T00:01:10Z".into()), 5.1).into(),
        RawSample::new("chiller", 70_000u64, f64::NAN).into(),
    ];
    let clean = sanitize(&records, &buffer.config().key_mode, 3 * TICK_MS);
    println!("\nSanitized: {} samples, {} rejected", clean.samples.len(), clean.rejected);
    buffer.ingest(&clean.samples, 3 * TICK_MS);
    print_badges(&buffer);

    // Quiet ticks: readings older than 120 s are evicted
    for tick in 4..=7 {
        buffer.ingest(&[], tick * TICK_MS);
    }
    println!("\nAfter four quiet ticks:");
    print_badges(&buffer);

    let stats = buffer.statistics();
    println!(
        "\nStatistics: {} series, {} points, {:.2} per series, window {} s",
        stats.series_count, stats.total_points, stats.avg_points_per_series, stats.window_secs
    );
}

fn print_badges(buffer: &WindowedSeriesBuffer) {
    for series in buffer.snapshot() {
        println!(
            "  {:<22} {} {:>7.2}%  {:?}",
            series.series_key,
            series.trend.direction.symbol(),
            series.trend.percent_change,
            series.values
        );
    }
}
