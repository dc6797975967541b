//! Property tests for the window merge and the trend classifier

use livetrend_core::{classify, update, values_for, Sample, Window};
use proptest::prelude::*;

const KEYS: [&str; 3] = ["a", "b", "c"];

fn sample_strategy(max_ts: u64) -> impl Strategy<Value = Sample> {
    (0..KEYS.len(), 0..max_ts, -1_000.0f64..1_000.0)
        .prop_map(|(key, ts, value)| Sample::new(KEYS[key], ts, value))
}

fn batches_strategy() -> impl Strategy<Value = Vec<(u64, Vec<Sample>)>> {
    // (tick advance in ms, batch)
    prop::collection::vec(
        (0u64..120_000, prop::collection::vec(sample_strategy(1_000_000), 0..40)),
        1..8,
    )
}

proptest! {
    #[test]
    fn retained_readings_stay_inside_window(
        batches in batches_strategy(),
        window_secs in 0u64..400,
    ) {
        let mut window = Window::new();
        let mut now = 0u64;

        for (advance, batch) in batches {
            now += advance;
            window = update(&window, &batch, now, window_secs);

            for (_, readings) in window.iter() {
                prop_assert!(!readings.is_empty());
                for reading in readings {
                    prop_assert!(now.saturating_sub(reading.timestamp) <= window_secs * 1000);
                }
            }
        }
    }

    #[test]
    fn series_are_strictly_increasing(batches in batches_strategy()) {
        let mut window = Window::new();
        let mut now = 0u64;

        for (advance, batch) in batches {
            now += advance;
            window = update(&window, &batch, now, 300);

            for (_, readings) in window.iter() {
                for pair in readings.windows(2) {
                    prop_assert!(pair[0].timestamp < pair[1].timestamp);
                }
            }
        }
    }

    #[test]
    fn resubmitting_a_batch_changes_nothing(
        batch in prop::collection::vec(sample_strategy(300_000), 0..60),
        now in 300_000u64..600_000,
    ) {
        let once = update(&Window::new(), &batch, now, 300);
        let twice = update(&once, &batch, now, 300);

        for key in KEYS {
            prop_assert_eq!(values_for(&once, key), values_for(&twice, key));
        }
    }

    #[test]
    fn first_seen_value_wins(
        batch in prop::collection::vec(sample_strategy(10_000), 1..60),
    ) {
        let window = update(&Window::new(), &batch, 10_000, 300);

        for (key, readings) in window.iter() {
            for reading in readings {
                let first = batch
                    .iter()
                    .find(|s| s.series_key == key && s.timestamp == reading.timestamp)
                    .map(|s| s.value);
                prop_assert_eq!(first, Some(reading.value));
            }
        }
    }

    #[test]
    fn classify_is_total(values in prop::collection::vec(prop::num::f64::NORMAL | prop::num::f64::ZERO, 0..10)) {
        let result = classify(&values);
        prop_assert!(result.percent_change.is_finite());
    }

    #[test]
    fn classify_with_leading_zero_reports_zero_change(rest in prop::collection::vec(-1e6f64..1e6, 1..10)) {
        let mut values = vec![0.0];
        values.extend(rest);
        prop_assert_eq!(classify(&values).percent_change, 0.0);
    }
}
