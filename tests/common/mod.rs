//! Shared helpers for integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use rsrslab::domain::ohlcv::Bar;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn bar_on(day_offset: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: date(2020, 1, 1) + chrono::Duration::days(day_offset),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Deterministic trending series with enough variation to keep every
/// rolling statistic non-degenerate.
pub fn generate_bars(len: usize) -> Vec<Bar> {
    (0..len)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.3 + ((i % 5) as f64 - 2.0) * 1.5;
            bar_on(
                i as i64,
                base,
                base + 1.0 + (i % 3) as f64,
                base - 1.0 - ((i + 1) % 4) as f64 * 0.4,
                base + 0.25,
                1_000.0 + ((i * 37) % 11) as f64 * 80.0,
            )
        })
        .collect()
}

/// Series where high = a·low + b exactly on every bar.
pub fn linear_bars(a: f64, b: f64, len: usize) -> Vec<Bar> {
    (0..len)
        .map(|i| {
            let low = 95.0 + ((i * 13) % 17) as f64;
            let high = a * low + b;
            bar_on(i as i64, low, high, low, (low + high) / 2.0, 1_000.0)
        })
        .collect()
}
