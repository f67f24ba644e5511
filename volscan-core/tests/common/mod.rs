//! Shared series builders for integration tests.

#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use volscan_core::{Bar, BarSeries};

/// Build a series on consecutive weekdays starting 2024-01-02.
pub fn weekday_series(closes: &[f64], volumes: &[u64]) -> BarSeries {
    assert_eq!(closes.len(), volumes.len());
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(closes.len());
    for (i, (&close, &volume)) in closes.iter().zip(volumes).enumerate() {
        let open = if i == 0 { close } else { closes[i - 1] };
        bars.push(Bar {
            date,
            open,
            high: open.max(close) + 0.5,
            low: open.min(close) - 0.5,
            close,
            volume,
        });
        date = next_weekday(date);
    }
    BarSeries::new(bars).unwrap()
}

fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut d = date.succ_opt().unwrap();
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d = d.succ_opt().unwrap();
    }
    d
}

/// The 40-row reference scenario: flat 1M volume and flat $100 closes, with
/// a 4M-share, +3% day at `spike_row`. Closes after the spike drift upward
/// by $1 per row; volume returns to 1M.
pub fn spike_scenario(spike_row: usize) -> (Vec<f64>, Vec<u64>) {
    let n = 40;
    let mut closes = vec![100.0; n];
    let mut volumes = vec![1_000_000u64; n];
    volumes[spike_row] = 4_000_000;
    closes[spike_row] = 103.0;
    for (k, c) in closes.iter_mut().enumerate().skip(spike_row + 1) {
        *c = 103.0 + (k - spike_row) as f64;
    }
    (closes, volumes)
}

/// Deterministic pseudo-random walk with periodic volume spikes.
pub fn noisy_series(n: usize) -> BarSeries {
    let mut closes = Vec::with_capacity(n);
    let mut volumes = Vec::with_capacity(n);
    let mut price = 50.0;
    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 1000) as f64 / 1000.0 * 8.0 - 3.5;
        price = (price * (1.0 + change / 100.0)).max(1.0);
        closes.push(price);
        let spike = if i % 37 == 36 { 5 } else { 1 };
        volumes.push((800_000 + (seed >> 40) % 400_000) * spike);
    }
    weekday_series(&closes, &volumes)
}
