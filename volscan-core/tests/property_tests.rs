//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify, over arbitrary series and parameters:
//! 1. Warmup: no baseline or ratio before `lookback` rows
//! 2. Classifier: flag equals the strict two-sided condition, false on undefined input
//! 3. Exit distance: every outcome sits exactly `holding_period` rows later
//! 4. Report/summary agreement: same signal set, same count

use chrono::NaiveDate;
use proptest::prelude::*;
use volscan_core::{analyze, Bar, BarSeries, ScanParams};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_series() -> impl Strategy<Value = BarSeries> {
    (10usize..120)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(1.0..500.0_f64, n),
                prop::collection::vec(0u64..5_000_000, n),
            )
        })
        .prop_map(|(closes, volumes)| {
            let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let bars = closes
                .iter()
                .zip(&volumes)
                .enumerate()
                .map(|(i, (&close, &volume))| Bar {
                    date: base + chrono::Duration::days(i as i64 * 2),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume,
                })
                .collect();
            BarSeries::new(bars).unwrap()
        })
}

fn arb_params() -> impl Strategy<Value = ScanParams> {
    (1usize..30, 0.0..4.0_f64, -5.0..10.0_f64, 1usize..15).prop_map(
        |(lookback_period, volume_threshold, price_threshold, holding_period)| ScanParams {
            lookback_period,
            volume_threshold,
            price_threshold,
            holding_period,
        },
    )
}

proptest! {
    #[test]
    fn warmup_rows_have_no_volume_metrics(series in arb_series(), params in arb_params()) {
        let a = analyze(&series, &params).unwrap();
        for r in a.rows.iter().take(params.lookback_period) {
            prop_assert!(r.volume_baseline.is_none());
            prop_assert!(r.volume_ratio.is_none());
            prop_assert!(!r.is_breakout);
        }
        prop_assert!(a.rows[0].price_change_pct.is_none());
    }

    #[test]
    fn flag_matches_strict_condition(series in arb_series(), params in arb_params()) {
        let a = analyze(&series, &params).unwrap();
        for r in &a.rows {
            let expected = match (r.volume_ratio, r.price_change_pct) {
                (Some(v), Some(p)) => {
                    v > 1.0 + params.volume_threshold && p > params.price_threshold
                }
                _ => false,
            };
            prop_assert_eq!(r.is_breakout, expected);
        }
    }

    #[test]
    fn exits_are_exactly_holding_period_rows_later(
        series in arb_series(),
        params in arb_params(),
    ) {
        let a = analyze(&series, &params).unwrap();
        let n = a.rows.len();
        for (i, r) in a.rows.iter().enumerate() {
            match r.outcome {
                Some(o) => {
                    prop_assert!(r.is_breakout);
                    prop_assert_eq!(o.exit_index, i + params.holding_period);
                    prop_assert_eq!(o.exit_date, a.rows[o.exit_index].bar.date);
                    prop_assert_eq!(o.exit_price, a.rows[o.exit_index].bar.close);
                }
                None => {
                    prop_assert!(!r.is_breakout || i + params.holding_period >= n);
                }
            }
        }
    }

    #[test]
    fn report_and_summary_cover_the_same_signals(
        series in arb_series(),
        params in arb_params(),
    ) {
        let a = analyze(&series, &params).unwrap();
        prop_assert_eq!(a.signals.len(), a.summary.total_signals);

        let evaluated: Vec<NaiveDate> = a
            .rows
            .iter()
            .filter(|r| r.is_evaluated_signal())
            .map(|r| r.bar.date)
            .collect();
        let reported: Vec<NaiveDate> = a.signals.iter().map(|s| s.signal_date).collect();
        prop_assert_eq!(&evaluated, &reported);
        prop_assert!(reported.windows(2).all(|w| w[0] < w[1]));

        if a.summary.total_signals > 0 {
            prop_assert_eq!(a.summary.first_signal, reported.first().copied());
            prop_assert_eq!(a.summary.last_signal, reported.last().copied());
            prop_assert!(a.summary.win_rate >= 0.0 && a.summary.win_rate <= 100.0);
            prop_assert!(a.summary.worst_trade <= a.summary.best_trade);
        } else {
            prop_assert!(a.summary.first_signal.is_none());
        }
    }

    #[test]
    fn derived_values_are_finite(series in arb_series(), params in arb_params()) {
        let a = analyze(&series, &params).unwrap();
        for r in &a.rows {
            prop_assert!(r.volume_ratio.map_or(true, f64::is_finite));
            prop_assert!(r.price_change_pct.map_or(true, f64::is_finite));
            prop_assert!(r.forward_return_pct().map_or(true, f64::is_finite));
        }
        prop_assert!(a.summary.average_return.is_finite());
    }
}
