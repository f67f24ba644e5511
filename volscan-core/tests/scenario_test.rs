//! End-to-end scenarios over the full pipeline.

mod common;

use common::{spike_scenario, weekday_series};
use volscan_core::format::SummaryTable;
use volscan_core::{analyze, ScanParams};

fn params(price_threshold: f64) -> ScanParams {
    ScanParams {
        lookback_period: 20,
        volume_threshold: 2.0,
        price_threshold,
        holding_period: 5,
    }
}

#[test]
fn spike_at_row_30_is_a_breakout() {
    let (closes, volumes) = spike_scenario(30);
    let series = weekday_series(&closes, &volumes);
    let analysis = analyze(&series, &params(2.0)).unwrap();

    let row = &analysis.rows[30];
    assert_eq!(row.volume_baseline, Some(1_000_000.0));
    assert_eq!(row.volume_ratio, Some(4.0));
    assert!((row.price_change_pct.unwrap() - 3.0).abs() < 1e-9);
    assert!(row.is_breakout);

    let outcome = row.outcome.unwrap();
    assert_eq!(outcome.exit_index, 35);
    assert_eq!(outcome.exit_date, analysis.rows[35].bar.date);
    let expected = (closes[35] - 103.0) / 103.0 * 100.0;
    assert!((outcome.forward_return_pct - expected).abs() < 1e-12);

    let flagged: Vec<usize> = analysis
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_breakout)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, vec![30]);

    assert_eq!(analysis.signals.len(), 1);
    assert_eq!(analysis.signals[0].signal_date, row.bar.date);
    assert_eq!(analysis.summary.total_signals, 1);
    assert_eq!(analysis.summary.win_rate, 100.0);
}

#[test]
fn higher_price_threshold_rejects_spike() {
    let (closes, volumes) = spike_scenario(30);
    let series = weekday_series(&closes, &volumes);
    let analysis = analyze(&series, &params(5.0)).unwrap();

    assert!(!analysis.rows[30].is_breakout);
    assert!(analysis.rows[30].outcome.is_none());
    assert!(analysis.signals.is_empty());
    assert!(analysis.summary.is_empty());
}

#[test]
fn breakout_too_close_to_end_is_excluded() {
    let (closes, volumes) = spike_scenario(38);
    let series = weekday_series(&closes, &volumes);
    let analysis = analyze(&series, &params(2.0)).unwrap();

    assert!(analysis.rows[38].is_breakout);
    assert!(analysis.rows[38].outcome.is_none());
    assert_eq!(analysis.open_signal_count(), 1);
    assert!(analysis.signals.is_empty());
    assert_eq!(analysis.summary.total_signals, 0);
}

#[test]
fn ratio_exactly_at_threshold_is_not_a_breakout() {
    let (closes, mut volumes) = spike_scenario(30);
    volumes[30] = 3_000_000;
    let series = weekday_series(&closes, &volumes);
    let analysis = analyze(&series, &params(2.0)).unwrap();

    assert_eq!(analysis.rows[30].volume_ratio, Some(3.0));
    assert!(!analysis.rows[30].is_breakout);
}

#[test]
fn price_change_exactly_at_threshold_is_not_a_breakout() {
    // 64 -> 65 is exactly +1.5625%
    let mut closes = vec![64.0; 30];
    closes[25..].iter_mut().for_each(|c| *c = 65.0);
    let mut volumes = vec![1_000u64; 30];
    volumes[25] = 10_000;
    let series = weekday_series(&closes, &volumes);
    let p = ScanParams {
        lookback_period: 20,
        volume_threshold: 2.0,
        price_threshold: 1.5625,
        holding_period: 2,
    };
    let analysis = analyze(&series, &p).unwrap();
    assert_eq!(analysis.rows[25].price_change_pct, Some(1.5625));
    assert!(!analysis.rows[25].is_breakout);

    let p = ScanParams {
        price_threshold: 1.5,
        ..p
    };
    assert!(analyze(&series, &p).unwrap().rows[25].is_breakout);
}

#[test]
fn empty_run_renders_placeholders() {
    let series = weekday_series(&[100.0; 40], &[1_000_000; 40]);
    let analysis = analyze(&series, &params(2.0)).unwrap();
    let table = SummaryTable::from_stats(&analysis.summary);

    assert_eq!(table.get("Total_Breakout_Days"), Some("0"));
    assert_eq!(table.get("Average_Return"), Some("0.00%"));
    assert_eq!(table.get("Win_Rate"), Some("0.00%"));
    assert_eq!(table.get("Max_Volume_Ratio"), Some("0.00x"));
    assert_eq!(table.get("First_Signal"), Some("N/A"));
}

#[test]
fn series_shorter_than_lookback_is_all_undefined() {
    let series = weekday_series(&[100.0, 110.0, 130.0], &[1, 100, 10_000]);
    let analysis = analyze(&series, &ScanParams::default()).unwrap();
    assert!(analysis.rows.iter().all(|r| r.volume_baseline.is_none()));
    assert!(analysis.rows.iter().all(|r| !r.is_breakout));
    assert!(analysis.summary.is_empty());
}

#[test]
fn weekend_gaps_do_not_count_as_held_days() {
    let (closes, volumes) = spike_scenario(30);
    let series = weekday_series(&closes, &volumes);
    let analysis = analyze(&series, &params(2.0)).unwrap();
    let entry = analysis.rows[30].bar.date;
    let exit = analysis.rows[30].exit_date().unwrap();
    // 5 trading rows span a weekend, so more than 5 calendar days pass.
    assert!((exit - entry).num_days() > 5);
    assert_eq!(analysis.rows[30].outcome.unwrap().exit_index, 35);
}
