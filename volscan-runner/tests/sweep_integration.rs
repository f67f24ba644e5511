use chrono::NaiveDate;
use proptest::prelude::*;
use volscan_core::ScanParams;
use volscan_runner::export::export_sweep_csv;
use volscan_runner::{
    generate_synthetic_series, ranked, run_scan_from_loaded, scan_many, sweep, ParamGrid,
    RunError, ScanConfig,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 2).unwrap()
}

#[test]
fn sweep_csv_has_one_row_per_combination() {
    let loaded = generate_synthetic_series("SWP", start(), 250, 1).unwrap();
    let grid = ParamGrid {
        lookback_periods: vec![10, 300],
        volume_thresholds: vec![1.0, 2.0],
        price_thresholds: vec![1.0],
        holding_periods: vec![5],
    };
    let entries = sweep("SWP", &loaded, &grid);
    let csv = export_sweep_csv(&entries).unwrap();
    assert_eq!(csv.lines().count(), grid.size() + 1);
    // lookback 300 needs 306 bars; both of its rows carry the error
    assert_eq!(
        csv.lines().filter(|l| l.contains("need at least")).count(),
        2
    );
    assert_eq!(ranked(&entries).len(), 2);
}

#[test]
fn scan_many_keeps_input_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut configs = Vec::new();
    for (i, symbol) in ["AAA", "BBB", "CCC"].iter().enumerate() {
        let loaded = generate_synthetic_series(symbol, start(), 200, i as u64).unwrap();
        let path = dir.path().join(format!("{symbol}.csv"));
        let mut buf = Vec::new();
        volscan_runner::data_loader::write_csv(loaded.series.bars(), &mut buf).unwrap();
        std::fs::write(&path, buf).unwrap();
        configs.push(ScanConfig::new(*symbol, path, ScanParams::default()));
    }
    configs.push(ScanConfig::new(
        "MISSING",
        dir.path().join("missing.csv"),
        ScanParams::default(),
    ));

    let results = scan_many(&configs);
    assert_eq!(results.len(), 4);
    for (config, result) in configs.iter().zip(&results).take(3) {
        assert_eq!(result.as_ref().unwrap().symbol, config.scan.symbol);
    }
    assert!(matches!(results[3], Err(RunError::Data(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Raising either threshold can only remove signals.
    #[test]
    fn stricter_thresholds_never_add_signals(
        seed in 0u64..1_000,
        volume in 0.5f64..3.0,
        price in 0.0f64..4.0,
        bump in 0.1f64..2.0,
    ) {
        let loaded = generate_synthetic_series("MONO", start(), 300, seed).unwrap();
        let base = ScanParams {
            volume_threshold: volume,
            price_threshold: price,
            ..ScanParams::default()
        };
        let loose = run_scan_from_loaded("MONO", &loaded, &base).unwrap();
        let stricter_volume = run_scan_from_loaded(
            "MONO",
            &loaded,
            &ScanParams { volume_threshold: volume + bump, ..base },
        )
        .unwrap();
        let stricter_price = run_scan_from_loaded(
            "MONO",
            &loaded,
            &ScanParams { price_threshold: price + bump, ..base },
        )
        .unwrap();

        prop_assert!(stricter_volume.signals.len() <= loose.signals.len());
        prop_assert!(stricter_price.signals.len() <= loose.signals.len());
        for s in &stricter_volume.signals {
            prop_assert!(loose.signals.iter().any(|l| l.signal_date == s.signal_date));
        }
    }
}
