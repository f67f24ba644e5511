//! VolScan Runner: scan orchestration around `volscan-core`.
//!
//! This crate builds on `volscan-core` to provide:
//! - TOML scan configuration
//! - Data loading from CSV or Parquet, plus a synthetic demo generator
//! - Single-scan runner with run fingerprinting
//! - Parallel parameter sweeps and multi-symbol fan-out
//! - JSON, CSV, and Markdown export with artifact bundles

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, ScanConfig, ScanSection};
pub use data_loader::{
    dataset_hash, generate_synthetic_series, load_series, DataSource, LoadError, LoadOptions,
    LoadedSeries,
};
pub use runner::{
    run_id, run_scan, run_scan_from_loaded, run_scan_from_series, RunError, ScanResult,
    SCHEMA_VERSION,
};
pub use sweep::{ranked, scan_many, sweep, ParamGrid, SweepEntry};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn scan_result_is_send_sync() {
        assert_send::<ScanResult>();
        assert_sync::<ScanResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn loaded_series_is_send_sync() {
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<SweepEntry>();
    }
}
