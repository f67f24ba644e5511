//! Scan runner: wires together loading, the core pipeline, and fingerprinting.
//!
//! Three entry points:
//! - `run_scan()`: loads the configured file, then runs. Used by the CLI.
//! - `run_scan_from_loaded()`: takes a pre-loaded series with provenance. Used by sweeps.
//! - `run_scan_from_series()`: takes a bare validated series. Used by tests and callers
//!   that build bars themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use volscan_core::{
    analyze, AnnotatedBar, BarSeries, ParamError, ScanParams, SignalReportRow, SummaryStats,
};

use crate::config::{ConfigError, ScanConfig};
use crate::data_loader::{dataset_hash, load_series, LoadError, LoadOptions, LoadedSeries};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),
    #[error("{symbol}: need at least {need} bars for these parameters, got {got}")]
    InsufficientHistory {
        symbol: String,
        need: usize,
        got: usize,
    },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub params: ScanParams,
    pub run_id: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub bar_count: usize,
    /// Leading bars without a volume baseline.
    pub warmup_bars: usize,
    /// Breakouts too close to the end of the series to have a forward return.
    pub open_signals: usize,
    pub summary: SummaryStats,
    pub signals: Vec<SignalReportRow>,
    /// Full annotated table, for charting.
    pub annotated: Vec<AnnotatedBar>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScanResult {
    pub fn has_signals(&self) -> bool {
        !self.signals.is_empty()
    }
}

/// Deterministic identity of a run: same parameters on the same data, same id.
pub fn run_id(params: &ScanParams, dataset_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(params.lookback_period as u64).to_le_bytes());
    hasher.update(&params.volume_threshold.to_le_bytes());
    hasher.update(&params.price_threshold.to_le_bytes());
    hasher.update(&(params.holding_period as u64).to_le_bytes());
    hasher.update(dataset_hash.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}

/// Load the configured file and run one scan.
pub fn run_scan(config: &ScanConfig) -> Result<ScanResult, RunError> {
    config.validate()?;
    let opts = LoadOptions {
        start: config.scan.start_date,
        end: config.scan.end_date,
    };
    let loaded = load_series(&config.scan.data, &opts)?;
    run_scan_from_loaded(&config.scan.symbol, &loaded, &config.params)
}

/// Run one scan over pre-loaded data: no I/O.
pub fn run_scan_from_loaded(
    symbol: &str,
    loaded: &LoadedSeries,
    params: &ScanParams,
) -> Result<ScanResult, RunError> {
    run_with_provenance(
        symbol,
        &loaded.series,
        params,
        &loaded.dataset_hash,
        loaded.has_synthetic(),
    )
}

/// Run one scan over a bare series. The dataset hash is computed here.
pub fn run_scan_from_series(
    symbol: &str,
    series: &BarSeries,
    params: &ScanParams,
) -> Result<ScanResult, RunError> {
    let hash = dataset_hash(series);
    run_with_provenance(symbol, series, params, &hash, false)
}

fn run_with_provenance(
    symbol: &str,
    series: &BarSeries,
    params: &ScanParams,
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<ScanResult, RunError> {
    params.validate()?;
    let need = params.min_series_len();
    if series.len() < need {
        return Err(RunError::InsufficientHistory {
            symbol: symbol.to_string(),
            need,
            got: series.len(),
        });
    }

    debug!(symbol, bars = series.len(), ?params, "scan starting");
    let analysis = analyze(series, params)?;
    let open_signals = analysis.open_signal_count();

    info!(
        symbol,
        bars = series.len(),
        warmup = analysis.warmup,
        signals = analysis.signals.len(),
        open_signals,
        "scan complete"
    );

    Ok(ScanResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        params: *params,
        run_id: run_id(params, dataset_hash),
        dataset_hash: dataset_hash.to_string(),
        has_synthetic,
        first_date: series.first_date(),
        last_date: series.last_date(),
        bar_count: series.len(),
        warmup_bars: analysis.warmup,
        open_signals,
        summary: analysis.summary,
        signals: analysis.signals,
        annotated: analysis.rows,
    })
}
