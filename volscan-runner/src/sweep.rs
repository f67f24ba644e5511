//! Parameter sweeps and multi-symbol fan-out.
//!
//! Every run is independent, so both entry points evaluate in parallel with
//! rayon. Results come back in input order, one `Result` per entry; a bad
//! combination never aborts the batch.

use rayon::prelude::*;
use tracing::info;

use volscan_core::ScanParams;

use crate::config::ScanConfig;
use crate::data_loader::LoadedSeries;
use crate::runner::{run_scan, run_scan_from_loaded, RunError, ScanResult};

/// Parameter grid specification: one list per scan parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub lookback_periods: Vec<usize>,
    pub volume_thresholds: Vec<f64>,
    pub price_thresholds: Vec<f64>,
    pub holding_periods: Vec<usize>,
}

impl Default for ParamGrid {
    /// Lookbacks 10/20/50, volume 1.5/2.0/3.0, price 1.0/2.0/3.0, holding 5/10/20.
    fn default() -> Self {
        Self {
            lookback_periods: vec![10, 20, 50],
            volume_thresholds: vec![1.5, 2.0, 3.0],
            price_thresholds: vec![1.0, 2.0, 3.0],
            holding_periods: vec![5, 10, 20],
        }
    }
}

impl ParamGrid {
    /// Total number of combinations.
    pub fn size(&self) -> usize {
        self.lookback_periods.len()
            * self.volume_thresholds.len()
            * self.price_thresholds.len()
            * self.holding_periods.len()
    }

    /// Cartesian product, lookback varying slowest.
    pub fn generate(&self) -> Vec<ScanParams> {
        let mut out = Vec::with_capacity(self.size());
        for &lookback_period in &self.lookback_periods {
            for &volume_threshold in &self.volume_thresholds {
                for &price_threshold in &self.price_thresholds {
                    for &holding_period in &self.holding_periods {
                        out.push(ScanParams {
                            lookback_period,
                            volume_threshold,
                            price_threshold,
                            holding_period,
                        });
                    }
                }
            }
        }
        out
    }
}

/// One combination and how it went.
#[derive(Debug)]
pub struct SweepEntry {
    pub params: ScanParams,
    pub result: Result<ScanResult, RunError>,
}

/// Run every combination in `grid` over one pre-loaded series.
pub fn sweep(symbol: &str, loaded: &LoadedSeries, grid: &ParamGrid) -> Vec<SweepEntry> {
    let combos = grid.generate();
    info!(symbol, combinations = combos.len(), "sweep starting");

    let entries: Vec<SweepEntry> = combos
        .par_iter()
        .map(|params| SweepEntry {
            params: *params,
            result: run_scan_from_loaded(symbol, loaded, params),
        })
        .collect();

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    info!(symbol, completed = entries.len() - failed, failed, "sweep complete");
    entries
}

/// Run several configurations (typically one per symbol) in parallel.
pub fn scan_many(configs: &[ScanConfig]) -> Vec<Result<ScanResult, RunError>> {
    configs.par_iter().map(run_scan).collect()
}

/// Successful sweep entries ordered by average forward return, best first.
///
/// Entries with no evaluated signals sort last; ties keep grid order.
pub fn ranked(entries: &[SweepEntry]) -> Vec<&ScanResult> {
    let mut ok: Vec<&ScanResult> = entries.iter().filter_map(|e| e.result.as_ref().ok()).collect();
    ok.sort_by(|a, b| {
        let key = |r: &ScanResult| {
            if r.summary.is_empty() {
                f64::NEG_INFINITY
            } else {
                r.summary.average_return
            }
        };
        key(b).total_cmp(&key(a))
    });
    ok
}
