//! Volume metrics: trailing baseline and current-to-baseline ratio.
//!
//! The baseline at row t is the mean of `volume[t-lookback .. t-1]`. It never
//! includes row t itself, so a spike cannot pull its own baseline up.
//! Warmup: the first `lookback` rows have no baseline.

use super::Stage;
use crate::domain::AnnotatedBar;

#[derive(Debug, Clone)]
pub struct VolumeMetrics {
    lookback: usize,
    name: String,
}

impl VolumeMetrics {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "volume lookback must be >= 1");
        Self {
            lookback,
            name: format!("volume_{lookback}"),
        }
    }

    /// Trailing baselines, one per row, computed on volumes alone.
    pub fn baselines(&self, volumes: &[u64]) -> Vec<Option<f64>> {
        let n = volumes.len();
        let mut result = vec![None; n];
        if n <= self.lookback {
            return result;
        }

        // Exact integer window sum; volumes are whole shares.
        let mut sum: u128 = volumes[..self.lookback].iter().map(|&v| v as u128).sum();
        for t in self.lookback..n {
            result[t] = Some(sum as f64 / self.lookback as f64);
            sum = sum + volumes[t] as u128 - volumes[t - self.lookback] as u128;
        }
        result
    }
}

/// `volume / baseline`, or `None` when the baseline is missing or zero or
/// the quotient is not finite.
pub fn volume_ratio(volume: u64, baseline: Option<f64>) -> Option<f64> {
    let baseline = baseline.filter(|b| *b > 0.0)?;
    let ratio = volume as f64 / baseline;
    ratio.is_finite().then_some(ratio)
}

impl Stage for VolumeMetrics {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.lookback
    }

    fn apply(&self, mut rows: Vec<AnnotatedBar>) -> Vec<AnnotatedBar> {
        let volumes: Vec<u64> = rows.iter().map(|r| r.bar.volume).collect();
        for (row, baseline) in rows.iter_mut().zip(self.baselines(&volumes)) {
            row.volume_baseline = baseline;
            row.volume_ratio = volume_ratio(row.bar.volume, baseline);
        }
        rows
    }
}
