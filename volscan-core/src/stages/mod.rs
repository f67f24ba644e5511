//! Pipeline stages.
//!
//! Each stage consumes the whole annotated table and returns it with its own
//! columns filled in. Stages are pure: same rows in, same rows out, no state
//! carried between calls. Order matters only through data dependencies:
//! volume metrics and price change read raw OHLCV, the classifier reads both,
//! forward returns read the classifier's flags.

pub mod classifier;
pub mod forward;
pub mod price;
pub mod volume;

pub use classifier::BreakoutClassifier;
pub use forward::ForwardReturns;
pub use price::PriceChange;
pub use volume::VolumeMetrics;

use crate::domain::AnnotatedBar;

/// One transformation over the annotated table.
pub trait Stage: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Rows before the first one this stage can define.
    fn warmup(&self) -> usize {
        0
    }

    fn apply(&self, rows: Vec<AnnotatedBar>) -> Vec<AnnotatedBar>;
}

/// Build annotated rows from closes and volumes for tests.
///
/// Dates are consecutive calendar days from 2024-01-02; open = previous
/// close, high/low bracket the body by 1.0.
#[cfg(test)]
pub fn make_rows(closes: &[f64], volumes: &[u64]) -> Vec<AnnotatedBar> {
    use crate::domain::Bar;
    assert_eq!(closes.len(), volumes.len(), "closes/volumes length mismatch");
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            AnnotatedBar::new(Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume,
            })
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
