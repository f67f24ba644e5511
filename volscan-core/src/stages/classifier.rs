//! Breakout classifier.
//!
//! A row is a breakout iff `volume_ratio > 1 + volume_threshold` and
//! `price_change_pct > price_threshold`. Both comparisons are strict; a
//! missing operand is never a breakout.

use super::Stage;
use crate::domain::AnnotatedBar;

#[derive(Debug, Clone)]
pub struct BreakoutClassifier {
    ratio_threshold: f64,
    price_threshold: f64,
    name: String,
}

impl BreakoutClassifier {
    /// `volume_threshold` is the fraction above baseline (2.0 => ratio > 3.0).
    pub fn new(volume_threshold: f64, price_threshold: f64) -> Self {
        Self {
            ratio_threshold: 1.0 + volume_threshold,
            price_threshold,
            name: format!("breakout_{volume_threshold}_{price_threshold}"),
        }
    }

    pub fn is_breakout(&self, volume_ratio: Option<f64>, price_change_pct: Option<f64>) -> bool {
        match (volume_ratio, price_change_pct) {
            (Some(ratio), Some(change)) => {
                ratio > self.ratio_threshold && change > self.price_threshold
            }
            _ => false,
        }
    }
}

impl Stage for BreakoutClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, mut rows: Vec<AnnotatedBar>) -> Vec<AnnotatedBar> {
        for row in rows.iter_mut() {
            row.is_breakout = self.is_breakout(row.volume_ratio, row.price_change_pct);
        }
        rows
    }
}
