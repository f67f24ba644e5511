//! Pipeline: wires the four stages in order and derives both reports.
//!
//! ```text
//! BarSeries ─▶ VolumeMetrics ─▶ PriceChange ─▶ BreakoutClassifier ─▶ ForwardReturns
//!                                                                      │
//!                                         ┌────────────────────────────┴──────┐
//!                                         ▼                                   ▼
//!                                   SummaryStats                    Vec<SignalReportRow>
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{AnnotatedBar, BarSeries};
use crate::params::{ParamError, ScanParams};
use crate::report::{build_signal_report, SignalReportRow};
use crate::stages::{BreakoutClassifier, ForwardReturns, PriceChange, Stage, VolumeMetrics};
use crate::summary::SummaryStats;

/// The ordered stage list for one parameter set.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(params: &ScanParams) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self {
            stages: vec![
                Box::new(VolumeMetrics::new(params.lookback_period)),
                Box::new(PriceChange),
                Box::new(BreakoutClassifier::new(
                    params.volume_threshold,
                    params.price_threshold,
                )),
                Box::new(ForwardReturns::new(params.holding_period)),
            ],
        })
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Rows at the head of the series that cannot be classified.
    pub fn warmup(&self) -> usize {
        self.stages.iter().map(|s| s.warmup()).max().unwrap_or(0)
    }

    /// Produce the fully annotated table.
    pub fn run(&self, series: &BarSeries) -> Vec<AnnotatedBar> {
        let mut rows: Vec<AnnotatedBar> =
            series.bars().iter().cloned().map(AnnotatedBar::new).collect();
        for stage in &self.stages {
            rows = stage.apply(rows);
            debug!(
                stage = stage.name(),
                rows = rows.len(),
                breakouts = rows.iter().filter(|r| r.is_breakout).count(),
                "stage applied"
            );
        }
        rows
    }
}

/// Everything one run exposes to a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Full annotated table, for charting.
    pub rows: Vec<AnnotatedBar>,
    pub summary: SummaryStats,
    pub signals: Vec<SignalReportRow>,
    /// Leading rows no breakout can be flagged on.
    pub warmup: usize,
}

impl Analysis {
    /// Breakouts still open at the end of the series.
    pub fn open_signal_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.is_breakout && r.outcome.is_none())
            .count()
    }
}

/// Run the pipeline and derive the summary and signal report.
pub fn analyze(series: &BarSeries, params: &ScanParams) -> Result<Analysis, ParamError> {
    let pipeline = Pipeline::new(params)?;
    let rows = pipeline.run(series);
    let summary = SummaryStats::compute(&rows);
    let signals = build_signal_report(&rows);
    Ok(Analysis {
        rows,
        summary,
        signals,
        warmup: pipeline.warmup(),
    })
}
