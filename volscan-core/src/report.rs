//! Signal report: one row per completed breakout trade, oldest first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::AnnotatedBar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReportRow {
    pub signal_date: NaiveDate,
    pub entry_price: f64,
    pub volume: u64,
    pub volume_baseline: f64,
    pub volume_ratio: f64,
    pub price_change_pct: f64,
    pub forward_return_pct: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
}

impl SignalReportRow {
    /// Project an annotated row; `None` unless it is an evaluated signal.
    pub fn from_row(row: &AnnotatedBar) -> Option<Self> {
        if !row.is_breakout {
            return None;
        }
        let outcome = row.outcome?;
        Some(Self {
            signal_date: row.bar.date,
            entry_price: row.bar.close,
            volume: row.bar.volume,
            volume_baseline: row.volume_baseline?,
            volume_ratio: row.volume_ratio?,
            price_change_pct: row.price_change_pct?,
            forward_return_pct: outcome.forward_return_pct,
            exit_date: outcome.exit_date,
            exit_price: outcome.exit_price,
        })
    }
}

/// Build the signal report from the annotated table.
///
/// Breakouts without a forward return (still open at the end of the series)
/// are left out entirely.
pub fn build_signal_report(rows: &[AnnotatedBar]) -> Vec<SignalReportRow> {
    let mut report: Vec<SignalReportRow> = rows.iter().filter_map(SignalReportRow::from_row).collect();
    report.sort_by_key(|r| r.signal_date);
    report
}
