//! AnnotatedBar: one row of the pipeline's working table.
//!
//! Each stage fills in its own fields and reads only fields filled by
//! earlier stages. A `None` means "not defined for this row" (insufficient
//! history, zero baseline, no exit row), never zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Bar;

/// Realized outcome of holding a breakout for the configured number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardOutcome {
    /// Row position of the exit bar in the series.
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// `(exit - entry) / entry * 100`.
    pub forward_return_pct: f64,
}

/// A bar plus every derived column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    #[serde(flatten)]
    pub bar: Bar,
    /// Trailing mean volume over the rows strictly before this one.
    pub volume_baseline: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub is_breakout: bool,
    pub outcome: Option<ForwardOutcome>,
}

impl AnnotatedBar {
    /// A fresh row with no derived columns yet.
    pub fn new(bar: Bar) -> Self {
        Self {
            bar,
            volume_baseline: None,
            volume_ratio: None,
            price_change_pct: None,
            is_breakout: false,
            outcome: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn forward_return_pct(&self) -> Option<f64> {
        self.outcome.map(|o| o.forward_return_pct)
    }

    pub fn exit_date(&self) -> Option<NaiveDate> {
        self.outcome.map(|o| o.exit_date)
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.outcome.map(|o| o.exit_price)
    }

    /// A breakout with a completed trade and every metric defined.
    ///
    /// Only these rows reach the summary and the signal report; open
    /// positions at the end of the series are not zero-return trades.
    pub fn is_evaluated_signal(&self) -> bool {
        self.is_breakout
            && self.outcome.is_some()
            && self.volume_ratio.is_some()
            && self.price_change_pct.is_some()
    }
}
