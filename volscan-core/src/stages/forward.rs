//! Forward return evaluation.
//!
//! For each breakout at row i, the exit is row `i + holding_period`. Distance
//! is counted in rows, so non-trading days inside the series never count as
//! held days. A breakout whose exit row does not exist keeps `outcome = None`.
//! Signals are evaluated independently; overlapping holds are fine.

use super::Stage;
use crate::domain::{AnnotatedBar, ForwardOutcome};

#[derive(Debug, Clone)]
pub struct ForwardReturns {
    holding_period: usize,
    name: String,
}

impl ForwardReturns {
    pub fn new(holding_period: usize) -> Self {
        assert!(holding_period >= 1, "holding period must be >= 1");
        Self {
            holding_period,
            name: format!("forward_{holding_period}"),
        }
    }

    /// Outcome of entering at `rows[entry]`'s close, if the exit row exists.
    pub fn evaluate(&self, rows: &[AnnotatedBar], entry: usize) -> Option<ForwardOutcome> {
        let exit_index = entry.checked_add(self.holding_period)?;
        let exit = rows.get(exit_index)?;
        let entry_price = rows.get(entry)?.bar.close;
        let exit_price = exit.bar.close;
        let forward_return_pct = (exit_price - entry_price) / entry_price * 100.0;
        if !forward_return_pct.is_finite() {
            return None;
        }
        Some(ForwardOutcome {
            exit_index,
            exit_date: exit.bar.date,
            exit_price,
            forward_return_pct,
        })
    }
}

impl Stage for ForwardReturns {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, mut rows: Vec<AnnotatedBar>) -> Vec<AnnotatedBar> {
        let outcomes: Vec<Option<ForwardOutcome>> = (0..rows.len())
            .map(|i| {
                if rows[i].is_breakout {
                    self.evaluate(&rows, i)
                } else {
                    None
                }
            })
            .collect();
        for (row, outcome) in rows.iter_mut().zip(outcomes) {
            row.outcome = outcome;
        }
        rows
    }
}
