//! Summary aggregation: pure functions from evaluated signals to statistics.
//!
//! Input is the fully annotated table. Only evaluated signals (breakouts with
//! a completed trade) participate. An empty signal set yields
//! `SummaryStats::empty()`, a valid record, not an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::AnnotatedBar;

/// Aggregate statistics over the evaluated signals of one run.
///
/// Percent fields are in percent units (3.2 means +3.2%). Fields that need
/// two or more signals are `None` below that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_signals: usize,
    pub average_return: f64,
    pub win_rate: f64,
    pub return_std_dev: Option<f64>,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_win_size: f64,
    pub avg_loss_size: f64,
    pub avg_days_between_signals: Option<f64>,
    pub avg_volume_ratio: f64,
    pub max_volume_ratio: f64,
    pub min_volume_ratio: f64,
    pub volume_ratio_std: Option<f64>,
    pub avg_price_change: f64,
    pub max_price_change: f64,
    pub min_price_change: f64,
    pub first_signal: Option<NaiveDate>,
    pub last_signal: Option<NaiveDate>,
    /// Calendar days from first to last signal.
    pub total_days_analyzed: Option<i64>,
}

/// The per-signal values the aggregator works on.
struct SignalPoint {
    date: NaiveDate,
    forward_return: f64,
    volume_ratio: f64,
    price_change: f64,
}

impl SummaryStats {
    /// Placeholder record for a run with no evaluated signals.
    pub fn empty() -> Self {
        Self {
            total_signals: 0,
            average_return: 0.0,
            win_rate: 0.0,
            return_std_dev: None,
            best_trade: 0.0,
            worst_trade: 0.0,
            avg_win_size: 0.0,
            avg_loss_size: 0.0,
            avg_days_between_signals: None,
            avg_volume_ratio: 0.0,
            max_volume_ratio: 0.0,
            min_volume_ratio: 0.0,
            volume_ratio_std: None,
            avg_price_change: 0.0,
            max_price_change: 0.0,
            min_price_change: 0.0,
            first_signal: None,
            last_signal: None,
            total_days_analyzed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_signals == 0
    }

    /// Compute all statistics from the annotated table.
    pub fn compute(rows: &[AnnotatedBar]) -> Self {
        let points: Vec<SignalPoint> = rows
            .iter()
            .filter_map(|r| {
                if !r.is_breakout {
                    return None;
                }
                Some(SignalPoint {
                    date: r.date(),
                    forward_return: r.forward_return_pct()?,
                    volume_ratio: r.volume_ratio?,
                    price_change: r.price_change_pct?,
                })
            })
            .collect();

        if points.is_empty() {
            return Self::empty();
        }

        let returns: Vec<f64> = points.iter().map(|p| p.forward_return).collect();
        let ratios: Vec<f64> = points.iter().map(|p| p.volume_ratio).collect();
        let changes: Vec<f64> = points.iter().map(|p| p.price_change).collect();
        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();

        let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r <= 0.0).collect();

        let first = dates.iter().min().copied();
        let last = dates.iter().max().copied();

        Self {
            total_signals: points.len(),
            average_return: mean(&returns),
            win_rate: win_rate(&returns),
            return_std_dev: sample_std_dev(&returns),
            best_trade: max(&returns),
            worst_trade: min(&returns),
            avg_win_size: mean(&wins),
            avg_loss_size: mean(&losses),
            avg_days_between_signals: avg_days_between(&dates),
            avg_volume_ratio: mean(&ratios),
            max_volume_ratio: max(&ratios),
            min_volume_ratio: min(&ratios),
            volume_ratio_std: sample_std_dev(&ratios),
            avg_price_change: mean(&changes),
            max_price_change: max(&changes),
            min_price_change: min(&changes),
            first_signal: first,
            last_signal: last,
            total_days_analyzed: first.zip(last).map(|(f, l)| (l - f).num_days()),
        }
    }
}

// ─── Individual statistic functions ─────────────────────────────────

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Percentage of strictly positive returns.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let winners = returns.iter().filter(|r| **r > 0.0).count();
    winners as f64 / returns.len() as f64 * 100.0
}

/// Mean calendar-day gap between consecutive dates. `None` below two dates.
pub fn avg_days_between(dates: &[NaiveDate]) -> Option<f64> {
    if dates.len() < 2 {
        return None;
    }
    let gaps: Vec<f64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    Some(mean(&gaps))
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
