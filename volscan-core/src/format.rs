//! Presentation-neutral formatting.
//!
//! The formatted strings are part of the output contract: the CSV export and
//! any table view consume exactly these. Percent fields carry an explicit
//! sign ("+3.21%"), ratios a trailing "x" ("2.40x"), undefined values "N/A".

use serde::{Deserialize, Serialize};

use crate::report::SignalReportRow;
use crate::summary::SummaryStats;

pub const NOT_AVAILABLE: &str = "N/A";
pub const ZERO_PCT: &str = "0.00%";
pub const ZERO_RATIO: &str = "0.00x";

/// Signed percent with two decimals: `3.2101` -> `"+3.21%"`.
///
/// Values that round to zero print as `"+0.00%"`, never `"-0.00%"`.
pub fn signed_pct(value: f64) -> String {
    let text = format!("{value:+.2}%");
    if text == "-0.00%" {
        "+0.00%".to_string()
    } else {
        text
    }
}

/// Unsigned percent with two decimals, for magnitudes like win rate.
pub fn pct(value: f64) -> String {
    format!("{value:.2}%")
}

/// Ratio with two decimals and an `x` suffix: `2.4` -> `"2.40x"`.
pub fn ratio_x(value: f64) -> String {
    format!("{value:.2}x")
}

pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// Volume with K/M/B suffix: `1_500_000` -> `"1.5M"`.
pub fn compact_volume(volume: f64) -> String {
    if volume >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if volume >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if volume >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{volume:.0}")
    }
}

fn opt(value: Option<f64>, f: fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// One metric/value line of the summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub metric: String,
    pub value: String,
}

/// Ordered metric/value view of `SummaryStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub entries: Vec<SummaryEntry>,
}

impl SummaryTable {
    /// Returns and price changes are signed. Win rate and the two std-dev
    /// rows are non-negative magnitudes and print unsigned ("50.00%").
    pub fn from_stats(s: &SummaryStats) -> Self {
        let values: Vec<(&str, String)> = if s.is_empty() {
            empty_values()
        } else {
            vec![
                ("Total_Breakout_Days", s.total_signals.to_string()),
                ("Average_Return", signed_pct(s.average_return)),
                ("Win_Rate", pct(s.win_rate)),
                ("Return_Std_Dev", opt(s.return_std_dev, pct)),
                ("Best_Trade", signed_pct(s.best_trade)),
                ("Worst_Trade", signed_pct(s.worst_trade)),
                ("Avg_Win_Size", signed_pct(s.avg_win_size)),
                ("Avg_Loss_Size", signed_pct(s.avg_loss_size)),
                (
                    "Avg_Days_Between_Signals",
                    opt(s.avg_days_between_signals, |d| format!("{d:.2}")),
                ),
                ("Avg_Volume_Ratio", ratio_x(s.avg_volume_ratio)),
                ("Max_Volume_Ratio", ratio_x(s.max_volume_ratio)),
                ("Min_Volume_Ratio", ratio_x(s.min_volume_ratio)),
                ("Volume_Ratio_Std", opt(s.volume_ratio_std, ratio_x)),
                ("Avg_Price_Change", signed_pct(s.avg_price_change)),
                ("Max_Price_Change", signed_pct(s.max_price_change)),
                ("Min_Price_Change", signed_pct(s.min_price_change)),
                ("First_Signal", date_or_na(s.first_signal)),
                ("Last_Signal", date_or_na(s.last_signal)),
                (
                    "Total_Days_Analyzed",
                    s.total_days_analyzed
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ),
            ]
        };
        Self {
            entries: values
                .into_iter()
                .map(|(metric, value)| SummaryEntry {
                    metric: metric.to_string(),
                    value,
                })
                .collect(),
        }
    }

    pub fn get(&self, metric: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.metric == metric)
            .map(|e| e.value.as_str())
    }
}

fn empty_values() -> Vec<(&'static str, String)> {
    let z = || ZERO_PCT.to_string();
    let x = || ZERO_RATIO.to_string();
    let na = || NOT_AVAILABLE.to_string();
    vec![
        ("Total_Breakout_Days", "0".to_string()),
        ("Average_Return", z()),
        ("Win_Rate", z()),
        ("Return_Std_Dev", z()),
        ("Best_Trade", z()),
        ("Worst_Trade", z()),
        ("Avg_Win_Size", z()),
        ("Avg_Loss_Size", z()),
        ("Avg_Days_Between_Signals", na()),
        ("Avg_Volume_Ratio", x()),
        ("Max_Volume_Ratio", x()),
        ("Min_Volume_Ratio", x()),
        ("Volume_Ratio_Std", x()),
        ("Avg_Price_Change", z()),
        ("Max_Price_Change", z()),
        ("Min_Price_Change", z()),
        ("First_Signal", na()),
        ("Last_Signal", na()),
        ("Total_Days_Analyzed", na()),
    ]
}

fn date_or_na(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Column headers of the signal report, in order.
pub const REPORT_HEADER: [&str; 9] = [
    "Signal_Date",
    "Entry_Price",
    "Volume",
    "Volume_MA",
    "Volume_Ratio",
    "Price_Change_Pct",
    "Forward_Return",
    "Exit_Date",
    "Exit_Price",
];

/// Display strings for one report row, aligned with `REPORT_HEADER`.
pub fn report_row(r: &SignalReportRow) -> [String; 9] {
    [
        r.signal_date.to_string(),
        price(r.entry_price),
        r.volume.to_string(),
        format!("{:.0}", r.volume_baseline),
        ratio_x(r.volume_ratio),
        signed_pct(r.price_change_pct),
        signed_pct(r.forward_return_pct),
        r.exit_date.to_string(),
        price(r.exit_price),
    ]
}
