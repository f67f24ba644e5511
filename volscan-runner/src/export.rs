//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for scan results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: signal report, summary, annotated table, and sweep grid
//! - **Markdown**: human-readable single-run report
//!
//! The signal and summary CSVs and the Markdown report use the display
//! strings from `volscan_core::format`. The annotated and sweep CSVs keep
//! raw numerics for charting and analysis tools.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use volscan_core::format::{self, SummaryTable, REPORT_HEADER};
use volscan_core::{AnnotatedBar, SignalReportRow};

use crate::runner::{ScanResult, SCHEMA_VERSION};
use crate::sweep::SweepEntry;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScanResult` to pretty JSON.
pub fn export_json(result: &ScanResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize ScanResult to JSON")
}

/// Deserialize a `ScanResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScanResult> {
    let result: ScanResult =
        serde_json::from_str(json).context("failed to deserialize ScanResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the signal report, one row per evaluated signal.
///
/// Cells are the display strings from `format::report_row`: ratios carry
/// an `x`, price change and forward return an explicit sign.
pub fn export_signals_csv(signals: &[SignalReportRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(REPORT_HEADER)?;
    for s in signals {
        wtr.write_record(format::report_row(s))?;
    }
    finish(wtr)
}

/// Export the summary as `Metric,Value` pairs using display strings.
pub fn export_summary_csv(table: &SummaryTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Metric", "Value"])?;
    for e in &table.entries {
        wtr.write_record([&e.metric, &e.value])?;
    }
    finish(wtr)
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Export the full annotated table for charting. Undefined cells are empty.
pub fn export_annotated_csv(rows: &[AnnotatedBar]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "volume_ma",
        "volume_ratio",
        "price_change_pct",
        "is_breakout",
        "forward_return",
        "exit_date",
    ])?;
    for r in rows {
        let b = &r.bar;
        wtr.write_record([
            b.date.to_string(),
            format!("{:.4}", b.open),
            format!("{:.4}", b.high),
            format!("{:.4}", b.low),
            format!("{:.4}", b.close),
            b.volume.to_string(),
            opt_num(r.volume_baseline),
            opt_num(r.volume_ratio),
            opt_num(r.price_change_pct),
            r.is_breakout.to_string(),
            opt_num(r.forward_return_pct()),
            r.exit_date().map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }
    finish(wtr)
}

/// One row per grid combination; failed runs carry their error message.
pub fn export_sweep_csv(entries: &[SweepEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "lookback_period",
        "volume_threshold",
        "price_threshold",
        "holding_period",
        "signals",
        "average_return",
        "win_rate",
        "return_std_dev",
        "run_id",
        "error",
    ])?;
    for e in entries {
        let p = &e.params;
        let mut record = vec![
            p.lookback_period.to_string(),
            p.volume_threshold.to_string(),
            p.price_threshold.to_string(),
            p.holding_period.to_string(),
        ];
        match &e.result {
            Ok(r) => {
                let s = &r.summary;
                record.extend([
                    s.total_signals.to_string(),
                    format!("{:.6}", s.average_return),
                    format!("{:.6}", s.win_rate),
                    opt_num(s.return_std_dev),
                    r.run_id.clone(),
                    String::new(),
                ]);
            }
            Err(err) => {
                record.extend([
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    err.to_string(),
                ]);
            }
        }
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single scan.
///
/// Creates a directory named `{symbol}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `ScanResult`
/// - `signals.csv`: the signal report
/// - `summary.csv`: metric/value pairs
/// - `annotated.csv`: every bar with its derived columns
/// - `report.md`: Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &ScanResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        result.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, content: &str| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    };

    write("manifest.json", &export_json(result)?)?;
    write("signals.csv", &export_signals_csv(&result.signals)?)?;
    write(
        "summary.csv",
        &export_summary_csv(&SummaryTable::from_stats(&result.summary))?,
    )?;
    write("annotated.csv", &export_annotated_csv(&result.annotated)?)?;
    write("report.md", &generate_report(result))?;

    Ok(run_dir)
}

/// Load a `ScanResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<ScanResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single scan.
pub fn generate_report(result: &ScanResult) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str(&format!("# Volume Breakout Report: {}\n\n", result.symbol));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.first_date, result.last_date
    ));
    md.push_str(&format!(
        "| Bars | {} ({} warmup) |\n",
        result.bar_count, result.warmup_bars
    ));
    md.push_str(&format!("| Open Signals | {} |\n", result.open_signals));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let p = &result.params;
    md.push_str("## Parameters\n\n");
    md.push_str("| Parameter | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Lookback Period | {} days |\n", p.lookback_period));
    md.push_str(&format!(
        "| Volume Threshold | {:.0}% above average ({}) |\n",
        p.volume_threshold * 100.0,
        format::ratio_x(p.volume_ratio_threshold())
    ));
    md.push_str(&format!("| Price Threshold | {:.2}% |\n", p.price_threshold));
    md.push_str(&format!("| Holding Period | {} days |\n", p.holding_period));
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    for e in SummaryTable::from_stats(&result.summary).entries {
        md.push_str(&format!("| {} | {} |\n", e.metric, e.value));
    }
    md.push('\n');

    md.push_str("## Signals\n\n");
    if result.signals.is_empty() {
        md.push_str("No breakout signals found in the selected period.\n");
    } else {
        md.push_str(&format!("| {} |\n", REPORT_HEADER.join(" | ")));
        md.push_str(&format!("|{}\n", " --- |".repeat(REPORT_HEADER.len())));
        for s in &result.signals {
            md.push_str(&format!("| {} |\n", format::report_row(s).join(" | ")));
        }
    }

    md
}
