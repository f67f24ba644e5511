//! VolScan CLI: volume-breakout scans from the command line.
//!
//! Commands:
//! - `scan`: scan one series from a TOML config file or a data file plus flags
//! - `sweep`: evaluate a parameter grid over one series in parallel
//! - `synth`: write a deterministic synthetic OHLCV CSV for demos

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use volscan_core::format::{self, SummaryTable, REPORT_HEADER};
use volscan_core::ScanParams;
use volscan_runner::data_loader::write_csv;
use volscan_runner::export::{export_sweep_csv, save_artifacts};
use volscan_runner::{
    generate_synthetic_series, load_series, ranked, run_scan, sweep, LoadOptions, ParamGrid,
    ScanConfig, ScanResult,
};

#[derive(Parser)]
#[command(
    name = "volscan",
    about = "VolScan CLI: volume breakout scanner and forward-return analysis"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one series for volume breakouts.
    Scan {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "data")]
        config: Option<PathBuf>,

        /// CSV or Parquet file with date/open/high/low/close/volume columns.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Symbol label (defaults to the data file's stem).
        #[arg(long)]
        symbol: Option<String>,

        /// Trailing window for the volume baseline, in rows.
        #[arg(long)]
        lookback: Option<usize>,

        /// Fraction above baseline volume must exceed (2.0 means 3x).
        #[arg(long)]
        volume_threshold: Option<f64>,

        /// Minimum day-over-day close change, in percent.
        #[arg(long)]
        price_threshold: Option<f64>,

        /// Rows between entry and exit.
        #[arg(long)]
        holding_period: Option<usize>,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Evaluate every parameter combination over one series.
    Sweep {
        /// CSV or Parquet data file.
        #[arg(long)]
        data: PathBuf,

        /// Symbol label (defaults to the data file's stem).
        #[arg(long)]
        symbol: Option<String>,

        #[arg(long, value_delimiter = ',', default_values_t = vec![10, 20, 50])]
        lookbacks: Vec<usize>,

        #[arg(long, value_delimiter = ',', default_values_t = vec![1.5, 2.0, 3.0])]
        volume_thresholds: Vec<f64>,

        #[arg(long, value_delimiter = ',', default_values_t = vec![1.0, 2.0, 3.0])]
        price_thresholds: Vec<f64>,

        #[arg(long, value_delimiter = ',', default_values_t = vec![5, 10, 20])]
        holding_periods: Vec<usize>,

        /// How many of the best combinations to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Write the full grid as CSV to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a synthetic OHLCV CSV.
    Synth {
        /// Destination CSV file.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "SYNTH")]
        symbol: String,

        #[arg(long, default_value_t = 756)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First calendar date (YYYY-MM-DD); weekends are skipped.
        #[arg(long, default_value = "2021-01-04")]
        start: NaiveDate,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            config,
            data,
            symbol,
            lookback,
            volume_threshold,
            price_threshold,
            holding_period,
            start,
            end,
            output_dir,
            no_save,
        } => {
            let mut scan_config = match (config, data) {
                (Some(path), None) => ScanConfig::from_file(&path)?,
                (None, Some(data)) => {
                    let symbol = symbol.clone().unwrap_or_else(|| symbol_from_path(&data));
                    ScanConfig::new(symbol, data, ScanParams::default())
                }
                _ => bail!("one of --config or --data is required"),
            };
            let p = &mut scan_config.params;
            if let Some(v) = lookback {
                p.lookback_period = v;
            }
            if let Some(v) = volume_threshold {
                p.volume_threshold = v;
            }
            if let Some(v) = price_threshold {
                p.price_threshold = v;
            }
            if let Some(v) = holding_period {
                p.holding_period = v;
            }
            if let Some(s) = symbol {
                scan_config.scan.symbol = s;
            }
            if start.is_some() {
                scan_config.scan.start_date = start;
            }
            if end.is_some() {
                scan_config.scan.end_date = end;
            }

            run_scan_cmd(&scan_config, &output_dir, no_save)
        }
        Commands::Sweep {
            data,
            symbol,
            lookbacks,
            volume_thresholds,
            price_thresholds,
            holding_periods,
            top,
            out,
        } => {
            let grid = ParamGrid {
                lookback_periods: lookbacks,
                volume_thresholds,
                price_thresholds,
                holding_periods,
            };
            let symbol = symbol.unwrap_or_else(|| symbol_from_path(&data));
            run_sweep_cmd(&data, &symbol, &grid, top, out.as_deref())
        }
        Commands::Synth {
            out,
            symbol,
            bars,
            seed,
            start,
        } => {
            let loaded = generate_synthetic_series(&symbol, start, bars, seed)?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            write_csv(loaded.series.bars(), file)?;
            println!(
                "Wrote {} synthetic bars for {symbol} to {} ({} to {})",
                loaded.series.len(),
                out.display(),
                loaded.series.first_date(),
                loaded.series.last_date()
            );
            Ok(())
        }
    }
}

/// Log to stderr; RUST_LOG wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn run_scan_cmd(config: &ScanConfig, output_dir: &Path, no_save: bool) -> Result<()> {
    let result = run_scan(config)?;
    print_summary(&result);
    print_signals(&result);

    if !no_save {
        let run_dir = save_artifacts(&result, output_dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_sweep_cmd(
    data: &Path,
    symbol: &str,
    grid: &ParamGrid,
    top: usize,
    out: Option<&Path>,
) -> Result<()> {
    if grid.size() == 0 {
        bail!("every parameter list needs at least one value");
    }
    let loaded = load_series(data, &LoadOptions::default())?;
    let entries = sweep(symbol, &loaded, grid);

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    println!();
    println!("=== Sweep: {symbol} ===");
    println!(
        "Combinations:   {} ({} failed)",
        entries.len(),
        failed
    );
    println!();
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>8} {:>10} {:>9}",
        "Lookback", "VolThr", "PxThr", "Hold", "Signals", "AvgRet", "WinRate"
    );
    println!("{}", "-".repeat(67));
    for r in ranked(&entries).into_iter().take(top) {
        let p = &r.params;
        let s = &r.summary;
        println!(
            "{:>8} {:>8.2} {:>8.2} {:>8} {:>8} {:>10} {:>9}",
            p.lookback_period,
            p.volume_threshold,
            p.price_threshold,
            p.holding_period,
            s.total_signals,
            format::signed_pct(s.average_return),
            format::pct(s.win_rate)
        );
    }
    for e in entries.iter().filter(|e| e.result.is_err()).take(3) {
        if let Err(err) = &e.result {
            eprintln!("skipped {:?}: {err}", e.params);
        }
    }

    if let Some(path) = out {
        std::fs::write(path, export_sweep_csv(&entries)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Grid written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(result: &ScanResult) {
    let p = &result.params;
    println!();
    println!("=== Volume Breakout Scan ===");
    println!("Symbol:         {}", result.symbol);
    println!(
        "Period:         {} to {}",
        result.first_date, result.last_date
    );
    println!(
        "Bars:           {} ({} warmup)",
        result.bar_count, result.warmup_bars
    );
    println!(
        "Parameters:     lookback {}, volume >{}, price >{:.2}%, hold {}",
        p.lookback_period,
        format::ratio_x(p.volume_ratio_threshold()),
        p.price_threshold,
        p.holding_period
    );
    if result.open_signals > 0 {
        println!(
            "Open signals:   {} (too close to the end to evaluate)",
            result.open_signals
        );
    }
    println!();
    println!("--- Summary ---");
    for e in SummaryTable::from_stats(&result.summary).entries {
        println!("{:<26}{}", e.metric, e.value);
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_signals(result: &ScanResult) {
    if !result.has_signals() {
        println!("No breakout signals found in the selected period.");
        return;
    }
    println!("--- Signals ---");
    println!(
        "{:<12} {:>11} {:>12} {:>10} {:>12} {:>16} {:>14} {:<12} {:>10}",
        REPORT_HEADER[0],
        REPORT_HEADER[1],
        REPORT_HEADER[2],
        REPORT_HEADER[3],
        REPORT_HEADER[4],
        REPORT_HEADER[5],
        REPORT_HEADER[6],
        REPORT_HEADER[7],
        REPORT_HEADER[8]
    );
    for s in &result.signals {
        let c = format::report_row(s);
        println!(
            "{:<12} {:>11} {:>12} {:>10} {:>12} {:>16} {:>14} {:<12} {:>10}",
            c[0],
            c[1],
            format::compact_volume(s.volume as f64),
            format::compact_volume(s.volume_baseline),
            c[4],
            c[5],
            c[6],
            c[7],
            c[8]
        );
    }
    println!();
}
