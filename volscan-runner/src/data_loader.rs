//! Series loading for the runner.
//!
//! Reads one instrument's daily OHLCV from a CSV or Parquet file, applies an
//! optional date window, and validates the result into a `BarSeries`. The
//! file is expected to be clean already (sorted, deduplicated, gaps
//! forward-filled); anything else fails fast instead of being repaired.
//!
//! Synthetic data is a developer-only demo mode. Results produced on it are
//! tagged so they are never mistaken for real market data.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use volscan_core::{Bar, BarSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("parquet error in {path}: {reason}")]
    Parquet { path: PathBuf, reason: String },

    #[error("missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("row {row}: cannot parse {field} from '{value}'")]
    Parse {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("no rows in {path}")]
    Empty { path: PathBuf },

    #[error("unsupported data file {path} (expected .csv or .parquet)")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

/// Where the bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Csv,
    Parquet,
    Synthetic,
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// First date to keep (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date to keep (inclusive).
    pub end: Option<NaiveDate>,
}

/// A loaded series with provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: BarSeries,
    pub source: DataSource,
    /// BLAKE3 over all bar data, for fingerprinting runs.
    pub dataset_hash: String,
}

impl LoadedSeries {
    pub fn has_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Load a series from `path`, choosing the reader by file extension.
pub fn load_series(path: &Path, opts: &LoadOptions) -> Result<LoadedSeries, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let (bars, source) = match ext.as_deref() {
        Some("csv") => {
            let file = fs::File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            (read_csv(file, path)?, DataSource::Csv)
        }
        Some("parquet") => (read_parquet(path)?, DataSource::Parquet),
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), rows = bars.len(), "bars read");

    let series = BarSeries::new(bars)?;
    let series = if opts.start.is_some() || opts.end.is_some() {
        series.window(opts.start, opts.end)?
    } else {
        series
    };
    let dataset_hash = dataset_hash(&series);

    Ok(LoadedSeries {
        series,
        source,
        dataset_hash,
    })
}

// ── CSV ──────────────────────────────────────────────────────────────

/// Parse OHLCV rows from CSV. Headers match case-insensitively; extra
/// columns such as `Adj Close` are ignored. `origin` is only for errors.
pub fn read_csv<R: std::io::Read>(reader: R, origin: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LoadError::MissingColumn {
                path: origin.to_path_buf(),
                column: name,
            })?;
    }
    let [i_date, i_open, i_high, i_low, i_close, i_volume] = idx;

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let field = |i: usize| record.get(i).unwrap_or("");
        bars.push(Bar {
            date: parse_date(field(i_date), row)?,
            open: parse_price(field(i_open), row, "open")?,
            high: parse_price(field(i_high), row, "high")?,
            low: parse_price(field(i_low), row, "low")?,
            close: parse_price(field(i_close), row, "close")?,
            volume: parse_volume(field(i_volume), row)?,
        });
    }
    Ok(bars)
}

/// `YYYY-MM-DD`, optionally followed by a time part which is dropped.
fn parse_date(value: &str, row: usize) -> Result<NaiveDate, LoadError> {
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| LoadError::Parse {
        row,
        field: "date",
        value: value.to_string(),
    })
}

fn parse_price(value: &str, row: usize, field: &'static str) -> Result<f64, LoadError> {
    value.parse::<f64>().map_err(|_| LoadError::Parse {
        row,
        field,
        value: value.to_string(),
    })
}

/// Whole share count; accepts `1200` and `1200.0` but not `12.5` or `-1`.
fn parse_volume(value: &str, row: usize) -> Result<u64, LoadError> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(whole_volume)
        .ok_or_else(|| LoadError::Parse {
            row,
            field: "volume",
            value: value.to_string(),
        })
}

/// `Some` only for a finite, non-negative value with no fractional part.
fn whole_volume(v: f64) -> Option<u64> {
    (v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}

// ── Parquet ──────────────────────────────────────────────────────────

fn parquet_err(path: &Path) -> impl Fn(PolarsError) -> LoadError + '_ {
    move |e| LoadError::Parquet {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Read bars from a Parquet file with a Date `date` column.
pub fn read_parquet(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(parquet_err(path))?;

    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            });
        }
    }
    dataframe_to_bars(&df, path)
}

fn dataframe_to_bars(df: &DataFrame, path: &Path) -> Result<Vec<Bar>, LoadError> {
    let map_err = parquet_err(path);

    let date_ca = df.column("date").map_err(&map_err)?.date().map_err(&map_err)?;
    let open_ca = df.column("open").map_err(&map_err)?.f64().map_err(&map_err)?;
    let high_ca = df.column("high").map_err(&map_err)?.f64().map_err(&map_err)?;
    let low_ca = df.column("low").map_err(&map_err)?.f64().map_err(&map_err)?;
    let close_ca = df.column("close").map_err(&map_err)?.f64().map_err(&map_err)?;
    let volumes = read_volumes(df.column("volume").map_err(&map_err)?, path)?;

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let n = df.height();
    let mut bars = Vec::with_capacity(n);
    for (i, volume) in volumes.into_iter().enumerate() {
        let date_days = date_ca.get(i).ok_or_else(|| null_cell(i, "date"))?;
        bars.push(Bar {
            date: epoch + chrono::Duration::days(date_days as i64),
            open: open_ca.get(i).ok_or_else(|| null_cell(i, "open"))?,
            high: high_ca.get(i).ok_or_else(|| null_cell(i, "high"))?,
            low: low_ca.get(i).ok_or_else(|| null_cell(i, "low"))?,
            close: close_ca.get(i).ok_or_else(|| null_cell(i, "close"))?,
            volume,
        });
    }
    Ok(bars)
}

fn null_cell(row: usize, field: &'static str) -> LoadError {
    LoadError::Parse {
        row,
        field,
        value: "null".into(),
    }
}

/// Volumes as whole share counts. Nulls, negatives and fractions fail the
/// load with the offending row; nothing is coerced.
fn read_volumes(column: &Column, path: &Path) -> Result<Vec<u64>, LoadError> {
    let map_err = parquet_err(path);
    let bad = |row: usize, value: String| LoadError::Parse {
        row,
        field: "volume",
        value,
    };
    let dtype = column.dtype().clone();

    if dtype == DataType::UInt64 {
        let ca = column.u64().map_err(&map_err)?;
        return (0..ca.len())
            .map(|i| ca.get(i).ok_or_else(|| null_cell(i, "volume")))
            .collect();
    }
    if dtype.is_integer() {
        // every integer type except u64 fits in i64
        let widened = column.cast(&DataType::Int64).map_err(&map_err)?;
        let ca = widened.i64().map_err(&map_err)?;
        return (0..ca.len())
            .map(|i| match ca.get(i) {
                Some(v) => u64::try_from(v).map_err(|_| bad(i, v.to_string())),
                None => Err(null_cell(i, "volume")),
            })
            .collect();
    }
    if dtype.is_float() {
        let widened = column.cast(&DataType::Float64).map_err(&map_err)?;
        let ca = widened.f64().map_err(&map_err)?;
        return (0..ca.len())
            .map(|i| match ca.get(i) {
                Some(v) => whole_volume(v).ok_or_else(|| bad(i, v.to_string())),
                None => Err(null_cell(i, "volume")),
            })
            .collect();
    }
    Err(LoadError::Parquet {
        path: path.to_path_buf(),
        reason: format!("volume column has unsupported type {dtype}"),
    })
}

/// Write bars to a Parquet file readable by `read_parquet`.
pub fn write_parquet(bars: &[Bar], path: &Path) -> Result<(), LoadError> {
    let map_err = parquet_err(path);
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    let mut df = DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(&map_err)?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(&map_err)?;

    let file = fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file).finish(&mut df).map_err(&map_err)?;
    Ok(())
}

// ── Fingerprint ──────────────────────────────────────────────────────

/// Deterministic BLAKE3 hash over dates and OHLCV values.
pub fn dataset_hash(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// ── Synthetic ────────────────────────────────────────────────────────

/// Generate `n_bars` weekday bars starting at `start` for demos and tests.
///
/// A seeded random walk from 100.0 with occasional high-volume up days so
/// the scanner has something to find. Same `symbol` and `seed`, same bars.
pub fn generate_synthetic_series(
    symbol: &str,
    start: NaiveDate,
    n_bars: usize,
    seed: u64,
) -> Result<LoadedSeries, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    warn!(symbol, "generating synthetic data; results will be tagged as synthetic");

    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    hasher.update(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());

    let mut bars = Vec::with_capacity(n_bars);
    let mut price = 100.0_f64;
    let mut current = start;

    while bars.len() < n_bars {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let spike = rng.gen_bool(0.04);
        let mut daily_return: f64 = rng.gen_range(-0.025..0.025);
        let mut volume = rng.gen_range(800_000..1_200_000u64);
        if spike {
            daily_return = rng.gen_range(0.02..0.06);
            volume *= rng.gen_range(3..7u64);
        }

        let open = price;
        let close = (price * (1.0 + daily_return)).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    let series = BarSeries::new(bars)?;
    let dataset_hash = dataset_hash(&series);
    Ok(LoadedSeries {
        series,
        source: DataSource::Synthetic,
        dataset_hash,
    })
}

/// Write bars as CSV with the canonical lower-case header.
pub fn write_csv<W: std::io::Write>(bars: &[Bar], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)?;
    for b in bars {
        wtr.write_record([
            b.date.to_string(),
            format!("{:.6}", b.open),
            format!("{:.6}", b.high),
            format!("{:.6}", b.low),
            format!("{:.6}", b.close),
            b.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
