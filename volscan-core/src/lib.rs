//! VolScan Core: OHLCV domain types and the volume-breakout pipeline.
//!
//! This crate contains the analytical heart of the scanner:
//! - Domain types (bars, validated series, annotated rows)
//! - Scan parameters with defaults and validation
//! - Four annotation stages run in strict order over the series
//!   (volume metrics, price change, breakout classifier, forward returns)
//! - Summary aggregation and the signal report over the annotated table
//! - Presentation-neutral formatting of both outputs
//!
//! Every stage is a pure function of its input: no I/O, no shared state.
//! Insufficient history and out-of-range lookups surface as `None` fields,
//! never as errors. The only errors are precondition violations on the
//! input series and on the parameters.

pub mod domain;
pub mod format;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod stages;
pub mod summary;

pub use domain::{AnnotatedBar, Bar, BarSeries, ForwardOutcome, SeriesError};
pub use params::{ParamError, ScanParams};
pub use pipeline::{analyze, Analysis, Pipeline};
pub use report::{build_signal_report, SignalReportRow};
pub use summary::SummaryStats;
