//! Domain types for VolScan

pub mod annotated;
pub mod bar;

pub use annotated::{AnnotatedBar, ForwardOutcome};
pub use bar::{Bar, BarSeries, SeriesError};
