//! Bar, the fundamental market data unit, and the validated series of bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single instrument on a single trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// True when every price is finite and strictly positive.
    pub fn has_positive_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Precondition violations on an input series.
///
/// These are the only failures the pipeline propagates to its caller; every
/// other condition is resolved row by row inside the stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,

    #[error("dates not strictly increasing at row {index}: {previous} then {current}")]
    NonMonotonicDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("non-positive or non-finite price at row {index} ({date})")]
    InvalidPrice { index: usize, date: NaiveDate },
}

/// An ordered, validated OHLCV series for one instrument.
///
/// Invariant: non-empty, dates strictly increasing (no duplicates), all
/// prices finite and positive. Gaps between dates are allowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate `bars` and wrap them. Fails fast on the first violation.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, bar) in bars.iter().enumerate() {
            if !bar.has_positive_prices() {
                return Err(SeriesError::InvalidPrice {
                    index,
                    date: bar.date,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date <= previous {
                    return Err(SeriesError::NonMonotonicDates {
                        index,
                        previous,
                        current: bar.date,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// Keep only bars dated within `[start, end]` (either bound optional).
    pub fn window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, SeriesError> {
        let bars = self
            .bars
            .iter()
            .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
            .cloned()
            .collect();
        Self::new(bars)
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl<'de> Deserialize<'de> for BarSeries {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            bars: Vec<Bar>,
        }
        let raw = Raw::deserialize(d)?;
        BarSeries::new(raw.bars).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(day: u32) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn series_accepts_gaps() {
        let series = BarSeries::new(vec![sample_bar(2), sample_bar(3), sample_bar(8)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn series_rejects_empty() {
        assert_eq!(BarSeries::new(vec![]), Err(SeriesError::Empty));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = BarSeries::new(vec![sample_bar(2), sample_bar(3), sample_bar(3)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonMonotonicDates { index: 2, .. }));
    }

    #[test]
    fn series_rejects_descending_dates() {
        let err = BarSeries::new(vec![sample_bar(5), sample_bar(4)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonMonotonicDates { index: 1, .. }));
    }

    #[test]
    fn series_rejects_nan_open() {
        let mut bad = sample_bar(3);
        bad.open = f64::NAN;
        let err = BarSeries::new(vec![sample_bar(2), bad]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidPrice { index: 1, .. }));
    }

    #[test]
    fn series_rejects_zero_close() {
        let mut bad = sample_bar(3);
        bad.close = 0.0;
        let err = BarSeries::new(vec![sample_bar(2), bad]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidPrice { index: 1, .. }));
    }

    #[test]
    fn window_filters_inclusive() {
        let series =
            BarSeries::new(vec![sample_bar(2), sample_bar(3), sample_bar(4), sample_bar(5)])
                .unwrap();
        let w = series
            .window(
                NaiveDate::from_ymd_opt(2024, 1, 3),
                NaiveDate::from_ymd_opt(2024, 1, 4),
            )
            .unwrap();
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn series_serialization_roundtrip() {
        let series = BarSeries::new(vec![sample_bar(2), sample_bar(3)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        let deser: BarSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(series, deser);
    }

    #[test]
    fn series_deserialization_validates() {
        let json = r#"{"bars":[
            {"date":"2024-01-03","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1},
            {"date":"2024-01-02","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1}
        ]}"#;
        assert!(serde_json::from_str::<BarSeries>(json).is_err());
    }
}
