//! Scan parameters: the four scalars that configure a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LOOKBACK_PERIOD: usize = 20;
pub const DEFAULT_VOLUME_THRESHOLD: f64 = 2.0;
pub const DEFAULT_PRICE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_HOLDING_PERIOD: usize = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("lookback_period must be > 0")]
    ZeroLookback,

    #[error("holding_period must be > 0")]
    ZeroHoldingPeriod,

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Configuration for one scan.
///
/// `volume_threshold` is "percent above baseline" as a fraction: 2.0 means
/// volume must exceed 3x its trailing mean. `price_threshold` is a minimum
/// day-over-day change in percent. `holding_period` counts rows, not
/// calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    #[serde(default = "default_lookback")]
    pub lookback_period: usize,
    #[serde(default = "default_volume_threshold")]
    pub volume_threshold: f64,
    #[serde(default = "default_price_threshold")]
    pub price_threshold: f64,
    #[serde(default = "default_holding")]
    pub holding_period: usize,
}

fn default_lookback() -> usize {
    DEFAULT_LOOKBACK_PERIOD
}

fn default_volume_threshold() -> f64 {
    DEFAULT_VOLUME_THRESHOLD
}

fn default_price_threshold() -> f64 {
    DEFAULT_PRICE_THRESHOLD
}

fn default_holding() -> usize {
    DEFAULT_HOLDING_PERIOD
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            lookback_period: DEFAULT_LOOKBACK_PERIOD,
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            price_threshold: DEFAULT_PRICE_THRESHOLD,
            holding_period: DEFAULT_HOLDING_PERIOD,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.lookback_period == 0 {
            return Err(ParamError::ZeroLookback);
        }
        if self.holding_period == 0 {
            return Err(ParamError::ZeroHoldingPeriod);
        }
        if !self.volume_threshold.is_finite() {
            return Err(ParamError::NonFinite {
                field: "volume_threshold",
                value: self.volume_threshold,
            });
        }
        if !self.price_threshold.is_finite() {
            return Err(ParamError::NonFinite {
                field: "price_threshold",
                value: self.price_threshold,
            });
        }
        Ok(())
    }

    /// Volume ratio a row must strictly exceed: `1 + volume_threshold`.
    pub fn volume_ratio_threshold(&self) -> f64 {
        1.0 + self.volume_threshold
    }

    /// Fewest rows that can produce one evaluable signal:
    /// `lookback` rows of history, the signal row, `holding_period` rows after.
    pub fn min_series_len(&self) -> usize {
        self.lookback_period + self.holding_period + 1
    }
}
