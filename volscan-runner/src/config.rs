//! Serializable scan configuration (TOML).
//!
//! ```toml
//! [scan]
//! symbol = "NVDA"
//! data = "data/nvda.csv"
//! start_date = "2023-01-03"   # optional
//! end_date = "2024-06-28"     # optional
//!
//! [params]                    # every field optional
//! lookback_period = 20
//! volume_threshold = 2.0
//! price_threshold = 2.0
//! holding_period = 10
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use volscan_core::{ParamError, ScanParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// Which series to scan and over which dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSection {
    pub symbol: String,
    /// CSV or Parquet file with date/open/high/low/close/volume columns.
    pub data: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Full configuration for one scan run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    pub scan: ScanSection,
    #[serde(default)]
    pub params: ScanParams,
}

impl ScanConfig {
    pub fn new(symbol: impl Into<String>, data: impl Into<PathBuf>, params: ScanParams) -> Self {
        Self {
            scan: ScanSection {
                symbol: symbol.into(),
                data: data.into(),
                start_date: None,
                end_date: None,
            },
            params,
        }
    }

    /// Load from a TOML file. A relative `data` path resolves against the
    /// config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.scan.data.is_relative() {
            if let Some(dir) = path.parent() {
                config.scan.data = dir.join(&config.scan.data);
            }
        }
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if let (Some(start), Some(end)) = (self.scan.start_date, self.scan.end_date) {
            if start > end {
                return Err(ConfigError::InvalidDateRange { start, end });
            }
        }
        self.params.validate()?;
        Ok(())
    }
}
