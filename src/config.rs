//! Profiler thresholds and chart limits.
//!
//! Defaults are compiled in; a YAML file may override any subset of fields:
//!
//! ```yaml
//! numeric_ratio: 0.8
//! date_ratio: 0.6
//! histogram_bins: 12
//! category_chart_limit: 30
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NUMERIC_RATIO: f64 = 0.8;
pub const DEFAULT_DATE_RATIO: f64 = 0.8;
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;
pub const DEFAULT_CATEGORY_CHART_LIMIT: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 1 (got {value})")]
    RatioOutOfRange { field: &'static str, value: f64 },
    #[error("histogram_bins must be at least 1")]
    ZeroHistogramBins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilerConfig {
    /// A column is numeric when strictly more than this share of its
    /// non-missing values parse as finite numbers.
    pub numeric_ratio: f64,
    /// A non-numeric column is a date column when strictly more than this
    /// share of its non-missing values parse as calendar dates.
    pub date_ratio: f64,
    pub histogram_bins: usize,
    /// Categorical columns with more distinct values than this get no bar chart.
    pub category_chart_limit: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            numeric_ratio: DEFAULT_NUMERIC_RATIO,
            date_ratio: DEFAULT_DATE_RATIO,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            category_chart_limit: DEFAULT_CATEGORY_CHART_LIMIT,
        }
    }
}

impl ProfilerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("numeric_ratio", self.numeric_ratio),
            ("date_ratio", self.date_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { field, value });
            }
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::ZeroHistogramBins);
        }
        Ok(())
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: ProfilerConfig =
            serde_yaml::from_str(input).context("Parsing profiler configuration YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening configuration file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Loading configuration from {path:?}"))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProfilerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.numeric_ratio, 0.8);
        assert_eq!(config.date_ratio, 0.8);
        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.category_chart_limit, 20);
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let config = ProfilerConfig::from_yaml_str("date_ratio: 0.6\n").expect("parse config");
        assert_eq!(config.date_ratio, 0.6);
        assert_eq!(config.numeric_ratio, DEFAULT_NUMERIC_RATIO);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let config = ProfilerConfig {
            numeric_ratio: 1.5,
            ..ProfilerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RatioOutOfRange {
                field: "numeric_ratio",
                value: 1.5
            })
        );
        assert!(ProfilerConfig::from_yaml_str("histogram_bins: 0\n").is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ProfilerConfig::from_yaml_str("numeric_threshold: 0.5\n").is_err());
    }
}
