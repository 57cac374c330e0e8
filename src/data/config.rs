//! Dataset Configuration Module
//! Column names, placeholder tokens, and the supported year range.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Year range is empty: first_year {first} > last_year {last}")]
    EmptyYearRange { first: i32, last: i32 },
    #[error("Synthesized year {0} is outside the supported year range")]
    SynthesizedYearOutOfRange(i32),
    #[error("Default year {0} is outside the supported year range")]
    DefaultYearOutOfRange(i32),
    #[error("Size scale must be a positive finite number, got {0}")]
    InvalidSizeScale(f64),
    #[error("Lat-long separator must not be empty")]
    EmptySeparator,
}

/// Describes the layout of a bicycle-count table.
///
/// Every field has a default matching the Portland public counts dataset, so a
/// JSON file only needs to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub name_column: String,
    pub lat_long_column: String,
    pub lat_long_separator: String,
    /// Token meaning "no observation".
    pub placeholder: String,
    pub thousands_separator: char,
    pub first_year: i32,
    pub last_year: i32,
    /// Years with no published data. Their columns are rebuilt as all-missing.
    pub synthesized_years: Vec<i32>,
    pub default_year: i32,
    /// Size of the largest count across all years.
    pub size_scale: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name_column: "Name".to_string(),
            lat_long_column: "Lat-Long".to_string(),
            lat_long_separator: ", ".to_string(),
            placeholder: "-".to_string(),
            thousands_separator: ',',
            first_year: 2000,
            last_year: 2023,
            synthesized_years: vec![2020, 2021],
            default_year: 2023,
            size_scale: 125.0,
        }
    }
}

impl DatasetConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: DatasetConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_year > self.last_year {
            return Err(ConfigError::EmptyYearRange {
                first: self.first_year,
                last: self.last_year,
            });
        }
        if let Some(&year) = self
            .synthesized_years
            .iter()
            .find(|&&y| !self.contains_year(y))
        {
            return Err(ConfigError::SynthesizedYearOutOfRange(year));
        }
        if !self.contains_year(self.default_year) {
            return Err(ConfigError::DefaultYearOutOfRange(self.default_year));
        }
        if !self.size_scale.is_finite() || self.size_scale <= 0.0 {
            return Err(ConfigError::InvalidSizeScale(self.size_scale));
        }
        if self.lat_long_separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        Ok(())
    }

    /// All supported years, inclusive.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// Years the raw table must provide itself.
    pub fn required_years(&self) -> Vec<i32> {
        self.years()
            .filter(|y| !self.synthesized_years.contains(y))
            .collect()
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.years().contains(&year)
    }

    /// Column name holding the counts for `year`.
    pub fn year_column(&self, year: i32) -> String {
        year.to_string()
    }
}
