//! Data Normalizer Module
//! Turns a raw counts table into a strictly typed clean table.
//!
//! The steps run in a fixed order, each producing a new DataFrame:
//! 1. trim every string cell
//! 2. placeholder token -> null
//! 3. split the lat/long column into `latitude` / `longitude`
//! 4. drop rows without both coordinates
//! 5. rebuild synthesized year columns as all-null
//! 6. coerce every year column to a non-negative `Int64`, null -> 0

use crate::data::DatasetConfig;
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Required column missing from raw table: {0}")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Counters describing what normalization silently skipped or defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    /// Rows removed for missing or unparseable coordinates.
    pub dropped_rows: usize,
    /// Year cells that held a value but not a count, coerced to 0.
    pub defaulted_counts: usize,
}

/// A normalized table: valid coordinates on every row, every supported year
/// present as a non-null `Int64` column.
#[derive(Debug, Clone)]
pub struct CleanTable {
    df: DataFrame,
    report: NormalizeReport,
}

impl CleanTable {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn report(&self) -> NormalizeReport {
        self.report
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Handles data cleaning and type coercion.
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw table.
    ///
    /// Fails only when a required column is absent; unparseable cells are
    /// dropped (coordinates) or defaulted to 0 (counts).
    pub fn normalize(raw: &DataFrame, config: &DatasetConfig) -> Result<CleanTable, NormalizeError> {
        Self::check_schema(raw, config)?;

        let df = Self::trim_strings(raw)?;
        let df = Self::replace_placeholder(&df, &config.placeholder)?;
        let df = Self::split_lat_long(&df, config)?;
        let (df, dropped_rows) = Self::drop_missing_coordinates(&df)?;
        let df = Self::synthesize_years(&df, config)?;
        let (df, defaulted_counts) = Self::coerce_years(&df, config)?;

        let report = NormalizeReport {
            input_rows: raw.height(),
            dropped_rows,
            defaulted_counts,
        };

        debug!(
            dropped_rows,
            defaulted_counts, "Rows dropped and counts defaulted during normalization"
        );
        info!(
            input_rows = report.input_rows,
            rows = df.height(),
            "Normalized bicycle counts"
        );

        Ok(CleanTable { df, report })
    }

    /// Refuse tables that do not look like the configured dataset.
    fn check_schema(raw: &DataFrame, config: &DatasetConfig) -> Result<(), NormalizeError> {
        let names: HashSet<&str> = raw
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();

        let required = [config.name_column.clone(), config.lat_long_column.clone()]
            .into_iter()
            .chain(
                config
                    .required_years()
                    .into_iter()
                    .map(|year| config.year_column(year)),
            );

        for column in required {
            if !names.contains(column.as_str()) {
                return Err(NormalizeError::MissingColumn(column));
            }
        }

        Ok(())
    }

    fn trim_strings(df: &DataFrame) -> PolarsResult<DataFrame> {
        Self::map_string_cells(df, |value| Some(value.trim()))
    }

    fn replace_placeholder(df: &DataFrame, placeholder: &str) -> PolarsResult<DataFrame> {
        Self::map_string_cells(df, |value| (value != placeholder).then_some(value))
    }

    /// Apply `f` to every non-null cell of every string column.
    fn map_string_cells<F>(df: &DataFrame, f: F) -> PolarsResult<DataFrame>
    where
        F: Fn(&str) -> Option<&str>,
    {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                if column.dtype() != &DataType::String {
                    return Ok(column.clone());
                }

                let values = column.as_materialized_series().str()?;
                let mapped: StringChunked = values.into_iter().map(|v| v.and_then(&f)).collect();
                Ok(Column::from(
                    mapped.with_name(column.name().clone()).into_series(),
                ))
            })
            .collect::<PolarsResult<Vec<Column>>>()?;

        DataFrame::new(columns)
    }

    fn split_lat_long(df: &DataFrame, config: &DatasetConfig) -> PolarsResult<DataFrame> {
        let lat_long = df
            .column(&config.lat_long_column)?
            .cast(&DataType::String)?;
        let values = lat_long.as_materialized_series().str()?;

        let (latitudes, longitudes): (Vec<Option<f64>>, Vec<Option<f64>>) = values
            .into_iter()
            .map(|value| {
                match value.and_then(|v| parse_lat_long(v, &config.lat_long_separator)) {
                    Some((lat, lon)) => (Some(lat), Some(lon)),
                    None => (None, None),
                }
            })
            .unzip();

        let mut df = df.clone();
        df.with_column(Column::new(LATITUDE_COLUMN.into(), latitudes))?;
        df.with_column(Column::new(LONGITUDE_COLUMN.into(), longitudes))?;
        Ok(df)
    }

    fn drop_missing_coordinates(df: &DataFrame) -> PolarsResult<(DataFrame, usize)> {
        let latitudes = df.column(LATITUDE_COLUMN)?.f64()?;
        let longitudes = df.column(LONGITUDE_COLUMN)?.f64()?;

        let mask: BooleanChunked = latitudes
            .into_iter()
            .zip(longitudes)
            .map(|(lat, lon)| lat.is_some() && lon.is_some())
            .collect();

        let filtered = df.filter(&mask)?;
        let dropped = df.height() - filtered.height();
        Ok((filtered, dropped))
    }

    fn synthesize_years(df: &DataFrame, config: &DatasetConfig) -> PolarsResult<DataFrame> {
        let mut df = df.clone();
        let height = df.height();

        for &year in &config.synthesized_years {
            let missing: Vec<Option<&str>> = vec![None; height];
            df.with_column(Column::new(config.year_column(year).into(), missing))?;
        }

        Ok(df)
    }

    fn coerce_years(df: &DataFrame, config: &DatasetConfig) -> PolarsResult<(DataFrame, usize)> {
        let mut df = df.clone();
        let mut defaulted = 0;

        for year in config.years() {
            let name = config.year_column(year);
            let (counts, year_defaulted) =
                coerce_counts(df.column(&name)?, config.thousands_separator)?;
            defaulted += year_defaulted;
            df.with_column(Column::new(name.into(), counts))?;
        }

        Ok((df, defaulted))
    }
}

/// Split `"<lat><sep><lon>"` into two finite floats.
///
/// Anything other than exactly two numeric parts yields `None`.
pub fn parse_lat_long(value: &str, separator: &str) -> Option<(f64, f64)> {
    let mut parts = value.split(separator);
    let (lat, lon) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
}

/// Coerce one year column to counts. Returns the values and how many present
/// cells had to be defaulted to 0.
fn coerce_counts(column: &Column, thousands_separator: char) -> PolarsResult<(Vec<i64>, usize)> {
    let mut defaulted = 0;

    let counts = if column.dtype() == &DataType::String {
        column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|value| match value {
                None => 0,
                Some(text) => match parse_count(text, thousands_separator) {
                    Some(count) => count,
                    None => {
                        defaulted += 1;
                        0
                    }
                },
            })
            .collect()
    } else {
        column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|value| match value {
                None => 0,
                Some(count) if count >= 0 => count,
                Some(_) => {
                    defaulted += 1;
                    0
                }
            })
            .collect()
    };

    Ok((counts, defaulted))
}

fn parse_count(text: &str, thousands_separator: char) -> Option<i64> {
    let digits = text.replace(thousands_separator, "");
    digits.parse::<i64>().ok().filter(|count| *count >= 0)
}
