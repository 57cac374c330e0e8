//! CSV Data Loader Module
//! Reads a counts CSV into a raw, all-string table using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Loads raw tables. No cleaning happens here.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with schema inference disabled.
    ///
    /// Every column comes back as a string column; empty cells are null.
    pub fn load_csv(file_path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let file_path = file_path.as_ref();
        if !file_path.exists() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        debug!(path = %file_path.display(), "Reading CSV");

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loaded raw table"
        );
        debug!(columns = ?Self::column_names(&df), "Raw table columns");

        Ok(df)
    }

    /// Get list of column names from a DataFrame.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
