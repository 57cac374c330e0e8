//! Year View Module
//! Scales the selected year's counts into render sizes.

use crate::data::{CleanTable, DatasetConfig};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

pub const SIZE_COLUMN: &str = "size";

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Year {year} is outside the supported range {first}..={last}")]
    YearOutOfRange { year: i32, first: i32, last: i32 },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// A clean table plus a `size` column for one selected year.
#[derive(Debug, Clone)]
pub struct ViewTable {
    df: DataFrame,
    selected_year: i32,
    max_value: i64,
}

impl ViewTable {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn selected_year(&self) -> i32 {
        self.selected_year
    }

    /// Largest count across every row and every supported year.
    pub fn max_value(&self) -> i64 {
        self.max_value
    }

    pub fn sizes(&self) -> PolarsResult<Vec<f64>> {
        Ok(self
            .df
            .column(SIZE_COLUMN)?
            .f64()?
            .into_iter()
            .map(|size| size.unwrap_or(0.0))
            .collect())
    }

    /// Counts of the selected year, row-aligned with [`ViewTable::sizes`].
    pub fn counts(&self) -> PolarsResult<Vec<i64>> {
        Ok(self
            .df
            .column(&self.selected_year.to_string())?
            .i64()?
            .into_iter()
            .map(|count| count.unwrap_or(0))
            .collect())
    }
}

/// Maximum count over all year columns of the clean table, 0 when empty.
pub fn max_count(clean: &CleanTable, config: &DatasetConfig) -> PolarsResult<i64> {
    let df = clean.frame();

    let per_year = config
        .years()
        .into_par_iter()
        .map(|year| -> PolarsResult<i64> {
            let counts = df.column(&config.year_column(year))?.i64()?;
            Ok(counts.into_iter().flatten().max().unwrap_or(0))
        })
        .collect::<PolarsResult<Vec<i64>>>()?;

    Ok(per_year.into_iter().max().unwrap_or(0).max(0))
}

/// `count / max_value * scale`, with the count clamped to `[0, max_value]`.
///
/// A zero `max_value` yields 0 instead of dividing.
pub fn scaled_size(count: i64, max_value: i64, scale: f64) -> f64 {
    if max_value <= 0 {
        return 0.0;
    }
    count.clamp(0, max_value) as f64 / max_value as f64 * scale
}

/// Build the render-ready table for `selected_year`.
///
/// Returns the view together with the global maximum it was scaled against.
pub fn build_view(
    clean: &CleanTable,
    selected_year: i32,
    config: &DatasetConfig,
) -> Result<(ViewTable, i64), ViewError> {
    if !config.contains_year(selected_year) {
        return Err(ViewError::YearOutOfRange {
            year: selected_year,
            first: config.first_year,
            last: config.last_year,
        });
    }

    let max_value = max_count(clean, config)?;

    let sizes: Vec<f64> = clean
        .frame()
        .column(&config.year_column(selected_year))?
        .i64()?
        .into_iter()
        .map(|count| scaled_size(count.unwrap_or(0), max_value, config.size_scale))
        .collect();

    let mut df = clean.frame().clone();
    df.with_column(Column::new(SIZE_COLUMN.into(), sizes))?;

    debug!(
        year = selected_year,
        max_value,
        rows = df.height(),
        "Built year view"
    );

    Ok((
        ViewTable {
            df,
            selected_year,
            max_value,
        },
        max_value,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::clean_frame;
    use crate::data::{NormalizeError, Normalizer};

    fn clean(rows: &[(&str, f64, f64, &[(i32, i64)])]) -> CleanTable {
        Normalizer::normalize(&clean_frame(rows), &DatasetConfig::default()).unwrap()
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(500, 1000, 125.0), 62.5);
        assert_eq!(scaled_size(1000, 1000, 125.0), 125.0);
        assert_eq!(scaled_size(0, 1000, 125.0), 0.0);
        assert_eq!(scaled_size(2000, 1000, 125.0), 125.0);
        assert_eq!(scaled_size(-10, 1000, 125.0), 0.0);
        assert_eq!(scaled_size(10, 0, 125.0), 0.0);
    }

    #[test]
    fn test_size_against_global_max() {
        let table = clean(&[("Site", 45.5, -122.6, &[(2023, 500), (2010, 1000)])]);

        let (view, max_value) = build_view(&table, 2023, &DatasetConfig::default()).unwrap();

        assert_eq!(max_value, 1000);
        assert_eq!(view.max_value(), 1000);
        assert_eq!(view.selected_year(), 2023);
        assert_eq!(view.sizes().unwrap(), vec![62.5]);
        assert_eq!(view.counts().unwrap(), vec![500]);
    }

    #[test]
    fn test_max_spans_rows_and_years() {
        let table = clean(&[
            ("A", 45.5, -122.6, &[(2001, 40), (2023, 10)]),
            ("B", 45.6, -122.7, &[(2015, 80)]),
        ]);

        let (view, max_value) = build_view(&table, 2023, &DatasetConfig::default()).unwrap();

        assert_eq!(max_value, 80);
        assert_eq!(view.sizes().unwrap(), vec![10.0 / 80.0 * 125.0, 0.0]);
    }

    #[test]
    fn test_all_zero_counts_give_zero_sizes() {
        let table = clean(&[("A", 45.5, -122.6, &[]), ("B", 45.6, -122.7, &[])]);

        let (view, max_value) = build_view(&table, 2023, &DatasetConfig::default()).unwrap();

        assert_eq!(max_value, 0);
        assert_eq!(view.sizes().unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_year_is_rejected() {
        let table = clean(&[("A", 45.5, -122.6, &[(2023, 5)])]);
        let config = DatasetConfig::default();

        for year in [1999, 2024] {
            let result = build_view(&table, year, &config);
            assert!(matches!(
                result,
                Err(ViewError::YearOutOfRange {
                    first: 2000,
                    last: 2023,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_max_value_stable_across_years() {
        let table = clean(&[
            ("A", 45.5, -122.6, &[(2000, 3), (2012, 900)]),
            ("B", 45.6, -122.7, &[(2019, 1200), (2023, 7)]),
        ]);
        let config = DatasetConfig::default();

        let maxima: Vec<i64> = config
            .years()
            .map(|year| build_view(&table, year, &config).unwrap().1)
            .collect();

        assert!(maxima.iter().all(|&m| m == 1200));
        assert_eq!(max_count(&table, &config).unwrap(), 1200);
    }

    #[test]
    fn test_custom_year_range_and_gap() {
        let config = DatasetConfig {
            first_year: 2010,
            last_year: 2012,
            synthesized_years: vec![2011],
            default_year: 2012,
            ..Default::default()
        };
        let raw = df!(
            "Name" => [" A ", "B", "C"],
            "Lat-Long" => ["45.5, -122.6", "45.5,  -122.6", "45.5, -122.6, 1.0"],
            "2010" => ["1,000", "-", "5"],
            "2012" => [" 250 ", "2,000,000", "5"],
            "2013" => ["9,999,999", "9,999,999", "9,999,999"]
        )
        .unwrap();

        let table = Normalizer::normalize(&raw, &config).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.report().dropped_rows, 1);

        let gap: Vec<Option<i64>> = table
            .frame()
            .column("2011")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(gap, vec![Some(0), Some(0)]);
        assert_eq!(
            table.frame().get_column_names().last().map(|name| name.as_str()),
            Some("2011")
        );

        for year in ["2010", "2012"] {
            let missing = raw.drop(year).unwrap();
            assert!(matches!(
                Normalizer::normalize(&missing, &config),
                Err(NormalizeError::MissingColumn(column)) if column == year
            ));
        }

        assert_eq!(max_count(&table, &config).unwrap(), 2_000_000);
        let (view, max_value) = build_view(&table, 2012, &config).unwrap();
        assert_eq!(max_value, 2_000_000);
        let sizes = view.sizes().unwrap();
        assert!((sizes[0] - 0.015625).abs() < 1e-12);
        assert_eq!(sizes[1], 125.0);

        let (gap_view, _) = build_view(&table, 2011, &config).unwrap();
        assert_eq!(gap_view.sizes().unwrap(), vec![0.0, 0.0]);

        assert!(matches!(
            build_view(&table, 2013, &config),
            Err(ViewError::YearOutOfRange {
                year: 2013,
                first: 2010,
                last: 2012
            })
        ));
    }

    #[test]
    fn test_clean_table_is_left_untouched() {
        let table = clean(&[("A", 45.5, -122.6, &[(2023, 5)])]);

        let (view, _) = build_view(&table, 2023, &DatasetConfig::default()).unwrap();

        assert!(table.frame().column(SIZE_COLUMN).is_err());
        assert_eq!(view.frame().width(), table.frame().width() + 1);
    }
}
