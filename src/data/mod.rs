//! Data module - CSV loading, normalization, and per-year views

mod cache;
mod config;
mod loader;
mod normalizer;
mod view;

pub use cache::{CacheKey, DatasetCache};
pub use config::{ConfigError, DatasetConfig};
pub use loader::{DataLoader, LoaderError};
pub use normalizer::{
    parse_lat_long, CleanTable, NormalizeError, NormalizeReport, Normalizer, LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
};
pub use view::{build_view, max_count, scaled_size, ViewError, ViewTable, SIZE_COLUMN};
