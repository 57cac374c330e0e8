//! Scatter Layer Module
//! Shapes a year view into what the map renderers draw: one positioned,
//! sized, tooltipped point per counting site.

use crate::data::{ViewTable, LATITUDE_COLUMN, LONGITUDE_COLUMN};
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Site fill colour, RGBA.
pub const FILL_RGBA: [u8; 4] = [0, 128, 0, 160];

/// Initial zoom level of the map.
pub const DEFAULT_ZOOM: u8 = 11;

/// Width of the initial viewport, in 256px map tiles.
const VIEWPORT_TILES: f64 = 4.0;

pub const METRES_PER_DEGREE_LATITUDE: f64 = 111_320.0;

const UNNAMED_SITE: &str = "Unnamed site";

/// How sizes become circles on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub fill_rgba: [u8; 4],
    /// Metres of radius per size unit.
    pub radius_scale: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            fill_rgba: FILL_RGBA,
            radius_scale: 6.0,
            radius_min_pixels: 0.0,
            radius_max_pixels: 125.0,
        }
    }
}

impl LayerStyle {
    /// Screen radius for `size` at the given ground resolution.
    pub fn pixel_radius(&self, size: f64, metres_per_pixel: f64) -> f64 {
        if metres_per_pixel.is_nan() || metres_per_pixel <= 0.0 {
            return self.radius_min_pixels;
        }
        (size * self.radius_scale / metres_per_pixel)
            .clamp(self.radius_min_pixels, self.radius_max_pixels)
    }
}

/// One counting site, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub name: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Count for the selected year.
    pub count: i64,
    pub size: f64,
}

impl MapPoint {
    /// `[x, y]` plot position.
    pub fn position(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_SITE)
    }

    pub fn tooltip(&self) -> String {
        format!("Location: {}\nCount: {}", self.display_name(), self.count)
    }
}

/// All sites of one year view plus the style to draw them with.
#[derive(Debug, Clone)]
pub struct ScatterLayer {
    pub year: i32,
    pub max_value: i64,
    pub points: Vec<MapPoint>,
    pub style: LayerStyle,
}

impl ScatterLayer {
    /// Pull the render fields out of a view table.
    pub fn from_view(view: &ViewTable, name_column: &str) -> PolarsResult<Self> {
        let df = view.frame();

        let names = df.column(name_column)?.cast(&DataType::String)?;
        let names = names.as_materialized_series().str()?;
        let latitudes = df.column(LATITUDE_COLUMN)?.f64()?;
        let longitudes = df.column(LONGITUDE_COLUMN)?.f64()?;
        let counts = view.counts()?;
        let sizes = view.sizes()?;

        let points = names
            .into_iter()
            .zip(latitudes)
            .zip(longitudes)
            .zip(counts.into_iter().zip(sizes))
            .filter_map(|(((name, lat), lon), (count, size))| {
                Some(MapPoint {
                    name: name.map(str::to_string),
                    longitude: lon?,
                    latitude: lat?,
                    count,
                    size,
                })
            })
            .collect();

        Ok(Self {
            year: view.selected_year(),
            max_value: view.max_value(),
            points,
            style: LayerStyle::default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min, max)` corners as `[longitude, latitude]`.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        if self.points.is_empty() {
            return None;
        }

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for point in &self.points {
            let position = point.position();
            for axis in 0..2 {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }
        Some((min, max))
    }
}

/// Where the map opens: centred on the mean site position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl MapViewState {
    pub fn centered_on(layer: &ScatterLayer) -> Option<Self> {
        if layer.is_empty() {
            return None;
        }

        Some(Self {
            latitude: layer.points.iter().map(|p| p.latitude).mean(),
            longitude: layer.points.iter().map(|p| p.longitude).mean(),
            zoom: DEFAULT_ZOOM,
        })
    }

    /// Longitude degrees per latitude degree of equal ground distance.
    pub fn aspect(&self) -> f64 {
        self.latitude.to_radians().cos()
    }

    /// `(longitude, latitude)` degrees visible at this zoom.
    pub fn span_degrees(&self) -> (f64, f64) {
        let lon_span = VIEWPORT_TILES * 360.0 / 2f64.powi(i32::from(self.zoom));
        (lon_span, lon_span * self.aspect())
    }
}
