//! Static Map Renderer
//! Renders a scatter layer to a PNG with plotters, for export.
//!
//! Layout:
//! 1. Optional caption with the selected year
//! 2. Longitude/latitude frame padded around the sites
//! 3. One filled circle per site, radius from the layer style

use crate::charts::layer::{ScatterLayer, METRES_PER_DEGREE_LATITUDE};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Fraction of the data span added on each side.
const PADDING: f64 = 0.05;
/// Smallest span (degrees) for a single site or a collinear layer.
const MIN_SPAN: f64 = 0.01;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the layer has no sites")]
    EmptyLayer,
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] ImageError),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticMapRenderer;

impl StaticMapRenderer {
    /// Render to PNG bytes.
    ///
    /// With a caption, axes and labels are drawn too, which needs a system
    /// font; without one nothing text-related is drawn.
    pub fn render_png(
        layer: &ScatterLayer,
        width: u32,
        height: u32,
        caption: Option<&str>,
    ) -> Result<Vec<u8>, RenderError> {
        let (x_range, y_range) = Self::padded_ranges(layer).ok_or(RenderError::EmptyLayer)?;
        let [r, g, b, a] = layer.style.fill_rgba;
        let fill = RGBColor(r, g, b).mix(f64::from(a) / 255.0).filled();

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut builder = ChartBuilder::on(&root);
            builder.margin(10);
            if let Some(caption) = caption {
                builder
                    .caption(caption, ("sans-serif", 24))
                    .x_label_area_size(30)
                    .y_label_area_size(50);
            }

            let mut chart = builder
                .build_cartesian_2d(x_range.clone(), y_range.clone())
                .map_err(draw_err)?;

            if caption.is_some() {
                chart
                    .configure_mesh()
                    .disable_mesh()
                    .x_desc("Longitude")
                    .y_desc("Latitude")
                    .draw()
                    .map_err(draw_err)?;
            }

            let plot_height = chart.plotting_area().dim_in_pixel().1.max(1);
            let degrees_per_pixel = (y_range.end - y_range.start) / f64::from(plot_height);
            let metres_per_pixel = degrees_per_pixel * METRES_PER_DEGREE_LATITUDE;

            chart
                .draw_series(layer.points.iter().map(|point| {
                    let radius = layer.style.pixel_radius(point.size, metres_per_pixel).round();
                    Circle::new((point.longitude, point.latitude), radius as i32, fill)
                }))
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(&buffer, width, height, ExtendedColorType::Rgb8)?;
        Ok(png)
    }

    /// Render and write a PNG file.
    pub fn save_png(
        layer: &ScatterLayer,
        path: &Path,
        width: u32,
        height: u32,
        caption: Option<&str>,
    ) -> Result<(), RenderError> {
        let png = Self::render_png(layer, width, height, caption)?;
        std::fs::write(path, &png)?;
        info!(path = %path.display(), bytes = png.len(), "Exported map image");
        Ok(())
    }

    /// Longitude and latitude ranges covering every site, padded.
    pub fn padded_ranges(
        layer: &ScatterLayer,
    ) -> Option<(std::ops::Range<f64>, std::ops::Range<f64>)> {
        let (min, max) = layer.bounds()?;

        let pad = |lo: f64, hi: f64| {
            let span = (hi - lo).max(MIN_SPAN);
            let center = (lo + hi) / 2.0;
            let half = span * (0.5 + PADDING);
            (center - half)..(center + half)
        };

        Some((pad(min[0], max[0]), pad(min[1], max[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::layer::{LayerStyle, MapPoint};

    fn layer(points: Vec<MapPoint>) -> ScatterLayer {
        ScatterLayer {
            year: 2023,
            max_value: 1000,
            points,
            style: LayerStyle::default(),
        }
    }

    fn point(latitude: f64, longitude: f64, size: f64) -> MapPoint {
        MapPoint {
            name: Some("Site".to_string()),
            longitude,
            latitude,
            count: 0,
            size,
        }
    }

    #[test]
    fn test_render_png_without_caption() {
        let layer = layer(vec![
            point(45.52, -122.68, 125.0),
            point(45.50, -122.60, 10.0),
        ]);

        let png = StaticMapRenderer::render_png(&layer, 320, 240, None).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_empty_layer_is_an_error() {
        let layer = layer(Vec::new());

        assert!(matches!(
            StaticMapRenderer::render_png(&layer, 320, 240, None),
            Err(RenderError::EmptyLayer)
        ));
    }

    #[test]
    fn test_padded_ranges_cover_sites() {
        let layer = layer(vec![point(45.0, -123.0, 1.0), point(46.0, -122.0, 1.0)]);

        let (x, y) = StaticMapRenderer::padded_ranges(&layer).unwrap();

        assert!(x.start < -123.0 && x.end > -122.0);
        assert!(y.start < 45.0 && y.end > 46.0);
    }

    #[test]
    fn test_single_site_gets_minimum_span() {
        let layer = layer(vec![point(45.5, -122.6, 1.0)]);

        let (x, y) = StaticMapRenderer::padded_ranges(&layer).unwrap();

        assert!(x.end - x.start >= MIN_SPAN);
        assert!(y.end - y.start >= MIN_SPAN);
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let layer = layer(vec![point(45.5, -122.6, 50.0)]);

        StaticMapRenderer::save_png(&layer, &path, 200, 200, None).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
