//! Map Plotter Module
//! Draws the interactive site map using egui_plot.

use crate::charts::layer::{MapViewState, ScatterLayer, METRES_PER_DEGREE_LATITUDE};
use egui::{Color32, Pos2};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points};

/// Pointer distance (px) that still hovers a tiny or zero-sized site.
const HOVER_MIN_RADIUS: f32 = 4.0;

/// Draws a scatter layer as a longitude/latitude map.
pub struct MapPlotter;

impl MapPlotter {
    pub fn fill_color(layer: &ScatterLayer) -> Color32 {
        let [r, g, b, a] = layer.style.fill_rgba;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Draw the map. Shows the hovered site's tooltip.
    pub fn draw_map(ui: &mut egui::Ui, layer: &ScatterLayer, view_state: &MapViewState) {
        let color = Self::fill_color(layer);
        let (lon_span, lat_span) = view_state.span_degrees();

        let response = Plot::new("bicycle_counts_map")
            .data_aspect(view_state.aspect() as f32)
            .include_x(view_state.longitude - lon_span / 2.0)
            .include_x(view_state.longitude + lon_span / 2.0)
            .include_y(view_state.latitude - lat_span / 2.0)
            .include_y(view_state.latitude + lat_span / 2.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let degrees_per_pixel = plot_ui.transform().dvalue_dpos()[1].abs();
                let metres_per_pixel = degrees_per_pixel * METRES_PER_DEGREE_LATITUDE;

                let mut targets = Vec::with_capacity(layer.points.len());
                for point in &layer.points {
                    let radius = layer.style.pixel_radius(point.size, metres_per_pixel) as f32;

                    plot_ui.points(
                        Points::new(PlotPoints::new(vec![point.position()]))
                            .radius(radius)
                            .color(color)
                            .filled(true),
                    );

                    let center = plot_ui
                        .screen_from_plot(PlotPoint::new(point.longitude, point.latitude));
                    targets.push((center, radius));
                }

                plot_ui
                    .pointer_coordinate()
                    .map(|coordinate| plot_ui.screen_from_plot(coordinate))
                    .and_then(|pointer| Self::hovered_point(&targets, pointer))
            });

        if let Some(point) = response.inner.and_then(|idx| layer.points.get(idx)) {
            response.response.on_hover_text(point.tooltip());
        }
    }

    /// Index of the site under `pointer`, preferring the closest centre.
    pub fn hovered_point(targets: &[(Pos2, f32)], pointer: Pos2) -> Option<usize> {
        targets
            .iter()
            .enumerate()
            .map(|(idx, (center, radius))| (idx, center.distance(pointer), *radius))
            .filter(|(_, distance, radius)| *distance <= radius.max(HOVER_MIN_RADIUS))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _, _)| idx)
    }
}
