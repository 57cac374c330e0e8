//! Map Viewer Widget
//! Central panel showing the site map, plus the "View Data" table window.

use bicycle_counts::charts::{MapPlotter, MapViewState, ScatterLayer};
use egui::{RichText, ScrollArea};

/// Central map area.
#[derive(Default)]
pub struct MapViewer;

impl MapViewer {
    pub fn new() -> Self {
        Self
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        layer: Option<&ScatterLayer>,
        view_state: Option<&MapViewState>,
        is_loading: bool,
    ) {
        if is_loading {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        }

        let (Some(layer), Some(view_state)) = (layer, view_state) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("Bicycle Counts {}", layer.year))
                    .size(18.0)
                    .strong(),
            );
            ui.add_space(12.0);
            ui.label(format!(
                "{} sites, scaled to {} (largest count in any year)",
                layer.points.len(),
                layer.max_value
            ));
        });
        ui.add_space(6.0);

        MapPlotter::draw_map(ui, layer, view_state);
    }

    /// Floating table of every site in the current view.
    pub fn show_data_window(ctx: &egui::Context, open: &mut bool, layer: Option<&ScatterLayer>) {
        egui::Window::new("View Data")
            .open(open)
            .default_width(620.0)
            .default_height(400.0)
            .show(ctx, |ui| {
                let Some(layer) = layer else {
                    ui.label("No data loaded");
                    return;
                };

                let year_label = layer.year.to_string();
                ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                    egui::Grid::new("site_table")
                        .num_columns(5)
                        .striped(true)
                        .show(ui, |ui| {
                            for header in ["Name", "latitude", "longitude", year_label.as_str(), "size"] {
                                ui.label(RichText::new(header).strong());
                            }
                            ui.end_row();

                            for point in &layer.points {
                                ui.label(point.display_name());
                                ui.label(format!("{:.5}", point.latitude));
                                ui.label(format!("{:.5}", point.longitude));
                                ui.label(point.count.to_string());
                                ui.label(format!("{:.2}", point.size));
                                ui.end_row();
                            }
                        });
                });
            });
    }
}
