//! Control Panel Widget
//! Left side panel with data source, year selection, and export controls.

use bicycle_counts::data::{DatasetConfig, NormalizeReport};
use egui::{Color32, RichText};
use std::path::PathBuf;

const DATA_SOURCE_URL: &str = "https://data.portlandoregon.gov/dataset/bicycle-counts";

/// What the loaded dataset looks like after normalization.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSummary {
    pub sites: usize,
    pub report: NormalizeReport,
    pub max_value: i64,
}

/// Left side control panel with file selection and year controls.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub year: i32,
    pub first_year: i32,
    pub last_year: i32,
    pub summary: Option<DatasetSummary>,
    pub show_data: bool,
    pub export_enabled: bool,
    pub status: String,
}

impl ControlPanel {
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            csv_path: None,
            year: config.default_year,
            first_year: config.first_year,
            last_year: config.last_year,
            summary: None,
            show_data: false,
            export_enabled: false,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Bicycle Counts")
                    .size(22.0)
                    .color(Color32::from_rgb(0, 128, 0)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label(RichText::new("📅 Year").size(14.0).strong());
            let slider = egui::Slider::new(&mut self.year, self.first_year..=self.last_year);
            if ui.add(slider).changed() {
                action = ControlPanelAction::YearChanged;
            }
        });

        ui.add_space(12.0);
        ui.separator();

        ui.horizontal(|ui| {
            ui.label(RichText::new("📊 Dataset").size(14.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("📂 Open CSV…").clicked() {
                    action = ControlPanelAction::BrowseCsv;
                }
            });
        });

        let file_name = self
            .csv_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());

        egui::Grid::new("dataset_summary")
            .num_columns(2)
            .spacing([20.0, 4.0])
            .show(ui, |ui| {
                ui.label("File:");
                match &file_name {
                    Some(name) => ui.label(name),
                    None => ui.weak("none"),
                };
                ui.end_row();

                let Some(summary) = &self.summary else {
                    return;
                };
                let rows = [
                    ("Sites:", summary.sites.to_string()),
                    ("Dropped rows:", summary.report.dropped_rows.to_string()),
                    ("Defaulted counts:", summary.report.defaulted_counts.to_string()),
                    ("Max count:", summary.max_value.to_string()),
                ];
                for (label, value) in rows {
                    ui.label(label);
                    ui.label(value);
                    ui.end_row();
                }
            });

        ui.add_space(12.0);
        ui.separator();

        ui.horizontal(|ui| {
            ui.toggle_value(&mut self.show_data, "🗒 View Data");
            ui.add_enabled_ui(self.export_enabled, |ui| {
                if ui.button("🖼 Export PNG").clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(8.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Data from").size(11.0));
            ui.hyperlink_to(RichText::new("Portland Open Data").size(11.0), DATA_SOURCE_URL);
        });

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    YearChanged,
    ExportPng,
}
