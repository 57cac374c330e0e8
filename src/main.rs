//! Bicycle Counts - Portland bicycle count site map
//!
//! Loads the public counts CSV, normalizes it, and shows a year-selectable map
//! of counting sites sized by their counts.

mod gui;

use anyhow::Result;
use bicycle_counts::data::DatasetConfig;
use eframe::egui;
use gui::BicycleCountsApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CSV: &str = "portland-bicycle-counts-public-data.csv";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("BICYCLE_COUNTS_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading dataset config");
            DatasetConfig::load(&path)?
        }
        Err(_) => DatasetConfig::default(),
    };

    let csv_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV));

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Bicycle Counts"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Bicycle Counts",
        options,
        Box::new(|cc| Ok(Box::new(BicycleCountsApp::new(cc, config, csv_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {e}"))
}
