//! Bicycle Counts Main Application
//! Main window with control panel and site map.

use crate::gui::{ControlPanel, ControlPanelAction, DatasetSummary, MapViewer};
use anyhow::Result;
use bicycle_counts::charts::{MapViewState, ScatterLayer, StaticMapRenderer};
use bicycle_counts::data::{
    build_view, CacheKey, CleanTable, DataLoader, DatasetCache, DatasetConfig, Normalizer,
};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

const EXPORT_WIDTH: u32 = 1600;
const EXPORT_HEIGHT: u32 = 1200;

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        key: Option<CacheKey>,
        table: CleanTable,
    },
    Error(String),
}

/// Main application window.
pub struct BicycleCountsApp {
    config: DatasetConfig,
    cache: DatasetCache,
    control_panel: ControlPanel,
    map_viewer: MapViewer,

    clean: Option<Arc<CleanTable>>,
    layer: Option<ScatterLayer>,
    view_state: Option<MapViewState>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl BicycleCountsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DatasetConfig, csv_path: PathBuf) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(&config),
            config,
            cache: DatasetCache::new(),
            map_viewer: MapViewer::new(),
            clean: None,
            layer: None,
            view_state: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_load(csv_path);
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Load and normalize `path`, from the cache when the file is unchanged.
    fn start_load(&mut self, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());

        let key = match CacheKey::for_path(&path) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot stat CSV, loading uncached");
                None
            }
        };

        if let Some(table) = key.as_ref().and_then(|key| self.cache.get(key)) {
            info!(path = %path.display(), "Using cached clean table");
            self.set_clean(table);
            return;
        }

        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let config = self.config.clone();

        // Load and normalize in background thread
        thread::spawn(move || {
            let result = DataLoader::load_csv(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| Ok(Normalizer::normalize(&raw, &config)?));

            let message = match result {
                Ok(table) => LoadResult::Complete { key, table },
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load bicycle counts");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { key, table }) => {
                let table = match key {
                    Some(key) => self.cache.insert(key, table),
                    None => Arc::new(table),
                };
                self.is_loading = false;
                self.set_clean(table);
            }
            Ok(LoadResult::Error(error)) => {
                self.is_loading = false;
                self.clean = None;
                self.layer = None;
                self.view_state = None;
                self.control_panel.summary = None;
                self.control_panel.export_enabled = false;
                self.control_panel.set_status(format!("Error: {}", error));
            }
            Err(_) => {
                self.load_rx = Some(rx);
            }
        }
    }

    fn set_clean(&mut self, table: Arc<CleanTable>) {
        let report = table.report();
        self.control_panel.set_status(format!(
            "Loaded {} sites ({} rows dropped)",
            table.height(),
            report.dropped_rows
        ));
        self.clean = Some(table);
        self.view_state = None;
        self.rebuild_view();
    }

    /// Recompute sizes for the selected year.
    fn rebuild_view(&mut self) {
        let Some(clean) = self.clean.clone() else {
            return;
        };

        match self.build_layer(&clean) {
            Ok(layer) => {
                if self.view_state.is_none() {
                    self.view_state = MapViewState::centered_on(&layer);
                }
                self.control_panel.summary = Some(DatasetSummary {
                    sites: clean.height(),
                    report: clean.report(),
                    max_value: layer.max_value,
                });
                self.control_panel.export_enabled = !layer.is_empty();
                self.layer = Some(layer);
            }
            Err(e) => {
                error!(error = %e, "Failed to build year view");
                self.layer = None;
                self.control_panel.export_enabled = false;
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn build_layer(&self, clean: &CleanTable) -> Result<ScatterLayer> {
        let (view, _) = build_view(clean, self.control_panel.year, &self.config)?;
        Ok(ScatterLayer::from_view(&view, &self.config.name_column)?)
    }

    /// Handle PNG export - render the current year and open the result
    fn handle_export_png(&mut self) {
        let Some(layer) = &self.layer else {
            self.control_panel.set_status("No map to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("bicycle_counts_{}.png", layer.year))
            .save_file()
        {
            Some(path) => path,
            None => return,
        };

        let caption = format!("Bicycle Counts {}", layer.year);
        match StaticMapRenderer::save_png(
            layer,
            &output_path,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
            Some(&caption),
        ) {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Exported {}", output_path.display()));
                if let Err(e) = open::that(&output_path) {
                    warn!(error = %e, "Could not open exported image");
                }
            }
            Err(e) => {
                error!(error = %e, "PNG export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for BicycleCountsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::YearChanged => self.rebuild_view(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Map
        egui::CentralPanel::default().show(ctx, |ui| {
            self.map_viewer.show(
                ui,
                self.layer.as_ref(),
                self.view_state.as_ref(),
                self.is_loading,
            );
        });

        MapViewer::show_data_window(ctx, &mut self.control_panel.show_data, self.layer.as_ref());
    }
}
