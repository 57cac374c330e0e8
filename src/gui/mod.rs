//! GUI module - User interface components

mod app;
mod control_panel;
mod map_viewer;

pub use app::BicycleCountsApp;
pub use control_panel::{ControlPanel, ControlPanelAction, DatasetSummary};
pub use map_viewer::MapViewer;
