//! Charts module - Site map layer, interactive plot, and PNG export

mod layer;
mod plotter;
mod renderer;

pub use layer::{LayerStyle, MapPoint, MapViewState, ScatterLayer, DEFAULT_ZOOM, FILL_RGBA};
pub use plotter::MapPlotter;
pub use renderer::{RenderError, StaticMapRenderer};
