//! Bicycle Counts - count normalization and site map rendering
//!
//! `data` turns the public counts CSV into a typed table and per-year views;
//! `charts` turns a view into map layers for the window and for PNG export.

pub mod charts;
pub mod data;
