//! GUI module for the cosmic timeline.
//!
//! This module contains the egui-based user interface components: the main
//! application window, the timeline canvas, zoom controls, the selected event
//! panel and dialogs.

mod app;
mod controls;
mod details;
mod dialogs;
mod timeline;

pub use app::TimelineApp;
