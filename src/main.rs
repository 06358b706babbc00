//! Cosmic Timeline - a zoomable timeline from the Big Bang to the far future.

mod core;
mod gui;

use crate::core::config::AppSettings;
use gui::TimelineApp;

const DEFAULT_WINDOW_SIZE: [f32; 2] = [1280.0, 800.0];

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = AppSettings::load();
    let window_size = settings
        .window_size
        .map(|(w, h)| [w, h])
        .unwrap_or(DEFAULT_WINDOW_SIZE);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size(window_size)
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Cosmic Timeline",
        options,
        Box::new(|cc| Ok(Box::new(TimelineApp::new(cc, settings)))),
    )
}
