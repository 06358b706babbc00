//! Main application state and GUI logic.
//!
//! This module defines the application struct that owns the catalog, filter,
//! viewport and selection, and implements the eframe::App trait to lay out
//! the toolbar, zoom controls, details panel and timeline canvas.

use eframe::egui;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::core::catalog::EventCatalog;
use crate::core::config::AppSettings;
use crate::core::filter::{ALL_CATEGORIES, EventFilter};
use crate::core::format::{format_calendar_year, format_span_label, parse_date};
use crate::core::gesture::{GestureController, RateZoomHandle};
use crate::core::render::TimelineRenderer;
use crate::core::resize::ResizeDebouncer;
use crate::core::viewport::{FrameTicket, Viewport, ViewportChange, ViewportState};

use super::controls::{ControlAction, ControlsRenderer, RangeInputs};
use super::details::{DetailsAction, DetailsRenderer};
use super::dialogs::{ErrorDialogAction, ErrorDialogRenderer, ErrorDialogState};
use super::timeline::TimelineCanvas;

/// Width assumed for the timeline until the first frame is laid out.
const FALLBACK_WIDTH: f64 = 1024.0;

/// Scale used by the "Bang" shortcut.
const BIG_BANG_SCALE: f64 = 1e-11;

/// Scale used by the "Year 0" and "Today" shortcuts.
const CALENDAR_SCALE: f64 = 0.5;

/// Kind of status message to display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    /// Success message (shown in green)
    Success,
    /// Error message (shown in red)
    Error,
}

/// A status message with its kind and timestamp.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// When the message was created (for auto-dismiss)
    pub created_at: std::time::Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: std::time::Instant::now(),
        }
    }

    /// Duration to show status messages before auto-dismissing.
    const DISPLAY_DURATION: std::time::Duration = std::time::Duration::from_secs(5);

    pub fn is_visible(&self) -> bool {
        self.created_at.elapsed() < Self::DISPLAY_DURATION
    }
}

/// Navigation shortcuts offered in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    OpenCatalog,
    OpenRecent(PathBuf),
    GoToBigBang,
    GoToYearZero,
    GoToToday,
    ClearFilter,
}

/// Main application state and GUI logic.
pub struct TimelineApp {
    settings: AppSettings,
    /// Whether settings are written back to the config directory
    persist_settings: bool,
    catalog: EventCatalog,
    filter: EventFilter,
    viewport: Viewport,
    gestures: GestureController,
    rate_handle: RateZoomHandle,
    renderer: TimelineRenderer,
    selected_id: Option<String>,
    /// Ticket for the next animation frame, while one is running
    frame_ticket: Option<FrameTicket>,
    resize: ResizeDebouncer,
    /// Last state published by the viewport
    last_change: Rc<Cell<ViewportChange>>,
    status_message: Option<StatusMessage>,
    error_dialog: ErrorDialogState,
    range_inputs: RangeInputs,
}

impl TimelineApp {
    /// Create the application with settings loaded from disk.
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        let mut app = Self::with_settings(settings);
        app.persist_settings = true;
        app
    }

    /// Create the application without touching the config directory.
    pub fn with_settings(settings: AppSettings) -> Self {
        let width = settings
            .window_size
            .map(|(w, _)| f64::from(w))
            .unwrap_or(FALLBACK_WIDTH);
        let mut viewport = Viewport::new(
            ViewportState::initial(settings.calendar.calendar_epoch),
            width,
        );
        viewport.set_animation_duration(settings.tuning.animation_duration_ms);

        let last_change = Rc::new(Cell::new(ViewportChange {
            state: viewport.state(),
            width: viewport.width(),
        }));
        let observer = Rc::clone(&last_change);
        viewport.on_change(Box::new(move |change| observer.set(*change)));

        let catalog = EventCatalog::builtin();
        log::info!(
            "Loaded built-in catalog: {} events, {} categories",
            catalog.events.len(),
            catalog.categories.len()
        );

        Self {
            gestures: GestureController::new(&settings.tuning),
            renderer: TimelineRenderer::new(
                settings.colors.clone(),
                settings.calendar.clone(),
                settings.tuning.clone(),
            ),
            resize: ResizeDebouncer::new(settings.tuning.resize_debounce_ms),
            settings,
            persist_settings: false,
            catalog,
            filter: EventFilter::new(),
            viewport,
            rate_handle: RateZoomHandle::default(),
            selected_id: None,
            frame_ticket: None,
            last_change,
            status_message: None,
            error_dialog: ErrorDialogState::new(),
            range_inputs: RangeInputs::default(),
        }
    }

    fn save_settings(&mut self) {
        if !self.persist_settings {
            return;
        }
        if let Err(e) = self.settings.save() {
            log::warn!("{}", e.brief_description());
            self.status_message = Some(StatusMessage::new(e.brief_description(), StatusKind::Error));
        }
    }

    /// Keep a new animation's ticket, replacing any older one.
    fn start_animation(&mut self, ticket: Option<FrameTicket>) {
        self.frame_ticket = ticket;
    }

    /// Open a file dialog and import the selected catalog.
    fn open_catalog_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Catalog", &["json"])
            .set_title("Import Timeline Catalog")
            .pick_file()
        {
            self.import_catalog(path);
        }
    }

    /// Merge the catalog at `path` into the current one.
    fn import_catalog(&mut self, path: PathBuf) {
        match EventCatalog::load_from(&path) {
            Ok(imported) => {
                let count = self.catalog.merge(imported);
                log::info!("Imported {} events from {}", count, path.display());
                self.status_message = Some(StatusMessage::new(
                    format!(
                        "Imported {} events from {}",
                        count,
                        path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| "file".to_string())
                    ),
                    StatusKind::Success,
                ));
                self.settings.add_recent_catalog(path);
                self.save_settings();
            }
            Err(e) => {
                self.error_dialog.show(e);
            }
        }
    }

    /// Select an event and bring it into view.
    fn select_event(&mut self, id: String, now_ms: f64) {
        let ticket = self
            .catalog
            .find(&id)
            .and_then(|event| self.viewport.focus_on_event(event, now_ms));
        self.start_animation(ticket);
        self.selected_id = Some(id);
    }

    /// Remove the selected event from the catalog.
    fn delete_selected(&mut self) {
        let Some(id) = self.selected_id.take() else {
            return;
        };
        if let Some(event) = self.catalog.remove(&id) {
            log::info!("Deleted event '{}'", event.title);
            self.status_message = Some(StatusMessage::new(
                format!("Deleted '{}'", event.title),
                StatusKind::Success,
            ));
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction, now_ms: f64) {
        let calendar = self.renderer.calendar().clone();
        match action {
            ToolbarAction::OpenCatalog => self.open_catalog_dialog(),
            ToolbarAction::OpenRecent(path) => self.import_catalog(path),
            ToolbarAction::GoToBigBang => {
                let ticket = self
                    .viewport
                    .focus_on_time(Some(0.0), BIG_BANG_SCALE, true, now_ms);
                self.start_animation(ticket);
            }
            ToolbarAction::GoToYearZero => {
                let ticket = self.viewport.focus_on_time(
                    Some(calendar.calendar_epoch),
                    CALENDAR_SCALE,
                    true,
                    now_ms,
                );
                self.start_animation(ticket);
            }
            ToolbarAction::GoToToday => {
                let ticket = self.viewport.focus_on_time(
                    Some(calendar.present_day),
                    CALENDAR_SCALE,
                    true,
                    now_ms,
                );
                self.start_animation(ticket);
            }
            ToolbarAction::ClearFilter => self.filter.reset(),
        }
    }

    fn handle_control_action(&mut self, action: ControlAction, now_ms: f64) {
        match action {
            ControlAction::RatePress => {
                self.viewport.cancel_animation();
                self.frame_ticket = None;
                self.rate_handle.press();
            }
            ControlAction::RateDrag(offset) => self.rate_handle.drag_to(offset),
            ControlAction::RateRelease => self.rate_handle.release(),
            ControlAction::FastScale(preset) => {
                let ticket = self.viewport.fast_scale(preset, now_ms);
                self.start_animation(ticket);
            }
            ControlAction::FrameRange => self.frame_typed_range(now_ms),
            ControlAction::StopFollowing => self.viewport.clear_follow(),
        }
    }

    /// Frame the range typed into the date inputs.
    fn frame_typed_range(&mut self, now_ms: f64) {
        let calendar = self.renderer.calendar();
        let start = parse_date(&self.range_inputs.start, calendar);
        let end = parse_date(&self.range_inputs.end, calendar);
        match (start, end) {
            (Some(start), Some(end)) => {
                let ticket = self.viewport.focus_on_range(start, end, now_ms);
                self.start_animation(ticket);
            }
            _ => {
                self.status_message = Some(StatusMessage::new(
                    "Enter dates as YYYY-MM-DD or a signed year",
                    StatusKind::Error,
                ));
            }
        }
    }

    fn handle_details_action(&mut self, action: DetailsAction, now_ms: f64) {
        match action {
            DetailsAction::Focus => {
                if let Some(id) = self.selected_id.clone() {
                    self.select_event(id, now_ms);
                }
            }
            DetailsAction::Delete => self.delete_selected(),
            DetailsAction::Close => self.selected_id = None,
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;

        self.track_window(ctx);
        self.handle_dropped_files(ctx);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && !self.error_dialog.has_error() {
            self.selected_id = None;
        }

        if let Some(ticket) = self.frame_ticket {
            self.frame_ticket = self.viewport.run_frame(ticket, now_ms);
        }
        let rate_zooming = self.rate_handle.apply(&mut self.viewport);

        self.render_toolbar(ctx, now_ms);
        self.render_controls(ctx, now_ms);
        self.render_details(ctx, now_ms);
        self.render_timeline(ctx, now_ms);
        self.render_error_dialog(ctx);

        if self.frame_ticket.is_some() || rate_zooming || self.rate_handle.is_active() {
            ctx.request_repaint();
        } else if self.resize.is_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(
                self.settings.tuning.resize_debounce_ms as u64,
            ));
        }
    }
}

impl TimelineApp {
    /// Remember the window size, and save settings when the window closes.
    fn track_window(&mut self, ctx: &egui::Context) {
        let (inner, closing) = ctx.input(|i| (i.viewport().inner_rect, i.viewport().close_requested()));
        if let Some(rect) = inner {
            let size = (rect.width(), rect.height());
            if self.settings.window_size != Some(size) {
                self.settings.set_window_size(size.0, size.1);
            }
        }
        if closing {
            self.save_settings();
        }
    }

    /// Import catalogs dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> =
            ctx.input(|i| i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect());
        for path in dropped {
            self.import_catalog(path);
        }
    }

    /// Render the top toolbar section.
    ///
    /// Contains catalog import, navigation shortcuts and the event filter.
    fn render_toolbar(&mut self, ctx: &egui::Context, now_ms: f64) {
        let mut action: Option<ToolbarAction> = None;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Cosmic Timeline");
                ui.separator();

                if ui.button("📂 Import Catalog").clicked() {
                    action = Some(ToolbarAction::OpenCatalog);
                }
                ui.add_enabled_ui(!self.settings.recent_catalogs.is_empty(), |ui| {
                    ui.menu_button("Recent", |ui| {
                        for path in &self.settings.recent_catalogs {
                            if ui.button(path.display().to_string()).clicked() {
                                action = Some(ToolbarAction::OpenRecent(path.clone()));
                                ui.close();
                            }
                        }
                    });
                });

                ui.separator();

                if ui.button("Bang").clicked() {
                    action = Some(ToolbarAction::GoToBigBang);
                }
                if ui.button("Year 0").clicked() {
                    action = Some(ToolbarAction::GoToYearZero);
                }
                if ui.button("Today").clicked() {
                    action = Some(ToolbarAction::GoToToday);
                }

                ui.separator();

                ui.label("🔍");
                ui.add(
                    egui::TextEdit::singleline(&mut self.filter.query)
                        .hint_text("Search events")
                        .desired_width(160.0),
                );
                let selected = self
                    .filter
                    .active_category()
                    .unwrap_or(ALL_CATEGORIES)
                    .to_string();
                egui::ComboBox::from_id_salt("category_combo")
                    .selected_text(selected.clone())
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(selected == ALL_CATEGORIES, ALL_CATEGORIES).clicked() {
                            self.filter.category = None;
                        }
                        for category in &self.catalog.categories {
                            let label = format!("{} {}", category.emoji, category.name);
                            if ui.selectable_label(selected == category.name, label).clicked() {
                                self.filter.category = Some(category.name.clone());
                            }
                        }
                    });
                if !self.filter.is_empty() && ui.small_button("✕").on_hover_text("Clear filter").clicked() {
                    action = Some(ToolbarAction::ClearFilter);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_status_message(ui);
                });
            });
        });

        if let Some(action) = action {
            self.handle_toolbar_action(action, now_ms);
        }
    }

    /// Render the status message if one is active.
    fn render_status_message(&mut self, ui: &mut egui::Ui) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|msg| !msg.is_visible())
        {
            self.status_message = None;
            return;
        }

        let msg_info = self.status_message.as_ref().map(|msg| {
            let color = match msg.kind {
                StatusKind::Success => egui::Color32::from_rgb(76, 175, 80),
                StatusKind::Error => egui::Color32::from_rgb(244, 67, 54),
            };
            (color, msg.text.clone())
        });

        if let Some((color, text)) = msg_info {
            let mut dismiss_clicked = false;
            ui.horizontal(|ui| {
                if ui.small_button("✕").clicked() {
                    dismiss_clicked = true;
                }
                ui.colored_label(color, &text);
            });
            if dismiss_clicked {
                self.status_message = None;
            }
        }
    }

    /// Render the bottom zoom controls and the center readout.
    fn render_controls(&mut self, ctx: &egui::Context, now_ms: f64) {
        let change = self.last_change.get();
        let span = change.state.visible_range(change.width);
        let center = change.state.center_time(change.width);
        let following = self.viewport.follow_range().is_some();

        let mut action: Option<ControlAction> = None;

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut renderer =
                    ControlsRenderer::new(&self.rate_handle, span, following, &mut self.range_inputs);
                action = renderer.render(ui);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format_calendar_year(center, self.renderer.calendar()))
                            .monospace(),
                    )
                    .on_hover_text(format!("Center of view, {} across", format_span_label(span)));
                });
            });
        });

        if let Some(action) = action {
            self.handle_control_action(action, now_ms);
        }
    }

    /// Render the selected event panel.
    fn render_details(&mut self, ctx: &egui::Context, now_ms: f64) {
        let Some(event) = self
            .selected_id
            .as_deref()
            .and_then(|id| self.catalog.find(id))
        else {
            return;
        };

        let mut action: Option<DetailsAction> = None;
        egui::SidePanel::right("details")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                action = DetailsRenderer::new(event, &self.catalog, self.renderer.calendar())
                    .render(ui);
            });

        if let Some(action) = action {
            self.handle_details_action(action, now_ms);
        }
    }

    /// Render the center timeline section.
    fn render_timeline(&mut self, ctx: &egui::Context, now_ms: f64) {
        let mut clicked: Option<String> = None;

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                if let Some(size) =
                    self.resize
                        .observe(f64::from(rect.width()), f64::from(rect.height()), now_ms)
                {
                    self.viewport.set_width(size.width);
                }

                let events = self.filter.apply(&self.catalog);
                clicked = TimelineCanvas {
                    viewport: &mut self.viewport,
                    gestures: &mut self.gestures,
                    renderer: &mut self.renderer,
                    catalog: &self.catalog,
                    events: &events,
                    selected_id: self.selected_id.as_deref(),
                }
                .show(ui);
            });

        if let Some(id) = clicked {
            self.select_event(id, now_ms);
        }
    }

    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let action = ErrorDialogRenderer::new(&mut self.error_dialog).render(ctx);
        match action {
            Some(ErrorDialogAction::Retry) => {
                let path = self.error_dialog.retry_path();
                self.error_dialog.close();
                if let Some(path) = path {
                    self.import_catalog(path);
                }
            }
            Some(ErrorDialogAction::Close) => self.error_dialog.close(),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::FastScale;

    fn app() -> TimelineApp {
        TimelineApp::with_settings(AppSettings::default())
    }

    fn temp_catalog(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cosmic-app-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_initial_state() {
        let app = app();
        assert!(app.catalog.events.len() >= 10);
        assert!(app.selected_id.is_none());
        assert!(app.frame_ticket.is_none());
        let state = app.viewport.state();
        assert_eq!(state.scale, 0.05);
        assert_eq!(state.origin_time, 13.8e9 - 2000.0);
    }

    #[test]
    fn test_select_event_focuses_and_publishes_changes() {
        let mut app = app();
        app.select_event("1".to_string(), 0.0);
        assert_eq!(app.selected_id.as_deref(), Some("1"));

        let mut ticket = app.frame_ticket.expect("animation started");
        let mut now = 0.0;
        while let Some(next) = app.viewport.run_frame(ticket, now) {
            ticket = next;
            now += 16.0;
        }
        // Zoomed-out views snap to 0.5 px/yr around the event
        let change = app.last_change.get();
        assert_eq!(change.state.scale, 0.5);
        assert!((change.state.center_time(change.width) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_delete_selected() {
        let mut app = app();
        let before = app.catalog.events.len();
        app.select_event("5".to_string(), 0.0);
        app.handle_details_action(DetailsAction::Delete, 10.0);

        assert_eq!(app.catalog.events.len(), before - 1);
        assert!(app.catalog.find("5").is_none());
        assert!(app.selected_id.is_none());
        assert_eq!(
            app.status_message.as_ref().map(|m| m.kind),
            Some(StatusKind::Success)
        );
    }

    #[test]
    fn test_import_merges_and_records_recent() {
        let mut app = app();
        let path = temp_catalog(
            "extra.json",
            r#"{"events": [{"id": "x1", "title": "Moon Landing", "start_time": 13800001969,
                "category": "Modern", "importance": 9}]}"#,
        );

        app.import_catalog(path.clone());
        assert!(app.catalog.find("x1").is_some());
        assert_eq!(app.settings.recent_catalogs.first(), Some(&path));
        assert!(!app.error_dialog.has_error());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_failure_opens_error_dialog() {
        let mut app = app();
        let path = temp_catalog("bad.json", r#"{"version": 7, "events": []}"#);
        let before = app.catalog.clone();

        app.import_catalog(path.clone());
        assert!(app.error_dialog.has_error());
        assert_eq!(app.catalog, before);
        assert!(app.settings.recent_catalogs.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_navigation_shortcuts_animate() {
        let mut app = app();
        app.handle_toolbar_action(ToolbarAction::GoToBigBang, 0.0);
        assert!(app.frame_ticket.is_some());

        app.handle_control_action(ControlAction::FastScale(FastScale::Day), 5.0);
        let ticket = app.frame_ticket.expect("fast scale animates");
        assert!(app.viewport.run_frame(ticket, 5000.0).is_none());
        let state = app.viewport.state();
        assert!((state.visible_range(app.viewport.width()) - 1.0 / 365.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_range_enables_follow_mode() {
        let mut app = app();
        app.range_inputs.start = "1900".to_string();
        app.range_inputs.end = "2000".to_string();
        app.handle_control_action(ControlAction::FrameRange, 0.0);
        assert!(app.viewport.follow_range().is_some());

        app.handle_control_action(ControlAction::StopFollowing, 1.0);
        assert!(app.viewport.follow_range().is_none());
    }

    #[test]
    fn test_frame_range_rejects_bad_input() {
        let mut app = app();
        app.range_inputs.start = "soon".to_string();
        app.handle_control_action(ControlAction::FrameRange, 0.0);
        assert!(app.viewport.follow_range().is_none());
        assert_eq!(
            app.status_message.as_ref().map(|m| m.kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn test_rate_press_cancels_animation() {
        let mut app = app();
        app.handle_toolbar_action(ToolbarAction::GoToToday, 0.0);
        assert!(app.viewport.is_animating());

        app.handle_control_action(ControlAction::RatePress, 1.0);
        assert!(!app.viewport.is_animating());
        assert!(app.frame_ticket.is_none());

        app.handle_control_action(ControlAction::RateDrag(-60.0), 2.0);
        let scale = app.viewport.state().scale;
        assert!(app.rate_handle.apply(&mut app.viewport));
        assert!(app.viewport.state().scale > scale);

        app.handle_control_action(ControlAction::RateRelease, 3.0);
        assert!(!app.rate_handle.apply(&mut app.viewport));
    }
}
