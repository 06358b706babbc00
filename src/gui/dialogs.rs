//! Dialog components for the timeline viewer.
//!
//! The error dialog reports rejected catalog imports and settings failures,
//! and offers a retry for file problems the user can fix.

use eframe::egui;

use crate::core::error::AppError;

/// How long the "copied" note stays visible.
const CLIPBOARD_FEEDBACK_SECS: f64 = 2.0;

/// Actions that can be triggered from the error dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDialogAction {
    /// User wants to retry the failed import
    Retry,
    /// User dismissed the dialog
    Close,
}

/// State for managing the error dialog.
#[derive(Debug, Clone, Default)]
pub struct ErrorDialogState {
    /// The error to display, if any
    pub error: Option<AppError>,
    /// Whether the error details are expanded
    pub details_expanded: bool,
    /// Time (egui seconds) at which the details were copied
    copied_at: Option<f64>,
}

impl ErrorDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the error dialog with the given error.
    pub fn show(&mut self, error: AppError) {
        log::warn!("{}", error.brief_description());
        self.error = Some(error);
        self.details_expanded = false;
        self.copied_at = None;
    }

    /// Close the error dialog.
    pub fn close(&mut self) {
        self.error = None;
        self.details_expanded = false;
        self.copied_at = None;
    }

    /// Check if the dialog is showing an error.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Path to re-import when the user asks for a retry.
    pub fn retry_path(&self) -> Option<std::path::PathBuf> {
        self.error
            .as_ref()
            .filter(|e| e.supports_retry())
            .and_then(|e| e.file_path().cloned())
    }

    fn copied_note_visible(&self, now: f64) -> bool {
        self.copied_at
            .is_some_and(|at| now - at < CLIPBOARD_FEEDBACK_SECS)
    }
}

/// Renderer for the error dialog.
pub struct ErrorDialogRenderer<'a> {
    state: &'a mut ErrorDialogState,
}

impl<'a> ErrorDialogRenderer<'a> {
    pub fn new(state: &'a mut ErrorDialogState) -> Self {
        Self { state }
    }

    /// Render the error dialog and return the action taken.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<ErrorDialogAction> {
        let error = self.state.error.as_ref()?;

        let title = error.dialog_title();
        let brief = error.brief_description();
        let detailed = error.detailed_info();
        let supports_retry = error.supports_retry();
        let now = ctx.input(|i| i.time);

        let mut action: Option<ErrorDialogAction> = None;

        // Dim the timeline behind the dialog
        let screen_rect = ctx.input(|i| i.viewport_rect());
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("error_dialog_overlay"),
        ));
        painter.rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(150));

        egui::Window::new(format!("⚠ {}", title))
            .id(egui::Id::new("error_dialog"))
            .collapsible(false)
            .resizable(true)
            .default_width(450.0)
            .min_width(350.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(&brief).size(14.0));
                ui.add_space(12.0);

                let details_header = if self.state.details_expanded {
                    "▼ Details"
                } else {
                    "▶ Details"
                };
                if ui
                    .add(egui::Button::new(details_header).frame(false))
                    .clicked()
                {
                    self.state.details_expanded = !self.state.details_expanded;
                }

                if self.state.details_expanded {
                    ui.add_space(4.0);
                    egui::Frame::new()
                        .fill(egui::Color32::from_gray(30))
                        .inner_margin(8.0)
                        .corner_radius(4.0)
                        .show(ui, |ui| {
                            ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(&detailed).color(egui::Color32::LIGHT_GRAY),
                                )
                                .wrap(),
                            );
                        });
                }

                ui.add_space(12.0);

                if self.state.copied_note_visible(now) {
                    ui.colored_label(egui::Color32::from_rgb(76, 175, 80), "Copied to clipboard!");
                    ui.add_space(4.0);
                    ctx.request_repaint();
                }

                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .button("📋 Copy Error")
                        .on_hover_text("Copy error details to clipboard")
                        .clicked()
                    {
                        ui.ctx().copy_text(detailed.clone());
                        self.state.copied_at = Some(now);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            action = Some(ErrorDialogAction::Close);
                        }

                        if supports_retry
                            && ui
                                .button("🔄 Retry")
                                .on_hover_text("Try importing the catalog again")
                                .clicked()
                        {
                            action = Some(ErrorDialogAction::Retry);
                        }
                    });
                });

                ui.add_space(4.0);
            });

        action
    }
}
