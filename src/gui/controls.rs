//! Zoom controls module.
//!
//! This module renders the bottom panel: the spring-loaded rate-zoom handle,
//! the fast-scale presets, the visible-span readout and the date-range framing
//! inputs.

use eframe::egui;

use crate::core::format::format_span_label;
use crate::core::gesture::{RATE_MAX_OFFSET_PX, RateZoomHandle};
use crate::core::viewport::FastScale;

/// Size of the rate-zoom track.
const TRACK_WIDTH: f32 = 28.0;
const TRACK_HEIGHT: f32 = 2.0 * RATE_MAX_OFFSET_PX as f32 + 16.0;
const KNOB_RADIUS: f32 = 9.0;

/// User actions that can be triggered from the controls panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Rate-zoom handle grabbed
    RatePress,
    /// Rate-zoom handle moved to an offset from rest (negative is up)
    RateDrag(f64),
    /// Rate-zoom handle let go
    RateRelease,
    /// Animate to a preset span around the current center
    FastScale(FastScale),
    /// Frame the date range typed into the inputs
    FrameRange,
    /// Stop keeping the framed range in view
    StopFollowing,
}

/// Text typed into the date-range inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeInputs {
    pub start: String,
    pub end: String,
}

/// Renders zoom controls and returns any actions triggered by user interaction.
pub struct ControlsRenderer<'a> {
    /// Rate-zoom handle, for drawing the knob
    handle: &'a RateZoomHandle,
    /// Years currently visible across the timeline
    visible_span: f64,
    /// Whether a range is being kept in frame
    following: bool,
    range: &'a mut RangeInputs,
}

impl<'a> ControlsRenderer<'a> {
    pub fn new(
        handle: &'a RateZoomHandle,
        visible_span: f64,
        following: bool,
        range: &'a mut RangeInputs,
    ) -> Self {
        Self {
            handle,
            visible_span,
            following,
            range,
        }
    }

    /// Render the controls and return any triggered action.
    pub fn render(&mut self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        ui.horizontal(|ui| {
            action = self.render_rate_handle(ui).or(action);
            ui.separator();

            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    action = Self::render_fast_scales(ui).or(action);
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format_span_label(self.visible_span))
                            .monospace()
                            .strong(),
                    )
                    .on_hover_text("Visible span");
                });

                ui.add_space(4.0);

                ui.horizontal(|ui| {
                    action = self.render_range_inputs(ui).or(action);
                });
            });
        });

        action
    }

    /// Draw the rate-zoom track and translate drags on it into actions.
    fn render_rate_handle(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(TRACK_WIDTH, TRACK_HEIGHT),
            egui::Sense::drag(),
        );
        let response = response.on_hover_text("Drag up to zoom in, down to zoom out");

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, TRACK_WIDTH / 2.0, egui::Color32::from_gray(30));
        painter.line_segment(
            [
                egui::pos2(rect.left() + 6.0, rect.center().y),
                egui::pos2(rect.right() - 6.0, rect.center().y),
            ],
            egui::Stroke::new(1.0, egui::Color32::from_gray(70)),
        );
        let knob = rect.center() + egui::vec2(0.0, self.handle.offset() as f32);
        let knob_color = if self.handle.is_active() {
            egui::Color32::from_rgb(99, 102, 241)
        } else {
            egui::Color32::from_gray(160)
        };
        painter.circle_filled(knob, KNOB_RADIUS, knob_color);
        painter.text(
            rect.center_top() + egui::vec2(0.0, 2.0),
            egui::Align2::CENTER_TOP,
            "+",
            egui::FontId::proportional(10.0),
            egui::Color32::GRAY,
        );
        painter.text(
            rect.center_bottom() - egui::vec2(0.0, 2.0),
            egui::Align2::CENTER_BOTTOM,
            "−",
            egui::FontId::proportional(10.0),
            egui::Color32::GRAY,
        );

        if response.drag_started() {
            return Some(ControlAction::RatePress);
        }
        if response.drag_stopped() {
            return Some(ControlAction::RateRelease);
        }
        if response.dragged()
            && let Some(pos) = response.interact_pointer_pos()
        {
            return Some(ControlAction::RateDrag(f64::from(pos.y - rect.center().y)));
        }
        None
    }

    fn render_fast_scales(ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action = None;
        for preset in FastScale::ALL {
            if ui
                .button(preset.label())
                .on_hover_text(format!("Zoom to {}", format_span_label(preset.span_years())))
                .clicked()
            {
                action = Some(ControlAction::FastScale(preset));
            }
        }
        action
    }

    fn render_range_inputs(&mut self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action = None;

        ui.label("From:");
        ui.add(
            egui::TextEdit::singleline(&mut self.range.start)
                .hint_text("YYYY-MM-DD")
                .desired_width(90.0),
        );
        ui.label("To:");
        ui.add(
            egui::TextEdit::singleline(&mut self.range.end)
                .hint_text("YYYY-MM-DD")
                .desired_width(90.0),
        );

        if ui
            .button("Frame")
            .on_hover_text("Keep this range in view")
            .clicked()
        {
            action = Some(ControlAction::FrameRange);
        }

        if self.following && ui.button("Unfollow").clicked() {
            action = Some(ControlAction::StopFollowing);
        }

        action
    }
}
