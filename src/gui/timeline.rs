//! Timeline canvas.
//!
//! This module is the rendering surface for the core: it replays the frame's
//! draw commands with an egui `Painter` and feeds pointer, wheel and pinch
//! input back into the gesture controller.

use eframe::egui::{self, Color32, Painter, Pos2, Rect, Stroke, emath::Rot2};

use crate::core::catalog::{EventCatalog, TimelineEvent};
use crate::core::gesture::{GestureController, GestureState};
use crate::core::render::{DrawCommand, FontWeight, Point, Rgba, SurfaceSize, TimelineRenderer};
use crate::core::viewport::Viewport;

/// Horizontal offset of the second pass used to embolden text.
///
/// The bundled fonts ship a single weight.
const FAUX_BOLD_OFFSET: f32 = 0.6;

/// Pointer input in surface-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Press(f64),
    Move(f64),
    Release(f64),
    /// Wheel with browser-style sign (positive scrolls down, zooms out)
    Wheel { delta_y: f64, x: f64 },
    Pinch { factor: f64, x: f64 },
}

pub fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn to_pos(origin: Pos2, point: Point) -> Pos2 {
    Pos2::new(origin.x + point.x as f32, origin.y + point.y as f32)
}

/// Top-left corner of a text block of `size` anchored center-bottom at
/// `anchor` and rotated by `angle` around that corner.
pub fn text_origin(anchor: Pos2, size: egui::Vec2, angle: f32) -> Pos2 {
    anchor + Rot2::from_angle(angle) * egui::vec2(-size.x / 2.0, -size.y)
}

/// Replay draw commands onto `painter`, with `(0, 0)` at `origin`.
pub fn paint_commands(painter: &Painter, origin: Pos2, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::Clear { color } => {
                painter.rect_filled(painter.clip_rect(), 0.0, to_color32(*color));
            }
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment(
                    [to_pos(origin, *from), to_pos(origin, *to)],
                    Stroke::new(*width as f32, to_color32(*color)),
                );
            }
            DrawCommand::Rect {
                min,
                max,
                fill,
                stroke,
            } => {
                let rect = Rect::from_min_max(to_pos(origin, *min), to_pos(origin, *max));
                painter.rect_filled(rect, 0.0, to_color32(*fill));
                if let Some((width, color)) = stroke {
                    painter.rect_stroke(
                        rect,
                        0.0,
                        Stroke::new(*width as f32, to_color32(*color)),
                        egui::StrokeKind::Inside,
                    );
                }
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(to_pos(origin, *center), *radius as f32, to_color32(*color));
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                weight,
                color,
                angle,
            } => {
                let color = to_color32(*color);
                let galley = painter.layout_no_wrap(
                    text.clone(),
                    egui::FontId::proportional(*size as f32),
                    color,
                );
                let angle = *angle as f32;
                let top_left = text_origin(to_pos(origin, *pos), galley.size(), angle);

                if matches!(weight, FontWeight::Bold | FontWeight::Black) {
                    let nudge = Rot2::from_angle(angle) * egui::vec2(FAUX_BOLD_OFFSET, 0.0);
                    painter.add(
                        egui::epaint::TextShape::new(top_left + nudge, galley.clone(), color)
                            .with_angle(angle),
                    );
                }
                painter.add(egui::epaint::TextShape::new(top_left, galley, color).with_angle(angle));
            }
        }
    }
}

/// Gather this frame's pointer input for the canvas at `rect`.
///
/// Presses, wheel and pinch only count while the pointer is over the canvas;
/// moves and releases are reported while a gesture is in progress so drags
/// may leave the canvas.
pub fn collect_input(
    ui: &egui::Ui,
    response: &egui::Response,
    rect: Rect,
    gesture_active: bool,
) -> Vec<PointerInput> {
    let left = f64::from(rect.left());
    let hovered = response.hovered();

    ui.input(|i| {
        let mut inputs = Vec::new();
        let Some(pos) = i.pointer.interact_pos().or(i.pointer.hover_pos()) else {
            return inputs;
        };
        let x = f64::from(pos.x) - left;

        let pressed = hovered && i.pointer.primary_pressed();
        if pressed {
            inputs.push(PointerInput::Press(x));
        } else if gesture_active && i.pointer.primary_down() && i.pointer.delta() != egui::Vec2::ZERO {
            inputs.push(PointerInput::Move(x));
        }
        // A fast click can press and release within one frame
        if (gesture_active || pressed) && i.pointer.primary_released() {
            inputs.push(PointerInput::Release(x));
        }

        if hovered {
            let zoom = i.zoom_delta();
            if zoom != 1.0 {
                inputs.push(PointerInput::Pinch {
                    factor: f64::from(zoom),
                    x,
                });
            } else if i.raw_scroll_delta.y != 0.0 {
                // egui reports upward scrolling as positive
                inputs.push(PointerInput::Wheel {
                    delta_y: -f64::from(i.raw_scroll_delta.y),
                    x,
                });
            }
        }
        inputs
    })
}

/// One frame of the interactive timeline.
pub struct TimelineCanvas<'a> {
    pub viewport: &'a mut Viewport,
    pub gestures: &'a mut GestureController,
    pub renderer: &'a mut TimelineRenderer,
    pub catalog: &'a EventCatalog,
    pub events: &'a [&'a TimelineEvent],
    pub selected_id: Option<&'a str>,
}

impl TimelineCanvas<'_> {
    /// Handle input, then draw. Returns the id of a clicked event.
    pub fn show(self, ui: &mut egui::Ui) -> Option<String> {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        // The pointer left the window or focus moved elsewhere mid-gesture
        if self.gestures.state() != GestureState::Idle
            && ui.input(|i| !i.focused || !i.pointer.has_pointer())
        {
            self.gestures.cancel();
        }

        let gesture_active = self.gestures.state() != GestureState::Idle;
        let mut clicked = None;
        for input in collect_input(ui, &response, rect, gesture_active) {
            match input {
                PointerInput::Press(x) => self.gestures.press(x, self.viewport),
                PointerInput::Move(x) => self.gestures.move_to(x, self.viewport),
                PointerInput::Release(x) => {
                    let events = self.events.iter().copied();
                    if let Some(event) = self.gestures.release(x, self.viewport, events) {
                        clicked = Some(event.id.clone());
                    }
                }
                PointerInput::Wheel { delta_y, x } => self.gestures.wheel(delta_y, x, self.viewport),
                PointerInput::Pinch { factor, x } => self.gestures.pinch(factor, x, self.viewport),
            }
        }

        if self.gestures.is_dragging() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        let size = SurfaceSize::new(
            f64::from(rect.width()),
            f64::from(rect.height()),
            f64::from(ui.ctx().pixels_per_point()),
        );
        let state = self.viewport.state();
        let selected_id = clicked.as_deref().or(self.selected_id);
        let commands = self.renderer.render(
            &state,
            self.events.iter().copied(),
            self.catalog,
            selected_id,
            size,
        );
        paint_commands(&ui.painter_at(rect), rect.min, &commands);

        clicked
    }
}
