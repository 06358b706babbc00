//! Frame assembly.
//!
//! Combines the grid, ruler, labels and placed markers into a flat list of
//! drawing primitives. The list is toolkit independent; the GUI layer replays
//! it with whatever painter it has.

use std::f64::consts::FRAC_PI_2;

use super::catalog::{EventCatalog, TimelineEvent};
use super::config::{CalendarSettings, ColorSettings, TuningSettings};
use super::format::LabelFormatter;
use super::grid::{RulerTick, grid_layers, ruler_ticks};
use super::placement::{
    PlacedEvent, RANGE_BAND_HALF_HEIGHT, RANGE_BORDER_ALPHA, RANGE_FILL_ALPHA, place_events,
};
use super::viewport::ViewportState;

// ============================================================================
// Primitives
// ============================================================================

/// 8-bit RGBA color (unpremultiplied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Replace the alpha with an opacity in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.with_alpha(a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Medium,
    Bold,
    Black,
}

/// One drawing primitive. Text is centered horizontally on `pos` with its
/// baseline at `pos.y`, rotated by `angle` radians around `pos`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba,
    },
    Rect {
        min: Point,
        max: Point,
        fill: Rgba,
        stroke: Option<(f64, Rgba)>,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
    Text {
        pos: Point,
        text: String,
        size: f64,
        weight: FontWeight,
        color: Rgba,
        angle: f64,
    },
}

/// Logical size of the drawing surface and its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Move a coordinate to the middle of its device pixel so hairlines
    /// cover exactly one pixel.
    pub fn snap(&self, v: f64) -> f64 {
        ((v * self.pixel_ratio).floor() + 0.5) / self.pixel_ratio
    }
}

// ============================================================================
// Layout constants
// ============================================================================

const GRID_LINE_WIDTH: f64 = 1.0;
const TICK_LINE_WIDTH: f64 = 1.0;
const MINOR_TICK_OPACITY: f64 = 0.15;
const MAJOR_TICK_OPACITY: f64 = 0.5;
const MINOR_LABEL_OPACITY: f64 = 0.35;
const CENTER_LINE_OPACITY: f64 = 0.1;
const TITLE_OPACITY: f64 = 0.9;

const LABEL_TOP_OFFSET: f64 = 34.0;
const LABEL_LINE_HEIGHT: f64 = 16.0;
const MAJOR_LABEL_SIZE: f64 = 13.0;
const MINOR_LABEL_SIZE: f64 = 10.0;

const ERA_LABEL_SIZE: f64 = 120.0;
const ERA_LABEL_OPACITY: f64 = 0.025;
const ERA_MARGIN_PX: f64 = 1000.0;

/// A large faint caption marking a milestone of cosmic history.
#[derive(Debug, Clone, PartialEq)]
pub struct Era {
    pub time: f64,
    pub label: &'static str,
}

/// Milestones drawn behind the ruler.
pub fn eras(calendar: &CalendarSettings) -> [Era; 5] {
    [
        Era {
            time: 0.0,
            label: "BIG BANG",
        },
        Era {
            time: 1e9,
            label: "FIRST GALAXIES",
        },
        Era {
            time: 9.3e9,
            label: "EARTH FORMS",
        },
        Era {
            time: calendar.calendar_epoch,
            label: "YEAR ZERO",
        },
        Era {
            time: calendar.present_day,
            label: "TODAY",
        },
    ]
}

// ============================================================================
// Renderer
// ============================================================================

/// Produces the draw-command list for one frame.
#[derive(Debug, Clone, Default)]
pub struct TimelineRenderer {
    colors: ColorSettings,
    tuning: TuningSettings,
    formatter: LabelFormatter,
}

impl TimelineRenderer {
    pub fn new(colors: ColorSettings, calendar: CalendarSettings, tuning: TuningSettings) -> Self {
        Self {
            colors,
            tuning,
            formatter: LabelFormatter::new(calendar),
        }
    }

    pub fn calendar(&self) -> &CalendarSettings {
        self.formatter.calendar()
    }

    /// Build the frame for `events` as seen through `state`.
    pub fn render<'a, I>(
        &mut self,
        state: &ViewportState,
        events: I,
        catalog: &EventCatalog,
        selected_id: Option<&str>,
        size: SurfaceSize,
    ) -> Vec<DrawCommand>
    where
        I: IntoIterator<Item = &'a TimelineEvent>,
    {
        let mut out = Vec::new();
        out.push(DrawCommand::Clear {
            color: ColorSettings::to_rgba(self.colors.background),
        });

        self.draw_grid(&mut out, state, size);
        self.draw_eras(&mut out, state, size);

        let ticks = ruler_ticks(state, size.width, self.calendar().calendar_epoch);
        self.draw_ticks(&mut out, &ticks, size);
        self.draw_tick_labels(&mut out, &ticks, state.scale, size);

        let cy = size.snap(size.center_y());
        out.push(DrawCommand::Line {
            from: Point::new(0.0, cy),
            to: Point::new(size.width, cy),
            width: GRID_LINE_WIDTH,
            color: ColorSettings::to_rgba_opacity(self.colors.ruler, CENTER_LINE_OPACITY),
        });

        let placed = place_events(events, state, size.width, selected_id, &self.tuning);
        for marker in &placed {
            self.draw_marker(&mut out, marker, catalog, size);
        }

        out
    }

    fn draw_grid(&self, out: &mut Vec<DrawCommand>, state: &ViewportState, size: SurfaceSize) {
        for layer in grid_layers(state, size.width) {
            let color = ColorSettings::to_rgba_opacity(self.colors.grid, layer.opacity);
            out.extend(layer.xs.iter().map(|&x| {
                let x = size.snap(x);
                DrawCommand::Line {
                    from: Point::new(x, 0.0),
                    to: Point::new(x, size.height),
                    width: GRID_LINE_WIDTH,
                    color,
                }
            }));
        }
    }

    fn draw_eras(&self, out: &mut Vec<DrawCommand>, state: &ViewportState, size: SurfaceSize) {
        let color = ColorSettings::to_rgba_opacity(self.colors.era_label, ERA_LABEL_OPACITY);
        for era in eras(self.calendar()) {
            let x = state.time_to_x(era.time);
            if x < -ERA_MARGIN_PX || x > size.width + ERA_MARGIN_PX {
                continue;
            }
            out.push(DrawCommand::Text {
                pos: Point::new(x, size.center_y()),
                text: era.label.to_string(),
                size: ERA_LABEL_SIZE,
                weight: FontWeight::Black,
                color,
                angle: -FRAC_PI_2,
            });
        }
    }

    fn draw_ticks(&self, out: &mut Vec<DrawCommand>, ticks: &[RulerTick], size: SurfaceSize) {
        let cy = size.center_y();
        let minor = ColorSettings::to_rgba_opacity(self.colors.ruler, MINOR_TICK_OPACITY);
        let major = ColorSettings::to_rgba_opacity(self.colors.ruler, MAJOR_TICK_OPACITY);

        // Minor ticks first so majors sit on top
        for pass_major in [false, true] {
            for tick in ticks.iter().filter(|t| t.major == pass_major) {
                let x = size.snap(tick.x);
                let h = tick.half_height();
                out.push(DrawCommand::Line {
                    from: Point::new(x, cy - h),
                    to: Point::new(x, cy + h),
                    width: TICK_LINE_WIDTH,
                    color: if tick.major { major } else { minor },
                });
            }
        }
    }

    fn draw_tick_labels(
        &mut self,
        out: &mut Vec<DrawCommand>,
        ticks: &[RulerTick],
        scale: f64,
        size: SurfaceSize,
    ) {
        let cy = size.center_y();
        for tick in ticks.iter().filter(|t| t.is_labelled(size.width)) {
            let (color, text_size, weight) = if tick.major {
                (
                    ColorSettings::to_rgba(self.colors.label_major),
                    MAJOR_LABEL_SIZE,
                    FontWeight::Bold,
                )
            } else {
                (
                    ColorSettings::to_rgba_opacity(self.colors.label_minor, MINOR_LABEL_OPACITY),
                    MINOR_LABEL_SIZE,
                    FontWeight::Medium,
                )
            };

            let lines = self
                .formatter
                .format_granular_lines(tick.time, scale, size.width);
            for (i, line) in lines.into_iter().enumerate() {
                out.push(DrawCommand::Text {
                    pos: Point::new(tick.x, cy + LABEL_TOP_OFFSET + i as f64 * LABEL_LINE_HEIGHT),
                    text: line,
                    size: text_size,
                    weight,
                    color,
                    angle: 0.0,
                });
            }
        }
    }

    fn draw_marker(
        &self,
        out: &mut Vec<DrawCommand>,
        marker: &PlacedEvent<'_>,
        catalog: &EventCatalog,
        size: SurfaceSize,
    ) {
        let cy = size.center_y();
        let x = marker.start_x;
        let geometry = marker.geometry();
        let color = ColorSettings::to_rgba(self.colors.event_color(marker.event.color));

        if let Some(end_x) = marker.end_x {
            out.push(DrawCommand::Rect {
                min: Point::new(x.min(end_x), cy - RANGE_BAND_HALF_HEIGHT),
                max: Point::new(x.max(end_x), cy + RANGE_BAND_HALF_HEIGHT),
                fill: color.with_alpha(RANGE_FILL_ALPHA),
                stroke: Some((1.0, color.with_alpha(RANGE_BORDER_ALPHA))),
            });
        }

        out.push(DrawCommand::Line {
            from: Point::new(x, cy),
            to: Point::new(x, cy - geometry.stem_height),
            width: geometry.stem_width,
            color,
        });
        out.push(DrawCommand::Circle {
            center: Point::new(x, cy),
            radius: geometry.marker_radius,
            color,
        });
        out.push(DrawCommand::Text {
            pos: Point::new(x, cy - geometry.icon_offset),
            text: catalog.glyph_for(marker.event).to_string(),
            size: geometry.icon_size,
            weight: FontWeight::Medium,
            color: Rgba::WHITE,
            angle: 0.0,
        });

        let (title_color, title_weight) = if marker.selected {
            (ColorSettings::to_rgba(self.colors.event_title), FontWeight::Bold)
        } else {
            (
                ColorSettings::to_rgba_opacity(self.colors.event_title, TITLE_OPACITY),
                FontWeight::Medium,
            )
        };
        out.push(DrawCommand::Text {
            pos: Point::new(x, cy - geometry.title_offset),
            text: marker.event.title.clone(),
            size: geometry.title_size,
            weight: title_weight,
            color: title_color,
            angle: 0.0,
        });
    }
}
