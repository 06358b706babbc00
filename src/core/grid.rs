//! Adaptive background grid and ruler generation.
//!
//! Both structures are recomputed from the viewport state on every frame.
//! Positions are generated from an integer multiple of the step so that long
//! runs of lines do not accumulate floating-point drift.

use super::viewport::ViewportState;

/// Smallest step (in years) the ruler will refine to.
pub const MIN_STEP: f64 = 1e-7;

/// Powers of ten used for the background grid, coarsest first.
pub const GRID_POWERS: [i32; 6] = [12, 9, 6, 3, 0, -2];

/// Grid layers whose line spacing falls outside this range are hidden.
const GRID_MIN_SPACING_PX: f64 = 10.0;
const GRID_MAX_SPACING_PX: f64 = 5000.0;

/// Grid opacity is `spacing / GRID_FADE_PX`, capped at `GRID_MAX_OPACITY`.
const GRID_FADE_PX: f64 = 300.0;
const GRID_MAX_OPACITY: f64 = 0.3;

/// Target pixel spacing between ruler ticks.
const RULER_MIN_SPACING_PX: f64 = 80.0;
const RULER_MAX_SPACING_PX: f64 = 200.0;

/// Half-height of ruler ticks.
pub const MAJOR_TICK_HALF_HEIGHT: f64 = 18.0;
pub const MINOR_TICK_HALF_HEIGHT: f64 = 8.0;

/// Ticks further than this outside the surface get no label.
pub const LABEL_MARGIN_PX: f64 = 200.0;

/// Upper bound on positions generated per layer.
const MAX_POSITIONS: usize = 10_000;

/// Upper bound on step adjustment iterations.
const MAX_STEP_ITERATIONS: usize = 128;

const MONTH: f64 = 1.0 / 12.0;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * b.abs().max(1.0)
}

/// One power-of-ten layer of the background grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayer {
    /// Line spacing in years
    pub step: f64,
    /// Line opacity in `[0, 0.3]`
    pub opacity: f64,
    /// Screen x of every line
    pub xs: Vec<f64>,
}

/// A single ruler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    pub time: f64,
    pub x: f64,
    pub major: bool,
}

impl RulerTick {
    /// Half-height of the tick mark in pixels.
    pub fn half_height(&self) -> f64 {
        if self.major {
            MAJOR_TICK_HALF_HEIGHT
        } else {
            MINOR_TICK_HALF_HEIGHT
        }
    }

    /// Whether the tick is close enough to the surface to be labelled.
    pub fn is_labelled(&self, width: f64) -> bool {
        self.x >= -LABEL_MARGIN_PX && self.x <= width + LABEL_MARGIN_PX
    }
}

/// Times `k * step` covering the visible range, including the multiples
/// just outside each edge.
fn step_multiples(state: &ViewportState, width: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (state.origin_time / step).floor();
    let last = ((state.origin_time + width / state.scale) / step).ceil();
    let count = if last >= first {
        ((last - first) as usize).saturating_add(1).min(MAX_POSITIONS)
    } else {
        0
    };
    (0..count).map(move |i| (first + i as f64) * step)
}

/// Compute the visible background grid layers.
pub fn grid_layers(state: &ViewportState, width: f64) -> Vec<GridLayer> {
    GRID_POWERS
        .iter()
        .filter_map(|&power| {
            let step = 10f64.powi(power);
            if step < MIN_STEP {
                return None;
            }
            let spacing = step * state.scale;
            if !(GRID_MIN_SPACING_PX..=GRID_MAX_SPACING_PX).contains(&spacing) {
                return None;
            }
            Some(GridLayer {
                step,
                opacity: (spacing / GRID_FADE_PX).min(GRID_MAX_OPACITY),
                xs: step_multiples(state, width, step)
                    .map(|t| state.time_to_x(t))
                    .collect(),
            })
        })
        .collect()
}

/// Starting ruler step for a scale, before spacing adjustment.
pub fn base_step(scale: f64) -> f64 {
    if scale < 1e-12 {
        1e9
    } else if scale < 1e-9 {
        1e8
    } else if scale < 1e-6 {
        1e6
    } else if scale < 0.1 {
        1000.0
    } else if scale < 1.0 {
        100.0
    } else if scale < 10.0 {
        10.0
    } else if scale < 100.0 {
        1.0
    } else if scale < 1000.0 {
        MONTH
    } else if scale < 1e5 {
        1.0 / 365.0
    } else {
        1.0 / (365.0 * 24.0)
    }
}

/// Ruler step for a scale: the base step coarsened until ticks are at least
/// 80 px apart, then refined while they are more than 200 px apart.
pub fn ruler_step(scale: f64) -> f64 {
    let mut step = base_step(scale);

    for _ in 0..MAX_STEP_ITERATIONS {
        if step * scale >= RULER_MIN_SPACING_PX {
            break;
        }
        step = if approx_eq(step, MONTH) {
            1.0
        } else if step < MONTH {
            step * 2.0
        } else if approx_eq(step, 1.0) {
            5.0
        } else if approx_eq(step, 5.0) {
            10.0
        } else {
            step * 10.0
        };
    }

    for _ in 0..MAX_STEP_ITERATIONS {
        if step * scale <= RULER_MAX_SPACING_PX {
            break;
        }
        step = if approx_eq(step, 1.0) {
            MONTH
        } else if step > 1.0 {
            step / 2.0
        } else {
            step / 10.0
        };
        if step < MIN_STEP {
            break;
        }
    }

    step
}

/// Classify a tick as major.
///
/// Whole-year steps are major on multiples of five steps counted from the
/// calendar epoch; sub-year steps on multiples of four steps.
pub fn is_major_tick(time: f64, step: f64, calendar_epoch: f64) -> bool {
    if step >= 1.0 {
        (time - calendar_epoch).round() % (step * 5.0) == 0.0
    } else {
        (time % (step * 4.0)).abs() < step * 0.1
    }
}

/// Compute the ruler ticks covering the visible range.
pub fn ruler_ticks(state: &ViewportState, width: f64, calendar_epoch: f64) -> Vec<RulerTick> {
    let step = ruler_step(state.scale);
    step_multiples(state, width, step)
        .map(|time| RulerTick {
            time,
            x: state.time_to_x(time),
            major: is_major_tick(time, step, calendar_epoch),
        })
        .collect()
}
