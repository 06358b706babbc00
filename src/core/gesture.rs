//! Pointer and gesture handling.
//!
//! Translates press/move/release, wheel and pinch input into viewport
//! mutations and click selections. Input coordinates are surface-relative
//! pixels.

use super::catalog::TimelineEvent;
use super::config::TuningSettings;
use super::viewport::{Viewport, ViewportState};

/// Offsets of the rate-zoom handle inside this band do nothing.
const RATE_DEAD_ZONE_PX: f64 = 5.0;

/// Maximum travel of the rate-zoom handle from its rest position.
pub const RATE_MAX_OFFSET_PX: f64 = 60.0;

const RATE_REFERENCE_PX: f64 = 50.0;
const RATE_GAIN: f64 = 0.05;

/// Pointer state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Pointer is down but has not moved past the drag threshold
    Pressed {
        start_x: f64,
        start_origin: f64,
        last_x: f64,
    },
    /// Pointer moved; release will not select anything
    Dragging {
        start_x: f64,
        start_origin: f64,
        last_x: f64,
    },
}

/// Drives the viewport from pointer input.
#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    hit_radius_px: f64,
    wheel_sensitivity: f64,
    drag_threshold_px: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&TuningSettings::default())
    }
}

impl GestureController {
    pub fn new(tuning: &TuningSettings) -> Self {
        Self {
            state: GestureState::Idle,
            hit_radius_px: tuning.hit_radius_px,
            wheel_sensitivity: tuning.wheel_sensitivity,
            drag_threshold_px: tuning.drag_threshold_px,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Pointer down: remember where the drag started and stop any animation.
    pub fn press(&mut self, x: f64, viewport: &mut Viewport) {
        viewport.cancel_animation();
        self.state = GestureState::Pressed {
            start_x: x,
            start_origin: viewport.state().origin_time,
            last_x: x,
        };
    }

    /// Pointer moved while down.
    ///
    /// The origin is recomputed from the press position rather than
    /// accumulated, so long drags at deep zoom do not lose precision.
    pub fn move_to(&mut self, x: f64, viewport: &mut Viewport) {
        let (start_x, start_origin, last_x, dragging) = match self.state {
            GestureState::Idle => return,
            GestureState::Pressed {
                start_x,
                start_origin,
                last_x,
            } => (start_x, start_origin, last_x, false),
            GestureState::Dragging {
                start_x,
                start_origin,
                last_x,
            } => (start_x, start_origin, last_x, true),
        };

        let dragging = dragging || (x - last_x).abs() > self.drag_threshold_px;
        if dragging {
            viewport.clear_follow();
            self.state = GestureState::Dragging {
                start_x,
                start_origin,
                last_x: x,
            };
        } else {
            self.state = GestureState::Pressed {
                start_x,
                start_origin,
                last_x: x,
            };
        }

        viewport.set_origin(start_origin - (x - start_x) / viewport.state().scale);
    }

    /// Pointer up. A press that never moved selects the nearest event.
    pub fn release<'a, I>(&mut self, x: f64, viewport: &Viewport, events: I) -> Option<&'a TimelineEvent>
    where
        I: IntoIterator<Item = &'a TimelineEvent>,
    {
        let was_click = matches!(self.state, GestureState::Pressed { .. });
        self.state = GestureState::Idle;
        if !was_click {
            return None;
        }
        hit_test(events, &viewport.state(), x, self.hit_radius_px)
    }

    /// Abandon the current gesture without selecting anything.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Wheel input: immediate zoom anchored at the pointer.
    pub fn wheel(&mut self, delta_y: f64, x: f64, viewport: &mut Viewport) {
        viewport.clear_follow();
        viewport.zoom_by(1.0 - delta_y * self.wheel_sensitivity, x);
    }

    /// Pinch input: immediate zoom by the gesture's scale factor.
    pub fn pinch(&mut self, factor: f64, x: f64, viewport: &mut Viewport) {
        viewport.clear_follow();
        viewport.zoom_by(factor, x);
    }
}

/// Find the event whose start is nearest to screen `x`.
///
/// Only events closer than `hit_radius_px` (converted to time at the current
/// scale) qualify; ties keep the first event encountered.
pub fn hit_test<'a, I>(
    events: I,
    state: &ViewportState,
    x: f64,
    hit_radius_px: f64,
) -> Option<&'a TimelineEvent>
where
    I: IntoIterator<Item = &'a TimelineEvent>,
{
    let click_time = state.x_to_time(x);
    let mut best_distance = hit_radius_px / state.scale;
    let mut best = None;

    for event in events {
        let distance = (event.start_time - click_time).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Some(event);
        }
    }
    best
}

/// Zoom rate for a rate-zoom handle displaced by `offset` pixels.
///
/// Upward displacement (negative offset) zooms in. The response is quadratic
/// with a small dead zone around the rest position.
pub fn zoom_rate_for_offset(offset: f64) -> f64 {
    let offset = offset.clamp(-RATE_MAX_OFFSET_PX, RATE_MAX_OFFSET_PX);
    if offset.abs() <= RATE_DEAD_ZONE_PX {
        return 0.0;
    }
    let direction = if offset < 0.0 { 1.0 } else { -1.0 };
    direction * (offset.abs() / RATE_REFERENCE_PX).powi(2) * RATE_GAIN
}

/// A spring-loaded handle that zooms continuously while held off-center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateZoomHandle {
    offset: f64,
    active: bool,
}

impl RateZoomHandle {
    pub fn press(&mut self) {
        self.active = true;
        self.offset = 0.0;
    }

    /// Update the displacement from the handle's rest position.
    pub fn drag_to(&mut self, offset: f64) {
        if self.active && offset.is_finite() {
            self.offset = offset.clamp(-RATE_MAX_OFFSET_PX, RATE_MAX_OFFSET_PX);
        }
    }

    pub fn release(&mut self) {
        self.active = false;
        self.offset = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current zoom rate (zero when released).
    pub fn rate(&self) -> f64 {
        if self.active {
            zoom_rate_for_offset(self.offset)
        } else {
            0.0
        }
    }

    /// Apply one frame of zoom. Returns true if the viewport changed.
    pub fn apply(&self, viewport: &mut Viewport) -> bool {
        let rate = self.rate();
        if rate == 0.0 {
            return false;
        }
        viewport.clear_follow();
        viewport.zoom_by_rate(rate);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::test_event;
    use crate::core::viewport::MIN_SCALE;

    fn viewport(origin: f64, scale: f64) -> Viewport {
        Viewport::new(ViewportState::new(origin, scale), 1000.0)
    }

    #[test]
    fn test_drag_scenario() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(1000.0, 0.5);

        gestures.press(100.0, &mut vp);
        gestures.move_to(80.0, &mut vp);

        assert!(gestures.is_dragging());
        assert_eq!(vp.state().origin_time, 1040.0);
    }

    #[test]
    fn test_drag_is_absolute_not_accumulated() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 3.0);

        gestures.press(500.0, &mut vp);
        for x in (200..500).rev() {
            gestures.move_to(x as f64, &mut vp);
        }
        assert_eq!(vp.state().origin_time, 0.0 - (200.0 - 500.0) / 3.0);
    }

    #[test]
    fn test_small_move_stays_a_click() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        let events = vec![test_event("a", 1000.0, 5)];

        gestures.press(1000.0, &mut vp);
        gestures.move_to(1000.5, &mut vp);
        assert!(matches!(gestures.state(), GestureState::Pressed { .. }));

        let hit = gestures.release(1000.5, &vp, &events);
        assert_eq!(hit.map(|e| e.id.as_str()), Some("a"));
        assert_eq!(gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_moved_flag_sticks_until_release() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        let events = vec![test_event("a", 1000.0, 5)];

        gestures.press(1000.0, &mut vp);
        gestures.move_to(1010.0, &mut vp);
        gestures.move_to(1000.0, &mut vp);

        assert!(gestures.release(1000.0, &vp, &events).is_none());
    }

    #[test]
    fn test_press_cancels_animation() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        vp.animate_to(1e6, 1.0, 800.0, 0.0);

        gestures.press(10.0, &mut vp);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_drag_clears_follow_mode() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        vp.focus_on_range(0.0, 100.0, 0.0);
        assert!(vp.follow_range().is_some());

        gestures.press(10.0, &mut vp);
        gestures.move_to(50.0, &mut vp);
        assert!(vp.follow_range().is_none());
    }

    #[test]
    fn test_hit_radius() {
        let state = ViewportState::new(0.0, 1.0);
        let events = vec![test_event("a", 1000.0, 5)];

        assert!(hit_test(&events, &state, 1050.0, 60.0).is_some());
        assert!(hit_test(&events, &state, 1100.0, 60.0).is_none());
        // Exactly on the radius is a miss
        assert!(hit_test(&events, &state, 1060.0, 60.0).is_none());
    }

    #[test]
    fn test_hit_test_picks_nearest() {
        let state = ViewportState::new(0.0, 2.0);
        let events = vec![
            test_event("a", 100.0, 5),
            test_event("b", 110.0, 5),
            test_event("c", 125.0, 5),
        ];

        // x = 232 -> t = 116
        let hit = hit_test(&events, &state, 232.0, 60.0);
        assert_eq!(hit.map(|e| e.id.as_str()), Some("b"));
    }

    #[test]
    fn test_hit_radius_scales_with_zoom() {
        let events = vec![test_event("a", 1e9, 5)];
        let state = ViewportState::new(0.0, 1e-7);
        // 50 px away at 1e-7 px/yr is 5e8 years, still within 60 px
        assert!(hit_test(&events, &state, 150.0, 60.0).is_some());
    }

    #[test]
    fn test_wheel_zooms_at_pointer() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        vp.focus_on_range(0.0, 100.0, 0.0);

        let anchor_time = vp.state().x_to_time(300.0);
        gestures.wheel(-100.0, 300.0, &mut vp);

        assert!(!vp.is_animating());
        assert!(vp.follow_range().is_none());
        assert!((vp.state().x_to_time(300.0) - anchor_time).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_press_selects_nothing() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        let events = [test_event("a", 500.0, 5)];

        gestures.press(500.0, &mut vp);
        gestures.cancel();
        assert_eq!(gestures.state(), GestureState::Idle);

        assert!(gestures.release(500.0, &vp, events.iter()).is_none());
        gestures.move_to(600.0, &mut vp);
        assert_eq!(vp.state().origin_time, 0.0);
    }

    #[test]
    fn test_large_wheel_delta_zooms_out_fully() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        assert!(vp.animate_to(1e6, 5.0, 800.0, 0.0).is_some());

        gestures.wheel(1500.0, 500.0, &mut vp);

        assert!(!vp.is_animating());
        assert_eq!(vp.state().scale, MIN_SCALE);
    }

    #[test]
    fn test_wheel_direction() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        gestures.wheel(-100.0, 500.0, &mut vp);
        assert!((vp.state().scale - 1.1).abs() < 1e-12);
        gestures.wheel(200.0, 500.0, &mut vp);
        assert!((vp.state().scale - 1.1 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_pinch() {
        let mut gestures = GestureController::default();
        let mut vp = viewport(0.0, 1.0);
        gestures.pinch(2.0, 500.0, &mut vp);
        assert_eq!(vp.state().origin_time, 250.0);
        assert_eq!(vp.state().scale, 2.0);
    }

    #[test]
    fn test_zoom_rate_for_offset() {
        assert_eq!(zoom_rate_for_offset(0.0), 0.0);
        assert_eq!(zoom_rate_for_offset(5.0), 0.0);
        assert_eq!(zoom_rate_for_offset(-5.0), 0.0);
        assert!((zoom_rate_for_offset(-50.0) - 0.05).abs() < 1e-12);
        assert!((zoom_rate_for_offset(50.0) + 0.05).abs() < 1e-12);
        // Clamped to the handle travel
        assert_eq!(zoom_rate_for_offset(-500.0), zoom_rate_for_offset(-60.0));
    }

    #[test]
    fn test_rate_zoom_handle() {
        let mut handle = RateZoomHandle::default();
        let mut vp = viewport(0.0, 1.0);

        handle.drag_to(-50.0);
        assert_eq!(handle.rate(), 0.0);

        handle.press();
        handle.drag_to(-200.0);
        assert_eq!(handle.offset(), -RATE_MAX_OFFSET_PX);
        assert!(handle.apply(&mut vp));
        assert!(vp.state().scale > 1.0);
        assert!((vp.center_time() - 500.0).abs() < 1e-9);

        handle.release();
        assert!(!handle.apply(&mut vp));
    }
}
