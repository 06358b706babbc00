//! Viewport model for the zoomable timeline.
//!
//! This module owns the `{origin_time, scale}` state, the coordinate transforms
//! between time and screen pixels, and the cancellable animated transition used
//! by every programmatic navigation request.

use std::fmt;

use super::catalog::TimelineEvent;

/// Smallest allowed scale in pixels per year (whole universe fits easily).
pub const MIN_SCALE: f64 = 1e-12;

/// Largest allowed scale in pixels per year (minutes are visible).
pub const MAX_SCALE: f64 = 1e7;

/// Scale of a freshly opened viewport.
pub const INITIAL_SCALE: f64 = 0.05;

/// Years before the calendar epoch shown at the left edge on startup.
pub const INITIAL_LEAD_YEARS: f64 = 2000.0;

/// Default duration of animated transitions.
pub const DEFAULT_ANIMATION_MS: f64 = 800.0;

/// Focusing an event below this scale zooms in to `EVENT_FOCUS_SCALE`.
pub const EVENT_FOCUS_MIN_SCALE: f64 = 0.1;

/// Scale used when focusing an event from a very wide view.
pub const EVENT_FOCUS_SCALE: f64 = 0.5;

/// Fraction of a framed range added as padding on each side.
pub const RANGE_PADDING: f64 = 0.1;

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`.
///
/// NaN and non-positive values map to `MIN_SCALE`; positive infinity maps to
/// `MAX_SCALE`. The function is idempotent.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() || scale <= 0.0 {
        MIN_SCALE
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

/// The mapping between time and screen x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Time at screen x = 0, in years from the Big Bang
    pub origin_time: f64,
    /// Pixels per year
    pub scale: f64,
}

impl ViewportState {
    /// Create a state, clamping the scale.
    pub fn new(origin_time: f64, scale: f64) -> Self {
        Self {
            origin_time,
            scale: clamp_scale(scale),
        }
    }

    /// Startup state: a couple of millennia before the calendar epoch.
    pub fn initial(calendar_epoch: f64) -> Self {
        Self::new(calendar_epoch - INITIAL_LEAD_YEARS, INITIAL_SCALE)
    }

    /// State that puts `time` at the center of a surface `width` pixels wide.
    pub fn centered_on(time: f64, scale: f64, width: f64) -> Self {
        let scale = clamp_scale(scale);
        Self {
            origin_time: time - width / 2.0 / scale,
            scale,
        }
    }

    /// Screen x of a time value.
    #[inline]
    pub fn time_to_x(&self, time: f64) -> f64 {
        (time - self.origin_time) * self.scale
    }

    /// Time value under a screen x.
    #[inline]
    pub fn x_to_time(&self, x: f64) -> f64 {
        x / self.scale + self.origin_time
    }

    /// Time at the horizontal center of a surface `width` pixels wide.
    #[inline]
    pub fn center_time(&self, width: f64) -> f64 {
        self.x_to_time(width / 2.0)
    }

    /// Number of years visible across `width` pixels.
    #[inline]
    pub fn visible_range(&self, width: f64) -> f64 {
        width / self.scale
    }
}

/// Preset zoom levels reachable with one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastScale {
    Millennium,
    Year,
    Month,
    Day,
}

impl FastScale {
    /// All presets, widest first.
    pub const ALL: [FastScale; 4] = [Self::Millennium, Self::Year, Self::Month, Self::Day];

    /// Visible span the preset frames, in years.
    pub fn span_years(self) -> f64 {
        match self {
            Self::Millennium => 1000.0,
            Self::Year => 1.0,
            Self::Month => 1.0 / 12.0,
            Self::Day => 1.0 / 365.0,
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Millennium => "1000Y",
            Self::Year => "1Y",
            Self::Month => "1M",
            Self::Day => "1D",
        }
    }
}

/// Handle for stepping the running animation.
///
/// Only the ticket from the most recent `animate_to` advances anything; older
/// tickets are silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// Snapshot passed to change listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportChange {
    pub state: ViewportState,
    pub width: f64,
}

/// Callback fired after every viewport mutation.
pub type ChangeListener = Box<dyn FnMut(&ViewportChange)>;

#[derive(Debug, Clone, Copy)]
struct Animation {
    start_center: f64,
    start_scale: f64,
    target_center: f64,
    target_scale: f64,
    start_ms: f64,
    duration_ms: f64,
    generation: u64,
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Viewport state plus its animation, follow mode and observers.
pub struct Viewport {
    state: ViewportState,
    width: f64,
    animation: Option<Animation>,
    generation: u64,
    follow_range: Option<(f64, f64)>,
    animation_duration_ms: f64,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("state", &self.state)
            .field("width", &self.width)
            .field("animation", &self.animation)
            .field("follow_range", &self.follow_range)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Viewport {
    /// Create a viewport with the given state on a surface `width` pixels wide.
    pub fn new(state: ViewportState, width: f64) -> Self {
        Self {
            state: ViewportState::new(state.origin_time, state.scale),
            width: sanitize_width(width),
            animation: None,
            generation: 0,
            follow_range: None,
            animation_duration_ms: DEFAULT_ANIMATION_MS,
            listeners: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Width of the surface in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Time at the center of the surface.
    pub fn center_time(&self) -> f64 {
        self.state.center_time(self.width)
    }

    /// Years visible across the surface.
    pub fn visible_range(&self) -> f64 {
        self.state.visible_range(self.width)
    }

    /// Whether an animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// The range being kept in frame, if follow mode is active.
    pub fn follow_range(&self) -> Option<(f64, f64)> {
        self.follow_range
    }

    /// Duration used by the focus helpers.
    pub fn set_animation_duration(&mut self, duration_ms: f64) {
        self.animation_duration_ms = duration_ms.max(0.0);
    }

    /// Register an observer fired after every mutation.
    pub fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self) {
        let change = ViewportChange {
            state: self.state,
            width: self.width,
        };
        log::trace!(
            "Viewport changed: origin={} scale={}",
            change.state.origin_time,
            change.state.scale
        );
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    /// Stop the running animation, keeping the last interpolated state.
    pub fn cancel_animation(&mut self) {
        if self.animation.take().is_some() {
            log::debug!("Animation cancelled");
        }
    }

    /// Turn off follow mode.
    pub fn clear_follow(&mut self) {
        if self.follow_range.take().is_some() {
            log::debug!("Follow mode off");
        }
    }

    /// Center `time` at `scale` without animating.
    pub fn set_immediate(&mut self, time: f64, scale: f64) {
        if !time.is_finite() {
            return;
        }
        self.cancel_animation();
        self.state = ViewportState::centered_on(time, scale, self.width);
        self.notify();
    }

    /// Set the origin directly, keeping the scale.
    pub fn set_origin(&mut self, origin_time: f64) {
        if !origin_time.is_finite() {
            return;
        }
        self.cancel_animation();
        self.state.origin_time = origin_time;
        self.notify();
    }

    /// Start an animated transition that centers `center_time` at `scale`.
    ///
    /// Returns `None` when the target is not finite or the transition
    /// completes instantly (zero duration).
    pub fn animate_to(
        &mut self,
        center_time: f64,
        scale: f64,
        duration_ms: f64,
        now_ms: f64,
    ) -> Option<FrameTicket> {
        if !center_time.is_finite() {
            return None;
        }
        self.cancel_animation();

        let target_scale = clamp_scale(scale);
        if !(duration_ms > 0.0) {
            self.state = ViewportState::centered_on(center_time, target_scale, self.width);
            self.notify();
            return None;
        }

        self.generation += 1;
        self.animation = Some(Animation {
            start_center: self.center_time(),
            start_scale: self.state.scale,
            target_center: center_time,
            target_scale,
            start_ms: now_ms,
            duration_ms,
            generation: self.generation,
        });
        log::debug!(
            "Animating to center={} scale={} over {}ms",
            center_time,
            target_scale,
            duration_ms
        );
        Some(FrameTicket {
            generation: self.generation,
        })
    }

    /// Advance the animation to `now_ms`.
    ///
    /// Returns the ticket for the next frame while the animation is running.
    pub fn run_frame(&mut self, ticket: FrameTicket, now_ms: f64) -> Option<FrameTicket> {
        let anim = self.animation?;
        if anim.generation != ticket.generation {
            return None;
        }

        let t = ((now_ms - anim.start_ms) / anim.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.animation = None;
            self.state =
                ViewportState::centered_on(anim.target_center, anim.target_scale, self.width);
            log::debug!("Animation finished");
            self.notify();
            return None;
        }

        let ease = ease_out_cubic(t);
        let log_scale =
            anim.start_scale.ln() + (anim.target_scale.ln() - anim.start_scale.ln()) * ease;
        let center = anim.start_center + (anim.target_center - anim.start_center) * ease;
        self.state = ViewportState::centered_on(center, log_scale.exp(), self.width);
        self.notify();
        Some(ticket)
    }

    /// Pan by a pixel delta; positive drags the content to the right.
    pub fn pan_by(&mut self, delta_px: f64) {
        if !delta_px.is_finite() {
            return;
        }
        self.cancel_animation();
        self.state.origin_time -= delta_px / self.state.scale;
        self.notify();
    }

    /// Zoom by `factor`, keeping the time under `anchor_x` fixed on screen.
    ///
    /// The resulting scale is clamped, so a non-positive factor zooms all the
    /// way out.
    pub fn zoom_by(&mut self, factor: f64, anchor_x: f64) {
        if !(factor.is_finite() && anchor_x.is_finite()) {
            return;
        }
        self.cancel_animation();
        let anchor_time = self.state.x_to_time(anchor_x);
        let new_scale = clamp_scale(self.state.scale * factor);
        self.state = ViewportState {
            origin_time: anchor_time - anchor_x / new_scale,
            scale: new_scale,
        };
        self.notify();
    }

    /// Zoom by `1 + delta` around the center of the surface.
    pub fn zoom_by_rate(&mut self, delta: f64) {
        self.zoom_by(1.0 + delta, self.width / 2.0);
    }

    /// Center a time, either instantly or with the default animation.
    ///
    /// Does nothing for a missing or non-finite time.
    pub fn focus_on_time(
        &mut self,
        time: Option<f64>,
        scale: f64,
        animated: bool,
        now_ms: f64,
    ) -> Option<FrameTicket> {
        let time = time.filter(|t| t.is_finite())?;
        if animated {
            self.animate_to(time, scale, self.animation_duration_ms, now_ms)
        } else {
            self.set_immediate(time, scale);
            None
        }
    }

    /// Animate to an event, zooming in if the view is very wide.
    pub fn focus_on_event(&mut self, event: &TimelineEvent, now_ms: f64) -> Option<FrameTicket> {
        let scale = if self.state.scale < EVENT_FOCUS_MIN_SCALE {
            EVENT_FOCUS_SCALE
        } else {
            self.state.scale
        };
        self.animate_to(event.start_time, scale, self.animation_duration_ms, now_ms)
    }

    /// Animate to a preset span around the current center.
    pub fn fast_scale(&mut self, preset: FastScale, now_ms: f64) -> Option<FrameTicket> {
        let scale = self.width / preset.span_years();
        self.animate_to(
            self.center_time(),
            scale,
            self.animation_duration_ms,
            now_ms,
        )
    }

    /// Frame a time range and keep it framed while the surface resizes.
    pub fn focus_on_range(&mut self, start: f64, end: f64, now_ms: f64) -> Option<FrameTicket> {
        if !(start.is_finite() && end.is_finite()) {
            return None;
        }
        let range = (start.min(end), start.max(end));
        let (center, scale) = self.range_target(range);
        let ticket = self.animate_to(center, scale, self.animation_duration_ms, now_ms);
        self.follow_range = Some(range);
        log::debug!("Follow mode on: {} to {}", range.0, range.1);
        ticket
    }

    fn range_target(&self, (start, end): (f64, f64)) -> (f64, f64) {
        let span = end - start;
        let center = start + span / 2.0;
        if span <= 0.0 {
            return (center, self.state.scale);
        }
        (center, self.width / (span * (1.0 + 2.0 * RANGE_PADDING)))
    }

    /// Update the surface width.
    ///
    /// The center time is preserved, or the followed range is refitted when
    /// follow mode is active.
    pub fn set_width(&mut self, width: f64) {
        let width = sanitize_width(width);
        if width == self.width {
            return;
        }
        let center = self.center_time();
        self.width = width;

        if let Some(range) = self.follow_range {
            self.cancel_animation();
            let (center, scale) = self.range_target(range);
            self.state = ViewportState::centered_on(center, scale, self.width);
        } else if self.animation.is_none() {
            self.state = ViewportState::centered_on(center, self.state.scale, self.width);
        }
        self.notify();
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::test_event;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
    }

    fn viewport(origin: f64, scale: f64, width: f64) -> Viewport {
        Viewport::new(ViewportState::new(origin, scale), width)
    }

    #[test]
    fn test_clamp_scale() {
        assert_eq!(clamp_scale(1.0), 1.0);
        assert_eq!(clamp_scale(1e-20), MIN_SCALE);
        assert_eq!(clamp_scale(1e20), MAX_SCALE);
        assert_eq!(clamp_scale(0.0), MIN_SCALE);
        assert_eq!(clamp_scale(-5.0), MIN_SCALE);
        assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
        assert_eq!(clamp_scale(f64::INFINITY), MAX_SCALE);
        assert_eq!(clamp_scale(f64::NEG_INFINITY), MIN_SCALE);
    }

    #[test]
    fn test_clamp_scale_idempotent() {
        for s in [1e-30, 1e-12, 3.5e-4, 1.0, 42.0, 1e7, 1e12, f64::NAN, -1.0] {
            let once = clamp_scale(s);
            assert_eq!(clamp_scale(once), once);
        }
    }

    #[test]
    fn test_time_x_round_trip() {
        let state = ViewportState::new(1000.0, 0.25);
        assert_eq!(state.time_to_x(1400.0), 100.0);
        assert_eq!(state.x_to_time(100.0), 1400.0);
        assert_eq!(state.center_time(800.0), 2600.0);
        assert_eq!(state.visible_range(800.0), 3200.0);
    }

    #[test]
    fn test_initial_state() {
        let state = ViewportState::initial(13.8e9);
        assert_eq!(state.origin_time, 13.8e9 - 2000.0);
        assert_eq!(state.scale, INITIAL_SCALE);
    }

    #[test]
    fn test_zoom_scenario() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        vp.zoom_by(2.0, 500.0);
        assert_eq!(vp.state().origin_time, 250.0);
        assert_eq!(vp.state().scale, 2.0);
    }

    #[test]
    fn test_zoom_anchor_invariant() {
        let origins = [-5e9, 0.0, 13.8e9 - 2000.0];
        let scales = [1e-11, 3e-5, 0.05, 7.0, 2e6];
        let factors = [0.01, 0.5, 1.1, 3.0, 1e3];
        let anchors = [0.0, 123.0, 640.0, 1279.0];

        for &origin in &origins {
            for &scale in &scales {
                for &factor in &factors {
                    for &anchor in &anchors {
                        let mut vp = viewport(origin, scale, 1280.0);
                        let before = vp.state().x_to_time(anchor);
                        vp.zoom_by(factor, anchor);
                        let after = vp.state().x_to_time(anchor);
                        let tolerance = 1e-9 * before.abs().max(1.0) + 1e-9 / vp.state().scale;
                        assert!(
                            (after - before).abs() <= tolerance,
                            "anchor drift at origin={} scale={} factor={} anchor={}",
                            origin,
                            scale,
                            factor,
                            anchor
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_zoom_respects_bounds() {
        let mut vp = viewport(0.0, MAX_SCALE, 1000.0);
        vp.zoom_by(10.0, 500.0);
        assert_eq!(vp.state().scale, MAX_SCALE);

        let mut vp = viewport(0.0, MIN_SCALE, 1000.0);
        vp.zoom_by(0.1, 500.0);
        assert_eq!(vp.state().scale, MIN_SCALE);
    }

    #[test]
    fn test_zoom_rejects_non_finite_input() {
        let mut vp = viewport(10.0, 1.0, 1000.0);
        vp.zoom_by(f64::NAN, 500.0);
        vp.zoom_by(f64::INFINITY, 500.0);
        vp.zoom_by(2.0, f64::NAN);
        assert_eq!(vp.state(), ViewportState::new(10.0, 1.0));
    }

    #[test]
    fn test_zoom_non_positive_factor_clamps_to_min() {
        for factor in [0.0, -2.0] {
            let mut vp = viewport(10.0, 1.0, 1000.0);
            let ticket = vp.animate_to(1e6, 5.0, 800.0, 0.0);
            assert!(ticket.is_some());

            vp.zoom_by(factor, 500.0);

            assert!(!vp.is_animating());
            assert_eq!(vp.state().scale, MIN_SCALE);
        }
    }

    #[test]
    fn test_zoom_by_rate_anchors_center() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        vp.zoom_by_rate(0.05);
        assert!(approx_eq(vp.center_time(), 500.0, 1e-12));
        assert!(approx_eq(vp.state().scale, 1.05, 1e-12));
    }

    #[test]
    fn test_pan_by() {
        let mut vp = viewport(100.0, 0.5, 1000.0);
        vp.pan_by(40.0);
        assert_eq!(vp.state().origin_time, 20.0);
        vp.pan_by(f64::INFINITY);
        assert_eq!(vp.state().origin_time, 20.0);
    }

    #[test]
    fn test_set_immediate_centers_time() {
        let mut vp = viewport(0.0, 1.0, 800.0);
        vp.set_immediate(5000.0, 2.0);
        assert_eq!(vp.center_time(), 5000.0);
        assert_eq!(vp.state().scale, 2.0);

        vp.set_immediate(f64::NAN, 4.0);
        assert_eq!(vp.state().scale, 2.0);

        vp.set_immediate(5000.0, 1e20);
        assert_eq!(vp.state().scale, MAX_SCALE);
        assert_eq!(vp.state().scale, clamp_scale(vp.state().scale));

        vp.set_immediate(5000.0, 1e-30);
        assert_eq!(vp.state().scale, MIN_SCALE);
        assert_eq!(vp.state().scale, clamp_scale(vp.state().scale));
    }

    #[test]
    fn test_animation_converges_exactly() {
        let mut vp = viewport(0.0, 1e-9, 1000.0);
        let mut ticket = vp.animate_to(13.8e9, 0.5, 800.0, 0.0);
        let mut now = 0.0;
        let mut frames = 0;
        while let Some(t) = ticket {
            now += 16.0;
            ticket = vp.run_frame(t, now);
            frames += 1;
            assert!(frames < 100, "animation did not terminate");
        }

        assert!(!vp.is_animating());
        assert_eq!(
            vp.state(),
            ViewportState::centered_on(13.8e9, 0.5, 1000.0)
        );
    }

    #[test]
    fn test_animation_scale_is_log_interpolated() {
        let mut vp = viewport(0.0, 1e-6, 1000.0);
        let ticket = vp.animate_to(0.0, 1e2, 1000.0, 0.0).unwrap();

        // Halfway in eased time, scale is the geometric mean
        let t = 1.0 - 0.5f64.cbrt();
        vp.run_frame(ticket, t * 1000.0);
        assert!(approx_eq(vp.state().scale, 1e-2, 1e-9));
    }

    #[test]
    fn test_animation_monotonic_scale() {
        let mut vp = viewport(0.0, 1e-3, 1000.0);
        let mut ticket = vp.animate_to(5e5, 10.0, 800.0, 0.0);
        let mut previous = vp.state().scale;
        let mut now = 0.0;
        while let Some(t) = ticket {
            now += 10.0;
            ticket = vp.run_frame(t, now);
            assert!(vp.state().scale >= previous);
            previous = vp.state().scale;
        }
    }

    #[test]
    fn test_stale_ticket_is_noop() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        let old = vp.animate_to(1e6, 1.0, 800.0, 0.0).unwrap();
        let new = vp.animate_to(-1e6, 1.0, 800.0, 0.0).unwrap();

        let before = vp.state();
        assert!(vp.run_frame(old, 400.0).is_none());
        assert_eq!(vp.state(), before);

        assert!(vp.run_frame(new, 400.0).is_some());
        assert!(vp.center_time() < 0.0);
    }

    #[test]
    fn test_cancel_keeps_interpolated_state() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        let ticket = vp.animate_to(10_000.0, 1.0, 800.0, 0.0).unwrap();
        vp.run_frame(ticket, 400.0);
        let mid = vp.state();

        vp.cancel_animation();
        assert!(!vp.is_animating());
        assert_eq!(vp.state(), mid);
        assert!(vp.run_frame(ticket, 800.0).is_none());
        assert_eq!(vp.state(), mid);
    }

    #[test]
    fn test_pan_cancels_animation() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        let ticket = vp.animate_to(10_000.0, 1.0, 800.0, 0.0).unwrap();
        vp.pan_by(10.0);
        assert!(!vp.is_animating());
        assert!(vp.run_frame(ticket, 100.0).is_none());
    }

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        assert!(vp.animate_to(700.0, 3.0, 0.0, 0.0).is_none());
        assert_eq!(vp.center_time(), 700.0);
        assert_eq!(vp.state().scale, 3.0);
    }

    #[test]
    fn test_focus_on_time_none_is_noop() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        assert!(vp.focus_on_time(None, 5.0, true, 0.0).is_none());
        assert!(vp.focus_on_time(Some(f64::NAN), 5.0, false, 0.0).is_none());
        assert_eq!(vp.state(), ViewportState::new(0.0, 1.0));

        vp.focus_on_time(Some(42.0), 5.0, false, 0.0);
        assert_eq!(vp.center_time(), 42.0);
    }

    #[test]
    fn test_focus_on_event_zooms_in_from_wide_view() {
        let event = test_event("a", 9.3e9, 9);

        let mut vp = viewport(0.0, 1e-8, 1000.0);
        let mut ticket = vp.focus_on_event(&event, 0.0);
        while let Some(t) = ticket {
            ticket = vp.run_frame(t, 1000.0);
        }
        assert_eq!(vp.state().scale, EVENT_FOCUS_SCALE);
        assert!(approx_eq(vp.center_time(), 9.3e9, 1e-12));

        // Already close enough: scale is kept
        let mut vp = viewport(0.0, 3.0, 1000.0);
        let ticket = vp.focus_on_event(&event, 0.0).unwrap();
        vp.run_frame(ticket, 1000.0);
        assert_eq!(vp.state().scale, 3.0);
    }

    #[test]
    fn test_fast_scale_presets() {
        let mut vp = viewport(0.0, 1e-3, 1200.0);
        let center = vp.center_time();
        let ticket = vp.fast_scale(FastScale::Year, 0.0).unwrap();
        vp.run_frame(ticket, 800.0);
        assert_eq!(vp.state().scale, 1200.0);
        assert!(approx_eq(vp.center_time(), center, 1e-12));
        assert!(approx_eq(vp.visible_range(), 1.0, 1e-12));

        assert_eq!(FastScale::Day.span_years(), 1.0 / 365.0);
    }

    #[test]
    fn test_focus_on_range_and_follow() {
        let mut vp = viewport(0.0, 1.0, 1000.0);
        let ticket = vp.focus_on_range(2000.0, 1000.0, 0.0).unwrap();
        vp.run_frame(ticket, 800.0);

        assert_eq!(vp.follow_range(), Some((1000.0, 2000.0)));
        assert!(approx_eq(vp.center_time(), 1500.0, 1e-12));
        assert!(approx_eq(vp.visible_range(), 1200.0, 1e-12));

        // Resizing refits the range
        vp.set_width(500.0);
        assert!(approx_eq(vp.center_time(), 1500.0, 1e-12));
        assert!(approx_eq(vp.visible_range(), 1200.0, 1e-12));

        vp.clear_follow();
        vp.set_width(1000.0);
        assert!(approx_eq(vp.visible_range(), 2400.0, 1e-12));
    }

    #[test]
    fn test_set_width_keeps_center() {
        let mut vp = viewport(0.0, 2.0, 1000.0);
        vp.set_width(600.0);
        assert_eq!(vp.center_time(), 250.0);
        assert_eq!(vp.state().scale, 2.0);
    }

    #[test]
    fn test_listeners_observe_every_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut vp = viewport(0.0, 1.0, 1000.0);
        vp.on_change(Box::new(move |change: &ViewportChange| {
            sink.borrow_mut().push(change.state.scale)
        }));

        vp.pan_by(5.0);
        vp.zoom_by(2.0, 0.0);
        let ticket = vp.animate_to(0.0, 4.0, 800.0, 0.0).unwrap();
        vp.run_frame(ticket, 800.0);
        vp.set_width(500.0);

        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 4.0, 4.0]);
    }
}
