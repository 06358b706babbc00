//! Density-aware event marker placement.
//!
//! Decides which events get a marker at the current zoom. Events below an
//! importance threshold that depends on the scale are hidden, and markers that
//! would crowd an already placed marker are suppressed. The selected event is
//! exempt from both rules.

use super::catalog::TimelineEvent;
use super::config::TuningSettings;
use super::viewport::ViewportState;

/// Size and offset constants for drawing one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGeometry {
    pub stem_height: f64,
    pub stem_width: f64,
    pub marker_radius: f64,
    pub icon_offset: f64,
    pub icon_size: f64,
    pub title_offset: f64,
    pub title_size: f64,
}

/// Geometry of an unselected marker.
pub const NORMAL_GEOMETRY: MarkerGeometry = MarkerGeometry {
    stem_height: 60.0,
    stem_width: 2.0,
    marker_radius: 5.0,
    icon_offset: 90.0,
    icon_size: 20.0,
    title_offset: 68.0,
    title_size: 12.0,
};

/// Geometry of the selected marker.
pub const SELECTED_GEOMETRY: MarkerGeometry = MarkerGeometry {
    stem_height: 120.0,
    stem_width: 4.0,
    marker_radius: 8.0,
    icon_offset: 150.0,
    icon_size: 32.0,
    title_offset: 125.0,
    title_size: 14.0,
};

/// Half-height of the translucent band drawn behind range events.
pub const RANGE_BAND_HALF_HEIGHT: f64 = 12.0;

/// Alpha of the range band fill and border.
pub const RANGE_FILL_ALPHA: u8 = 0x08;
pub const RANGE_BORDER_ALPHA: u8 = 0x20;

/// An event that survived placement, with its screen positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEvent<'a> {
    pub event: &'a TimelineEvent,
    pub start_x: f64,
    /// Screen x of the range end, for range events
    pub end_x: Option<f64>,
    pub selected: bool,
}

impl PlacedEvent<'_> {
    pub fn geometry(&self) -> &'static MarkerGeometry {
        if self.selected {
            &SELECTED_GEOMETRY
        } else {
            &NORMAL_GEOMETRY
        }
    }
}

/// Minimum importance an unselected event needs at `scale`.
///
/// Zooming in by one decade lowers the threshold by `threshold_slope`; the
/// result never drops below 1.
pub fn importance_threshold(scale: f64, tuning: &TuningSettings) -> f64 {
    let raw = tuning.threshold_base
        - (scale.log10() + tuning.threshold_offset) * tuning.threshold_slope;
    raw.max(1.0)
}

/// Select and position the markers to draw.
///
/// The result is in draw order: ascending importance with the selected event
/// last. Collision suppression visits candidates in the reverse order so the
/// selected and more important events claim their space first.
pub fn place_events<'a, I>(
    events: I,
    state: &ViewportState,
    width: f64,
    selected_id: Option<&str>,
    tuning: &TuningSettings,
) -> Vec<PlacedEvent<'a>>
where
    I: IntoIterator<Item = &'a TimelineEvent>,
{
    let is_selected = |event: &TimelineEvent| selected_id == Some(event.id.as_str());

    let mut ordered: Vec<&'a TimelineEvent> = events.into_iter().collect();
    ordered.sort_by_key(|event| (is_selected(event), event.importance));

    let threshold = importance_threshold(state.scale, tuning);
    let min_x = -tuning.cull_margin_px;
    let max_x = width + tuning.cull_margin_px;

    let mut placed_xs: Vec<f64> = Vec::new();
    let mut placed: Vec<Option<PlacedEvent<'a>>> = vec![None; ordered.len()];

    for (slot, &event) in placed.iter_mut().zip(ordered.iter()).rev() {
        let start_x = state.time_to_x(event.start_time);
        let end_x = event.range_end().map(|end| state.time_to_x(end));
        let (lo, hi) = match end_x {
            Some(end_x) => (start_x.min(end_x), start_x.max(end_x)),
            None => (start_x, start_x),
        };
        if hi < min_x || lo > max_x {
            continue;
        }

        let selected = is_selected(event);
        if !selected {
            if f64::from(event.importance) < threshold {
                continue;
            }
            if placed_xs
                .iter()
                .any(|x| (x - start_x).abs() < tuning.collision_distance_px)
            {
                continue;
            }
        }

        placed_xs.push(start_x);
        *slot = Some(PlacedEvent {
            event,
            start_x,
            end_x,
            selected,
        });
    }

    placed.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::test_event;

    fn ids(placed: &[PlacedEvent<'_>]) -> Vec<String> {
        placed.iter().map(|p| p.event.id.clone()).collect()
    }

    #[test]
    fn test_importance_threshold_values() {
        let tuning = TuningSettings::default();
        assert!((importance_threshold(1e-8, &tuning) - 9.0).abs() < 1e-9);
        assert!((importance_threshold(1e-12, &tuning) - 15.0).abs() < 1e-9);
        assert_eq!(importance_threshold(1.0, &tuning), 1.0);
        assert_eq!(importance_threshold(1e7, &tuning), 1.0);
    }

    #[test]
    fn test_importance_threshold_monotonic() {
        let tuning = TuningSettings::default();
        let mut previous = f64::INFINITY;
        let mut scale = 1e-12;
        while scale <= 1e7 {
            let threshold = importance_threshold(scale, &tuning);
            assert!(threshold <= previous);
            assert!(threshold >= 1.0);
            previous = threshold;
            scale *= 3.0;
        }
    }

    #[test]
    fn test_threshold_hides_minor_events() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1e-8);
        let events = vec![test_event("minor", 1e10, 8), test_event("major", 5e10, 10)];

        let placed = place_events(&events, &state, 1000.0, None, &tuning);
        assert_eq!(ids(&placed), vec!["major"]);
    }

    #[test]
    fn test_collision_favours_higher_importance() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1.0);
        let events = vec![
            test_event("low", 100.0, 5),
            test_event("high", 150.0, 8),
            test_event("far", 600.0, 3),
        ];

        let placed = place_events(&events, &state, 1000.0, None, &tuning);
        assert_eq!(ids(&placed), vec!["far", "high"]);
    }

    #[test]
    fn test_selected_is_always_placed_and_drawn_last() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1e-8);
        let events = vec![
            test_event("big", 1e10, 10),
            test_event("tiny", 1e10 + 1e8, 1),
        ];

        let placed = place_events(&events, &state, 1000.0, Some("tiny"), &tuning);
        assert_eq!(ids(&placed), vec!["tiny"]);
        assert!(placed[0].selected);
        assert_eq!(placed[0].geometry(), &SELECTED_GEOMETRY);

        // Selected event wins the collision, not the more important one
        let state = ViewportState::new(0.0, 1.0);
        let events = vec![test_event("big", 100.0, 10), test_event("tiny", 120.0, 1)];
        let placed = place_events(&events, &state, 1000.0, Some("tiny"), &tuning);
        assert_eq!(ids(&placed), vec!["tiny"]);
    }

    #[test]
    fn test_draw_order_is_ascending_importance() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1.0);
        let events = vec![
            test_event("c", 500.0, 9),
            test_event("a", 100.0, 2),
            test_event("s", 900.0, 1),
            test_event("b", 300.0, 5),
        ];

        let placed = place_events(&events, &state, 1000.0, Some("s"), &tuning);
        assert_eq!(ids(&placed), vec!["a", "b", "c", "s"]);
        assert_eq!(placed[0].geometry(), &NORMAL_GEOMETRY);
    }

    #[test]
    fn test_cull_margin() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1.0);

        let mut spanning = test_event("range", -2000.0, 5);
        spanning.end_time = Some(100.0);
        let mut reversed = test_event("reversed", 1700.0, 5);
        reversed.end_time = Some(900.0);
        let events = vec![
            test_event("left", -600.0, 5),
            test_event("edge", -450.0, 5),
            test_event("right", 1501.0, 5),
            spanning,
            reversed,
        ];

        let placed = place_events(&events, &state, 1000.0, None, &tuning);
        let mut placed_ids = ids(&placed);
        placed_ids.sort();
        assert_eq!(placed_ids, vec!["edge", "range", "reversed"]);

        let range = placed.iter().find(|p| p.event.id == "range").unwrap();
        assert_eq!(range.end_x, Some(100.0));
    }

    #[test]
    fn test_no_overlap_among_unselected() {
        let tuning = TuningSettings::default();
        let state = ViewportState::new(0.0, 1.0);
        let events: Vec<_> = (0..50)
            .map(|i| test_event(&i.to_string(), i as f64 * 37.0, (i % 10 + 1) as u8))
            .collect();

        let placed = place_events(&events, &state, 2000.0, None, &tuning);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!((a.start_x - b.start_x).abs() >= 100.0);
            }
        }
    }
}
