// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pan, zoom, drag and selection state of the radar scope.
//!
//! Pointer positions handed to [`ViewState`] are screen pixels relative to
//! the canvas centre (see [`super::transform`]). The controller is a small
//! state machine:
//!
//! ```text
//! Idle --pointer_down--> Dragging --pointer_move--> Dragging
//! Dragging --pointer_up (same spot)--> Idle + hit test
//! Dragging --pointer_up (moved)-----> Idle (pan committed)
//! ```

use atc_feed::{Aircraft, Vec2};
use log::debug;

use super::transform::Transform;
use super::ViewMode;
use crate::geometry::distance_squared;

/// Scale bounds
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 40.0;

/// Wheel zoom factors per tick
const ZOOM_IN_FACTOR: f64 = 1.1;
const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Click selection radius in screen pixels
pub const SELECT_RADIUS_PX: f64 = 100.0;

/// Aircraft at or below this altitude belong to the ground view
pub const GROUND_CEILING_FT: f64 = 100.0;

const OVERVIEW_SCALE: f64 = 1.0;
const TOWER_SCALE: f64 = 4.0;
const GROUND_SCALE: f64 = 15.0;

/// Named view resets bound to keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    /// Whole airspace in tower mode.
    Overview,
    /// Terminal area around the home airport in tower mode.
    Tower,
    /// Airport surface in ground mode.
    Ground,
}

/// Captured when a drag starts. Only exists while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    /// Pointer position at pointer-down (px).
    pub anchor_screen: Vec2,
    /// Pan at pointer-down, in pixels.
    pub pan_at_start: Vec2,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerRelease {
    /// Pointer-up without a matching pointer-down.
    Ignored,
    /// The pointer moved; the pan stays where the drag left it.
    Panned,
    /// Treated as a click; carries the resulting selection.
    Clicked(Option<String>),
}

/// Interaction state of the radar scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    scale: f64,
    /// World-space pan offset (feet).
    pub pan_offset: Vec2,
    drag: Option<DragAnchor>,
    pub mode: ViewMode,
    selected: Option<String>,
    /// Pointer travel (px) still classified as a click. 0 = exact match.
    click_slop_px: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewMode::Tower)
    }
}

impl ViewState {
    #[must_use]
    pub fn new(mode: ViewMode) -> Self {
        let scale = match mode {
            ViewMode::Tower => OVERVIEW_SCALE,
            ViewMode::Ground => GROUND_SCALE,
        };
        Self {
            scale,
            pan_offset: Vec2::ZERO,
            drag: None,
            mode,
            selected: None,
            click_slop_px: 0.0,
        }
    }

    #[must_use]
    pub fn with_click_slop(mut self, slop_px: f64) -> Self {
        self.click_slop_px = slop_px.max(0.0);
        self
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale, clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            OVERVIEW_SCALE
        };
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::new(self.scale, self.pan_offset)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, callsign: Option<String>) {
        if self.selected != callsign {
            debug!("Selection -> {callsign:?}");
        }
        self.selected = callsign;
    }

    /// Centre the view on a world point (feet).
    pub fn center_on(&mut self, world: Vec2) {
        self.pan_offset = -world;
    }

    /// World point (feet) currently under the canvas centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        -self.pan_offset
    }

    /// Start a drag at `pos` (px).
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.drag = Some(DragAnchor {
            anchor_screen: pos,
            pan_at_start: self.transform().pan_in_pixels(),
        });
    }

    /// Pan while dragging. Does nothing when idle.
    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(anchor) = self.drag {
            self.drag_to(anchor, pos);
        }
    }

    /// Finish a drag at `pos` (px).
    ///
    /// A release on the press position is a click: the nearest aircraft in
    /// `aircraft` under the pointer becomes the selection, or the selection
    /// is cleared when none qualifies.
    pub fn pointer_up(&mut self, pos: Vec2, aircraft: &[Aircraft]) -> PointerRelease {
        let Some(anchor) = self.drag.take() else {
            return PointerRelease::Ignored;
        };

        let travel_sq = distance_squared(anchor.anchor_screen, pos);
        let is_click = if self.click_slop_px > 0.0 {
            travel_sq <= self.click_slop_px * self.click_slop_px
        } else {
            pos == anchor.anchor_screen
        };

        if !is_click {
            self.drag_to(anchor, pos);
            return PointerRelease::Panned;
        }

        // Undo any sub-slop wiggle so a click never nudges the view.
        self.pan_offset = self.transform().pan_from_pixels(anchor.pan_at_start);

        let hit = self.hit_test(pos, aircraft).map(|a| a.id.clone());
        self.select(hit.clone());
        PointerRelease::Clicked(hit)
    }

    /// Abandon a drag without committing or clicking (pointer left the canvas).
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn drag_to(&mut self, anchor: DragAnchor, pos: Vec2) {
        let pan_px = anchor.pan_at_start + (pos - anchor.anchor_screen);
        self.pan_offset = self.transform().pan_from_pixels(pan_px);
    }

    /// Apply one wheel tick. Positive `delta` zooms in.
    ///
    /// Zoom is anchored at the canvas centre.
    pub fn wheel(&mut self, delta: f64) {
        if delta > 0.0 {
            self.set_scale(self.scale * ZOOM_IN_FACTOR);
        } else if delta < 0.0 {
            self.set_scale(self.scale * ZOOM_OUT_FACTOR);
        }
    }

    /// Reset scale, pan and mode to a named preset centred on `focus` (feet).
    pub fn apply_preset(&mut self, preset: ViewPreset, focus: Vec2) {
        self.drag = None;
        match preset {
            ViewPreset::Overview => {
                self.mode = ViewMode::Tower;
                self.set_scale(OVERVIEW_SCALE);
            }
            ViewPreset::Tower => {
                self.mode = ViewMode::Tower;
                self.set_scale(TOWER_SCALE);
            }
            ViewPreset::Ground => {
                self.mode = ViewMode::Ground;
                self.set_scale(GROUND_SCALE);
            }
        }
        self.center_on(focus);
    }

    /// Nearest aircraft to the screen point `pos` (px) that is visible in the
    /// current mode and within [`SELECT_RADIUS_PX`].
    ///
    /// Ties resolve to the first aircraft in `aircraft` order.
    #[must_use]
    pub fn hit_test<'a>(&self, pos: Vec2, aircraft: &'a [Aircraft]) -> Option<&'a Aircraft> {
        let transform = self.transform();
        let world = transform.screen_to_world(pos);
        let radius_ft = transform.pixels_to_feet(SELECT_RADIUS_PX);
        let threshold_sq = radius_ft * radius_ft;

        let mut best: Option<(&Aircraft, f64)> = None;
        for candidate in aircraft {
            if !self.mode.shows(candidate) {
                continue;
            }
            let dist_sq = distance_squared(world, candidate.pos);
            // NaN positions fail this comparison and are skipped.
            if !(dist_sq <= threshold_sq) {
                continue;
            }
            if best.map_or(true, |(_, d)| dist_sq < d) {
                best = Some((candidate, dist_sq));
            }
        }
        best.map(|(a, _)| a)
    }
}

impl ViewMode {
    /// Whether `aircraft` belongs to this view (airborne for tower, surface for ground).
    #[must_use]
    pub fn shows(self, aircraft: &Aircraft) -> bool {
        match self {
            ViewMode::Tower => !aircraft.is_on_ground(GROUND_CEILING_FT),
            ViewMode::Ground => aircraft.is_on_ground(GROUND_CEILING_FT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::testing::aircraft_at;
    use approx::assert_abs_diff_eq;

    /// World position `px` screen pixels east of the centre at `view`'s scale.
    fn east_of_centre(view: &ViewState, px: f64) -> Vec2 {
        view.transform().screen_to_world(Vec2::new(px, 0.0))
    }

    #[test]
    fn test_scale_stays_in_bounds() {
        let mut view = ViewState::default();
        for _ in 0..200 {
            view.wheel(1.0);
            assert!(view.scale() <= MAX_SCALE);
        }
        assert_abs_diff_eq!(view.scale(), MAX_SCALE);
        for step in 0..500 {
            view.wheel(if step % 7 == 0 { 1.0 } else { -1.0 });
            assert!((MIN_SCALE..=MAX_SCALE).contains(&view.scale()));
        }
        assert_abs_diff_eq!(view.scale(), MIN_SCALE);
        view.set_scale(f64::NAN);
        assert!((MIN_SCALE..=MAX_SCALE).contains(&view.scale()));
    }

    #[test]
    fn test_drag_pans_with_pointer() {
        let mut view = ViewState::default();
        let before = view.transform().world_to_screen(Vec2::new(5000.0, 5000.0));

        view.pointer_down(Vec2::new(10.0, 10.0));
        assert!(view.is_dragging());
        view.pointer_move(Vec2::new(40.0, -20.0));
        let release = view.pointer_up(Vec2::new(40.0, -20.0), &[]);

        assert_eq!(release, PointerRelease::Panned);
        assert!(!view.is_dragging());
        let after = view.transform().world_to_screen(Vec2::new(5000.0, 5000.0));
        assert_abs_diff_eq!(after.x - before.x, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(after.y - before.y, -30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pointer_move_when_idle_is_ignored() {
        let mut view = ViewState::default();
        view.pointer_move(Vec2::new(100.0, 100.0));
        assert_eq!(view.pan_offset, Vec2::ZERO);
        assert_eq!(view.pointer_up(Vec2::ZERO, &[]), PointerRelease::Ignored);
    }

    #[test]
    fn test_click_selects_only_within_radius() {
        let mut view = ViewState::default();
        let near = aircraft_at("NEAR", east_of_centre(&view, 50.0), 5000.0);
        let far = aircraft_at("FAR", east_of_centre(&view, -150.0), 5000.0);
        let traffic = vec![far, near];

        view.pointer_down(Vec2::ZERO);
        let release = view.pointer_up(Vec2::ZERO, &traffic);
        assert_eq!(release, PointerRelease::Clicked(Some("NEAR".to_string())));
        assert_eq!(view.selected(), Some("NEAR"));
    }

    #[test]
    fn test_click_outside_radius_clears_selection() {
        let mut view = ViewState::default();
        view.select(Some("OLD".to_string()));
        let traffic = vec![
            aircraft_at("A", east_of_centre(&view, 150.0), 5000.0),
            aircraft_at("B", east_of_centre(&view, -180.0), 5000.0),
        ];

        view.pointer_down(Vec2::ZERO);
        assert_eq!(view.pointer_up(Vec2::ZERO, &traffic), PointerRelease::Clicked(None));
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_hit_test_filters_by_mode_and_breaks_ties_in_order() {
        let mut view = ViewState::default();
        let spot = east_of_centre(&view, 10.0);
        let traffic = vec![
            aircraft_at("TAXI", spot, 0.0),
            aircraft_at("FIRST", spot, 3000.0),
            aircraft_at("SECOND", spot, 3000.0),
        ];

        assert_eq!(view.hit_test(Vec2::ZERO, &traffic).map(|a| a.id.as_str()), Some("FIRST"));

        view.mode = ViewMode::Ground;
        assert_eq!(view.hit_test(Vec2::ZERO, &traffic).map(|a| a.id.as_str()), Some("TAXI"));
    }

    #[test]
    fn test_moved_release_is_not_a_click() {
        let mut view = ViewState::default();
        let traffic = vec![aircraft_at("A", Vec2::ZERO, 5000.0)];

        view.pointer_down(Vec2::ZERO);
        assert_eq!(view.pointer_up(Vec2::new(0.5, 0.0), &traffic), PointerRelease::Panned);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_click_slop_tolerates_small_moves() {
        let mut view = ViewState::default().with_click_slop(3.0);
        let traffic = vec![aircraft_at("A", Vec2::ZERO, 5000.0)];

        view.pointer_down(Vec2::ZERO);
        view.pointer_move(Vec2::new(2.0, 1.0));
        let release = view.pointer_up(Vec2::new(2.0, 1.0), &traffic);

        assert_eq!(release, PointerRelease::Clicked(Some("A".to_string())));
        assert_abs_diff_eq!(view.pan_offset.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.pan_offset.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_presets_reset_scale_and_pan() {
        let mut view = ViewState::default();
        view.wheel(1.0);
        view.pan_offset = Vec2::new(1.0, 2.0);

        view.apply_preset(ViewPreset::Ground, Vec2::new(500.0, -300.0));
        assert_eq!(view.mode, ViewMode::Ground);
        assert_abs_diff_eq!(view.scale(), GROUND_SCALE);
        assert_eq!(view.center(), Vec2::new(500.0, -300.0));

        view.apply_preset(ViewPreset::Tower, Vec2::new(10.0, 20.0));
        assert_eq!(view.mode, ViewMode::Tower);
        assert_abs_diff_eq!(view.scale(), TOWER_SCALE);
        assert_eq!(view.center(), Vec2::new(10.0, 20.0));

        view.apply_preset(ViewPreset::Overview, Vec2::ZERO);
        assert_eq!(view.mode, ViewMode::Tower);
        assert_abs_diff_eq!(view.scale(), OVERVIEW_SCALE);
    }
}
