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

//! Per-frame paint pipeline for the radar scope.
//!
//! Every frame:
//!
//! 1. clear the canvas (always, even with no data)
//! 2. swap in the newest upstream snapshot if the scheduler says a refresh is due
//! 3. draw the tower or ground layers from the *cached* snapshot
//! 4. draw the conflict overlay and HUD
//!
//! Painting never fails. Missing data means an empty scope, and a broken
//! entity is skipped without affecting the rest of the frame.

pub mod aircraft;
pub mod ground;
pub mod tower;

use std::sync::Arc;
use std::time::{Duration, Instant};

use atc_feed::model::Airport;
use atc_feed::{Aircraft, AircraftSnapshot, Vec2, World};
use egui::Align2;
use log::debug;

use super::canvas::Canvas;
use super::scheduler::{FpsCounter, FrameScheduler};
use super::transform::Transform;
use super::view::ViewState;
use super::ViewMode;

pub mod palette {
    use egui::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgb(12, 16, 20);
    pub const AIRSPACE: Color32 = Color32::from_rgb(60, 90, 120);
    pub const RUNWAY: Color32 = Color32::from_rgb(200, 200, 200);
    pub const RUNWAY_SURFACE: Color32 = Color32::from_rgb(55, 55, 60);
    pub const RUNWAY_CENTERLINE: Color32 = Color32::from_rgb(235, 235, 235);
    pub const RUNWAY_TEXT: Color32 = Color32::from_rgb(220, 220, 220);
    pub const LOCALIZER: Color32 = Color32::from_rgb(70, 110, 150);
    pub const WAYPOINT: Color32 = Color32::from_rgb(110, 130, 150);
    pub const ROUTE: Color32 = Color32::from_rgb(100, 200, 255);
    pub const TAXIWAY: Color32 = Color32::from_rgb(80, 80, 90);
    pub const HOLD_SHORT: Color32 = Color32::from_rgb(200, 170, 40);
    pub const APRON: Color32 = Color32::from_rgb(70, 70, 80);
    pub const TAXIWAY_TEXT: Color32 = Color32::from_rgb(230, 200, 80);
    pub const TERMINAL: Color32 = Color32::from_rgb(140, 140, 160);
    pub const TERMINAL_FILL: Color32 = Color32::from_rgb(40, 40, 52);
    pub const GATE: Color32 = Color32::from_rgb(170, 170, 190);
    pub const SELECTED: Color32 = Color32::from_rgb(255, 215, 0);
    pub const CONFLICT: Color32 = Color32::from_rgb(255, 70, 70);
    pub const INACTIVE: Color32 = Color32::from_rgb(110, 120, 110);
    pub const ACTIVE: Color32 = Color32::from_rgb(0, 220, 90);
    pub const TAG_TEXT: Color32 = Color32::from_rgb(200, 200, 200);
    pub const HUD: Color32 = Color32::from_rgb(150, 160, 170);
}

/// Screen length to the f32 the painter wants.
#[allow(clippy::cast_possible_truncation, reason = "pixel lengths fit in f32")]
pub(crate) fn px(value: f64) -> f32 {
    value as f32
}

/// Everything a layer needs to draw one frame.
pub(crate) struct Scene<'a> {
    pub transform: Transform,
    pub world: &'a World,
    pub aircraft: &'a [Aircraft],
    /// Airport shown in ground view.
    pub airport: Option<&'a Airport>,
    pub selected: Option<&'a str>,
    pub active_frequency: f64,
}

impl Scene<'_> {
    fn selected_aircraft(&self) -> Option<&Aircraft> {
        let selected = self.selected?;
        self.aircraft.iter().find(|a| a.id == selected)
    }
}

/// Inputs for one paint tick.
#[derive(Debug)]
pub struct FrameInput<'a> {
    pub now: Instant,
    pub view: &'a ViewState,
    /// Latest upstream data. Only adopted when a refresh is due.
    pub world: Option<Arc<World>>,
    pub aircraft: Option<Arc<AircraftSnapshot>>,
    /// Scene refresh interval for the current mode.
    pub refresh_interval: Duration,
    pub active_frequency: f64,
    /// Preferred airport for ground view. Falls back to the first one known.
    pub home_airport: &'a str,
}

/// Owns the cached scene and the paint-rate bookkeeping.
#[derive(Debug)]
pub struct RenderPipeline {
    scheduler: FrameScheduler,
    fps: FpsCounter,
    world: Option<Arc<World>>,
    aircraft: Option<Arc<AircraftSnapshot>>,
    pub show_fps: bool,
}

impl RenderPipeline {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            scheduler: FrameScheduler::new(),
            fps: FpsCounter::new(now),
            world: None,
            aircraft: None,
            show_fps: true,
        }
    }

    /// Force the next frame to pick up fresh data (mode switch, reconnect).
    pub fn request_refresh(&mut self) {
        self.scheduler.request_initial_draw();
    }

    /// Aircraft currently on screen. Hit testing uses these so a click
    /// matches what the controller sees.
    #[must_use]
    pub fn cached_aircraft(&self) -> &[Aircraft] {
        match self.aircraft.as_deref() {
            Some(snapshot) => &snapshot.aircraft,
            None => &[],
        }
    }

    /// Paint one frame.
    pub fn paint(&mut self, canvas: &mut dyn Canvas, input: FrameInput<'_>) {
        canvas.clear(palette::BACKGROUND);

        let upstream_empty = input
            .aircraft
            .as_ref()
            .map_or(true, |snapshot| snapshot.aircraft.is_empty());
        self.scheduler.observe_upstream(upstream_empty);
        if self.scheduler.should_refresh(input.now, input.refresh_interval) {
            // Keep the last good data when the feed has nothing new.
            if input.world.is_some() {
                self.world = input.world;
            }
            if input.aircraft.is_some() {
                self.aircraft = input.aircraft;
            }
        }

        if let Some(world) = self.world.clone() {
            let view = input.view;
            let scene = Scene {
                transform: view.transform(),
                world: &world,
                aircraft: self.cached_aircraft(),
                airport: resolve_airport(&world, input.home_airport),
                selected: view.selected(),
                active_frequency: input.active_frequency,
            };
            match view.mode {
                ViewMode::Tower => tower::draw(canvas, &scene),
                ViewMode::Ground => ground::draw(canvas, &scene),
            }
        } else {
            debug!("World not loaded yet, drawing background only");
        }

        canvas.begin_layer("overlay");
        draw_conflict_overlay(canvas, self.cached_aircraft());

        canvas.begin_layer("hud");
        self.draw_hud(canvas, input.view);

        self.fps.tick(input.now);
    }

    fn draw_hud(&self, canvas: &mut dyn Canvas, view: &ViewState) {
        let size = canvas.size();
        let bottom_left = Vec2::new(-size.x / 2.0 + 10.0, size.y / 2.0 - 10.0);
        let status = if self.world.is_some() {
            format!("{}  x{:.1}", view.mode.label().to_uppercase(), view.scale())
        } else {
            "WAITING FOR SERVER".to_string()
        };
        canvas.text(bottom_left, Align2::LEFT_BOTTOM, &status, 12.0, palette::HUD);

        if self.show_fps {
            let bottom_right = Vec2::new(size.x / 2.0 - 10.0, size.y / 2.0 - 10.0);
            canvas.text(
                bottom_right,
                Align2::RIGHT_BOTTOM,
                &format!("{} FPS", self.fps.fps()),
                10.0,
                palette::HUD,
            );
        }
    }
}

/// Airport with `preferred` id, else the first airport of the first airspace.
#[must_use]
pub fn resolve_airport<'w>(world: &'w World, preferred: &str) -> Option<&'w Airport> {
    if !preferred.is_empty() {
        if let Some(airport) = world.airport(preferred) {
            return Some(airport);
        }
    }
    world
        .airspaces
        .iter()
        .flat_map(|airspace| airspace.airports.iter())
        .next()
}

/// Ids of every aircraft flagged as in conflict, in snapshot order.
#[must_use]
pub fn conflicting_ids(aircraft: &[Aircraft]) -> Vec<&str> {
    aircraft
        .iter()
        .filter(|a| a.is_colliding)
        .map(|a| a.id.as_str())
        .collect()
}

fn draw_conflict_overlay(canvas: &mut dyn Canvas, aircraft: &[Aircraft]) {
    let ids = conflicting_ids(aircraft);
    if ids.is_empty() {
        return;
    }
    let size = canvas.size();
    canvas.text(
        Vec2::new(0.0, -size.y / 2.0 + 12.0),
        Align2::CENTER_TOP,
        &format!("CONFLICT ALERT: {}", ids.join(", ")),
        14.0,
        palette::CONFLICT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::canvas::recording::{Op, RecordingCanvas};
    use crate::radar::testing::aircraft_at;
    use atc_feed::model::{Airspace, Gate, Runway, Taxiway, TaxiwayKind, Terminal, Waypoint};

    fn world() -> Arc<World> {
        let runway = Runway {
            id: "28L".to_string(),
            start: Vec2::new(2000.0, 0.0),
            end: Vec2::new(-8000.0, 0.0),
            heading: 280.0,
            length: 10_000.0,
        };
        let taxiway = |id: &str, a: Vec2, b: Vec2| Taxiway {
            id: id.to_string(),
            a,
            b,
            kind: TaxiwayKind::Normal,
        };
        let airport = Airport {
            id: "KSFO".to_string(),
            center: Vec2::ZERO,
            runways: vec![runway],
            taxiways: vec![
                taxiway("A", Vec2::new(0.0, 500.0), Vec2::new(1000.0, 500.0)),
                taxiway("A", Vec2::new(1000.0, 500.0), Vec2::new(2000.0, 500.0)),
                taxiway("B", Vec2::new(0.0, 900.0), Vec2::new(0.0, 1500.0)),
            ],
            terminals: vec![Terminal {
                id: "T1".to_string(),
                a: Vec2::new(0.0, 2000.0),
                b: Vec2::new(500.0, 2000.0),
                c: Vec2::new(500.0, 2500.0),
                d: Vec2::new(0.0, 2500.0),
                apron: (Vec2::new(0.0, 1900.0), Vec2::new(500.0, 1900.0)),
                gates: vec![Gate {
                    id: "G1".to_string(),
                    pos: Vec2::new(100.0, 1950.0),
                    heading: 180.0,
                }],
            }],
        };
        Arc::new(World {
            airspaces: vec![Airspace {
                id: "NORCAL".to_string(),
                pos: Vec2::ZERO,
                radius: 150_000.0,
                airports: vec![airport],
            }],
            waypoints: vec![Waypoint {
                name: "SUNOL".to_string(),
                pos: Vec2::new(40_000.0, -20_000.0),
            }],
        })
    }

    fn snapshot(aircraft: Vec<Aircraft>) -> Arc<AircraftSnapshot> {
        Arc::new(AircraftSnapshot {
            aircraft,
            fetched_at: chrono::Utc::now(),
            generation: 0,
        })
    }

    fn input<'a>(
        view: &'a ViewState,
        world: Option<Arc<World>>,
        aircraft: Option<Arc<AircraftSnapshot>>,
        now: Instant,
    ) -> FrameInput<'a> {
        FrameInput {
            now,
            view,
            world,
            aircraft,
            refresh_interval: Duration::from_secs(1),
            active_frequency: 118.6,
            home_airport: "",
        }
    }

    #[test]
    fn test_background_only_without_world() {
        let now = Instant::now();
        let mut pipeline = RenderPipeline::new(now);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let view = ViewState::default();

        pipeline.paint(&mut canvas, input(&view, None, None, now));

        assert_eq!(canvas.ops.first(), Some(&Op::Clear));
        assert_eq!(canvas.shape_count(), 0);
        assert_eq!(canvas.layers(), vec!["overlay", "hud"]);
        assert!(canvas.texts().contains(&"WAITING FOR SERVER"));
    }

    #[test]
    fn test_tower_layer_order_and_selected_on_top() {
        let now = Instant::now();
        let mut pipeline = RenderPipeline::new(now);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut view = ViewState::default();
        view.select(Some("AAL1".to_string()));
        let traffic = snapshot(vec![
            aircraft_at("AAL1", Vec2::new(1000.0, 1000.0), 5000.0),
            aircraft_at("UAL2", Vec2::new(-1000.0, 1000.0), 6000.0),
            aircraft_at("TAXI3", Vec2::new(0.0, 0.0), 0.0),
        ]);

        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(traffic), now));

        assert_eq!(
            canvas.layers(),
            vec!["airspaces", "runways", "waypoints", "aircraft", "route", "overlay", "hud"]
        );
        let texts = canvas.texts();
        let selected = texts.iter().position(|t| *t == "AAL1").unwrap();
        let other = texts.iter().position(|t| *t == "UAL2").unwrap();
        assert!(other < selected);
        assert!(!texts.contains(&"TAXI3"));
    }

    #[test]
    fn test_ground_layer_order_and_label_dedup() {
        let now = Instant::now();
        let mut pipeline = RenderPipeline::new(now);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let view = ViewState::new(ViewMode::Ground);
        let traffic = snapshot(vec![
            aircraft_at("TAXI3", Vec2::new(0.0, 500.0), 0.0),
            aircraft_at("HIGH4", Vec2::new(0.0, 500.0), 9000.0),
        ]);

        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(traffic), now));

        assert_eq!(
            canvas.layers(),
            vec!["taxiways", "runway-markings", "terminals", "taxiway-labels", "aircraft", "overlay", "hud"]
        );
        let texts = canvas.texts();
        assert_eq!(texts.iter().filter(|t| **t == "A").count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == "B").count(), 1);
        assert!(texts.contains(&"TAXI3"));
        assert!(!texts.contains(&"HIGH4"));
    }

    #[test]
    fn test_malformed_aircraft_does_not_abort_frame() {
        let now = Instant::now();
        let mut pipeline = RenderPipeline::new(now);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let view = ViewState::default();
        let traffic = snapshot(vec![
            aircraft_at("BROKEN", Vec2::new(f64::NAN, 0.0), 5000.0),
            aircraft_at("GOOD", Vec2::new(100.0, 100.0), 5000.0),
        ]);

        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(traffic), now));

        let texts = canvas.texts();
        assert!(texts.contains(&"GOOD"));
        assert!(!texts.contains(&"BROKEN"));
        assert_eq!(canvas.layers().last(), Some(&"hud"));
    }

    #[test]
    fn test_cached_scene_held_between_refreshes() {
        let start = Instant::now();
        let mut pipeline = RenderPipeline::new(start);
        let view = ViewState::default();

        let first = snapshot(vec![aircraft_at("OLD1", Vec2::ZERO, 5000.0)]);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(first), start));
        assert!(canvas.texts().contains(&"OLD1"));

        // Within the interval the new snapshot is not adopted yet.
        let second = snapshot(vec![aircraft_at("NEW2", Vec2::ZERO, 5000.0)]);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let soon = start + Duration::from_millis(100);
        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(second.clone()), soon));
        assert!(canvas.texts().contains(&"OLD1"));
        assert!(!canvas.texts().contains(&"NEW2"));

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let later = start + Duration::from_millis(1100);
        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(second), later));
        assert!(canvas.texts().contains(&"NEW2"));
    }

    #[test]
    fn test_conflict_overlay_lists_ids() {
        let mut a = aircraft_at("AAL1", Vec2::ZERO, 5000.0);
        let mut b = aircraft_at("UAL2", Vec2::new(100.0, 0.0), 5000.0);
        a.is_colliding = true;
        b.is_colliding = true;
        let traffic = vec![a, aircraft_at("SWA3", Vec2::ZERO, 5000.0), b];
        assert_eq!(conflicting_ids(&traffic), vec!["AAL1", "UAL2"]);

        let now = Instant::now();
        let mut pipeline = RenderPipeline::new(now);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let view = ViewState::default();
        pipeline.paint(&mut canvas, input(&view, Some(world()), Some(snapshot(traffic)), now));
        assert!(canvas.texts().contains(&"CONFLICT ALERT: AAL1, UAL2"));
    }

    #[test]
    fn test_resolve_airport_falls_back_to_first() {
        let world = world();
        assert_eq!(resolve_airport(&world, "KSFO").map(|a| a.id.as_str()), Some("KSFO"));
        assert_eq!(resolve_airport(&world, "KXXX").map(|a| a.id.as_str()), Some("KSFO"));
        assert_eq!(resolve_airport(&world, "").map(|a| a.id.as_str()), Some("KSFO"));
        assert!(resolve_airport(&World::default(), "KSFO").is_none());
    }
}
