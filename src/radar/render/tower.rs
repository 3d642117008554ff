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

//! Airspace-scale scope.
//!
//! Layer order: airspace circles, runways with localizer geometry, en-route
//! waypoints, airborne blips (selected last) and finally the selected
//! aircraft's remaining route.

use atc_feed::model::{Runway, Waypoint};
use atc_feed::{Aircraft, Vec2};
use egui::{Align2, Color32};
use log::debug;

use super::aircraft::draw_blip;
use super::{palette, px, Scene};
use crate::geometry::{move_point, nm_to_feet, normalize_heading};
use crate::radar::canvas::Canvas;
use crate::radar::ViewMode;

/// Localizer course length drawn beyond the threshold
pub const LOCALIZER_LENGTH_NM: f64 = 10.0;
/// Half-angle of the localizer cone
pub const LOCALIZER_HALF_ANGLE_DEG: f64 = 3.0;
/// Half-length of the one-mile tick marks (feet)
const LOCALIZER_TICK_FT: f64 = 400.0;

const WAYPOINT_SIZE_PX: f64 = 5.0;

pub(super) fn draw(canvas: &mut dyn Canvas, scene: &Scene<'_>) {
    canvas.begin_layer("airspaces");
    draw_airspaces(canvas, scene);

    canvas.begin_layer("runways");
    for airspace in &scene.world.airspaces {
        for airport in &airspace.airports {
            for runway in &airport.runways {
                draw_runway_with_localizer(canvas, scene, runway);
            }
        }
    }

    canvas.begin_layer("waypoints");
    for waypoint in &scene.world.waypoints {
        draw_waypoint(canvas, scene, waypoint, palette::WAYPOINT);
    }

    canvas.begin_layer("aircraft");
    draw_airborne(canvas, scene);

    canvas.begin_layer("route");
    if let Some(selected) = scene.selected_aircraft() {
        draw_route(canvas, scene, selected);
    }
}

fn draw_airspaces(canvas: &mut dyn Canvas, scene: &Scene<'_>) {
    let transform = scene.transform;
    for airspace in &scene.world.airspaces {
        if !airspace.pos.is_finite() || !airspace.radius.is_finite() {
            debug!("Skipping airspace {} with invalid geometry", airspace.id);
            continue;
        }
        let center = transform.world_to_screen(airspace.pos);
        let radius = transform.feet_to_pixels(airspace.radius);
        canvas.circle_stroke(center, px(radius), 1.0, palette::AIRSPACE);
        canvas.text(
            center + Vec2::new(0.0, -radius - 6.0),
            Align2::CENTER_BOTTOM,
            &airspace.id,
            11.0,
            palette::AIRSPACE,
        );
    }
}

/// Localizer centreline and cone edges, starting at the threshold and
/// extending against the landing direction.
#[must_use]
pub fn localizer_lines(runway: &Runway) -> [(Vec2, Vec2); 3] {
    let outbound = normalize_heading(runway.heading + 180.0);
    let length = nm_to_feet(LOCALIZER_LENGTH_NM);
    let threshold = runway.start;
    [
        (threshold, move_point(threshold, outbound, length)),
        (
            threshold,
            move_point(threshold, outbound - LOCALIZER_HALF_ANGLE_DEG, length),
        ),
        (
            threshold,
            move_point(threshold, outbound + LOCALIZER_HALF_ANGLE_DEG, length),
        ),
    ]
}

/// Perpendicular tick marks at every whole mile of the localizer.
#[must_use]
pub fn localizer_ticks(runway: &Runway) -> Vec<(Vec2, Vec2)> {
    let outbound = normalize_heading(runway.heading + 180.0);
    let mut ticks = Vec::new();
    let mut nm = 1.0;
    while nm <= LOCALIZER_LENGTH_NM {
        let mark = move_point(runway.start, outbound, nm_to_feet(nm));
        ticks.push((
            move_point(mark, outbound - 90.0, LOCALIZER_TICK_FT),
            move_point(mark, outbound + 90.0, LOCALIZER_TICK_FT),
        ));
        nm += 1.0;
    }
    ticks
}

fn runway_is_valid(runway: &Runway) -> bool {
    runway.start.is_finite() && runway.end.is_finite() && runway.heading.is_finite()
}

fn draw_runway_with_localizer(canvas: &mut dyn Canvas, scene: &Scene<'_>, runway: &Runway) {
    if !runway_is_valid(runway) {
        debug!("Skipping runway {} with invalid geometry", runway.id);
        return;
    }
    let transform = scene.transform;

    for (a, b) in localizer_lines(runway) {
        canvas.line(
            transform.world_to_screen(a),
            transform.world_to_screen(b),
            1.0,
            palette::LOCALIZER,
        );
    }
    for (a, b) in localizer_ticks(runway) {
        canvas.line(
            transform.world_to_screen(a),
            transform.world_to_screen(b),
            1.0,
            palette::LOCALIZER,
        );
    }

    let start = transform.world_to_screen(runway.start);
    let end = transform.world_to_screen(runway.end);
    canvas.line(start, end, 3.0, palette::RUNWAY);
    canvas.text(start, Align2::RIGHT_TOP, &runway.id, 10.0, palette::RUNWAY_TEXT);
}

fn draw_waypoint(canvas: &mut dyn Canvas, scene: &Scene<'_>, waypoint: &Waypoint, color: Color32) {
    if !waypoint.pos.is_finite() {
        debug!("Skipping waypoint {} with invalid position", waypoint.name);
        return;
    }
    let center = scene.transform.world_to_screen(waypoint.pos);
    let triangle = [
        center + Vec2::new(0.0, -WAYPOINT_SIZE_PX),
        center + Vec2::new(WAYPOINT_SIZE_PX, WAYPOINT_SIZE_PX),
        center + Vec2::new(-WAYPOINT_SIZE_PX, WAYPOINT_SIZE_PX),
    ];
    canvas.polygon(&triangle, Color32::TRANSPARENT, 1.0, color);
    canvas.text(
        center + Vec2::new(WAYPOINT_SIZE_PX + 3.0, 0.0),
        Align2::LEFT_CENTER,
        &waypoint.name,
        10.0,
        color,
    );
}

/// Unselected aircraft first so the selected blip ends up on top.
fn draw_airborne(canvas: &mut dyn Canvas, scene: &Scene<'_>) {
    let mut selected = None;
    for aircraft in scene.aircraft {
        if !ViewMode::Tower.shows(aircraft) {
            continue;
        }
        if scene.selected == Some(aircraft.id.as_str()) {
            selected = Some(aircraft);
            continue;
        }
        draw_blip(canvas, scene, aircraft);
    }
    if let Some(aircraft) = selected {
        draw_blip(canvas, scene, aircraft);
    }
}

fn draw_route(canvas: &mut dyn Canvas, scene: &Scene<'_>, aircraft: &Aircraft) {
    if !aircraft.pos.is_finite() {
        return;
    }
    let transform = scene.transform;
    let mut previous = transform.world_to_screen(aircraft.pos);
    for waypoint in aircraft.flight_plan.remaining() {
        if !waypoint.pos.is_finite() {
            debug!("Route of {} has an invalid waypoint {}", aircraft.id, waypoint.name);
            break;
        }
        let next = transform.world_to_screen(waypoint.pos);
        canvas.line(previous, next, 1.0, palette::ROUTE);
        draw_waypoint(canvas, scene, waypoint, palette::ROUTE);
        previous = next;
    }
}
