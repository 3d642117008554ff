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

//! Airport surface scope.

use std::collections::HashSet;

use atc_feed::model::{Airport, Runway, Taxiway, TaxiwayKind, Terminal};
use atc_feed::Vec2;
use egui::{Align2, Color32};
use log::debug;

use super::aircraft::draw_blip;
use super::{palette, px, Scene};
use crate::geometry::{heading_to_radians, midpoint};
use crate::radar::canvas::Canvas;
use crate::radar::ViewMode;

/// Paved widths in feet
const TAXIWAY_WIDTH_FT: f64 = 75.0;
const RUNWAY_WIDTH_FT: f64 = 150.0;

const GATE_RADIUS_PX: f32 = 3.0;

pub(super) fn draw(canvas: &mut dyn Canvas, scene: &Scene<'_>) {
    let Some(airport) = scene.airport else {
        debug!("No airport to draw in ground view");
        return;
    };

    canvas.begin_layer("taxiways");
    for taxiway in &airport.taxiways {
        draw_taxiway(canvas, scene, taxiway);
    }

    canvas.begin_layer("runway-markings");
    for runway in &airport.runways {
        draw_runway_markings(canvas, scene, runway);
    }

    canvas.begin_layer("terminals");
    for terminal in &airport.terminals {
        draw_terminal(canvas, scene, terminal);
    }

    canvas.begin_layer("taxiway-labels");
    draw_taxiway_labels(canvas, scene, airport);

    canvas.begin_layer("aircraft");
    let mut selected = None;
    for aircraft in scene.aircraft {
        if !ViewMode::Ground.shows(aircraft) {
            continue;
        }
        if scene.selected == Some(aircraft.id.as_str()) {
            selected = Some(aircraft);
        } else {
            draw_blip(canvas, scene, aircraft);
        }
    }
    if let Some(aircraft) = selected {
        draw_blip(canvas, scene, aircraft);
    }
}

fn taxiway_color(kind: TaxiwayKind) -> Color32 {
    match kind {
        TaxiwayKind::Normal => palette::TAXIWAY,
        TaxiwayKind::HoldShort => palette::HOLD_SHORT,
        TaxiwayKind::Apron => palette::APRON,
    }
}

fn draw_taxiway(canvas: &mut dyn Canvas, scene: &Scene<'_>, taxiway: &Taxiway) {
    if !taxiway.a.is_finite() || !taxiway.b.is_finite() {
        debug!("Skipping taxiway {} with invalid geometry", taxiway.id);
        return;
    }
    let transform = scene.transform;
    let width = transform.feet_to_pixels(TAXIWAY_WIDTH_FT).max(1.0);
    canvas.line(
        transform.world_to_screen(taxiway.a),
        transform.world_to_screen(taxiway.b),
        px(width),
        taxiway_color(taxiway.kind),
    );
}

/// Corners of the runway rectangle in world feet.
#[must_use]
pub fn runway_outline(runway: &Runway) -> [Vec2; 4] {
    let along = runway.end - runway.start;
    let length = along.length();
    let half = RUNWAY_WIDTH_FT / 2.0;
    let normal = if length > 0.0 {
        Vec2::new(-along.y / length, along.x / length) * half
    } else {
        // Degenerate strip: orient by the published heading instead.
        let angle = heading_to_radians(runway.heading);
        Vec2::new(-angle.sin(), angle.cos()) * half
    };
    [
        runway.start + normal,
        runway.end + normal,
        runway.end - normal,
        runway.start - normal,
    ]
}

fn draw_runway_markings(canvas: &mut dyn Canvas, scene: &Scene<'_>, runway: &Runway) {
    if !runway.start.is_finite() || !runway.end.is_finite() || !runway.heading.is_finite() {
        debug!("Skipping runway {} with invalid geometry", runway.id);
        return;
    }
    let transform = scene.transform;
    let outline = runway_outline(runway).map(|corner| transform.world_to_screen(corner));
    canvas.polygon(&outline, palette::RUNWAY_SURFACE, 1.0, palette::RUNWAY);

    let start = transform.world_to_screen(runway.start);
    let end = transform.world_to_screen(runway.end);
    canvas.line(start, end, 1.0, palette::RUNWAY_CENTERLINE);
    canvas.text(start, Align2::CENTER_CENTER, &runway.id, 12.0, palette::RUNWAY_TEXT);
}

fn draw_terminal(canvas: &mut dyn Canvas, scene: &Scene<'_>, terminal: &Terminal) {
    let transform = scene.transform;
    let outline = terminal.outline();
    if outline.iter().all(|corner| corner.is_finite()) {
        let screen = outline.map(|corner| transform.world_to_screen(corner));
        canvas.polygon(&screen, palette::TERMINAL_FILL, 1.0, palette::TERMINAL);
    } else {
        debug!("Skipping terminal {} outline with invalid geometry", terminal.id);
    }

    let (apron_a, apron_b) = terminal.apron;
    if apron_a.is_finite() && apron_b.is_finite() {
        canvas.line(
            transform.world_to_screen(apron_a),
            transform.world_to_screen(apron_b),
            1.0,
            palette::APRON,
        );
    }

    for gate in &terminal.gates {
        if !gate.pos.is_finite() {
            debug!("Skipping gate {} with invalid position", gate.id);
            continue;
        }
        let pos = transform.world_to_screen(gate.pos);
        canvas.circle_stroke(pos, GATE_RADIUS_PX, 1.0, palette::GATE);
        canvas.text(pos + Vec2::new(0.0, 6.0), Align2::CENTER_TOP, &gate.id, 9.0, palette::GATE);
    }
}

/// One label per taxiway name, placed on the first segment that carries it.
fn draw_taxiway_labels(canvas: &mut dyn Canvas, scene: &Scene<'_>, airport: &Airport) {
    let mut seen: HashSet<&str> = HashSet::new();
    for taxiway in &airport.taxiways {
        if taxiway.id.is_empty() || !taxiway.a.is_finite() || !taxiway.b.is_finite() {
            continue;
        }
        if !seen.insert(taxiway.id.as_str()) {
            continue;
        }
        let pos = scene.transform.world_to_screen(midpoint(taxiway.a, taxiway.b));
        canvas.label(pos, &taxiway.id, 10.0, palette::TAXIWAY_TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_runway_outline_has_runway_width() {
        let runway = Runway {
            id: "09".to_string(),
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(8000.0, 0.0),
            heading: 90.0,
            length: 8000.0,
        };
        let [a, b, c, d] = runway_outline(&runway);
        assert_abs_diff_eq!(distance(a, d), RUNWAY_WIDTH_FT, epsilon = 1e-9);
        assert_abs_diff_eq!(distance(a, b), 8000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(distance(b, c), RUNWAY_WIDTH_FT, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_runway_uses_heading() {
        let runway = Runway {
            id: "36".to_string(),
            start: Vec2::new(10.0, 10.0),
            end: Vec2::new(10.0, 10.0),
            heading: 0.0,
            length: 0.0,
        };
        let [a, _, _, d] = runway_outline(&runway);
        assert_abs_diff_eq!(distance(a, d), RUNWAY_WIDTH_FT, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, 10.0, epsilon = 1e-9);
    }
}
