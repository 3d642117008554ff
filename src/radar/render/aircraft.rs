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

//! Aircraft blips and data tags, shared by both scopes.

use atc_feed::{Aircraft, Vec2};
use egui::Color32;
use log::debug;

use super::{palette, px, Scene};
use crate::geometry::{move_point, nm_to_feet};
use crate::radar::canvas::Canvas;

/// Radius of the separation ring around conflicting aircraft
pub const SEPARATION_RING_NM: f64 = 3.0;

/// Frequencies closer than this are the same channel (MHz)
const FREQUENCY_EPSILON: f64 = 0.001;

const BLIP_RADIUS: f32 = 4.0;
const LEADER_LINE_PX: f64 = 18.0;

/// Colour class of a blip. Earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlipStyle {
    Selected,
    Colliding,
    InactiveFrequency,
    Active,
}

impl BlipStyle {
    #[must_use]
    pub fn color(self) -> Color32 {
        match self {
            Self::Selected => palette::SELECTED,
            Self::Colliding => palette::CONFLICT,
            Self::InactiveFrequency => palette::INACTIVE,
            Self::Active => palette::ACTIVE,
        }
    }
}

#[must_use]
pub fn same_frequency(a: f64, b: f64) -> bool {
    (a - b).abs() < FREQUENCY_EPSILON
}

/// Pick the style for `aircraft` given the current selection and the
/// controller's tuned frequency.
#[must_use]
pub fn blip_style(aircraft: &Aircraft, selected: Option<&str>, active_frequency: f64) -> BlipStyle {
    if selected == Some(aircraft.id.as_str()) {
        BlipStyle::Selected
    } else if aircraft.is_colliding {
        BlipStyle::Colliding
    } else if !same_frequency(aircraft.frequency, active_frequency) {
        BlipStyle::InactiveFrequency
    } else {
        BlipStyle::Active
    }
}

/// Altitude in hundreds, heading, ground speed: `080 270 250`.
#[must_use]
pub fn data_tag(aircraft: &Aircraft) -> String {
    format!(
        "{:03.0} {:03.0} {:.0}",
        (aircraft.altitude / 100.0).max(0.0),
        aircraft.heading.rem_euclid(360.0),
        aircraft.speed.max(0.0),
    )
}

/// Numbers the blip depends on are all finite.
fn is_drawable(aircraft: &Aircraft) -> bool {
    aircraft.pos.is_finite()
        && aircraft.heading.is_finite()
        && aircraft.altitude.is_finite()
        && aircraft.speed.is_finite()
}

/// Draw one aircraft. Returns `false` when the record was skipped.
pub(super) fn draw_blip(canvas: &mut dyn Canvas, scene: &Scene<'_>, aircraft: &Aircraft) -> bool {
    if !is_drawable(aircraft) {
        debug!("Skipping aircraft {} with non-finite kinematics", aircraft.id);
        return false;
    }

    let transform = scene.transform;
    let style = blip_style(aircraft, scene.selected, scene.active_frequency);
    let color = style.color();
    let center = transform.world_to_screen(aircraft.pos);

    if aircraft.is_colliding {
        let radius = transform.feet_to_pixels(nm_to_feet(SEPARATION_RING_NM));
        canvas.circle_stroke(center, px(radius), 1.5, palette::CONFLICT);
    }

    let leader_ft = transform.pixels_to_feet(LEADER_LINE_PX);
    let tip = transform.world_to_screen(move_point(aircraft.pos, aircraft.heading, leader_ft));
    canvas.line(center, tip, 1.5, color);
    canvas.circle_filled(center, BLIP_RADIUS, color);

    let tag_pos = center + Vec2::new(10.0, -8.0);
    canvas.label(tag_pos, &aircraft.id, 11.0, color);

    let annotate = style == BlipStyle::Selected
        || same_frequency(aircraft.frequency, scene.active_frequency);
    if annotate {
        canvas.label(tag_pos + Vec2::new(0.0, 14.0), &data_tag(aircraft), 10.0, palette::TAG_TEXT);
    }
    true
}
