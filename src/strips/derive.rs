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

//! Aircraft record to flight strip.
//!
//! Everything here is a pure function of one aircraft and a
//! [`StripContext`]; nothing is cached between calls.

use atc_feed::model::{FlightSegment, Waypoint};
use atc_feed::{Aircraft, AircraftState, Vec2};

use crate::geometry::{distance, feet_to_nm, path_length};

/// Shown when no time to go can be computed
pub const NO_TIMER: &str = "--:--";

/// Which board section an aircraft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripStatus {
    Inbound,
    Approach,
    Landing,
    Parked,
    Ground,
    Takeoff,
    Departure,
    Outbound,
    /// Not ours, but currently selected on the scope.
    Selected,
    /// Not shown on the board.
    None,
}

impl StripStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Approach => "Approach",
            Self::Landing => "Landing",
            Self::Parked => "Parked",
            Self::Ground => "Ground",
            Self::Takeoff => "Takeoff",
            Self::Departure => "Departure",
            Self::Outbound => "Outbound",
            Self::Selected => "Selected",
            Self::None => "",
        }
    }
}

/// Controller-side facts the derivation needs besides the aircraft itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripContext<'a> {
    /// Airport the controller works. Empty matches nothing.
    pub home_airport: &'a str,
    /// Reference point for the distance label when an aircraft has no route.
    pub home_center: Option<Vec2>,
    pub selected: Option<&'a str>,
}

/// Display record for one aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftStrip {
    pub callsign: String,
    /// `"12.3NM"`, or empty outside flying/landing.
    pub distance: String,
    pub arriving: String,
    pub departing: String,
    pub top_status: String,
    pub bottom_status: String,
    pub frequency: f64,
    /// `mm:ss` to go or [`NO_TIMER`].
    pub timer: String,
    pub status: StripStatus,
}

/// Board section for `aircraft`. First matching rule wins.
#[must_use]
pub fn derive_status(aircraft: &Aircraft, context: &StripContext<'_>) -> StripStatus {
    let home = context.home_airport;
    if aircraft.accepted && !home.is_empty() {
        let plan = &aircraft.flight_plan;
        let arriving = plan.arriving == home;
        let departing = plan.departing == home;

        if arriving || departing {
            match aircraft.state {
                AircraftState::Parked { .. } => return StripStatus::Parked,
                AircraftState::Taxiing { .. } => return StripStatus::Ground,
                AircraftState::Flying { .. } | AircraftState::Landing { .. } => {}
            }
        }

        if departing {
            match aircraft.segment {
                FlightSegment::Takeoff => return StripStatus::Takeoff,
                FlightSegment::Departure | FlightSegment::Climb => return StripStatus::Departure,
                FlightSegment::Cruise => return StripStatus::Outbound,
                _ => {}
            }
        }

        if arriving {
            if aircraft.segment == FlightSegment::Landing || aircraft.is_landing() {
                return StripStatus::Landing;
            }
            if aircraft.segment == FlightSegment::Approach {
                return StripStatus::Approach;
            }
            return StripStatus::Inbound;
        }
    }

    if context.selected == Some(aircraft.id.as_str()) {
        StripStatus::Selected
    } else {
        StripStatus::None
    }
}

/// Feet left to fly: the remaining route while flying, or the straight line
/// to the threshold while landing.
///
/// The filed plan only counts while the aircraft follows it. An aircraft on
/// vectors is measured along its own waypoints instead.
#[must_use]
pub fn remaining_distance_ft(aircraft: &Aircraft) -> Option<f64> {
    let feet = match &aircraft.state {
        AircraftState::Flying { waypoints } => {
            let plan = &aircraft.flight_plan;
            let planned: &[Waypoint] = if plan.follow { plan.remaining() } else { &[] };
            let route: Vec<Vec2> = if planned.is_empty() {
                waypoints.clone()
            } else {
                planned.iter().map(|wp| wp.pos).collect()
            };
            if route.is_empty() {
                return None;
            }
            Some(path_length(aircraft.pos, route))
        }
        AircraftState::Landing { runway, .. } => Some(distance(aircraft.pos, runway.start)),
        AircraftState::Taxiing { .. } | AircraftState::Parked { .. } => None,
    };
    feet.filter(|feet| feet.is_finite())
}

/// `mm:ss` to cover `distance_nm` at `speed_kt`.
#[must_use]
pub fn format_timer(distance_nm: f64, speed_kt: f64) -> String {
    if !distance_nm.is_finite() || !speed_kt.is_finite() || distance_nm < 0.0 || speed_kt <= 0.0 {
        return NO_TIMER.to_string();
    }
    let seconds = (distance_nm / speed_kt * 3600.0).round();
    if !seconds.is_finite() || seconds > f64::from(u32::MAX) {
        return NO_TIMER.to_string();
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "checked finite, non-negative and in range above"
    )]
    let seconds = seconds as u64;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn format_distance(feet: f64) -> String {
    format!("{:.1}NM", feet_to_nm(feet))
}

fn next_waypoint(aircraft: &Aircraft) -> Option<&Waypoint> {
    aircraft.flight_plan.remaining().first()
}

/// Phase-specific top and bottom lines of a strip.
#[must_use]
pub fn status_text(aircraft: &Aircraft) -> (String, String) {
    match &aircraft.state {
        AircraftState::Landing { runway, .. } => ("ILS".to_string(), runway.id.clone()),
        AircraftState::Taxiing { waypoints } => match waypoints.first() {
            Some(node) => (node.kind.code().to_string(), node.name.clone()),
            None => (aircraft.segment.code().to_string(), String::new()),
        },
        AircraftState::Parked { at } => ("PARK".to_string(), at.id.clone()),
        AircraftState::Flying { .. } => (
            aircraft.segment.code().to_string(),
            next_waypoint(aircraft).map(|wp| wp.name.clone()).unwrap_or_default(),
        ),
    }
}

/// Build the full strip for `aircraft`.
#[must_use]
pub fn derive_strip(aircraft: &Aircraft, context: &StripContext<'_>) -> AircraftStrip {
    let remaining = remaining_distance_ft(aircraft);
    let timer = remaining.map_or_else(
        || NO_TIMER.to_string(),
        |feet| format_timer(feet_to_nm(feet), aircraft.speed),
    );

    let distance_label = match aircraft.state {
        AircraftState::Flying { .. } | AircraftState::Landing { .. } => remaining
            .or_else(|| {
                context
                    .home_center
                    .map(|center| distance(aircraft.pos, center))
                    .filter(|feet| feet.is_finite())
            })
            .map(format_distance)
            .unwrap_or_default(),
        AircraftState::Taxiing { .. } | AircraftState::Parked { .. } => String::new(),
    };

    let (top_status, bottom_status) = status_text(aircraft);

    AircraftStrip {
        callsign: aircraft.id.clone(),
        distance: distance_label,
        arriving: aircraft.flight_plan.arriving.clone(),
        departing: aircraft.flight_plan.departing.clone(),
        top_status,
        bottom_status,
        frequency: aircraft.frequency,
        timer,
        status: derive_status(aircraft, context),
    }
}
