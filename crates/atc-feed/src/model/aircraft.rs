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

//! Aircraft snapshot records.

use serde::{Deserialize, Serialize};

use super::world::{Gate, Runway, Waypoint};
use super::Vec2;

/// Coarse flight phase tag reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightSegment {
    Dormant,
    Boarding,
    Parking,
    Push,
    TaxiDep,
    Takeoff,
    Departure,
    Climb,
    Cruise,
    Arrival,
    Approach,
    Landing,
    TaxiArr,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FlightSegment {
    /// Four-letter-ish code shown on a flight strip.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Dormant => "DORM",
            Self::Boarding => "BORD",
            Self::Parking => "PARK",
            Self::Push => "PUSH",
            Self::TaxiDep => "TXO",
            Self::Takeoff => "TKOF",
            Self::Departure => "DEP",
            Self::Climb => "CLB",
            Self::Cruise => "CRZ",
            Self::Arrival => "ARR",
            Self::Approach => "APP",
            Self::Landing => "LAND",
            Self::TaxiArr => "TXI",
            Self::Unknown => "----",
        }
    }
}

/// Sub-state of an aircraft established on a landing procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandingState {
    BeforeTurn,
    Turning,
    GoAround,
    Correcting,
    Localizer,
    Glideslope,
    Touchdown,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Kind of node along a taxi route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Taxiway,
    Runway,
    HoldShort,
    Gate,
    Apron,
}

impl NodeKind {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Taxiway => "TXWY",
            Self::Runway => "RWY",
            Self::HoldShort => "HOLD",
            Self::Gate => "GATE",
            Self::Apron => "APRN",
        }
    }
}

/// One node along a taxi route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiNode {
    pub kind: NodeKind,
    pub name: String,
    pub pos: Vec2,
}

/// What the aircraft is doing right now, with the payload that state needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AircraftState {
    /// Airborne, optionally following a list of direct-to fixes.
    Flying { waypoints: Vec<Vec2> },
    /// Established on (or intercepting) a runway procedure.
    Landing { runway: Runway, state: LandingState },
    /// Moving on the ground along a taxi route.
    Taxiing { waypoints: Vec<TaxiNode> },
    /// Stationary at a gate.
    Parked { at: Gate },
}

/// Autopilot targets the aircraft is currently flying towards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub heading: f64,
    pub speed: f64,
    pub altitude: f64,
    pub runway: Option<String>,
}

/// Filed flight plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightPlan {
    /// Airport id of origin.
    pub departing: String,
    /// Airport id of destination.
    pub arriving: String,
    /// Whether the aircraft is navigating along `waypoints`.
    pub follow: bool,
    pub waypoints: Vec<Waypoint>,
    /// Index of the next waypoint to fly to.
    pub waypoint_index: usize,
}

impl FlightPlan {
    /// Waypoints not yet passed.
    #[must_use]
    pub fn remaining(&self) -> &[Waypoint] {
        self.waypoints
            .get(self.waypoint_index..)
            .unwrap_or_default()
    }
}

/// A single aircraft as seen in the latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Callsign, unique within a snapshot.
    pub id: String,
    /// Position in world feet.
    pub pos: Vec2,
    /// True heading in degrees (0 = north, clockwise).
    pub heading: f64,
    /// Ground speed in knots.
    pub speed: f64,
    /// Altitude in feet.
    pub altitude: f64,
    #[serde(default)]
    pub target: Target,
    pub state: AircraftState,
    #[serde(default)]
    pub flight_plan: FlightPlan,
    /// Radio frequency the aircraft is tuned to (MHz).
    #[serde(default)]
    pub frequency: f64,
    /// Whether a controller has accepted the handoff.
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub segment: FlightSegment,
    #[serde(default)]
    pub is_colliding: bool,
}

impl Aircraft {
    #[must_use]
    pub fn is_parked(&self) -> bool {
        matches!(self.state, AircraftState::Parked { .. })
    }

    #[must_use]
    pub fn is_taxiing(&self) -> bool {
        matches!(self.state, AircraftState::Taxiing { .. })
    }

    #[must_use]
    pub fn is_landing(&self) -> bool {
        matches!(self.state, AircraftState::Landing { .. })
    }

    /// True when the aircraft is at or below `ceiling_ft`.
    #[must_use]
    pub fn is_on_ground(&self, ceiling_ft: f64) -> bool {
        self.altitude <= ceiling_ft
    }

    /// Whether this aircraft departs from or arrives at `airport`.
    #[must_use]
    pub fn involves_airport(&self, airport: &str) -> bool {
        self.flight_plan.departing == airport || self.flight_plan.arriving == airport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLYING: &str = r#"{
        "id": "SKW2841",
        "pos": [1200.0, -5400.0],
        "heading": 270.0,
        "speed": 250.0,
        "altitude": 8000.0,
        "state": { "type": "flying", "value": { "waypoints": [[0.0, 0.0]] } },
        "flight_plan": {
            "departing": "KSFO",
            "arriving": "KLAX",
            "follow": true,
            "waypoints": [{ "name": "SUNOL", "pos": [10.0, 20.0] }],
            "waypoint_index": 0
        },
        "frequency": 118.5,
        "accepted": true,
        "segment": "climb"
    }"#;

    #[test]
    fn test_decode_flying_aircraft() {
        let aircraft: Aircraft = serde_json::from_str(FLYING).unwrap();
        assert_eq!(aircraft.id, "SKW2841");
        assert_eq!(aircraft.segment, FlightSegment::Climb);
        assert!(!aircraft.is_colliding);
        assert_eq!(
            aircraft.state,
            AircraftState::Flying { waypoints: vec![Vec2::ZERO] }
        );
        assert_eq!(aircraft.flight_plan.remaining().len(), 1);
    }

    #[test]
    fn test_unknown_segment_decodes() {
        let seg: FlightSegment = serde_json::from_str("\"hyperspace\"").unwrap();
        assert_eq!(seg, FlightSegment::Unknown);
        assert_eq!(seg.code(), "----");
    }

    #[test]
    fn test_missing_state_payload_is_an_error() {
        let broken = r#"{ "id": "X", "pos": [0.0, 0.0], "heading": 0.0, "speed": 0.0,
                          "altitude": 0.0, "state": { "type": "parked" } }"#;
        assert!(serde_json::from_str::<Aircraft>(broken).is_err());
    }

    #[test]
    fn test_remaining_past_end_is_empty() {
        let plan = FlightPlan {
            waypoint_index: 4,
            ..Default::default()
        };
        assert!(plan.remaining().is_empty());
    }
}
