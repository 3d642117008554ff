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

//! Static world topology: airspaces, airports and en-route fixes.
//!
//! The world is fetched once per session and assumed not to change.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// Named en-route fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub pos: Vec2,
}

/// Runway described by its two thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    /// Designator, e.g. `28L`.
    pub id: String,
    /// Landing threshold for this direction.
    pub start: Vec2,
    /// Far end.
    pub end: Vec2,
    /// Magnetic heading of the runway in degrees.
    pub heading: f64,
    /// Length in feet.
    pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxiwayKind {
    #[default]
    Normal,
    HoldShort,
    Apron,
}

/// Straight taxiway segment between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxiway {
    pub id: String,
    pub a: Vec2,
    pub b: Vec2,
    #[serde(default)]
    pub kind: TaxiwayKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    pub pos: Vec2,
    pub heading: f64,
}

/// Terminal building outline (four corners) with its apron edge and gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: String,
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub d: Vec2,
    pub apron: (Vec2, Vec2),
    #[serde(default)]
    pub gates: Vec<Gate>,
}

impl Terminal {
    #[must_use]
    pub fn outline(&self) -> [Vec2; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub center: Vec2,
    #[serde(default)]
    pub runways: Vec<Runway>,
    #[serde(default)]
    pub taxiways: Vec<Taxiway>,
    #[serde(default)]
    pub terminals: Vec<Terminal>,
}

/// Controlled airspace: a circle around one or more airports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airspace {
    pub id: String,
    pub pos: Vec2,
    /// Radius in feet.
    pub radius: f64,
    #[serde(default)]
    pub airports: Vec<Airport>,
}

/// Complete world topology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub airspaces: Vec<Airspace>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl World {
    /// Find an airport by id across all airspaces.
    #[must_use]
    pub fn airport(&self, id: &str) -> Option<&Airport> {
        self.airspaces
            .iter()
            .flat_map(|airspace| airspace.airports.iter())
            .find(|airport| airport.id == id)
    }

    /// Airspace that contains the airport `id`.
    #[must_use]
    pub fn airspace_of(&self, airport_id: &str) -> Option<&Airspace> {
        self.airspaces
            .iter()
            .find(|airspace| airspace.airports.iter().any(|a| a.id == airport_id))
    }
}
