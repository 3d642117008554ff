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

//! Radar scope: projection, interaction state and the paint pipeline.

pub mod canvas;
pub mod render;
pub mod scheduler;
pub mod transform;
pub mod view;

use serde::{Deserialize, Serialize};

pub use canvas::EguiCanvas;
pub use render::RenderPipeline;
pub use view::{PointerRelease, ViewPreset, ViewState};

/// Which scope the controller is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Airspace scale, airborne traffic.
    #[default]
    Tower,
    /// Airport surface, taxiing and parked traffic.
    Ground,
}

impl ViewMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tower => "Tower",
            Self::Ground => "Ground",
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use atc_feed::{Aircraft, AircraftState, Vec2};
    use atc_feed::model::{FlightPlan, FlightSegment, Target};

    /// Accepted, airborne-or-ground aircraft with no flight plan.
    pub fn aircraft_at(id: &str, pos: Vec2, altitude: f64) -> Aircraft {
        Aircraft {
            id: id.to_string(),
            pos,
            heading: 90.0,
            speed: 180.0,
            altitude,
            target: Target::default(),
            state: AircraftState::Flying { waypoints: Vec::new() },
            flight_plan: FlightPlan::default(),
            frequency: 118.6,
            accepted: true,
            segment: FlightSegment::Cruise,
            is_colliding: false,
        }
    }
}
