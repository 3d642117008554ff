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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arrival/departure/automation flags for one airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportStatus {
    pub arrivals: bool,
    pub departures: bool,
    pub automate: bool,
}

/// One line of radio traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioMessage {
    pub id: u64,
    pub frequency: f64,
    /// Callsign or `ATC`.
    pub speaker: String,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}
