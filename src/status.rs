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

use std::collections::VecDeque;

use atc_feed::{FeedState, World};
use chrono::{DateTime, Utc};

/// Connection status for the simulation feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
}

impl From<&FeedState> for ConnectionStatus {
    fn from(state: &FeedState) -> Self {
        match state {
            FeedState::Connecting => Self::Connecting,
            FeedState::Connected => Self::Connected,
            FeedState::Error(_) => Self::Error,
        }
    }
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Feed, data and frame statistics shown in the status pane
#[derive(Debug, Clone)]
pub struct SystemStatus {
    // Connection
    pub connection_status: ConnectionStatus,
    pub server_url: String,
    pub last_error: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub last_snapshot_at: Option<DateTime<Utc>>,

    // World topology
    pub world_loaded: bool,
    pub airspaces_loaded: usize,
    pub airports_loaded: usize,
    pub runways_loaded: usize,

    // Traffic
    pub aircraft_total: usize,
    pub conflicts: usize,
    pub strips_on_board: usize,

    // Diagnostic messages (keep last 50)
    pub diagnostics: VecDeque<DiagnosticMessage>,
    max_diagnostics: usize,

    // Performance metrics
    pub last_frame_ms: f64,
    pub average_frame_ms: f64,
}

impl SystemStatus {
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            connection_status: ConnectionStatus::Connecting,
            server_url: server_url.into(),
            last_error: None,
            connected_at: None,
            last_snapshot_at: None,

            world_loaded: false,
            airspaces_loaded: 0,
            airports_loaded: 0,
            runways_loaded: 0,

            aircraft_total: 0,
            conflicts: 0,
            strips_on_board: 0,

            diagnostics: VecDeque::with_capacity(50),
            max_diagnostics: 50,

            last_frame_ms: 0.0,
            average_frame_ms: 0.0,
        }
    }

    /// Track the poller's feed state. Only transitions are logged.
    pub fn observe_feed(&mut self, state: &FeedState) {
        let status = ConnectionStatus::from(state);
        let error = match state {
            FeedState::Error(message) => Some(message.clone()),
            FeedState::Connecting | FeedState::Connected => None,
        };
        if status == self.connection_status && error == self.last_error {
            return;
        }

        self.connection_status = status;
        match status {
            ConnectionStatus::Connected => {
                self.connected_at = Some(Utc::now());
                self.add_diagnostic(DiagnosticLevel::Info,
                    format!("Connected to {}", self.server_url));
            }
            ConnectionStatus::Connecting => {
                self.connected_at = None;
                self.add_diagnostic(DiagnosticLevel::Info,
                    format!("Connecting to {}...", self.server_url));
            }
            ConnectionStatus::Error => {
                self.connected_at = None;
                if let Some(message) = &error {
                    self.add_diagnostic(DiagnosticLevel::Error,
                        format!("Feed error: {message}"));
                }
            }
        }
        self.last_error = error;
    }

    /// Record topology counts the first time the world arrives
    pub fn set_world(&mut self, world: &World) {
        if self.world_loaded {
            return;
        }
        let airports = world.airspaces.iter().flat_map(|a| a.airports.iter());
        self.world_loaded = true;
        self.airspaces_loaded = world.airspaces.len();
        self.airports_loaded = airports.clone().count();
        self.runways_loaded = airports.map(|a| a.runways.len()).sum();
        self.add_diagnostic(DiagnosticLevel::Info,
            format!("World loaded: {} airspaces, {} airports, {} runways",
                self.airspaces_loaded, self.airports_loaded, self.runways_loaded));
    }

    /// Update traffic counts from the latest snapshot
    pub fn update_traffic(&mut self, total: usize, conflicts: usize, fetched_at: DateTime<Utc>) {
        if conflicts > 0 && self.conflicts == 0 {
            self.add_diagnostic(DiagnosticLevel::Warning,
                format!("{conflicts} aircraft in conflict"));
        }
        self.aircraft_total = total;
        self.conflicts = conflicts;
        self.last_snapshot_at = Some(fetched_at);
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        self.diagnostics.push_back(DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        });

        // Keep only the last N messages
        while self.diagnostics.len() > self.max_diagnostics {
            self.diagnostics.pop_front();
        }
    }

    /// Seconds since the connection came up
    #[must_use]
    pub fn uptime_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.connected_at
            .filter(|_| self.connection_status == ConnectionStatus::Connected)
            .and_then(|connected| u64::try_from((now - connected).num_seconds()).ok())
            .unwrap_or(0)
    }

    /// Age of the aircraft snapshot in seconds
    #[must_use]
    pub fn snapshot_age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_snapshot_at.map(|at| (now - at).num_seconds().max(0))
    }

    /// Update frame time metrics
    pub fn update_performance(&mut self, duration_ms: f64) {
        const ALPHA: f64 = 0.1; // Smoothing factor

        self.last_frame_ms = duration_ms;
        if self.average_frame_ms == 0.0 {
            self.average_frame_ms = duration_ms;
        } else {
            self.average_frame_ms = ALPHA * duration_ms + (1.0 - ALPHA) * self.average_frame_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_feed_transitions_logged_once() {
        let mut status = SystemStatus::new("http://localhost:3000");
        status.observe_feed(&FeedState::Connecting);
        assert!(status.diagnostics.is_empty());

        status.observe_feed(&FeedState::Connected);
        status.observe_feed(&FeedState::Connected);
        assert_eq!(status.diagnostics.len(), 1);
        assert_eq!(status.connection_status, ConnectionStatus::Connected);
        assert!(status.connected_at.is_some());

        status.observe_feed(&FeedState::Error("timeout".to_string()));
        status.observe_feed(&FeedState::Error("timeout".to_string()));
        status.observe_feed(&FeedState::Error("refused".to_string()));
        assert_eq!(status.diagnostics.len(), 3);
        assert_eq!(status.diagnostics.back().map(|d| d.level), Some(DiagnosticLevel::Error));
        assert_eq!(status.last_error.as_deref(), Some("refused"));
        assert_eq!(status.uptime_seconds(Utc::now()), 0);
    }

    #[test]
    fn test_diagnostics_capped() {
        let mut status = SystemStatus::new("http://localhost:3000");
        for i in 0..80 {
            status.add_diagnostic(DiagnosticLevel::Info, format!("message {i}"));
        }
        assert_eq!(status.diagnostics.len(), 50);
        assert_eq!(status.diagnostics.front().map(|d| d.message.as_str()), Some("message 30"));
    }

    #[test]
    fn test_world_counts_recorded_once() {
        let world: World = serde_json::from_str(r#"{
            "airspaces": [{
                "id": "NORCAL", "pos": [0.0, 0.0], "radius": 1000.0,
                "airports": [
                    { "id": "KSFO", "center": [0.0, 0.0], "runways": [
                        { "id": "28L", "start": [0.0, 0.0], "end": [1.0, 0.0], "heading": 280.0, "length": 1.0 }
                    ], "taxiways": [], "terminals": [] },
                    { "id": "KOAK", "center": [5.0, 5.0], "runways": [], "taxiways": [], "terminals": [] }
                ]
            }],
            "waypoints": []
        }"#).unwrap();

        let mut status = SystemStatus::new("http://localhost:3000");
        status.set_world(&world);
        status.set_world(&world);
        assert_eq!((status.airspaces_loaded, status.airports_loaded, status.runways_loaded), (1, 2, 1));
        assert_eq!(status.diagnostics.len(), 1);
    }

    #[test]
    fn test_performance_moving_average() {
        let mut status = SystemStatus::new("http://localhost:3000");
        status.update_performance(10.0);
        assert_abs_diff_eq!(status.average_frame_ms, 10.0);
        status.update_performance(20.0);
        assert_abs_diff_eq!(status.average_frame_ms, 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(status.last_frame_ms, 20.0);
    }

    #[test]
    fn test_conflict_warning_on_rising_edge() {
        let mut status = SystemStatus::new("http://localhost:3000");
        let now = Utc::now();
        status.update_traffic(5, 2, now);
        status.update_traffic(5, 2, now);
        assert_eq!(status.diagnostics.len(), 1);
        assert_eq!(status.snapshot_age_seconds(now), Some(0));
    }
}
