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

//! Application configuration management.
//!
//! Preferences are stored in TOML through `confy`. Every field has a serde
//! default, so a missing key (or a missing file) always means "use the
//! default" and never an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::radar::ViewMode;

const APP_NAME: &str = "atc-scope";
const CONFIG_NAME: &str = "config";

/// Default simulation server address
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Smallest refresh or poll interval accepted from the config file
const MIN_INTERVAL_MS: u64 = 16;

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Base URL of the simulation server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Airport the controller is responsible for (empty = first airport in the world)
    #[serde(default)]
    pub home_airport: String,

    /// Active radio frequency in MHz
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// Quick-select frequency slots
    #[serde(default = "default_frequency_presets")]
    pub frequency_presets: Vec<f64>,

    /// View mode restored at startup
    #[serde(default)]
    pub view_mode: ViewMode,

    /// Scene refresh interval in tower view (ms)
    #[serde(default = "default_tower_refresh_ms")]
    pub tower_refresh_ms: u64,

    /// Scene refresh interval in ground view (ms)
    #[serde(default = "default_ground_refresh_ms")]
    pub ground_refresh_ms: u64,

    /// Aircraft poll interval in tower view (ms)
    #[serde(default = "default_tower_poll_ms")]
    pub tower_poll_ms: u64,

    /// Aircraft poll interval in ground view (ms)
    #[serde(default = "default_ground_poll_ms")]
    pub ground_poll_ms: u64,

    /// Paint at 30 Hz instead of 60 Hz
    #[serde(default)]
    pub low_power: bool,

    /// Pointer travel (px) still treated as a click. 0 = exact position match.
    #[serde(default)]
    pub click_slop_px: f64,

    /// Strip board panel width in pixels
    #[serde(default = "default_strip_panel_width")]
    pub strip_panel_width: f32,

    /// Show the frame-rate counter
    #[serde(default = "default_true")]
    pub show_fps: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_frequency() -> f64 {
    118.6
}

fn default_frequency_presets() -> Vec<f64> {
    vec![118.6, 121.8, 124.35, 135.65]
}

fn default_tower_refresh_ms() -> u64 {
    1000
}

fn default_ground_refresh_ms() -> u64 {
    250
}

fn default_tower_poll_ms() -> u64 {
    1000
}

fn default_ground_poll_ms() -> u64 {
    500
}

fn default_strip_panel_width() -> f32 {
    320.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            server_url: default_server_url(),
            home_airport: String::new(),
            frequency: default_frequency(),
            frequency_presets: default_frequency_presets(),
            view_mode: ViewMode::default(),
            tower_refresh_ms: default_tower_refresh_ms(),
            ground_refresh_ms: default_ground_refresh_ms(),
            tower_poll_ms: default_tower_poll_ms(),
            ground_poll_ms: default_ground_poll_ms(),
            low_power: false,
            click_slop_px: 0.0,
            strip_panel_width: default_strip_panel_width(),
            show_fps: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        Ok(config.sanitized())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Clamp hand-edited values back into a usable range
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for interval in [
            &mut self.tower_refresh_ms,
            &mut self.ground_refresh_ms,
            &mut self.tower_poll_ms,
            &mut self.ground_poll_ms,
        ] {
            *interval = (*interval).max(MIN_INTERVAL_MS);
        }

        if !self.click_slop_px.is_finite() || self.click_slop_px < 0.0 {
            self.click_slop_px = 0.0;
        }

        self.frequency_presets.retain(|f| f.is_finite() && *f > 0.0);
        if self.frequency_presets.is_empty() {
            self.frequency_presets = default_frequency_presets();
        }

        if self.server_url.trim().is_empty() {
            self.server_url = default_server_url();
        }

        self
    }

    /// Scene refresh interval for `mode`
    #[must_use]
    pub fn refresh_interval(&self, mode: ViewMode) -> Duration {
        Duration::from_millis(match mode {
            ViewMode::Tower => self.tower_refresh_ms,
            ViewMode::Ground => self.ground_refresh_ms,
        })
    }

    /// Aircraft poll interval for `mode`
    #[must_use]
    pub fn poll_interval(&self, mode: ViewMode) -> Duration {
        Duration::from_millis(match mode {
            ViewMode::Tower => self.tower_poll_ms,
            ViewMode::Ground => self.ground_poll_ms,
        })
    }

    /// Paint tick length
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        if self.low_power {
            Duration::from_micros(33_333)
        } else {
            Duration::from_micros(16_667)
        }
    }
}

/// Values given on the command line. They apply to this session only and
/// are not written back unless the user changes them again in the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOverrides {
    pub server_url: Option<String>,
    pub home_airport: Option<String>,
    pub view_mode: Option<ViewMode>,
    pub low_power: Option<bool>,
}

impl SessionOverrides {
    /// Effective configuration for this session
    #[must_use]
    pub fn apply(&self, config: &AppConfig) -> AppConfig {
        let mut session = config.clone();
        if let Some(url) = &self.server_url {
            session.server_url.clone_from(url);
        }
        if let Some(home) = &self.home_airport {
            session.home_airport.clone_from(home);
        }
        if let Some(mode) = self.view_mode {
            session.view_mode = mode;
        }
        if let Some(low_power) = self.low_power {
            session.low_power = low_power;
        }
        session.sanitized()
    }

    /// Configuration to store on exit: the session state, except that fields
    /// still holding their override value keep what was on disk.
    #[must_use]
    pub fn persistable(&self, session: &AppConfig, on_disk: &AppConfig) -> AppConfig {
        let mut stored = session.clone();
        if self.server_url.as_ref() == Some(&session.server_url) {
            stored.server_url.clone_from(&on_disk.server_url);
        }
        if self.home_airport.as_ref() == Some(&session.home_airport) {
            stored.home_airport.clone_from(&on_disk.home_airport);
        }
        if self.view_mode == Some(session.view_mode) {
            stored.view_mode = on_disk.view_mode;
        }
        if self.low_power == Some(session.low_power) {
            stored.low_power = on_disk.low_power;
        }
        stored
    }
}
