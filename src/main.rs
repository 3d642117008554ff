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

mod app;
mod comms;
mod config;
mod geometry;
mod radar;
mod status;
mod status_pane;
mod strips;

use clap::Parser;
use log::{info, warn};

use crate::config::{AppConfig, SessionOverrides};
use crate::radar::ViewMode;

/// Radar scope and flight strip board for an ATC simulation server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Simulation server base URL (overrides the config file for this session)
    #[arg(long)]
    server: Option<String>,

    /// Home airport id
    #[arg(long)]
    home: Option<String>,

    /// Start in ground view
    #[arg(long)]
    ground: bool,

    /// Paint at 30 Hz
    #[arg(long)]
    low_power: bool,

    /// Log filter, e.g. `debug` or `atc_scope=debug,atc_feed=info`
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn overrides(&self) -> SessionOverrides {
        SessionOverrides {
            server_url: self.server.clone(),
            home_airport: self.home.clone(),
            view_mode: self.ground.then_some(ViewMode::Ground),
            low_power: self.low_power.then_some(true),
        }
    }
}

fn main() -> eframe::Result {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting ATC Scope...");

    let on_disk = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::config_path() {
        info!("Config file: {}", path.display());
    }
    let overrides = cli.overrides();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("ATC Scope"),
        ..Default::default()
    };

    eframe::run_native(
        "ATC Scope",
        options,
        Box::new(move |cc| Ok(Box::new(app::RadarApp::new(cc, on_disk, overrides)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_become_overrides() {
        let cli = Cli::parse_from(["atc-scope", "--home", "KOAK", "--ground"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.home_airport.as_deref(), Some("KOAK"));
        assert_eq!(overrides.view_mode, Some(ViewMode::Ground));
        assert_eq!(overrides.low_power, None);
        assert_eq!(overrides.server_url, None);
    }
}
