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

use atc_feed::model::AirportStatus;
use chrono::Utc;

use crate::status::{ConnectionStatus, DiagnosticLevel, SystemStatus};

const LABEL: egui::Color32 = egui::Color32::from_rgb(130, 130, 130);
const VALUE: egui::Color32 = egui::Color32::from_rgb(200, 200, 200);
const SECTION: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);

#[derive(Debug)]
pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl Default for StatusPane {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPane {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            collapsed: false,
        }
    }

    /// Render the status pane as a floating window
    pub fn render(
        &mut self,
        ctx: &egui::Context,
        status: &SystemStatus,
        airport: Option<(&str, AirportStatus)>,
    ) {
        if !self.visible {
            // Show a small button to re-open the status pane when hidden
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
                .fixed_size(egui::vec2(140.0, 35.0))
                .resizable(false)
                .frame(egui::Frame::window(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 200))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                    .corner_radius(6.0))
                .show(ctx, |ui| {
                    if ui.button(egui::RichText::new("📊 Show Status")
                        .color(egui::Color32::from_rgb(150, 200, 220))
                        .size(11.0))
                        .clicked() {
                        self.visible = true;
                    }
                });
            return;
        }

        let screen_height = ctx.content_rect().height();

        egui::Window::new("Feed Status")
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
            .fixed_size(egui::vec2(260.0, if self.collapsed { 40.0 } else { screen_height.min(420.0) }))
            .resizable(false)
            .collapsible(false)
            .frame(egui::Frame::window(&ctx.style())
                .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                .corner_radius(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("◈ STATUS")
                        .color(egui::Color32::from_rgb(100, 180, 220))
                        .size(12.0)
                        .strong());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(egui::RichText::new("✕")
                            .size(12.0)
                            .color(egui::Color32::from_rgb(200, 100, 100)))
                            .on_hover_text("Hide status pane")
                            .clicked() {
                            self.visible = false;
                        }

                        ui.add_space(4.0);

                        let collapse_icon = if self.collapsed { "▼" } else { "▲" };
                        if ui.button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked() {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                if self.collapsed {
                    return;
                }

                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(screen_height.min(380.0))
                    .show(ui, |ui| {
                        Self::render_connection_section(ui, status);
                        ui.add_space(6.0);
                        Self::render_traffic_section(ui, status, airport);
                        ui.add_space(6.0);
                        Self::render_performance_section(ui, status);
                        ui.add_space(6.0);
                        Self::render_diagnostics_section(ui, status);
                    });
            });
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.label(egui::RichText::new(title)
            .color(SECTION)
            .size(9.0)
            .strong());
        ui.add_space(2.0);
    }

    fn row(ui: &mut egui::Ui, label: &str, value: String, color: egui::Color32) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(label).color(LABEL).size(9.0));
            ui.label(egui::RichText::new(value).color(color).size(9.0).monospace());
        });
    }

    fn render_connection_section(ui: &mut egui::Ui, status: &SystemStatus) {
        Self::section(ui, "CONN");

        ui.horizontal(|ui| {
            let (status_color, status_text, status_icon) = match status.connection_status {
                ConnectionStatus::Connected => (
                    egui::Color32::from_rgb(100, 255, 100),
                    "CONNECTED",
                    "●"
                ),
                ConnectionStatus::Connecting => (
                    egui::Color32::from_rgb(255, 200, 100),
                    "CONNECTING",
                    "◐"
                ),
                ConnectionStatus::Error => (
                    egui::Color32::from_rgb(255, 100, 100),
                    "ERROR",
                    "✕"
                ),
            };

            ui.label(egui::RichText::new(status_icon)
                .color(status_color)
                .size(10.0));
            ui.label(egui::RichText::new(status_text)
                .color(status_color)
                .size(10.0)
                .monospace()
                .strong());
        });

        ui.label(egui::RichText::new(&status.server_url)
            .color(egui::Color32::from_rgb(180, 180, 180))
            .size(8.0)
            .monospace());

        let now = Utc::now();
        let uptime = status.uptime_seconds(now);
        if uptime > 0 {
            Self::row(ui, "Uptime:", format_duration(uptime), VALUE);
        }
        if let Some(age) = status.snapshot_age_seconds(now) {
            let color = if age > 5 { egui::Color32::from_rgb(255, 200, 100) } else { VALUE };
            Self::row(ui, "Snapshot:", format!("{age}s ago"), color);
        }
    }

    fn render_traffic_section(
        ui: &mut egui::Ui,
        status: &SystemStatus,
        airport: Option<(&str, AirportStatus)>,
    ) {
        Self::section(ui, "TRAFFIC");

        if status.world_loaded {
            Self::row(ui, "World:", format!("{} asp, {} apt, {} rwy",
                status.airspaces_loaded, status.airports_loaded, status.runways_loaded), VALUE);
        } else {
            Self::row(ui, "World:", "Loading...".to_string(), VALUE);
        }

        Self::row(ui, "Aircraft:", format!("{} tracked / {} strips",
            status.aircraft_total, status.strips_on_board), VALUE);

        if status.conflicts > 0 {
            Self::row(ui, "Conflicts:", status.conflicts.to_string(), egui::Color32::from_rgb(255, 100, 100));
        }

        if let Some((id, flags)) = airport {
            let flag = |on: bool| if on { "ON" } else { "OFF" };
            Self::row(ui, &format!("{id}:"), format!("ARR {} DEP {} AUTO {}",
                flag(flags.arrivals), flag(flags.departures), flag(flags.automate)), VALUE);
        }
    }

    fn render_performance_section(ui: &mut egui::Ui, status: &SystemStatus) {
        Self::section(ui, "PERFORMANCE");

        let frame_color = if status.average_frame_ms < 16.0 {
            egui::Color32::from_rgb(100, 255, 100)
        } else if status.average_frame_ms < 33.0 {
            egui::Color32::from_rgb(255, 200, 100)
        } else {
            egui::Color32::from_rgb(255, 100, 100)
        };
        Self::row(ui, "Frame:", format!("{:.1}ms (last {:.1}ms)",
            status.average_frame_ms, status.last_frame_ms), frame_color);
    }

    fn render_diagnostics_section(ui: &mut egui::Ui, status: &SystemStatus) {
        Self::section(ui, "DIAGNOSTICS");

        if status.diagnostics.is_empty() {
            ui.label(egui::RichText::new("No messages")
                .color(egui::Color32::from_rgb(100, 100, 100))
                .size(8.0)
                .italics());
            return;
        }

        // Each line is approximately 14 pixels tall
        let line_height = 14.0;
        let max_visible_lines = 6.0;

        egui::ScrollArea::vertical()
            .id_salt("diagnostics")
            .max_height(line_height * max_visible_lines)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                // Newest first
                for diagnostic in status.diagnostics.iter().rev() {
                    ui.horizontal(|ui| {
                        let (icon, color) = match diagnostic.level {
                            DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
                            DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
                            DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
                        };

                        ui.label(egui::RichText::new(icon).color(color).size(9.0));
                        ui.label(egui::RichText::new(diagnostic.timestamp.format("%H:%M:%S").to_string())
                            .color(egui::Color32::from_rgb(100, 100, 100))
                            .size(8.0)
                            .monospace());
                        ui.label(egui::RichText::new(truncate(&diagnostic.message, 30))
                            .color(egui::Color32::from_rgb(180, 180, 180))
                            .size(8.0))
                            .on_hover_text(&diagnostic.message);
                    });
                }
            });
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() > max_chars {
        let head: String = message.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3_725), "1h 2m 5s");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }
}
