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

//! egui rendering of the strip board.
//!
//! The panel never mutates the board. It reports what the user did as
//! [`StripCommand`]s and the app turns those into board events.

use egui::{Color32, RichText};

use super::board::{Strip, StripBoard};
use super::derive::{AircraftStrip, StripStatus};

/// User action on the strip panel.
#[derive(Debug, Clone, PartialEq)]
pub enum StripCommand {
    Select(String),
    PointerDown(usize),
    PointerMove(usize),
    PointerUp,
    Delete(usize),
    AddHeader(String),
    ToggleCollapsed(usize),
}

fn status_color(status: StripStatus) -> Color32 {
    match status {
        StripStatus::Inbound | StripStatus::Approach => Color32::from_rgb(100, 180, 255),
        StripStatus::Landing => Color32::from_rgb(80, 220, 255),
        StripStatus::Takeoff | StripStatus::Departure => Color32::from_rgb(100, 255, 100),
        StripStatus::Outbound => Color32::from_rgb(150, 200, 150),
        StripStatus::Parked | StripStatus::Ground => Color32::from_rgb(255, 200, 50),
        StripStatus::Selected => Color32::from_rgb(255, 215, 0),
        StripStatus::None => Color32::from_rgb(120, 120, 120),
    }
}

/// Strip board side panel.
#[derive(Debug, Default)]
pub struct StripPanel {
    new_header: String,
}

impl StripPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the board and collect this frame's commands.
    pub fn show(&mut self, ui: &mut egui::Ui, board: &StripBoard, selected: Option<&str>) -> Vec<StripCommand> {
        let mut commands = Vec::new();
        let aircraft_count = board
            .strips()
            .iter()
            .filter(|s| matches!(s, Strip::Aircraft(_)))
            .count();

        ui.vertical(|ui| {
            ui.label(RichText::new("◈ FLIGHT STRIPS")
                .color(Color32::from_rgb(100, 200, 100))
                .size(14.0)
                .strong());
            ui.label(RichText::new(format!("STRIPS: {aircraft_count}"))
                .color(Color32::from_rgb(150, 150, 150))
                .size(10.0)
                .monospace());
        });

        ui.add_space(4.0);

        let drag = board.drag();
        let pointer = ui.input(|i| i.pointer.hover_pos());

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.push_id("strip_board", |ui| {
                for (index, strip) in board.visible_rows() {
                    let response = match strip {
                        Strip::Header { name, collapsed } => {
                            Self::header_row(ui, index, name, *collapsed, &mut commands)
                        }
                        Strip::Aircraft(strip) => {
                            let is_selected = selected == Some(strip.callsign.as_str());
                            let is_dragged = drag.dragged_index == Some(index);
                            Self::strip_row(ui, index, strip, is_selected, is_dragged, &mut commands)
                        }
                    };

                    if response.drag_started() {
                        commands.push(StripCommand::PointerDown(index));
                    }
                    if drag.is_active() {
                        if let Some(pos) = pointer {
                            if response.rect.contains(pos) && drag.separator_index != Some(index) {
                                commands.push(StripCommand::PointerMove(index));
                            }
                        }
                    }

                    // Insertion marker under the row the strip will land after.
                    if drag.is_active() && drag.separator_index == Some(index) {
                        let y = response.rect.bottom() + 1.5;
                        ui.painter().hline(
                            response.rect.x_range(),
                            y,
                            egui::Stroke::new(2.0, Color32::from_rgb(255, 215, 0)),
                        );
                    }
                    ui.add_space(3.0);
                }
            });
        });

        if drag.is_active() && ui.input(|i| i.pointer.any_released()) {
            commands.push(StripCommand::PointerUp);
        }

        ui.separator();
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.new_header)
                    .hint_text("New section")
                    .desired_width(ui.available_width() - 40.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("＋").clicked() || submitted {
                let name = std::mem::take(&mut self.new_header);
                if !name.trim().is_empty() {
                    commands.push(StripCommand::AddHeader(name));
                }
            }
        });

        commands
    }

    fn header_row(
        ui: &mut egui::Ui,
        index: usize,
        name: &str,
        collapsed: bool,
        commands: &mut Vec<StripCommand>,
    ) -> egui::Response {
        let inner = egui::Frame::NONE
            .fill(Color32::from_rgb(30, 36, 44))
            .inner_margin(egui::Margin::symmetric(6, 3))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let arrow = if collapsed { "▶" } else { "▼" };
                    if ui.small_button(arrow).clicked() {
                        commands.push(StripCommand::ToggleCollapsed(index));
                    }
                    ui.label(RichText::new(name.to_uppercase())
                        .color(Color32::from_rgb(180, 190, 200))
                        .size(11.0)
                        .monospace()
                        .strong());
                    if index > 0 {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").clicked() {
                                commands.push(StripCommand::Delete(index));
                            }
                        });
                    }
                });
            });
        ui.interact(inner.response.rect, ui.id().with(("strip_header", index)), egui::Sense::drag())
    }

    fn strip_row(
        ui: &mut egui::Ui,
        index: usize,
        strip: &AircraftStrip,
        is_selected: bool,
        is_dragged: bool,
        commands: &mut Vec<StripCommand>,
    ) -> egui::Response {
        let frame = if is_selected {
            egui::Frame::group(ui.style()).fill(Color32::from_rgba_unmultiplied(100, 140, 180, 220))
        } else if is_dragged {
            egui::Frame::group(ui.style()).fill(Color32::from_rgba_unmultiplied(60, 60, 70, 200))
        } else {
            egui::Frame::group(ui.style())
        };
        let color = status_color(strip.status);

        let inner = frame.show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(color).size(12.0));
                let callsign = ui.add(egui::Label::new(RichText::new(&strip.callsign)
                    .color(Color32::from_rgb(200, 220, 255))
                    .size(12.0)
                    .monospace()
                    .strong())
                    .sense(egui::Sense::click()));
                if callsign.clicked() {
                    commands.push(StripCommand::Select(strip.callsign.clone()));
                }
                ui.label(RichText::new(strip.status.label().to_uppercase())
                    .color(color)
                    .size(9.0)
                    .monospace());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        commands.push(StripCommand::Delete(index));
                    }
                    ui.label(RichText::new(&strip.timer)
                        .color(Color32::from_rgb(220, 220, 160))
                        .size(11.0)
                        .monospace());
                });
            });

            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{} → {}", strip.departing, strip.arriving))
                    .color(Color32::from_rgb(150, 150, 150))
                    .size(10.0)
                    .monospace());
                if !strip.distance.is_empty() {
                    ui.label(RichText::new(format!("│ {}", strip.distance))
                        .color(Color32::from_rgb(150, 200, 255))
                        .size(10.0)
                        .monospace());
                }
            });

            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{:<4} {}", strip.top_status, strip.bottom_status))
                    .color(Color32::from_rgb(200, 200, 200))
                    .size(10.0)
                    .monospace());
                ui.label(RichText::new(format!("{:.3}", strip.frequency))
                    .color(Color32::from_rgb(100, 100, 100))
                    .size(9.0)
                    .monospace());
            });
        });

        // Drag-only so the buttons and callsign inside keep their clicks.
        ui.interact(inner.response.rect, ui.id().with(("strip", index)), egui::Sense::drag())
    }
}
