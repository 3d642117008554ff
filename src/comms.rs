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

//! Radio transcript and the comms panel.
//!
//! The server returns its recent message window on every poll. Lines are
//! merged into a local transcript keyed by message id and persisted between
//! sessions.

use std::collections::HashSet;

use atc_feed::model::RadioMessage;
use chrono::{DateTime, Utc};
use egui::{Color32, RichText};
use log::debug;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "atc-scope";
const TRANSCRIPT_NAME: &str = "transcript";

/// Number of lines kept on disk and on screen
pub const MAX_TRANSCRIPT_LINES: usize = 200;

/// Frequencies closer than this are the same channel
const FREQUENCY_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub id: u64,
    pub frequency: f64,
    pub speaker: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&RadioMessage> for TranscriptLine {
    fn from(message: &RadioMessage) -> Self {
        Self {
            id: message.id,
            frequency: message.frequency,
            speaker: message.speaker.clone(),
            text: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Persisted radio transcript, oldest line first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    /// Load the transcript from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        let mut transcript: Transcript = confy::load(APP_NAME, TRANSCRIPT_NAME)?;
        transcript.trim();
        Ok(transcript)
    }

    /// Save the transcript to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, TRANSCRIPT_NAME, self)
    }

    #[must_use]
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Append server messages not seen before. Returns how many were added.
    pub fn merge(&mut self, messages: &[RadioMessage]) -> usize {
        let known: HashSet<u64> = self.lines.iter().map(|l| l.id).collect();
        let before = self.lines.len();

        self.lines.extend(
            messages
                .iter()
                .filter(|m| !known.contains(&m.id))
                .map(TranscriptLine::from),
        );

        let added = self.lines.len() - before;
        if added > 0 {
            debug!("Transcript: {added} new line(s)");
            self.trim();
        }
        added
    }

    /// Lines heard on `frequency`
    pub fn on_frequency(&self, frequency: f64) -> impl Iterator<Item = &TranscriptLine> {
        self.lines
            .iter()
            .filter(move |l| (l.frequency - frequency).abs() < FREQUENCY_EPSILON)
    }

    fn trim(&mut self) {
        if self.lines.len() > MAX_TRANSCRIPT_LINES {
            let excess = self.lines.len() - MAX_TRANSCRIPT_LINES;
            self.lines.drain(..excess);
        }
    }
}

/// Action requested from the comms panel
#[derive(Debug, Clone, PartialEq)]
pub enum CommsCommand {
    Tune(f64),
    Send(String),
}

/// Frequency selector, transcript view and text entry
#[derive(Debug, Default)]
pub struct CommsPanel {
    draft: String,
    active_only: bool,
}

impl CommsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        transcript: &Transcript,
        frequency: f64,
        presets: &[f64],
    ) -> Vec<CommsCommand> {
        let mut commands = Vec::new();

        ui.horizontal(|ui| {
            ui.label(RichText::new("◈ COMMS")
                .color(Color32::from_rgb(100, 200, 100))
                .size(14.0)
                .strong());
            ui.label(RichText::new(format!("{frequency:.3}"))
                .color(Color32::from_rgb(220, 220, 160))
                .size(12.0)
                .monospace());
        });

        ui.horizontal_wrapped(|ui| {
            for &preset in presets {
                let active = (preset - frequency).abs() < FREQUENCY_EPSILON;
                if ui.selectable_label(active, RichText::new(format!("{preset:.3}")).monospace().size(10.0))
                    .clicked() && !active {
                    commands.push(CommsCommand::Tune(preset));
                }
            }
        });
        ui.checkbox(&mut self.active_only, "Active frequency only");

        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .max_height(180.0)
            .stick_to_bottom(true)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                let shown: Vec<&TranscriptLine> = if self.active_only {
                    transcript.on_frequency(frequency).collect()
                } else {
                    transcript.lines().iter().collect()
                };
                for line in shown {
                    let on_active = (line.frequency - frequency).abs() < FREQUENCY_EPSILON;
                    let color = if on_active {
                        Color32::from_rgb(200, 220, 255)
                    } else {
                        Color32::from_rgb(110, 110, 110)
                    };
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new(line.timestamp.format("%H:%M:%S").to_string())
                            .color(Color32::from_rgb(100, 100, 100))
                            .size(9.0)
                            .monospace());
                        ui.label(RichText::new(&line.speaker).color(color).size(10.0).strong());
                        ui.label(RichText::new(&line.text).color(color).size(10.0));
                    });
                }
            });

        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.draft)
                    .hint_text("Transmit...")
                    .desired_width(ui.available_width() - 50.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("SEND").clicked() || submitted {
                let text = std::mem::take(&mut self.draft);
                if !text.trim().is_empty() {
                    commands.push(CommsCommand::Send(text.trim().to_string()));
                }
            }
        });

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: u64, frequency: f64) -> RadioMessage {
        RadioMessage {
            id,
            frequency,
            speaker: "ATC".to_string(),
            text: format!("message {id}"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_merge_skips_known_ids() {
        let mut transcript = Transcript::default();
        assert_eq!(transcript.merge(&[message(1, 118.6), message(2, 118.6)]), 2);
        assert_eq!(transcript.merge(&[message(2, 118.6), message(3, 121.8)]), 1);
        let ids: Vec<u64> = transcript.lines().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_transcript_capped_to_newest_lines() {
        let mut transcript = Transcript::default();
        let batch: Vec<RadioMessage> = (0..250).map(|id| message(id, 118.6)).collect();
        transcript.merge(&batch);

        assert_eq!(transcript.lines().len(), MAX_TRANSCRIPT_LINES);
        assert_eq!(transcript.lines().first().map(|l| l.id), Some(50));
        assert_eq!(transcript.lines().last().map(|l| l.id), Some(249));
    }

    #[test]
    fn test_on_frequency_filter() {
        let mut transcript = Transcript::default();
        transcript.merge(&[message(1, 118.6), message(2, 121.8), message(3, 118.6004)]);
        let ids: Vec<u64> = transcript.on_frequency(118.6).map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_missing_lines_key_is_empty() {
        let transcript: Transcript = serde_json::from_str("{}").unwrap();
        assert!(transcript.lines().is_empty());
    }
}
