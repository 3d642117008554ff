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

//! Ordered strip board and its reducer.
//!
//! The board is a flat list of headers and aircraft strips. Index 0 is always
//! the Inbox header; it cannot be deleted or dragged. Every change goes
//! through [`StripBoard::reduce`], which the UI thread calls for each event
//! in arrival order.
//!
//! Drag addressing is by index, so any change in the number of strips while
//! a drag is active cancels the drag.

use std::collections::HashMap;

use atc_feed::Aircraft;
use log::debug;

use super::derive::{derive_status, derive_strip, AircraftStrip, StripContext, StripStatus};

/// Name of the permanent first header
pub const INBOX: &str = "Inbox";

/// One row of the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Strip {
    Header { name: String, collapsed: bool },
    Aircraft(AircraftStrip),
}

impl Strip {
    fn header(name: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            collapsed: false,
        }
    }

    /// Callsign of an aircraft strip.
    #[must_use]
    pub fn callsign(&self) -> Option<&str> {
        match self {
            Self::Aircraft(strip) => Some(strip.callsign.as_str()),
            Self::Header { .. } => None,
        }
    }
}

/// In-progress drag, by index into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragState {
    pub dragged_index: Option<usize>,
    /// Row the dragged strip will land after.
    pub separator_index: Option<usize>,
    pub length_at_start: usize,
}

impl DragState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dragged_index.is_some()
    }
}

/// Input to [`StripBoard::reduce`].
#[derive(Debug, Clone)]
pub enum BoardEvent<'a> {
    /// New aircraft snapshot: insert newly relevant strips, refresh the rest.
    Tick {
        aircraft: &'a [Aircraft],
        context: StripContext<'a>,
    },
    PointerDown(usize),
    PointerMove(usize),
    PointerUp,
    /// Remove the row at `index`. `selected` is the current scope selection.
    Delete {
        index: usize,
        selected: Option<&'a str>,
    },
    AddHeader(String),
    ToggleCollapsed(usize),
}

/// Side effect for the dispatcher to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEffect {
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripBoard {
    strips: Vec<Strip>,
    drag: DragState,
}

impl Default for StripBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StripBoard {
    /// Board holding only the Inbox header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strips: vec![Strip::header(INBOX)],
            drag: DragState::default(),
        }
    }

    #[must_use]
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    #[must_use]
    pub fn drag(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn contains(&self, callsign: &str) -> bool {
        self.strips.iter().any(|s| s.callsign() == Some(callsign))
    }

    /// Rows to display, skipping aircraft strips under collapsed headers.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<(usize, &Strip)> {
        let mut hidden = false;
        let mut rows = Vec::with_capacity(self.strips.len());
        for (index, strip) in self.strips.iter().enumerate() {
            match strip {
                Strip::Header { collapsed, .. } => {
                    hidden = *collapsed;
                    rows.push((index, strip));
                }
                Strip::Aircraft(_) if !hidden => rows.push((index, strip)),
                Strip::Aircraft(_) => {}
            }
        }
        rows
    }

    /// Apply one event.
    #[must_use]
    pub fn reduce(mut self, event: BoardEvent<'_>) -> (Self, Option<BoardEffect>) {
        let mut effect = None;
        match event {
            BoardEvent::Tick { aircraft, context } => self.tick(aircraft, &context),
            BoardEvent::PointerDown(index) => self.pointer_down(index),
            BoardEvent::PointerMove(index) => self.pointer_move(index),
            BoardEvent::PointerUp => self.pointer_up(),
            BoardEvent::Delete { index, selected } => effect = self.delete(index, selected),
            BoardEvent::AddHeader(name) => self.add_header(name),
            BoardEvent::ToggleCollapsed(index) => self.toggle_collapsed(index),
        }
        self.cancel_drag_if_resized();
        (self, effect)
    }

    fn tick(&mut self, aircraft: &[Aircraft], context: &StripContext<'_>) {
        // Newly relevant aircraft go straight under the Inbox, newest on top.
        for candidate in aircraft {
            if self.contains(&candidate.id) {
                continue;
            }
            if derive_status(candidate, context) == StripStatus::None {
                continue;
            }
            debug!("Adding strip for {}", candidate.id);
            self.strips.insert(1, Strip::Aircraft(derive_strip(candidate, context)));
        }

        // Refresh in place. Aircraft missing from the snapshot keep their strip.
        let by_id: HashMap<&str, &Aircraft> =
            aircraft.iter().map(|a| (a.id.as_str(), a)).collect();
        for strip in &mut self.strips {
            if let Strip::Aircraft(existing) = strip {
                if let Some(current) = by_id.get(existing.callsign.as_str()) {
                    *existing = derive_strip(current, context);
                }
            }
        }
    }

    fn pointer_down(&mut self, index: usize) {
        if index == 0 || index >= self.strips.len() {
            debug!("Ignoring drag start on row {index}");
            return;
        }
        self.drag = DragState {
            dragged_index: Some(index),
            separator_index: None,
            length_at_start: self.strips.len(),
        };
    }

    fn pointer_move(&mut self, index: usize) {
        if !self.drag.is_active() {
            return;
        }
        if index < self.strips.len() {
            self.drag.separator_index = Some(index);
        }
    }

    fn pointer_up(&mut self) {
        let drag = std::mem::take(&mut self.drag);
        let (Some(dragged), Some(separator)) = (drag.dragged_index, drag.separator_index) else {
            return;
        };
        if drag.length_at_start != self.strips.len() {
            debug!("Board changed during drag, cancelling");
            return;
        }
        if dragged == separator || dragged >= self.strips.len() || separator >= self.strips.len() {
            return;
        }

        let moved = self.strips.remove(dragged);
        // The separator row shifted up by one if it was below the removed row.
        let anchor = if separator > dragged { separator - 1 } else { separator };
        self.strips.insert(anchor + 1, moved);
    }

    fn delete(&mut self, index: usize, selected: Option<&str>) -> Option<BoardEffect> {
        if index == 0 || index >= self.strips.len() {
            debug!("Ignoring delete of row {index}");
            return None;
        }
        let removed = self.strips.remove(index);
        match (removed.callsign(), selected) {
            (Some(callsign), Some(selected)) if callsign == selected => {
                Some(BoardEffect::ClearSelection)
            }
            _ => None,
        }
    }

    fn add_header(&mut self, name: String) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.strips.push(Strip::header(name));
    }

    fn toggle_collapsed(&mut self, index: usize) {
        if let Some(Strip::Header { collapsed, .. }) = self.strips.get_mut(index) {
            *collapsed = !*collapsed;
        }
    }

    fn cancel_drag_if_resized(&mut self) {
        if self.drag.is_active() && self.drag.length_at_start != self.strips.len() {
            debug!("Board changed during drag, cancelling");
            self.drag = DragState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::testing::aircraft_at;
    use atc_feed::model::FlightSegment;
    use atc_feed::Vec2;

    const HOME: StripContext<'static> = StripContext {
        home_airport: "KSFO",
        home_center: None,
        selected: None,
    };

    fn inbound(id: &str) -> Aircraft {
        let mut aircraft = aircraft_at(id, Vec2::new(10_000.0, 0.0), 6000.0);
        aircraft.flight_plan.arriving = "KSFO".to_string();
        aircraft.flight_plan.departing = "KLAX".to_string();
        aircraft.segment = FlightSegment::Arrival;
        aircraft
    }

    fn order(board: &StripBoard) -> Vec<String> {
        board
            .strips()
            .iter()
            .map(|strip| match strip {
                Strip::Header { name, .. } => name.clone(),
                Strip::Aircraft(strip) => strip.callsign.clone(),
            })
            .collect()
    }

    /// Board `[Inbox, A, B, C]`.
    fn board_abc() -> StripBoard {
        let traffic = vec![inbound("C"), inbound("B"), inbound("A")];
        let (board, _) = StripBoard::new().reduce(BoardEvent::Tick { aircraft: &traffic, context: HOME });
        assert_eq!(order(&board), ["Inbox", "A", "B", "C"]);
        board
    }

    fn apply(board: StripBoard, events: Vec<BoardEvent<'_>>) -> StripBoard {
        events.into_iter().fold(board, |board, event| board.reduce(event).0)
    }

    #[test]
    fn test_new_strips_go_under_inbox() {
        let board = board_abc();
        let late = vec![inbound("D")];
        let (board, _) = board.reduce(BoardEvent::Tick { aircraft: &late, context: HOME });
        assert_eq!(order(&board), ["Inbox", "D", "A", "B", "C"]);
    }

    #[test]
    fn test_tick_is_idempotent() {
        let traffic = vec![inbound("A"), inbound("B")];
        let tick = || BoardEvent::Tick { aircraft: &traffic, context: HOME };
        let (once, _) = StripBoard::new().reduce(tick());
        let (twice, _) = once.clone().reduce(tick());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tick_never_removes() {
        let board = board_abc();
        let mut a = inbound("A");
        a.accepted = false;
        let traffic = vec![a];
        let (board, _) = board.reduce(BoardEvent::Tick { aircraft: &traffic, context: HOME });

        assert_eq!(order(&board), ["Inbox", "A", "B", "C"]);
        let Strip::Aircraft(strip) = &board.strips()[1] else {
            panic!("expected aircraft strip");
        };
        assert_eq!(strip.status, StripStatus::None);
    }

    #[test]
    fn test_irrelevant_aircraft_not_added() {
        let mut stranger = inbound("X");
        stranger.flight_plan.arriving = "KSEA".to_string();
        let traffic = vec![stranger];
        let (board, _) = StripBoard::new().reduce(BoardEvent::Tick { aircraft: &traffic, context: HOME });
        assert_eq!(board.strips().len(), 1);

        let selected = StripContext { selected: Some("X"), ..HOME };
        let (board, _) = board.reduce(BoardEvent::Tick { aircraft: &traffic, context: selected });
        assert_eq!(order(&board), ["Inbox", "X"]);
    }

    #[test]
    fn test_drag_to_end() {
        let board = apply(
            board_abc(),
            vec![BoardEvent::PointerDown(1), BoardEvent::PointerMove(3), BoardEvent::PointerUp],
        );
        assert_eq!(order(&board), ["Inbox", "B", "C", "A"]);
        assert!(!board.drag().is_active());
    }

    #[test]
    fn test_drag_upwards() {
        let board = apply(
            board_abc(),
            vec![BoardEvent::PointerDown(3), BoardEvent::PointerMove(0), BoardEvent::PointerUp],
        );
        assert_eq!(order(&board), ["Inbox", "C", "A", "B"]);
    }

    #[test]
    fn test_drag_aborts_when_strip_removed() {
        let board = apply(
            board_abc(),
            vec![
                BoardEvent::PointerDown(1),
                BoardEvent::PointerMove(2),
                BoardEvent::Delete { index: 3, selected: None },
            ],
        );
        assert!(!board.drag().is_active());

        let board = apply(board, vec![BoardEvent::PointerMove(2), BoardEvent::PointerUp]);
        assert_eq!(order(&board), ["Inbox", "A", "B"]);
    }

    #[test]
    fn test_drag_aborts_when_strip_inserted() {
        let late = vec![inbound("D")];
        let board = apply(
            board_abc(),
            vec![
                BoardEvent::PointerDown(1),
                BoardEvent::PointerMove(3),
                BoardEvent::Tick { aircraft: &late, context: HOME },
                BoardEvent::PointerUp,
            ],
        );
        assert_eq!(order(&board), ["Inbox", "D", "A", "B", "C"]);
    }

    #[test]
    fn test_drag_length_check_at_pointer_up() {
        let mut board = board_abc();
        board = board.reduce(BoardEvent::PointerDown(1)).0;
        board = board.reduce(BoardEvent::PointerMove(3)).0;
        // Shrink behind the reducer's back.
        board.strips.pop();
        let (board, _) = board.reduce(BoardEvent::PointerUp);
        assert_eq!(order(&board), ["Inbox", "A", "B"]);
    }

    #[test]
    fn test_inbox_is_protected() {
        let board = apply(
            board_abc(),
            vec![
                BoardEvent::Delete { index: 0, selected: None },
                BoardEvent::PointerDown(0),
                BoardEvent::PointerMove(3),
                BoardEvent::PointerUp,
            ],
        );
        assert_eq!(order(&board), ["Inbox", "A", "B", "C"]);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let (board, effect) = board_abc().reduce(BoardEvent::Delete { index: 2, selected: Some("B") });
        assert_eq!(effect, Some(BoardEffect::ClearSelection));
        assert_eq!(order(&board), ["Inbox", "A", "C"]);

        let (_, effect) = board.reduce(BoardEvent::Delete { index: 1, selected: Some("C") });
        assert_eq!(effect, None);
    }

    #[test]
    fn test_headers_collapse() {
        let board = apply(
            board_abc(),
            vec![
                BoardEvent::AddHeader("Holding".to_string()),
                BoardEvent::AddHeader("   ".to_string()),
                BoardEvent::PointerDown(1),
                BoardEvent::PointerMove(4),
                BoardEvent::PointerUp,
                BoardEvent::ToggleCollapsed(3),
            ],
        );
        assert_eq!(order(&board), ["Inbox", "B", "C", "Holding", "A"]);

        let visible: Vec<usize> = board.visible_rows().iter().map(|(i, _)| *i).collect();
        assert_eq!(visible, vec![0, 1, 2, 3]);

        let board = board.reduce(BoardEvent::ToggleCollapsed(0)).0;
        let visible: Vec<usize> = board.visible_rows().iter().map(|(i, _)| *i).collect();
        assert_eq!(visible, vec![0, 3]);
    }
}
