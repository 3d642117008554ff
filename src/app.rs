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

//! Top-level eframe application.
//!
//! Owns the view state, the strip board and the feed poller, and is the only
//! place where board events are dispatched.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use atc_feed::model::RadioMessage;
use atc_feed::{Aircraft, AircraftSnapshot, ApiClient, Poller, PollerConfig, Vec2, World};
use egui::{Color32, RichText};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::comms::{CommsCommand, CommsPanel, Transcript};
use crate::config::{AppConfig, SessionOverrides};
use crate::radar::render::{conflicting_ids, resolve_airport, FrameInput};
use crate::radar::{EguiCanvas, PointerRelease, RenderPipeline, ViewMode, ViewPreset, ViewState};
use crate::status::{DiagnosticLevel, SystemStatus};
use crate::status_pane::StatusPane;
use crate::strips::{BoardEffect, BoardEvent, Strip, StripBoard, StripCommand, StripContext, StripPanel};

/// Tokio runtime hosted on its own thread for the feed tasks.
#[derive(Debug)]
struct FeedThread {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl FeedThread {
    fn start() -> std::io::Result<(Self, Handle)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("atc-feed")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let join = std::thread::Builder::new()
            .name("feed-runtime".to_string())
            .spawn(move || {
                // Either a shutdown signal or a dropped sender ends the runtime.
                let _ = runtime.block_on(shutdown_rx);
                runtime.shutdown_timeout(Duration::from_millis(500));
                debug!("Feed runtime stopped");
            })?;

        Ok((
            Self {
                shutdown: Some(shutdown_tx),
                join: Some(join),
            },
            handle,
        ))
    }
}

impl Drop for FeedThread {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("Feed runtime thread panicked");
            }
        }
    }
}

/// Apply one board event and carry out its effect.
fn dispatch(board: &mut StripBoard, view: &mut ViewState, event: BoardEvent<'_>) {
    let (next, effect) = std::mem::take(board).reduce(event);
    *board = next;
    if let Some(BoardEffect::ClearSelection) = effect {
        view.select(None);
    }
}

/// Map a panel command to a board event. `Select` is handled by the caller.
fn board_event(command: StripCommand, selected: Option<&str>) -> Option<BoardEvent<'_>> {
    match command {
        StripCommand::Select(_) => None,
        StripCommand::PointerDown(index) => Some(BoardEvent::PointerDown(index)),
        StripCommand::PointerMove(index) => Some(BoardEvent::PointerMove(index)),
        StripCommand::PointerUp => Some(BoardEvent::PointerUp),
        StripCommand::Delete(index) => Some(BoardEvent::Delete { index, selected }),
        StripCommand::AddHeader(name) => Some(BoardEvent::AddHeader(name)),
        StripCommand::ToggleCollapsed(index) => Some(BoardEvent::ToggleCollapsed(index)),
    }
}

/// Feed this frame's pointer and wheel input on the scope into `view`.
fn handle_scope_input(
    ui: &egui::Ui,
    response: &egui::Response,
    view: &mut ViewState,
    aircraft: &[Aircraft],
) {
    let center = response.rect.center();
    let to_scope = |p: egui::Pos2| Vec2::new(f64::from(p.x - center.x), f64::from(p.y - center.y));

    let (pressed, released, pointer, scroll) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
            i.raw_scroll_delta.y,
        )
    });
    let hovered = response.hovered();

    if let Some(pos) = pointer.map(to_scope) {
        if pressed && hovered {
            view.pointer_down(pos);
        } else if view.is_dragging() && !released {
            view.pointer_move(pos);
        }
        // A tap can press and release within the same frame.
        if released && view.is_dragging() {
            if let PointerRelease::Clicked(hit) = view.pointer_up(pos, aircraft) {
                debug!("Scope click -> {hit:?}");
            }
        }
    } else if view.is_dragging() {
        view.cancel_drag();
    }

    if hovered && scroll.abs() > f32::EPSILON {
        view.wheel(f64::from(scroll));
    }
}

/// Point to centre on for `preset`: the home airspace for the overview,
/// the home airport otherwise.
fn preset_focus(world: Option<&World>, home_airport: &str, preset: ViewPreset) -> Option<Vec2> {
    let world = world?;
    let airport = resolve_airport(world, home_airport)?;
    match preset {
        ViewPreset::Overview => Some(
            world
                .airspace_of(&airport.id)
                .map_or(airport.center, |airspace| airspace.pos),
        ),
        ViewPreset::Tower | ViewPreset::Ground => Some(airport.center),
    }
}

/// Scope keyboard shortcut pressed this frame, if any.
fn shortcut(input: &egui::InputState) -> Option<Shortcut> {
    if input.key_pressed(egui::Key::Escape) {
        Some(Shortcut::ClearSelection)
    } else if input.key_pressed(egui::Key::Home) || input.key_pressed(egui::Key::O) {
        Some(Shortcut::Preset(ViewPreset::Overview))
    } else if input.key_pressed(egui::Key::G) {
        Some(Shortcut::Preset(ViewPreset::Ground))
    } else if input.key_pressed(egui::Key::T) {
        Some(Shortcut::Preset(ViewPreset::Tower))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    Preset(ViewPreset),
    ClearSelection,
}

#[derive(Debug)]
pub struct RadarApp {
    config: AppConfig,
    on_disk: AppConfig,
    overrides: SessionOverrides,

    view: ViewState,
    board: StripBoard,
    pipeline: RenderPipeline,
    strip_panel: StripPanel,
    comms_panel: CommsPanel,
    transcript: Transcript,
    status: SystemStatus,
    status_pane: StatusPane,

    poller: Option<Poller>,
    // Declared after the poller so its runtime outlives the poll tasks.
    _feed_thread: Option<FeedThread>,

    world_seen: bool,
    last_snapshot: Option<Arc<AircraftSnapshot>>,
    last_messages: Option<Arc<Vec<RadioMessage>>>,
    last_tick_selection: Option<String>,
}

impl RadarApp {
    #[must_use]
    pub fn new(cc: &eframe::CreationContext<'_>, on_disk: AppConfig, overrides: SessionOverrides) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let config = overrides.apply(&on_disk);
        let mut status = SystemStatus::new(config.server_url.clone());
        let transcript = Transcript::load().unwrap_or_else(|e| {
            warn!("Failed to load transcript: {e}");
            Transcript::default()
        });

        let (poller, feed_thread) = match Self::start_feed(&config) {
            Ok((poller, thread)) => (Some(poller), Some(thread)),
            Err(message) => {
                warn!("{message}");
                status.add_diagnostic(DiagnosticLevel::Error, message);
                (None, None)
            }
        };

        let mut pipeline = RenderPipeline::new(Instant::now());
        pipeline.show_fps = config.show_fps;

        info!(
            "Scope ready: {} mode, home airport {:?}",
            config.view_mode.label(),
            config.home_airport
        );

        Self {
            view: ViewState::new(config.view_mode).with_click_slop(config.click_slop_px),
            board: StripBoard::new(),
            pipeline,
            strip_panel: StripPanel::new(),
            comms_panel: CommsPanel::new(),
            transcript,
            status,
            status_pane: StatusPane::new(),
            poller,
            _feed_thread: feed_thread,
            world_seen: false,
            last_snapshot: None,
            last_messages: None,
            last_tick_selection: None,
            config,
            on_disk,
            overrides,
        }
    }

    fn start_feed(config: &AppConfig) -> Result<(Poller, FeedThread), String> {
        let api = ApiClient::new(&config.server_url)
            .map_err(|e| format!("Invalid server URL {}: {e}", config.server_url))?;
        let (thread, handle) = FeedThread::start()
            .map_err(|e| format!("Failed to start feed runtime: {e}"))?;
        let poller_config = PollerConfig {
            aircraft_interval: config.poll_interval(config.view_mode),
            home_airport: config.home_airport.clone(),
            ..PollerConfig::default()
        };
        Ok((Poller::spawn(api, poller_config, &handle), thread))
    }

    /// Pull the latest feed data into status, transcript and strip board.
    fn sync_feed(&mut self) {
        let Some(poller) = &self.poller else {
            return;
        };
        let state = poller.state();
        let world = poller.world();
        let messages = poller.messages();
        let snapshot = poller.aircraft();

        self.status.observe_feed(&state);

        if let Some(world) = &world {
            if !self.world_seen {
                self.world_seen = true;
                self.status.set_world(world);
                self.adopt_home_airport(world);
            }
        }

        if !self.last_messages.as_ref().is_some_and(|last| Arc::ptr_eq(last, &messages)) {
            self.transcript.merge(&messages);
            self.last_messages = Some(messages);
        }

        let Some(snapshot) = snapshot else {
            return;
        };
        let selected = self.view.selected().map(str::to_owned);
        let fresh = !self.last_snapshot.as_ref().is_some_and(|last| Arc::ptr_eq(last, &snapshot));
        if !fresh && selected == self.last_tick_selection {
            return;
        }

        if fresh {
            let conflicts = conflicting_ids(&snapshot.aircraft).len();
            self.status.update_traffic(snapshot.aircraft.len(), conflicts, snapshot.fetched_at);
        }

        let home_center = world
            .as_deref()
            .and_then(|w| w.airport(&self.config.home_airport))
            .map(|airport| airport.center);
        let context = StripContext {
            home_airport: &self.config.home_airport,
            home_center,
            selected: selected.as_deref(),
        };
        dispatch(
            &mut self.board,
            &mut self.view,
            BoardEvent::Tick {
                aircraft: &snapshot.aircraft,
                context,
            },
        );
        self.status.strips_on_board = self
            .board
            .strips()
            .iter()
            .filter(|s| matches!(s, Strip::Aircraft(_)))
            .count();

        self.last_snapshot = Some(snapshot);
        self.last_tick_selection = selected;
    }

    /// Settle on a home airport that exists in `world` and centre the scope on it.
    fn adopt_home_airport(&mut self, world: &World) {
        let Some(airport) = resolve_airport(world, &self.config.home_airport) else {
            warn!("World has no airports");
            return;
        };
        if airport.id != self.config.home_airport {
            info!("Home airport -> {}", airport.id);
            self.set_home_airport(airport.id.clone());
        }
        let preset = match self.view.mode {
            ViewMode::Tower => ViewPreset::Overview,
            ViewMode::Ground => ViewPreset::Ground,
        };
        self.apply_preset(preset);
    }

    fn set_home_airport(&mut self, id: String) {
        if let Some(poller) = &self.poller {
            poller.set_home_airport(id.clone());
        }
        self.config.home_airport = id;
        // Re-derive every strip against the new airport.
        self.last_snapshot = None;
        self.pipeline.request_refresh();
    }

    fn apply_preset(&mut self, preset: ViewPreset) {
        let world = self.poller.as_ref().and_then(Poller::world);
        let focus = preset_focus(world.as_deref(), &self.config.home_airport, preset)
            .unwrap_or_else(|| self.view.center());
        let before = self.view.mode;
        self.view.apply_preset(preset, focus);
        if self.view.mode != before {
            self.on_mode_changed();
        }
    }

    fn on_mode_changed(&mut self) {
        let mode = self.view.mode;
        info!("View mode -> {}", mode.label());
        self.config.view_mode = mode;
        if let Some(poller) = &self.poller {
            poller.set_aircraft_interval(self.config.poll_interval(mode));
        }
        self.pipeline.request_refresh();
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        match ctx.input(shortcut) {
            Some(Shortcut::Preset(preset)) => self.apply_preset(preset),
            Some(Shortcut::ClearSelection) => self.view.select(None),
            None => {}
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        let world = self.poller.as_ref().and_then(Poller::world);

        egui::TopBottomPanel::top("scope_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("◈ ATC SCOPE")
                    .color(Color32::from_rgb(100, 180, 220))
                    .size(13.0)
                    .strong());
                ui.separator();

                for preset in [ViewPreset::Tower, ViewPreset::Ground] {
                    let (mode, label) = match preset {
                        ViewPreset::Ground => (ViewMode::Ground, "GROUND [G]"),
                        ViewPreset::Tower | ViewPreset::Overview => (ViewMode::Tower, "TOWER [T]"),
                    };
                    if ui.selectable_label(self.view.mode == mode, label).clicked() && self.view.mode != mode {
                        self.apply_preset(preset);
                    }
                }
                if ui.button("OVERVIEW [O]").clicked() {
                    self.apply_preset(ViewPreset::Overview);
                }
                ui.separator();

                let mut chosen = None;
                egui::ComboBox::from_id_salt("home_airport")
                    .selected_text(if self.config.home_airport.is_empty() {
                        "----"
                    } else {
                        self.config.home_airport.as_str()
                    })
                    .show_ui(ui, |ui| {
                        let airports = world
                            .iter()
                            .flat_map(|w| w.airspaces.iter())
                            .flat_map(|airspace| airspace.airports.iter());
                        for airport in airports {
                            if ui.selectable_label(airport.id == self.config.home_airport, &airport.id).clicked() {
                                chosen = Some(airport.id.clone());
                            }
                        }
                    });
                if let Some(id) = chosen.filter(|id| *id != self.config.home_airport) {
                    self.set_home_airport(id);
                }

                if let Some(selected) = self.view.selected() {
                    ui.separator();
                    ui.label(RichText::new(format!("SEL {selected}"))
                        .color(Color32::from_rgb(255, 215, 0))
                        .monospace());
                }
            });
        });
    }

    fn show_side_panel(&mut self, ctx: &egui::Context) {
        let mut strip_commands = Vec::new();
        let mut comms_commands = Vec::new();

        let panel = egui::SidePanel::right("strip_board")
            .default_width(self.config.strip_panel_width)
            .resizable(true)
            .show(ctx, |ui| {
                egui::TopBottomPanel::bottom("comms")
                    .resizable(true)
                    .show_inside(ui, |ui| {
                        comms_commands = self.comms_panel.show(
                            ui,
                            &self.transcript,
                            self.config.frequency,
                            &self.config.frequency_presets,
                        );
                    });
                strip_commands = self.strip_panel.show(ui, &self.board, self.view.selected());
            });
        self.config.strip_panel_width = panel.response.rect.width();

        for command in strip_commands {
            if let StripCommand::Select(callsign) = &command {
                self.view.select(Some(callsign.clone()));
                continue;
            }
            let selected = self.view.selected().map(str::to_owned);
            if let Some(event) = board_event(command, selected.as_deref()) {
                dispatch(&mut self.board, &mut self.view, event);
            }
        }

        for command in comms_commands {
            match command {
                CommsCommand::Tune(frequency) => {
                    info!("Tuned {frequency:.3}");
                    self.config.frequency = frequency;
                }
                CommsCommand::Send(text) => match &self.poller {
                    Some(poller) => poller.send_text(text, self.config.frequency),
                    None => warn!("Not connected, message dropped"),
                },
            }
        }
    }

    fn show_scope(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;
                handle_scope_input(ui, &response, &mut self.view, self.pipeline.cached_aircraft());

                let mut canvas = EguiCanvas::new(painter, rect);
                let (world, aircraft) = match &self.poller {
                    Some(poller) => (poller.world(), poller.aircraft()),
                    None => (None, None),
                };
                self.pipeline.paint(
                    &mut canvas,
                    FrameInput {
                        now: Instant::now(),
                        view: &self.view,
                        world,
                        aircraft,
                        refresh_interval: self.config.refresh_interval(self.view.mode),
                        active_frequency: self.config.frequency,
                        home_airport: &self.config.home_airport,
                    },
                );
            });
    }
}

impl eframe::App for RadarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let frame_start = Instant::now();

        self.sync_feed();
        self.handle_shortcuts(ctx);

        self.show_top_bar(ctx);
        self.show_side_panel(ctx);
        self.show_scope(ctx);

        let airport_status = self.poller.as_ref().and_then(Poller::airport_status);
        self.status_pane.render(
            ctx,
            &self.status,
            airport_status.map(|flags| (self.config.home_airport.as_str(), flags)),
        );

        self.status.update_performance(frame_start.elapsed().as_secs_f64() * 1000.0);
        ctx.request_repaint_after(self.config.frame_interval());
    }
}

impl Drop for RadarApp {
    fn drop(&mut self) {
        if let Some(poller) = &self.poller {
            poller.shutdown();
        }

        let stored = self.overrides.persistable(&self.config, &self.on_disk);
        if let Err(e) = stored.save() {
            warn!("Failed to save config: {e}");
        }
        if let Err(e) = self.transcript.save() {
            warn!("Failed to save transcript: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::testing::aircraft_at;

    fn world() -> World {
        serde_json::from_str(r#"{
            "airspaces": [{
                "id": "NORCAL", "pos": [1000.0, 2000.0], "radius": 50000.0,
                "airports": [
                    { "id": "KSFO", "center": [10.0, 20.0] },
                    { "id": "KOAK", "center": [500.0, 600.0] }
                ]
            }],
            "waypoints": []
        }"#).unwrap()
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Run one 800x600 frame with the scope filling the window.
    fn scope_frame(
        ctx: &egui::Context,
        view: &mut ViewState,
        aircraft: &[Aircraft],
        events: Vec<egui::Event>,
    ) {
        let raw = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let _ = ctx.run(raw, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    let (response, _painter) =
                        ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                    handle_scope_input(ui, &response, view, aircraft);
                });
        });
    }

    #[test]
    fn test_tap_within_one_frame_selects_and_ends_drag() {
        let ctx = egui::Context::default();
        let mut view = ViewState::default();
        let traffic = vec![aircraft_at("UAL1", Vec2::ZERO, 5000.0)];
        let centre = egui::pos2(400.0, 300.0);

        scope_frame(&ctx, &mut view, &traffic, vec![egui::Event::PointerMoved(centre)]);
        scope_frame(&ctx, &mut view, &traffic, vec![button(centre, true), button(centre, false)]);
        assert!(!view.is_dragging());
        assert_eq!(view.selected(), Some("UAL1"));

        // Moving afterwards with no button held must not pan.
        scope_frame(&ctx, &mut view, &traffic, vec![egui::Event::PointerMoved(egui::pos2(450.0, 340.0))]);
        assert!(!view.is_dragging());
        assert_eq!(view.pan_offset, Vec2::ZERO);
    }

    #[test]
    fn test_drag_across_frames_pans() {
        let ctx = egui::Context::default();
        let mut view = ViewState::default();
        let centre = egui::pos2(400.0, 300.0);
        let east = egui::pos2(450.0, 300.0);

        scope_frame(&ctx, &mut view, &[], vec![egui::Event::PointerMoved(centre)]);
        scope_frame(&ctx, &mut view, &[], vec![button(centre, true)]);
        assert!(view.is_dragging());
        scope_frame(&ctx, &mut view, &[], vec![egui::Event::PointerMoved(east)]);
        scope_frame(&ctx, &mut view, &[], vec![button(east, false)]);

        assert!(!view.is_dragging());
        assert!(view.pan_offset.x > 0.0);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_preset_focus() {
        let world = world();
        assert_eq!(
            preset_focus(Some(&world), "KOAK", ViewPreset::Ground),
            Some(Vec2::new(500.0, 600.0))
        );
        assert_eq!(
            preset_focus(Some(&world), "KOAK", ViewPreset::Overview),
            Some(Vec2::new(1000.0, 2000.0))
        );
        // Unknown home falls back to the first airport.
        assert_eq!(
            preset_focus(Some(&world), "EGLL", ViewPreset::Ground),
            Some(Vec2::new(10.0, 20.0))
        );
        assert_eq!(
            preset_focus(Some(&world), "KOAK", ViewPreset::Tower),
            Some(Vec2::new(500.0, 600.0))
        );
        assert_eq!(preset_focus(None, "KSFO", ViewPreset::Tower), None);
    }

    #[test]
    fn test_board_event_mapping() {
        assert!(board_event(StripCommand::Select("UAL1".to_string()), None).is_none());
        assert!(matches!(
            board_event(StripCommand::Delete(2), Some("UAL1")),
            Some(BoardEvent::Delete { index: 2, selected: Some("UAL1") })
        ));
        assert!(matches!(board_event(StripCommand::PointerUp, None), Some(BoardEvent::PointerUp)));
    }

    #[test]
    fn test_dispatch_applies_clear_selection() {
        let mut board = StripBoard::new();
        let mut view = ViewState::default();
        view.select(Some("UAL1".to_string()));

        let mut plane = aircraft_at("UAL1", Vec2::new(0.0, 0.0), 3000.0);
        plane.flight_plan.departing = "KSFO".to_string();
        let aircraft = [plane];
        let context = StripContext {
            home_airport: "KSFO",
            home_center: None,
            selected: Some("UAL1"),
        };
        dispatch(&mut board, &mut view, BoardEvent::Tick { aircraft: &aircraft, context });
        assert!(board.contains("UAL1"));

        dispatch(&mut board, &mut view, BoardEvent::Delete { index: 1, selected: Some("UAL1") });
        assert!(!board.contains("UAL1"));
        assert_eq!(view.selected(), None);
    }
}
