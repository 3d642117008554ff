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

//! Background polling of the simulation server.
//!
//! One task per data class runs on the supplied tokio runtime. Each task
//! publishes complete snapshots through a `watch` channel, so readers on the
//! UI thread only ever see a fully decoded snapshot or the previous one.
//!
//! Changing the aircraft interval bumps a generation counter. A fetch that
//! was started under an older generation has its result dropped when it
//! completes; in-flight requests are never aborted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::model::{Aircraft, AirportStatus, RadioMessage, World};

/// Polling cadence for each data class.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Initial aircraft polling interval (changes with the view mode).
    pub aircraft_interval: Duration,
    /// Airport status polling interval.
    pub status_interval: Duration,
    /// Radio transcript polling interval.
    pub messages_interval: Duration,
    /// Delay between attempts to load the world topology.
    pub world_retry: Duration,
    /// Airport whose status is polled. Empty disables status polling.
    pub home_airport: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            aircraft_interval: Duration::from_millis(1000),
            status_interval: Duration::from_secs(5),
            messages_interval: Duration::from_millis(500),
            world_retry: Duration::from_secs(3),
            home_airport: String::new(),
        }
    }
}

/// Health of the aircraft feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    /// No response received yet.
    Connecting,
    /// Last aircraft poll succeeded.
    Connected,
    /// Last aircraft poll failed.
    Error(String),
}

/// One decoded aircraft poll.
#[derive(Debug, Clone)]
pub struct AircraftSnapshot {
    pub aircraft: Vec<Aircraft>,
    pub fetched_at: DateTime<Utc>,
    /// Interval generation the request was issued under.
    pub generation: u64,
}

/// Monotonic counter used to recognise superseded requests.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Current generation, taken when a request starts.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate every request started before now.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Whether a request started at `started` is still current.
    pub fn is_current(&self, started: u64) -> bool {
        self.current() == started
    }
}

/// Handle to the running poll tasks.
///
/// Dropping the handle cancels every task.
pub struct Poller {
    world_rx: watch::Receiver<Option<Arc<World>>>,
    aircraft_rx: watch::Receiver<Option<Arc<AircraftSnapshot>>>,
    status_rx: watch::Receiver<Option<AirportStatus>>,
    messages_rx: watch::Receiver<Arc<Vec<RadioMessage>>>,
    state_rx: watch::Receiver<FeedState>,
    interval_tx: watch::Sender<Duration>,
    home_tx: watch::Sender<String>,
    generation: Arc<Generation>,
    messages_refresh: Arc<Notify>,
    api: ApiClient,
    runtime: Handle,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("base_url", &self.api.base_url())
            .field("generation", &self.generation.current())
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawn the poll tasks on `runtime`.
    #[must_use]
    pub fn spawn(api: ApiClient, config: PollerConfig, runtime: &Handle) -> Self {
        let (world_tx, world_rx) = watch::channel(None);
        let (aircraft_tx, aircraft_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(None);
        let (messages_tx, messages_rx) = watch::channel(Arc::new(Vec::new()));
        let (state_tx, state_rx) = watch::channel(FeedState::Connecting);
        let (interval_tx, interval_rx) = watch::channel(config.aircraft_interval);
        let (home_tx, home_rx) = watch::channel(config.home_airport.clone());
        let generation = Arc::new(Generation::default());
        let messages_refresh = Arc::new(Notify::new());
        let cancel_token = CancellationToken::new();

        info!("Starting feed poller for {}", api.base_url());

        runtime.spawn(world_loop(
            api.clone(),
            world_tx,
            config.world_retry,
            cancel_token.clone(),
        ));
        runtime.spawn(aircraft_loop(
            api.clone(),
            aircraft_tx,
            state_tx,
            interval_rx,
            Arc::clone(&generation),
            cancel_token.clone(),
        ));
        runtime.spawn(status_loop(
            api.clone(),
            status_tx,
            home_rx,
            config.status_interval,
            cancel_token.clone(),
        ));
        runtime.spawn(messages_loop(
            api.clone(),
            messages_tx,
            Arc::clone(&messages_refresh),
            config.messages_interval,
            cancel_token.clone(),
        ));

        Self {
            world_rx,
            aircraft_rx,
            status_rx,
            messages_rx,
            state_rx,
            interval_tx,
            home_tx,
            generation,
            messages_refresh,
            api,
            runtime: runtime.clone(),
            cancel_token,
        }
    }

    /// Latest world topology, if loaded.
    #[must_use]
    pub fn world(&self) -> Option<Arc<World>> {
        self.world_rx.borrow().clone()
    }

    /// Latest aircraft snapshot, if any poll has succeeded.
    #[must_use]
    pub fn aircraft(&self) -> Option<Arc<AircraftSnapshot>> {
        self.aircraft_rx.borrow().clone()
    }

    /// Latest status of the home airport.
    #[must_use]
    pub fn airport_status(&self) -> Option<AirportStatus> {
        *self.status_rx.borrow()
    }

    /// Latest radio transcript from the server.
    #[must_use]
    pub fn messages(&self) -> Arc<Vec<RadioMessage>> {
        self.messages_rx.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> FeedState {
        self.state_rx.borrow().clone()
    }

    /// Change the aircraft polling interval.
    ///
    /// Any fetch already in flight is treated as stale.
    pub fn set_aircraft_interval(&self, interval: Duration) {
        if *self.interval_tx.borrow() == interval {
            return;
        }
        let generation = self.generation.bump();
        debug!("Aircraft interval -> {interval:?} (generation {generation})");
        self.interval_tx.send_replace(interval);
    }

    /// Change the airport whose status is polled.
    pub fn set_home_airport(&self, airport: String) {
        self.home_tx.send_replace(airport);
    }

    /// Transmit a text message; on success the transcript is refetched.
    ///
    /// Fire-and-forget: failures are only logged.
    pub fn send_text(&self, text: String, frequency: f64) {
        let api = self.api.clone();
        let refresh = Arc::clone(&self.messages_refresh);
        self.runtime.spawn(async move {
            match api.send_text(&text, frequency).await {
                Ok(()) => refresh.notify_one(),
                Err(e) => warn!("Failed to send message on {frequency:.3}: {e}"),
            }
        });
    }

    /// Stop all poll tasks.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn world_loop(
    api: ApiClient,
    world_tx: watch::Sender<Option<Arc<World>>>,
    retry: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            result = api.fetch_world() => result,
            () = cancel_token.cancelled() => return,
        };

        match result {
            Ok(world) => {
                info!(
                    "World loaded: {} airspaces, {} waypoints",
                    world.airspaces.len(),
                    world.waypoints.len()
                );
                world_tx.send_replace(Some(Arc::new(world)));
                return;
            }
            Err(e) => warn!("World fetch failed, retrying in {retry:?}: {e}"),
        }

        tokio::select! {
            () = sleep(retry) => {}
            () = cancel_token.cancelled() => return,
        }
    }
}

async fn aircraft_loop(
    api: ApiClient,
    aircraft_tx: watch::Sender<Option<Arc<AircraftSnapshot>>>,
    state_tx: watch::Sender<FeedState>,
    mut interval_rx: watch::Receiver<Duration>,
    generation: Arc<Generation>,
    cancel_token: CancellationToken,
) {
    loop {
        let interval = *interval_rx.borrow_and_update();
        let started = generation.current();

        let result = tokio::select! {
            result = api.fetch_aircraft() => result,
            () = cancel_token.cancelled() => return,
        };

        if generation.is_current(started) {
            match result {
                Ok(aircraft) => {
                    aircraft_tx.send_replace(Some(Arc::new(AircraftSnapshot {
                        aircraft,
                        fetched_at: Utc::now(),
                        generation: started,
                    })));
                    if *state_tx.borrow() != FeedState::Connected {
                        info!("Aircraft feed connected");
                        state_tx.send_replace(FeedState::Connected);
                    }
                }
                Err(e) => {
                    warn!("Aircraft fetch failed: {e}");
                    state_tx.send_replace(FeedState::Error(e.to_string()));
                }
            }
        } else {
            debug!("Discarding aircraft response from generation {started}");
        }

        tokio::select! {
            () = sleep(interval) => {}
            _ = interval_rx.changed() => {}
            () = cancel_token.cancelled() => return,
        }
    }
}

async fn status_loop(
    api: ApiClient,
    status_tx: watch::Sender<Option<AirportStatus>>,
    mut home_rx: watch::Receiver<String>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        let home = home_rx.borrow_and_update().clone();

        if !home.is_empty() {
            let result = tokio::select! {
                result = api.fetch_airport_status(&home) => result,
                () = cancel_token.cancelled() => return,
            };
            match result {
                // A home change while in flight makes this answer belong to another airport.
                Ok(status) if *home_rx.borrow() == home => {
                    status_tx.send_replace(Some(status));
                }
                Ok(_) => debug!("Discarding status for previous home airport {home}"),
                Err(e) => warn!("Status fetch for {home} failed: {e}"),
            }
        }

        tokio::select! {
            () = sleep(interval) => {}
            _ = home_rx.changed() => {
                status_tx.send_replace(None);
            }
            () = cancel_token.cancelled() => return,
        }
    }
}

async fn messages_loop(
    api: ApiClient,
    messages_tx: watch::Sender<Arc<Vec<RadioMessage>>>,
    refresh: Arc<Notify>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            result = api.fetch_messages() => result,
            () = cancel_token.cancelled() => return,
        };

        match result {
            Ok(messages) => {
                let changed = {
                    let current = messages_tx.borrow();
                    current.len() != messages.len()
                        || current.last().map(|m| m.id) != messages.last().map(|m| m.id)
                };
                if changed {
                    messages_tx.send_replace(Arc::new(messages));
                }
            }
            Err(e) => debug!("Message fetch failed: {e}"),
        }

        tokio::select! {
            () = sleep(interval) => {}
            () = refresh.notified() => {}
            () = cancel_token.cancelled() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_invalidates_older_requests() {
        let generation = Generation::default();
        let started = generation.current();
        assert!(generation.is_current(started));

        generation.bump();
        assert!(!generation.is_current(started));
        assert!(generation.is_current(generation.current()));
    }

    #[test]
    fn test_default_cadence() {
        let config = PollerConfig::default();
        assert!(config.messages_interval < Duration::from_secs(1));
        assert!(config.home_airport.is_empty());
    }
}
