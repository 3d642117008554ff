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

//! Client library for the ATC simulation server.
//!
//! The server owns the simulation; this crate only reads it. It is split into
//! layers that can be used on their own:
//!
//! - **Model layer**: serde types for the world topology, aircraft snapshots,
//!   airport status and radio messages. All positions are world feet.
//! - **API layer**: one async call per endpoint, returning [`FeedError`].
//! - **Poller layer**: background tasks that keep the latest snapshot of each
//!   data class available without blocking the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use atc_feed::{ApiClient, Poller, PollerConfig};
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .unwrap();
//! let api = ApiClient::new("http://localhost:3000").unwrap();
//! let poller = Poller::spawn(api, PollerConfig::default(), runtime.handle());
//!
//! if let Some(snapshot) = poller.aircraft() {
//!     for aircraft in &snapshot.aircraft {
//!         println!("{} at {:.0} ft", aircraft.id, aircraft.altitude);
//!     }
//! }
//! ```
//!
//! # Decoding Only
//!
//! ```
//! use atc_feed::model::World;
//!
//! let world: World = serde_json::from_str(r#"{ "airspaces": [], "waypoints": [] }"#).unwrap();
//! assert!(world.airport("KSFO").is_none());
//! ```

pub mod api;
pub mod model;
pub mod poller;

pub use api::{decode_aircraft_list, ApiClient, FeedError};
pub use model::{Aircraft, AircraftState, Vec2, World};
pub use poller::{AircraftSnapshot, FeedState, Generation, Poller, PollerConfig};
