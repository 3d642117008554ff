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

//! HTTP layer for the simulation server.
//!
//! Thin async wrappers around the server's JSON endpoints. Every call is a
//! single request; retry and cadence belong to the [`crate::poller`].

use log::{debug, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{Aircraft, AirportStatus, RadioMessage, World};

/// Errors that can occur while talking to the simulation server.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the simulation server's REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str) -> Result<Self, FeedError> {
        let parsed = Url::parse(base_url).map_err(|e| FeedError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FeedError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FeedError> {
        let url = self.endpoint(path);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch the static world topology.
    pub async fn fetch_world(&self) -> Result<World, FeedError> {
        self.get_json("world").await
    }

    /// Fetch the current aircraft list.
    ///
    /// Elements that fail to decode are skipped so one bad record cannot
    /// hide every other aircraft.
    pub async fn fetch_aircraft(&self) -> Result<Vec<Aircraft>, FeedError> {
        let raw: Vec<serde_json::Value> = self.get_json("aircraft").await?;
        Ok(decode_aircraft_list(raw))
    }

    /// Fetch the arrival/departure flags for one airport.
    pub async fn fetch_airport_status(&self, airport: &str) -> Result<AirportStatus, FeedError> {
        self.get_json(&format!("airport/{airport}/status")).await
    }

    /// Fetch the radio transcript known to the server.
    pub async fn fetch_messages(&self) -> Result<Vec<RadioMessage>, FeedError> {
        self.get_json("messages").await
    }

    /// Transmit a text message on `frequency`.
    pub async fn send_text(&self, text: &str, frequency: f64) -> Result<(), FeedError> {
        let url = self.endpoint("comms/text");
        let response = self
            .http
            .post(&url)
            .query(&[("frequency", frequency)])
            .body(text.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        debug!("Sent message on {frequency:.3}: {text}");
        Ok(())
    }
}

/// Decode each element independently, dropping the ones that are malformed.
#[must_use]
pub fn decode_aircraft_list(raw: Vec<serde_json::Value>) -> Vec<Aircraft> {
    let total = raw.len();
    let aircraft: Vec<Aircraft> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Aircraft>(value) {
            Ok(aircraft) => Some(aircraft),
            Err(e) => {
                debug!("Skipping malformed aircraft record: {e}");
                None
            }
        })
        .collect();

    if aircraft.len() < total {
        warn!("Dropped {} of {} aircraft records", total - aircraft.len(), total);
    }

    aircraft
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(ApiClient::new("not a url"), Err(FeedError::InvalidUrl(_))));
        assert!(matches!(ApiClient::new("ftp://host"), Err(FeedError::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.endpoint("world"), "http://localhost:3000/api/world");
    }

    #[test]
    fn test_decode_skips_malformed_records() {
        let raw: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                { "id": "GOOD1", "pos": [0.0, 0.0], "heading": 90.0, "speed": 0.0, "altitude": 0.0,
                  "state": { "type": "parked", "value": { "at": { "id": "A1", "pos": [0.0, 0.0], "heading": 0.0 } } } },
                { "id": "BAD", "pos": [0.0, 0.0], "heading": 90.0, "speed": 0.0, "altitude": 0.0,
                  "state": { "type": "taxiing" } },
                { "id": "GOOD2", "pos": [5.0, 5.0], "heading": 90.0, "speed": 140.0, "altitude": 3000.0,
                  "state": { "type": "flying", "value": { "waypoints": [] } } }
            ]"#,
        )
        .unwrap();

        let aircraft = decode_aircraft_list(raw);
        let ids: Vec<&str> = aircraft.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["GOOD1", "GOOD2"]);
    }
}
