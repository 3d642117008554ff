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

//! Wire model for the simulation server.
//!
//! Everything here is read-only data decoded from JSON. The server is
//! authoritative; the client never mutates a snapshot after decoding it.
//!
//! Positions are always in **world feet** with y growing north. Screen-space
//! types live in the application crate, never here.

mod aircraft;
mod comms;
mod world;

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

pub use aircraft::{
    Aircraft, AircraftState, FlightPlan, FlightSegment, LandingState, NodeKind, Target, TaxiNode,
};
pub use comms::{AirportStatus, RadioMessage};
pub use world::{Airport, Airspace, Gate, Runway, Taxiway, TaxiwayKind, Terminal, Waypoint, World};

/// Two-component vector.
///
/// The same type carries world feet and screen pixels; every function that
/// takes one documents which space it expects. On the wire it is a two
/// element array `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// True when both components are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for [f64; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_wire_format() {
        let v: Vec2 = serde_json::from_str("[12.5, -3.0]").unwrap();
        assert_eq!(v, Vec2::new(12.5, -3.0));
        assert_eq!(serde_json::to_string(&v).unwrap(), "[12.5,-3.0]");
    }

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3.0, 4.0);
        assert!((a.length() - 5.0).abs() < f64::EPSILON);
        assert_eq!(a - Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0));
        assert_eq!(-a * 2.0, Vec2::new(-6.0, -8.0));
    }
}
