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

//! Vector math on world coordinates.
//!
//! Every function here works in **world feet** (x east, y north) unless its
//! doc says otherwise. Headings are compass degrees: 0 = north, 90 = east,
//! increasing clockwise.

use atc_feed::Vec2;

/// Feet in one nautical mile
pub const FEET_PER_NM: f64 = 6076.115;

#[must_use]
pub fn feet_to_nm(feet: f64) -> f64 {
    feet / FEET_PER_NM
}

#[must_use]
pub fn nm_to_feet(nm: f64) -> f64 {
    nm * FEET_PER_NM
}

#[must_use]
pub fn distance_squared(a: Vec2, b: Vec2) -> f64 {
    (b - a).length_squared()
}

#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    distance_squared(a, b).sqrt()
}

#[must_use]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Wrap a heading into `[0, 360)`.
#[must_use]
pub fn normalize_heading(heading: f64) -> f64 {
    heading.rem_euclid(360.0)
}

/// Compass heading to a math angle in radians (0 = +x, counter-clockwise).
#[must_use]
pub fn heading_to_radians(heading: f64) -> f64 {
    (90.0 - heading).to_radians()
}

/// Math angle in radians back to a compass heading.
#[must_use]
pub fn radians_to_heading(radians: f64) -> f64 {
    normalize_heading(90.0 - radians.to_degrees())
}

/// Heading from `from` towards `to`. Coincident points give 0.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f64 {
    let delta = to - from;
    if delta.length_squared() == 0.0 {
        return 0.0;
    }
    normalize_heading(delta.x.atan2(delta.y).to_degrees())
}

/// Point `distance` feet from `from` along `heading`.
#[must_use]
pub fn move_point(from: Vec2, heading: f64, distance: f64) -> Vec2 {
    let (sin, cos) = heading.to_radians().sin_cos();
    Vec2::new(from.x + sin * distance, from.y + cos * distance)
}

/// Closest point to `p` on the segment `a`-`b`.
#[must_use]
pub fn project(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Length of the polyline `start -> points[0] -> ... -> points[n-1]`.
#[must_use]
pub fn path_length<I>(start: Vec2, points: I) -> f64
where
    I: IntoIterator<Item = Vec2>,
{
    let mut previous = start;
    let mut total = 0.0;
    for point in points {
        total += distance(previous, point);
        previous = point;
    }
    total
}
