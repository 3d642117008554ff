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

//! World feet <-> screen pixel conversion.
//!
//! Screen space here is **relative to the canvas centre** with y growing
//! downwards. The canvas adds its own centre when it issues primitives, so
//! nothing in this module knows the window size.
//!
//! World space is feet with y growing north.

use atc_feed::Vec2;

/// Pixels per foot at scale 1.0
pub const PIXELS_PER_FOOT: f64 = 0.003;

/// Snapshot of the parts of the view that affect projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    /// World-space offset (feet) added to every point before scaling.
    pub pan: Vec2,
}

impl Transform {
    #[must_use]
    pub fn new(scale: f64, pan: Vec2) -> Self {
        Self { scale, pan }
    }

    /// Length in feet to length in pixels.
    #[must_use]
    pub fn feet_to_pixels(&self, feet: f64) -> f64 {
        feet * PIXELS_PER_FOOT * self.scale
    }

    /// Length in pixels to length in feet.
    #[must_use]
    pub fn pixels_to_feet(&self, pixels: f64) -> f64 {
        pixels / (PIXELS_PER_FOOT * self.scale)
    }

    /// World point (feet) to screen point (px from canvas centre).
    #[must_use]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        let shifted = p + self.pan;
        Vec2::new(
            self.feet_to_pixels(shifted.x),
            -self.feet_to_pixels(shifted.y),
        )
    }

    /// Screen point (px from canvas centre) to world point (feet).
    #[must_use]
    pub fn screen_to_world(&self, s: Vec2) -> Vec2 {
        Vec2::new(self.pixels_to_feet(s.x), -self.pixels_to_feet(s.y)) - self.pan
    }

    /// Current pan expressed as a screen displacement (px).
    #[must_use]
    pub fn pan_in_pixels(&self) -> Vec2 {
        Vec2::new(
            self.feet_to_pixels(self.pan.x),
            -self.feet_to_pixels(self.pan.y),
        )
    }

    /// Screen displacement (px) back to a world pan (feet).
    #[must_use]
    pub fn pan_from_pixels(&self, pixels: Vec2) -> Vec2 {
        Vec2::new(self.pixels_to_feet(pixels.x), -self.pixels_to_feet(pixels.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_trip_across_views() {
        let points = [
            Vec2::ZERO,
            Vec2::new(182_000.0, -95_000.0),
            Vec2::new(-3.25, 0.5),
            Vec2::new(12_345.678, 98_765.4321),
        ];
        let views = [
            Transform::new(1.0, Vec2::ZERO),
            Transform::new(0.1, Vec2::new(50_000.0, -20_000.0)),
            Transform::new(40.0, Vec2::new(-1_234.5, 987.25)),
            Transform::new(3.7, Vec2::new(-250_000.0, 250_000.0)),
        ];

        for view in views {
            for p in points {
                let back = view.screen_to_world(view.world_to_screen(p));
                assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-6);
                assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_y_axis_is_inverted() {
        let view = Transform::new(1.0, Vec2::ZERO);
        let north = view.world_to_screen(Vec2::new(0.0, 1000.0));
        assert_abs_diff_eq!(north.x, 0.0);
        assert_abs_diff_eq!(north.y, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pan_moves_world_origin() {
        let view = Transform::new(2.0, Vec2::new(-1000.0, 0.0));
        // The point at -pan sits on the canvas centre.
        let centre = view.world_to_screen(Vec2::new(1000.0, 0.0));
        assert_abs_diff_eq!(centre.x, 0.0);
        assert_abs_diff_eq!(centre.y, 0.0);
    }

    #[test]
    fn test_pan_pixel_conversion_round_trip() {
        let view = Transform::new(5.5, Vec2::new(300.0, -42.0));
        let back = view.pan_from_pixels(view.pan_in_pixels());
        assert_abs_diff_eq!(back.x, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, -42.0, epsilon = 1e-9);
    }
}
