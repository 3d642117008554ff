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

//! Drawing surface used by the render pipeline.
//!
//! All coordinates are screen pixels **relative to the canvas centre**, the
//! output of [`super::transform::Transform::world_to_screen`]. Implementations add the
//! centre themselves, which is how every frame gets re-centred before the
//! first primitive is issued.

use atc_feed::Vec2;
use egui::{Align2, Color32};

pub trait Canvas {
    /// Size of the drawable area in pixels.
    fn size(&self) -> Vec2;

    /// Fill the whole canvas.
    fn clear(&mut self, color: Color32);

    /// Mark the start of a named drawing layer. Painters may ignore it.
    fn begin_layer(&mut self, _name: &'static str) {}

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color32);

    fn circle_filled(&mut self, center: Vec2, radius: f32, color: Color32);

    fn circle_stroke(&mut self, center: Vec2, radius: f32, width: f32, color: Color32);

    /// Closed polygon. `fill` may be transparent.
    fn polygon(&mut self, points: &[Vec2], fill: Color32, width: f32, stroke: Color32);

    fn text(&mut self, pos: Vec2, anchor: Align2, text: &str, size: f32, color: Color32);

    /// Left-aligned text on a translucent box, used for data tags.
    fn label(&mut self, pos: Vec2, text: &str, size: f32, color: Color32);
}

/// [`Canvas`] backed by an egui painter clipped to `rect`.
pub struct EguiCanvas {
    painter: egui::Painter,
    rect: egui::Rect,
}

impl std::fmt::Debug for EguiCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EguiCanvas").field("rect", &self.rect).finish_non_exhaustive()
    }
}

impl EguiCanvas {
    #[must_use]
    pub fn new(painter: egui::Painter, rect: egui::Rect) -> Self {
        Self { painter, rect }
    }

    /// Centre-relative pixels to an absolute egui position.
    /// Non-finite input yields `None` so a broken entity never reaches the tessellator.
    #[allow(clippy::cast_possible_truncation, reason = "screen pixels fit in f32")]
    fn to_pos(&self, p: Vec2) -> Option<egui::Pos2> {
        if !p.is_finite() {
            return None;
        }
        Some(self.rect.center() + egui::vec2(p.x as f32, p.y as f32))
    }
}

impl Canvas for EguiCanvas {
    fn size(&self) -> Vec2 {
        Vec2::new(f64::from(self.rect.width()), f64::from(self.rect.height()))
    }

    fn clear(&mut self, color: Color32) {
        self.painter.rect_filled(self.rect, 0.0, color);
    }

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color32) {
        if let (Some(a), Some(b)) = (self.to_pos(a), self.to_pos(b)) {
            self.painter
                .line_segment([a, b], egui::Stroke::new(width, color));
        }
    }

    fn circle_filled(&mut self, center: Vec2, radius: f32, color: Color32) {
        if let Some(center) = self.to_pos(center) {
            if radius.is_finite() {
                self.painter.circle_filled(center, radius, color);
            }
        }
    }

    fn circle_stroke(&mut self, center: Vec2, radius: f32, width: f32, color: Color32) {
        if let Some(center) = self.to_pos(center) {
            if radius.is_finite() {
                self.painter
                    .circle_stroke(center, radius, egui::Stroke::new(width, color));
            }
        }
    }

    fn polygon(&mut self, points: &[Vec2], fill: Color32, width: f32, stroke: Color32) {
        let points: Option<Vec<egui::Pos2>> = points.iter().map(|p| self.to_pos(*p)).collect();
        let Some(points) = points else {
            return;
        };
        if points.len() < 3 {
            return;
        }
        self.painter.add(egui::Shape::convex_polygon(
            points,
            fill,
            egui::Stroke::new(width, stroke),
        ));
    }

    fn text(&mut self, pos: Vec2, anchor: Align2, text: &str, size: f32, color: Color32) {
        if let Some(pos) = self.to_pos(pos) {
            self.painter
                .text(pos, anchor, text, egui::FontId::proportional(size), color);
        }
    }

    fn label(&mut self, pos: Vec2, text: &str, size: f32, color: Color32) {
        let Some(text_pos) = self.to_pos(pos) else {
            return;
        };

        // Measure first so the background box hugs the text.
        let galley = self.painter.layout_no_wrap(
            text.to_string(),
            egui::FontId::proportional(size),
            color,
        );
        let padding = egui::vec2(3.0, 2.0);
        let box_rect = egui::Rect::from_min_size(
            text_pos - egui::vec2(padding.x, galley.size().y / 2.0 + padding.y),
            galley.size() + padding * 2.0,
        );
        self.painter.rect_filled(
            box_rect,
            2.0,
            Color32::from_rgba_unmultiplied(0, 0, 0, 180),
        );
        self.painter.text(
            text_pos,
            Align2::LEFT_CENTER,
            text,
            egui::FontId::proportional(size),
            color,
        );
    }
}
