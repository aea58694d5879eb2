// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Abstract drawing surface.
//!
//! The painter only talks to a [`DrawingSurface`]; a toolkit backend
//! implements it on top of its own device context.  Text measurement is split
//! out into [`TextMeasure`] because the scene builder needs label extents
//! without drawing anything.
//!
//! [`RecordingSurface`] records every call and measures text with a fixed
//! cell size, which makes draw order observable in tests.

use crate::color::Rgb;
use crate::rect::Rect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenStyle {
    Solid,
    Dashed,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pen {
    pub color: Rgb,
    pub width: u32,
    pub style: PenStyle,
}

impl Pen {
    pub const fn solid(color: Rgb) -> Self {
        Self {
            color,
            width: 1,
            style: PenStyle::Solid,
        }
    }

    pub const fn dashed(color: Rgb) -> Self {
        Self {
            color,
            width: 1,
            style: PenStyle::Dashed,
        }
    }

    pub const fn transparent() -> Self {
        Self {
            color: Rgb::BLACK,
            width: 0,
            style: PenStyle::Transparent,
        }
    }

    pub const fn with_width(self, width: u32) -> Self {
        Self { width, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushStyle {
    Solid,
    Transparent,
    Hatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Brush {
    pub color: Rgb,
    pub style: BrushStyle,
}

impl Brush {
    pub const fn solid(color: Rgb) -> Self {
        Self {
            color,
            style: BrushStyle::Solid,
        }
    }

    pub const fn hatch(color: Rgb) -> Self {
        Self {
            color,
            style: BrushStyle::Hatch,
        }
    }

    pub const fn transparent() -> Self {
        Self {
            color: Rgb::WHITE,
            style: BrushStyle::Transparent,
        }
    }
}

/// Font request. Backends map it to the closest face they have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Font {
    pub point_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
}

impl Font {
    pub const fn new(point_size: u32) -> Self {
        Self {
            point_size,
            bold: false,
            italic: false,
            color: Rgb::BLACK,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub const fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(8)
    }
}

/// An image referenced by name, with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bitmap {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

/// Text extents in pixels.
pub trait TextMeasure {
    /// `(width, height)` of `text` drawn with `font`.
    fn text_extent(&self, text: &str, font: &Font) -> (i32, i32);
}

/// Primitive drawing operations.  Coordinates are canvas pixels with the
/// origin at the top-left corner.
pub trait DrawingSurface: TextMeasure {
    fn set_pen(&mut self, pen: Pen);
    fn set_brush(&mut self, brush: Brush);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn draw_rectangle(&mut self, rect: Rect);
    fn draw_polygon(&mut self, points: &[(i32, i32)]);
    fn draw_circle(&mut self, x: i32, y: i32, radius: i32);
    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &Font);
    fn set_clip(&mut self, rect: Rect);
    fn clear_clip(&mut self);
    fn draw_bitmap(&mut self, bitmap: &Bitmap, x: i32, y: i32);
}

/// Measures every character as the same cell, scaled with the point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthMeasure {
    /// Cell width at 8 pt.
    pub char_width: i32,
    /// Line height at 8 pt.
    pub line_height: i32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self {
            char_width: 7,
            line_height: 12,
        }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn text_extent(&self, text: &str, font: &Font) -> (i32, i32) {
        let scale = |v: i32| v * font.point_size as i32 / 8;
        let chars = text.chars().count() as i32;
        (chars * scale(self.char_width), scale(self.line_height))
    }
}

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Pen(Pen),
    Brush(Brush),
    Line(i32, i32, i32, i32),
    Rectangle(Rect),
    Polygon(Vec<(i32, i32)>),
    Circle(i32, i32, i32),
    Text { x: i32, y: i32, text: String, font: Font },
    Clip(Rect),
    ClearClip,
    Bitmap { name: String, x: i32, y: i32 },
}

/// A surface that keeps a log of what was drawn.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub measure: FixedWidthMeasure,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded rectangles, in draw order.
    pub fn rectangles(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Rectangle(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// All recorded texts, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first recorded call matching `pred`.
    pub fn position(&self, pred: impl Fn(&DrawCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl TextMeasure for RecordingSurface {
    fn text_extent(&self, text: &str, font: &Font) -> (i32, i32) {
        self.measure.text_extent(text, font)
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_pen(&mut self, pen: Pen) {
        self.calls.push(DrawCall::Pen(pen));
    }

    fn set_brush(&mut self, brush: Brush) {
        self.calls.push(DrawCall::Brush(brush));
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.calls.push(DrawCall::Line(x0, y0, x1, y1));
    }

    fn draw_rectangle(&mut self, rect: Rect) {
        self.calls.push(DrawCall::Rectangle(rect));
    }

    fn draw_polygon(&mut self, points: &[(i32, i32)]) {
        self.calls.push(DrawCall::Polygon(points.to_vec()));
    }

    fn draw_circle(&mut self, x: i32, y: i32, radius: i32) {
        self.calls.push(DrawCall::Circle(x, y, radius));
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: &Font) {
        self.calls.push(DrawCall::Text {
            x,
            y,
            text: text.to_owned(),
            font: *font,
        });
    }

    fn set_clip(&mut self, rect: Rect) {
        self.calls.push(DrawCall::Clip(rect));
    }

    fn clear_clip(&mut self) {
        self.calls.push(DrawCall::ClearClip);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        self.calls.push(DrawCall::Bitmap {
            name: bitmap.name.clone(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_measure_scales_with_point_size() {
        let m = FixedWidthMeasure::default();
        assert_eq!(m.text_extent("abc", &Font::new(8)), (21, 12));
        assert_eq!(m.text_extent("abc", &Font::new(16)), (42, 24));
        assert_eq!(m.text_extent("", &Font::default()), (0, 12));
    }

    #[test]
    fn recording_keeps_call_order() {
        let mut s = RecordingSurface::new();
        s.set_pen(Pen::solid(Rgb::BLACK));
        s.draw_rectangle(Rect::new(0, 0, 4, 4));
        s.draw_text(1, 2, "hi", &Font::default());
        assert_eq!(s.calls.len(), 3);
        assert_eq!(s.rectangles(), vec![Rect::new(0, 0, 4, 4)]);
        assert_eq!(s.texts(), vec!["hi"]);
        assert_eq!(s.position(|c| matches!(c, DrawCall::Text { .. })), Some(2));
    }
}
