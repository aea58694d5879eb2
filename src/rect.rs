// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Integer pixel rectangles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangle in canvas pixels (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle.
    ///
    /// # Panics
    ///
    /// On a negative width or height.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Rect {
        assert!(
            width >= 0 && height >= 0,
            "negative rectangle size: {x},{y} {width}x{height}"
        );
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    #[inline]
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Returns true if `other` lies entirely within this rectangle.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns true if the two rectangles share interior area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.y < other.bottom()
            && other.x < self.right()
            && other.y < self.bottom()
    }

    /// Returns the intersection rectangle.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let min_x = self.x.max(other.x);
        let min_y = self.y.max(other.y);
        let max_x = self.right().min(other.right());
        let max_y = self.bottom().min(other.bottom());
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Returns a new rectangle grown by `amount` on every side.
    pub fn inflate(&self, amount: i32) -> Rect {
        self.inset(-amount, -amount)
    }

    /// Returns a new rectangle inset by the specified amount, never smaller
    /// than zero.
    pub fn inset(&self, horiz: i32, vert: i32) -> Rect {
        Rect {
            x: self.x + horiz,
            y: self.y + vert,
            width: (self.width - 2 * horiz).max(0),
            height: (self.height - 2 * vert).max(0),
        }
    }

    /// Returns a new rectangle with the given vertical position.
    pub fn with_y(&self, y: i32) -> Rect {
        Rect { y, ..*self }
    }

    /// Clip horizontally to `[min_x, max_x]`. `None` if nothing remains.
    pub fn clip_x(&self, min_x: i32, max_x: i32) -> Option<Rect> {
        let x0 = self.x.max(min_x);
        let x1 = self.right().min(max_x);
        if x1 <= x0 {
            return None;
        }
        Some(Rect {
            x: x0,
            width: x1 - x0,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
    }

    #[test]
    fn intersect_computes_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 6, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 6, 5, 4)));
        assert_eq!(a.intersect(&Rect::new(20, 20, 1, 1)), None);
    }

    #[test]
    fn inflate_and_inset() {
        let r = Rect::new(10, 10, 20, 10);
        assert_eq!(r.inflate(5), Rect::new(5, 5, 30, 20));
        assert_eq!(r.inset(3, 3), Rect::new(13, 13, 14, 4));
        assert_eq!(r.inset(20, 0).width, 0);
    }

    #[test]
    fn clip_x_cuts_to_range() {
        let r = Rect::new(-50, 0, 100, 10);
        assert_eq!(r.clip_x(-10, 30), Some(Rect::new(-10, 0, 40, 10)));
        assert_eq!(r.clip_x(60, 80), None);
    }

    #[test]
    #[should_panic(expected = "negative rectangle size")]
    fn negative_width_is_fatal() {
        let _ = Rect::new(0, 0, -1, 4);
    }
}
