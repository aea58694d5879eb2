// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! RGB colors and color blending.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Component-wise mean of two colors, rounding down.
    pub const fn mix(self, other: Self) -> Self {
        Self::new(
            ((self.r as u16 + other.r as u16) / 2) as u8,
            ((self.g as u16 + other.g as u16) / 2) as u8,
            ((self.b as u16 + other.b as u16) / 2) as u8,
        )
    }

    /// Scale every component by `factor` (expected in `[0, 1]`).
    pub fn darken(self, factor: f64) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * f).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// WCAG relative luminance in `[0, 1]`.
    pub fn relative_luminance(self) -> f64 {
        fn linear(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Contrast ratio against black, scaled by 1000 (black itself is 1000,
    /// white is 21000).
    pub fn contrast_against_black(self) -> u32 {
        (((self.relative_luminance() + 0.05) / 0.05) * 1000.0).round() as u32
    }

    /// Label color for text drawn on this background: white when the
    /// contrast against black falls below `threshold`, black otherwise.
    pub fn text_color(self, threshold: u32) -> Self {
        if self.contrast_against_black() < threshold {
            Self::WHITE
        } else {
            Self::BLACK
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Running sum of colors whose mean is taken at the end.
///
/// Blending through the accumulated sum keeps an N-way overlap equal to the
/// plain mean of its N base colors, whatever order the overlaps were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorMix {
    r: u32,
    g: u32,
    b: u32,
    count: u32,
}

impl ColorMix {
    pub fn of(color: Rgb) -> Self {
        Self {
            r: color.r as u32,
            g: color.g as u32,
            b: color.b as u32,
            count: 1,
        }
    }

    /// Combine two disjoint sets of contributors.
    pub fn merge(self, other: Self) -> Self {
        Self {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
            count: self.count + other.count,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Component-wise mean, rounding down. `None` when empty.
    pub fn mean(&self) -> Option<Rgb> {
        if self.count == 0 {
            return None;
        }
        Some(Rgb::new(
            (self.r / self.count) as u8,
            (self.g / self.count) as u8,
            (self.b / self.count) as u8,
        ))
    }
}

impl FromIterator<Rgb> for ColorMix {
    fn from_iter<I: IntoIterator<Item = Rgb>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ColorMix::default(), |acc, c| acc.merge(ColorMix::of(c)))
    }
}
