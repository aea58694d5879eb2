// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Application context.
//!
//! [`AppContext`] carries every tunable the rendering core reads: layout
//! paddings, pixel thresholds, balloon delays and the palette.  It is passed
//! explicitly to [`SceneBuilder`](crate::SceneBuilder),
//! [`Painter`](crate::Painter) and [`InputController`](crate::InputController);
//! there is no global configuration.
//!
//! With the `serde` feature enabled the context (de)serializes with every
//! field optional, falling back to [`AppContext::default`].

use crate::color::Rgb;
use crate::surface::Font;
use crate::text::TextFormat;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First day of the week for week strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Weekday index (Monday = 0) of the first day of the week.
    pub const fn weekday_index(self) -> u32 {
        match self {
            WeekStart::Monday => 0,
            WeekStart::Sunday => 6,
        }
    }
}

/// Colors used by the painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    pub background: Rgb,
    pub minor_strip_divider: Rgb,
    pub major_strip_divider: Rgb,
    pub weekend: Rgb,
    pub divider_line: Rgb,
    pub now_line: Rgb,
    pub default_event: Rgb,
    pub event_border_darkening: u8,
    pub legend_background: Rgb,
    pub balloon_background: Rgb,
    pub selection_handle: Rgb,
    pub rubber_band: Rgb,
    pub text: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::WHITE,
            minor_strip_divider: Rgb::new(200, 200, 200),
            major_strip_divider: Rgb::new(128, 128, 128),
            weekend: Rgb::new(239, 239, 239),
            divider_line: Rgb::BLACK,
            now_line: Rgb::new(200, 0, 0),
            default_event: Rgb::new(200, 200, 200),
            event_border_darkening: 70,
            legend_background: Rgb::new(255, 255, 225),
            balloon_background: Rgb::new(255, 255, 231),
            selection_handle: Rgb::BLACK,
            rubber_band: Rgb::new(0, 120, 215),
            text: Rgb::BLACK,
        }
    }
}

/// Explicit replacement for the process-wide configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppContext {
    pub week_start: WeekStart,

    /// Period events narrower than this (px) are drawn as point events.
    pub period_threshold: i32,
    pub min_point_event_width: i32,
    pub min_period_event_width: i32,

    /// Gap kept around every event rectangle.
    pub outer_padding: i32,
    /// Gap between an event box and its text.
    pub inner_padding: i32,
    /// Gap between the divider line and the first row of events.
    pub baseline_padding: i32,
    /// Vertical inset of era bands from the canvas top and bottom.
    pub era_inset: i32,
    /// Horizontal distance outside the canvas up to which rectangles are kept.
    pub offscreen_margin: i32,

    pub handle_tolerance: i32,
    pub snap_tolerance: i32,
    pub min_legible_strip_width: i32,

    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub balloon_show_delay: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub balloon_hide_delay: Duration,
    pub balloon_max_width: i32,

    /// Fraction of the visible period panned per wheel step.
    pub wheel_scroll_fraction: f64,
    /// Divider movement per wheel step.
    pub wheel_divider_step: f64,

    pub text_contrast_threshold: u32,
    /// Base point size; strip labels and balloon titles derive from it.
    pub font_size: u32,
    pub balloon_text_format: TextFormat,
    pub palette: Palette,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Monday,
            period_threshold: 20,
            min_point_event_width: 25,
            min_period_event_width: 1,
            outer_padding: 5,
            inner_padding: 3,
            baseline_padding: 15,
            era_inset: 0,
            offscreen_margin: 10,
            handle_tolerance: 5,
            snap_tolerance: 10,
            min_legible_strip_width: 45,
            balloon_show_delay: Duration::from_millis(500),
            balloon_hide_delay: Duration::from_millis(100),
            balloon_max_width: 300,
            wheel_scroll_fraction: 0.1,
            wheel_divider_step: 0.05,
            text_contrast_threshold: 2250,
            font_size: 8,
            balloon_text_format: TextFormat::Plain,
            palette: Palette::default(),
        }
    }
}

impl AppContext {
    pub fn event_font(&self) -> Font {
        Font::new(self.font_size).with_color(self.palette.text)
    }

    pub fn minor_strip_font(&self) -> Font {
        Font::new(self.font_size).with_color(self.palette.text)
    }

    pub fn weekend_strip_font(&self) -> Font {
        self.minor_strip_font().italic()
    }

    pub fn major_strip_font(&self) -> Font {
        Font::new(self.font_size + 2).bold().with_color(self.palette.text)
    }

    pub fn balloon_title_font(&self) -> Font {
        Font::new(self.font_size).bold().with_color(self.palette.text)
    }

    pub fn legend_font(&self) -> Font {
        Font::new(self.font_size).with_color(self.palette.text)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
