// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Timeline rendering core.
//!
//! This crate turns a timeline (events, categories and eras) and a view (a
//! visible period plus selection and display state) into a laid-out
//! [`Scene`], paints it on an abstract [`DrawingSurface`], and interprets
//! pointer input against it.
//!
//! # Core types
//!
//! - [`Instant`] — julian day plus microseconds of day; [`TimeDelta`] — signed
//!   microseconds.
//! - [`TimePeriod`] — `[start, end)` with `start <= end`.
//! - [`TimeType`] — calendar (Gregorian or Pharaonic): dates, labels, limits.
//! - [`Strip`] / [`StripSeries`] — time granularities and their boundaries.
//! - [`Metrics`] — exact instant ↔ pixel mapping.
//! - [`Eras`] — background bands, flattened by [`resolve_overlaps`].
//! - [`Event`] / [`Categories`] — timeline content.
//! - [`TimelineSource`] — data access; [`MemoryTimeline`] implements it.
//! - [`ViewProperties`] — per-view mutable state with change notifications.
//!
//! # Pipeline
//!
//! | Step | Entry point |
//! |------|-------------|
//! | Build | [`SceneBuilder::build`] |
//! | Query | [`Scene::event_at`], [`Scene::hit_handle`], [`Scene::balloon_at`] |
//! | Paint | [`Painter::paint`] |
//! | Input | [`InputController`] |
//!
//! # Example
//!
//! ```
//! use timescene::{
//!     AppContext, Event, FixedWidthMeasure, MemoryTimeline, Painter, RecordingSurface,
//!     SceneBuilder, TimePeriod, TimeType, TimelineSource, ViewProperties,
//! };
//!
//! let mut timeline = MemoryTimeline::new(TimeType::Gregorian);
//! let start = TimeType::Gregorian.from_date(2020, 1, 2).unwrap();
//! let end = TimeType::Gregorian.from_date(2020, 1, 20).unwrap();
//! let id = timeline.new_event_id();
//! timeline
//!     .save_event(Event::new(id, TimePeriod::new(start, end).unwrap(), "Launch"))
//!     .unwrap();
//!
//! let view = ViewProperties::new(timeline.preferred_period());
//! let ctx = AppContext::default();
//! let measure = FixedWidthMeasure::default();
//! let scene = SceneBuilder::new(&ctx, &measure, 800, 400).build(&timeline, &view);
//! assert!(scene.entry(id).is_some());
//!
//! let mut surface = RecordingSurface::new();
//! Painter::new(&ctx).paint(&scene, &mut surface);
//! assert!(surface.texts().contains(&"Launch"));
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

mod balloon;
mod category;
mod color;
mod config;
mod era;
mod error;
mod event;
mod hit_test;
mod input;
mod instant;
mod layout;
mod metrics;
mod observer;
mod painter;
mod period;
mod rect;
mod scene;
mod snap;
mod strip;
mod surface;
mod text;
mod time_type;
mod timeline;
mod view;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use balloon::Balloon;
pub use category::{Categories, Category, CategoryId};
pub use color::{ColorMix, Rgb};
pub use config::{AppContext, Palette, WeekStart};
pub use era::{resolve_overlaps, Era, EraId, Eras, PaintedEra, OVERLAP_NAME};
pub use error::{DomainError, DomainResult};
pub use event::{Alert, Event, EventData, EventId, EventKind};
pub use hit_test::Handle;
pub use input::{
    CursorShape, InputContext, InputController, InputHost, InputMode, Key, Modifiers, TimerKind,
    TimerRequest,
};
pub use instant::{Instant, TimeDelta};
pub use layout::{layout_events, Layout, LayoutContext, PlacedEvent};
pub use metrics::Metrics;
pub use observer::{ListenerId, Observable};
pub use painter::Painter;
pub use period::{union_of, TimePeriod};
pub use rect::Rect;
pub use scene::{EraBand, EventEntry, Legend, LegendEntry, Scene, SceneBuilder};
pub use snap::{snap, snap_period};
pub use strip::{choose_strips, FontHint, Strip, StripKind, StripSeries};
pub use surface::{
    Bitmap, Brush, BrushStyle, DrawCall, DrawingSurface, FixedWidthMeasure, Font, Pen, PenStyle,
    RecordingSurface, TextMeasure,
};
pub use text::{break_word, escape, wrap_text, TextError, TextFormat};
pub use time_type::{CalendarDate, TimeType};
pub use timeline::{MemoryTimeline, TimelineChange, TimelineSource};
pub use view::{ViewChange, ViewFlags, ViewProperties};
