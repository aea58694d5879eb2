// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Event placement.
//!
//! The canvas is split by the divider line.  Point events (and periods too
//! narrow to read) stack upward from just above the divider; period events
//! stack downward from just below it.  Events are placed in `(start, id)`
//! order.  Each candidate starts next to the divider and hops past the first
//! already-placed rectangle it collides with, until it is free or leaves the
//! canvas, in which case it is hidden.
//!
//! A container is placed like a period event whose height fits its
//! subevents, which are stacked in rows inside it.

use crate::config::AppContext;
use crate::event::{Event, EventId};
use crate::metrics::Metrics;
use crate::rect::Rect;
use crate::surface::{Font, TextMeasure};
use crate::view::ViewFlags;
use std::collections::BTreeMap;

/// An event and the rectangle it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEvent {
    pub event: Event,
    pub rect: Rect,
    /// Drawn above the divider.
    pub drawn_as_point: bool,
    /// Set on subevents placed inside their container's rectangle.
    pub inside: Option<EventId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Draw order: containers are followed by their subevents.
    pub placed: Vec<PlacedEvent>,
    pub hidden_event_count: usize,
}

/// Everything placement depends on besides the events.
pub struct LayoutContext<'a> {
    pub metrics: &'a Metrics,
    pub ctx: &'a AppContext,
    pub flags: ViewFlags,
    pub measure: &'a dyn TextMeasure,
    pub font: &'a Font,
}

impl LayoutContext<'_> {
    fn text_size(&self, text: &str) -> (i32, i32) {
        self.measure.text_extent(text, self.font)
    }

    fn box_height(&self, text: &str) -> i32 {
        self.text_size(text).1 + 2 * self.ctx.inner_padding
    }

    /// Horizontal extent of a period box: starts at the event's x.
    fn period_span(&self, event: &Event) -> (i32, i32) {
        let x = self.metrics.x_of(event.start());
        let width = self
            .metrics
            .width_of(&event.period)
            .max(self.ctx.min_period_event_width);
        (x, width)
    }

    fn draws_as_point(&self, event: &Event) -> bool {
        if event.is_container() {
            return false;
        }
        if event.is_point() {
            return true;
        }
        !self.flags.never_show_period_as_point
            && self.metrics.width_of(&event.period) < self.ctx.period_threshold
    }

    fn point_rect(&self, event: &Event, bottom: i32) -> Rect {
        let (text_w, text_h) = self.text_size(&event.text);
        let width = (text_w + 2 * self.ctx.inner_padding).max(self.ctx.min_point_event_width);
        let height = text_h + 2 * self.ctx.inner_padding;
        let x = self.metrics.x_of(event.start());
        let x = if self.flags.draw_point_events_to_right {
            x
        } else {
            x - width / 2
        };
        Rect::new(x, bottom - height, width, height)
    }
}

/// Place `events`.  Subevents whose container is not among `events` are
/// placed as ordinary events.
pub fn layout_events(mut events: Vec<Event>, lc: &LayoutContext<'_>) -> Layout {
    events.sort_by_key(Event::sort_key);

    let container_ids: Vec<EventId> = events
        .iter()
        .filter(|e| e.is_container())
        .map(|e| e.id)
        .collect();
    let mut children: BTreeMap<EventId, Vec<Event>> = BTreeMap::new();
    let mut top_level = Vec::with_capacity(events.len());
    for event in events {
        match event.container_id() {
            Some(c) if container_ids.contains(&c) => children.entry(c).or_default().push(event),
            _ => top_level.push(event),
        }
    }

    let divider = lc.metrics.divider_y();
    let height = lc.metrics.height();
    let outer = lc.ctx.outer_padding;
    let margin = lc.ctx.offscreen_margin;
    let clip_max = lc.metrics.width() + margin;

    let mut layout = Layout::default();
    let mut above: Vec<Rect> = Vec::new();
    let mut below: Vec<Rect> = Vec::new();

    for event in top_level {
        let subs = children.remove(&event.id).unwrap_or_default();

        if lc.draws_as_point(&event) {
            let mut rect = lc.point_rect(&event, divider - lc.ctx.baseline_padding);
            while let Some(o) = first_collision(&rect, &above, outer) {
                rect = rect.with_y(o.y - outer - rect.height);
            }
            if rect.y < 0 {
                layout.hidden_event_count += 1;
                continue;
            }
            above.push(rect);
            layout.placed.push(PlacedEvent {
                event,
                rect,
                drawn_as_point: true,
                inside: None,
            });
            continue;
        }

        let (x, width) = lc.period_span(&event);
        let header = lc.box_height(&event.text);
        let inner_rows = stack_subevents(&subs, x, width, header, lc);
        let box_height = inner_rows
            .iter()
            .map(|(_, r)| r.bottom() + lc.ctx.inner_padding)
            .max()
            .unwrap_or(header)
            .max(header);

        let mut rect = Rect::new(x, divider + lc.ctx.baseline_padding, width, box_height);
        while let Some(o) = first_collision(&rect, &below, outer) {
            rect = rect.with_y(o.bottom() + outer);
        }
        if rect.bottom() > height {
            layout.hidden_event_count += 1 + subs.len();
            continue;
        }
        below.push(rect);

        let Some(clipped) = rect.clip_x(-margin, clip_max) else {
            continue;
        };
        let id = event.id;
        layout.placed.push(PlacedEvent {
            event,
            rect: clipped,
            drawn_as_point: false,
            inside: None,
        });
        for (sub, relative) in inner_rows {
            let absolute = relative.with_y(relative.y + rect.y);
            if let Some(r) = absolute.clip_x(-margin, clip_max) {
                layout.placed.push(PlacedEvent {
                    event: sub,
                    rect: r,
                    drawn_as_point: false,
                    inside: Some(id),
                });
            }
        }
    }
    layout
}

/// Rows of subevents inside a container spanning `[x, x + width)`, with y
/// relative to the container top.
fn stack_subevents(
    subs: &[Event],
    x: i32,
    width: i32,
    header: i32,
    lc: &LayoutContext<'_>,
) -> Vec<(Event, Rect)> {
    let outer = lc.ctx.outer_padding;
    let mut placed: Vec<Rect> = Vec::new();
    let mut rows = Vec::with_capacity(subs.len());
    for sub in subs {
        let (sx, sw) = lc.period_span(sub);
        // A dragged subevent may stray outside its container until saved.
        let left = sx.clamp(x, x + width);
        let right = (sx + sw).clamp(x, x + width);
        if right <= left {
            continue;
        }
        let mut rect = Rect::new(left, header, right - left, lc.box_height(&sub.text));
        while let Some(o) = first_collision(&rect, &placed, outer) {
            rect = rect.with_y(o.bottom() + outer);
        }
        placed.push(rect);
        rows.push((sub.clone(), rect));
    }
    rows
}

fn first_collision(candidate: &Rect, placed: &[Rect], outer: i32) -> Option<Rect> {
    let grown = candidate.inflate(outer);
    placed.iter().find(|o| grown.intersects(o)).copied()
}
