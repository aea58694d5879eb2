// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Balloon geometry.
//!
//! A balloon shows an event's title, its period, the wrapped description and
//! the icon.  It sits above the event box, or below it when there is no
//! room above, and is kept inside the canvas horizontally.

use crate::config::AppContext;
use crate::event::EventId;
use crate::layout::PlacedEvent;
use crate::rect::Rect;
use crate::surface::{Bitmap, TextMeasure};
use crate::text::wrap_text;
use crate::time_type::TimeType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balloon {
    pub event_id: EventId,
    pub rect: Rect,
    pub title: String,
    pub lines: Vec<String>,
    pub icon: Option<Bitmap>,
    pub sticky: bool,
}

impl Balloon {
    /// Compute the balloon for a placed event on a `canvas_width` wide canvas.
    pub fn for_event(
        placed: &PlacedEvent,
        sticky: bool,
        time_type: TimeType,
        ctx: &AppContext,
        measure: &dyn TextMeasure,
        canvas_width: i32,
    ) -> Balloon {
        let event = &placed.event;
        let pad = ctx.inner_padding;
        let title_font = ctx.balloon_title_font();
        let body_font = ctx.event_font();
        let icon = event.data.icon.clone();
        let icon_w = icon.as_ref().map_or(0, |i| i.width + pad);
        let icon_h = icon.as_ref().map_or(0, |i| i.height);

        let text_width = (ctx.balloon_max_width - 2 * pad - icon_w).max(1);
        let mut lines = vec![time_type.format_period(event.period)];
        if let Some(description) = event.data.description.as_deref() {
            let rendered = ctx.balloon_text_format.render(description);
            lines.extend(wrap_text(&rendered, text_width, &body_font, measure));
        }

        let (title_w, title_h) = measure.text_extent(&event.text, &title_font);
        let line_h = measure.text_extent("", &body_font).1;
        let widest = lines
            .iter()
            .map(|l| measure.text_extent(l, &body_font).0)
            .chain(std::iter::once(title_w))
            .max()
            .unwrap_or(0);
        let width = (widest + icon_w + 2 * pad).min(ctx.balloon_max_width);
        let body_h = (lines.len() as i32 * line_h).max(icon_h);
        let height = title_h + body_h + 2 * pad;

        let anchor = placed.rect;
        let x = (anchor.center_x() - width / 2).clamp(0, (canvas_width - width).max(0));
        let above = anchor.y - ctx.outer_padding - height;
        let y = if above >= 0 {
            above
        } else {
            anchor.bottom() + ctx.outer_padding
        };

        Balloon {
            event_id: event.id,
            rect: Rect::new(x, y, width, height),
            title: event.text.clone(),
            lines,
            icon,
            sticky,
        }
    }

    /// Where the icon goes, if there is one.
    pub fn icon_origin<M: TextMeasure + ?Sized>(&self, ctx: &AppContext, measure: &M) -> Option<(i32, i32)> {
        let title_h = measure.text_extent(&self.title, &ctx.balloon_title_font()).1;
        self.icon.as_ref().map(|_| {
            (
                self.rect.x + ctx.inner_padding,
                self.rect.y + ctx.inner_padding + title_h,
            )
        })
    }
}
