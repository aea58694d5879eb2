// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Painting a [`Scene`] onto a [`DrawingSurface`].
//!
//! Layers, back to front:
//!
//! 1. background
//! 2. era bands
//! 3. weekend bands
//! 4. minor strip dividers and labels
//! 5. major strip dividers and labels
//! 6. divider line
//! 7. stems from point events down to the divider
//! 8. now line
//! 9. period selection
//! 10. event boxes
//! 11. legend
//! 12. balloons, sticky ones first
//!
//! The painter reads the scene only; it never measures layout again except
//! to place text inside boxes that layout already sized.

use crate::balloon::Balloon;
use crate::config::AppContext;
use crate::rect::Rect;
use crate::scene::{EventEntry, Legend, Scene};
use crate::strip::FontHint;
use crate::surface::{Brush, DrawingSurface, Pen};

pub struct Painter<'a> {
    ctx: &'a AppContext,
}

impl<'a> Painter<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn paint(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        self.paint_background(scene, surface);
        self.paint_eras(scene, surface);
        self.paint_weekends(scene, surface);
        self.paint_minor_strips(scene, surface);
        self.paint_major_strips(scene, surface);
        self.paint_divider(scene, surface);
        self.paint_point_stems(scene, surface);
        self.paint_now_line(scene, surface);
        self.paint_period_selection(scene, surface);
        for entry in &scene.events {
            self.paint_event(scene, entry, surface);
        }
        self.paint_hidden_count(scene, surface);
        if let Some(legend) = &scene.legend {
            self.paint_legend(legend, surface);
        }
        for balloon in &scene.balloons {
            self.paint_balloon(balloon, surface);
        }
    }

    fn paint_background(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        surface.set_pen(Pen::transparent());
        surface.set_brush(Brush::solid(self.ctx.palette.background));
        surface.draw_rectangle(Rect::new(0, 0, scene.width, scene.height));
    }

    fn paint_eras(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        let font = self.ctx.minor_strip_font();
        surface.set_pen(Pen::transparent());
        for band in &scene.eras {
            surface.set_brush(Brush::solid(band.era.color));
            surface.draw_rectangle(band.rect);
            let (w, h) = surface.text_extent(&band.era.name, &font);
            if w + 2 * self.ctx.inner_padding <= band.rect.width {
                let x = band.rect.center_x() - w / 2;
                let y = band.rect.bottom() - h - self.ctx.inner_padding;
                surface.draw_text(x, y, &band.era.name, &font);
            }
        }
    }

    fn paint_weekends(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        surface.set_pen(Pen::transparent());
        surface.set_brush(Brush::solid(self.ctx.palette.weekend));
        for period in &scene.weekend_periods {
            let x0 = scene.metrics.x_of(period.start());
            let x1 = scene.metrics.x_of(period.end());
            if x1 > x0 {
                surface.draw_rectangle(Rect::new(x0, 0, x1 - x0, scene.height));
            }
        }
    }

    /// Minor labels sit just above the divider, centred in their period.
    fn paint_minor_strips(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        surface.set_pen(Pen::solid(self.ctx.palette.minor_strip_divider));
        for period in &scene.minor_strip_periods {
            let x0 = scene.metrics.x_of(period.start());
            let x1 = scene.metrics.x_of(period.end());
            surface.draw_line(x0, 0, x0, scene.height);

            let font = match scene.minor_strip.font_hint(period) {
                FontHint::Weekend => self.ctx.weekend_strip_font(),
                FontHint::Normal => self.ctx.minor_strip_font(),
            };
            let label = scene.minor_strip.label(period.start(), false);
            let (w, h) = surface.text_extent(&label, &font);
            let x = (x0 + x1) / 2 - w / 2;
            surface.draw_text(x, scene.divider_y - h, &label, &font);
        }
    }

    /// Major labels sit at the top, centred in the visible part of their
    /// period.
    fn paint_major_strips(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        let font = self.ctx.major_strip_font();
        surface.set_pen(Pen::solid(self.ctx.palette.major_strip_divider));
        for period in &scene.major_strip_periods {
            let x0 = scene.metrics.x_of(period.start());
            let x1 = scene.metrics.x_of(period.end());
            surface.draw_line(x0, 0, x0, scene.height);

            let label = scene.major_strip.label(period.start(), true);
            let (w, _) = surface.text_extent(&label, &font);
            let left = x0.max(0);
            let right = x1.min(scene.width);
            let x = ((left + right) / 2 - w / 2).max(left.min(right - w));
            surface.draw_text(x, self.ctx.inner_padding, &label, &font);
        }
    }

    fn paint_divider(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        surface.set_pen(Pen::solid(self.ctx.palette.divider_line));
        surface.draw_line(0, scene.divider_y, scene.width, scene.divider_y);
    }

    fn paint_point_stems(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        surface.set_pen(Pen::solid(self.ctx.palette.divider_line));
        surface.set_brush(Brush::solid(self.ctx.palette.divider_line));
        for entry in scene.events.iter().filter(|e| e.drawn_as_point) {
            let x = scene.metrics.x_of(entry.event.start());
            surface.draw_line(x, entry.rect.bottom(), x, scene.divider_y);
            surface.draw_circle(x, scene.divider_y, 2);
        }
    }

    fn paint_now_line(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        if let Some(x) = scene.x_for_now {
            surface.set_pen(Pen::solid(self.ctx.palette.now_line));
            surface.draw_line(x, 0, x, scene.height);
        }
    }

    fn paint_period_selection(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        let Some(period) = scene.period_selection else {
            return;
        };
        let x0 = scene.metrics.x_of(period.start());
        let x1 = scene.metrics.x_of(period.end());
        surface.set_pen(Pen::dashed(self.ctx.palette.rubber_band));
        surface.set_brush(Brush::hatch(self.ctx.palette.rubber_band));
        surface.draw_rectangle(Rect::new(x0, 0, (x1 - x0).max(1), scene.height));
    }

    fn paint_event(&self, scene: &Scene, entry: &EventEntry, surface: &mut dyn DrawingSurface) {
        let rect = entry.rect;
        let event = &entry.event;
        let darkening = f64::from(self.ctx.palette.event_border_darkening) / 100.0;
        let border = entry.color.darken(darkening);

        surface.set_pen(Pen::solid(border));
        surface.set_brush(Brush::solid(entry.color));
        surface.draw_rectangle(rect);

        if let Some(percent) = event.data.progress.filter(|p| *p > 0) {
            let width = rect.width * i32::from(percent) / 100;
            let height = self.ctx.inner_padding.min(rect.height);
            surface.set_pen(Pen::transparent());
            surface.set_brush(Brush::solid(entry.progress_color));
            surface.draw_rectangle(Rect::new(rect.x, rect.bottom() - height, width, height));
        }

        let edge = (rect.height / 2).min(rect.width / 4);
        if event.fuzzy && edge > 0 {
            surface.set_pen(Pen::transparent());
            surface.set_brush(Brush::hatch(self.ctx.palette.background));
            surface.draw_rectangle(Rect::new(rect.x, rect.y, edge, rect.height));
            surface.draw_rectangle(Rect::new(rect.right() - edge, rect.y, edge, rect.height));
        }
        if event.locked {
            let r = (rect.height / 3).max(1);
            surface.set_pen(Pen::solid(border));
            surface.set_brush(Brush::solid(self.ctx.palette.background));
            surface.draw_circle(rect.x, rect.center_y(), r);
            surface.draw_circle(rect.right(), rect.center_y(), r);
        }

        self.paint_event_text(scene, entry, surface);

        if event.data.has_any() {
            let s = (rect.height / 2).min(rect.width / 2).min(2 * self.ctx.inner_padding);
            surface.set_pen(Pen::transparent());
            surface.set_brush(Brush::solid(border));
            surface.draw_polygon(&[
                (rect.right() - s, rect.y),
                (rect.right(), rect.y),
                (rect.right(), rect.y + s),
            ]);
        }

        if entry.selected && !event.locked {
            self.paint_handles(entry, surface);
        }
    }

    /// Text starts at the box's left edge, or the canvas edge when the box
    /// begins off screen, and is clipped to the box.
    fn paint_event_text(&self, scene: &Scene, entry: &EventEntry, surface: &mut dyn DrawingSurface) {
        let rect = entry.rect;
        let pad = self.ctx.inner_padding;
        let inner = rect.inset(pad, 0);
        if inner.is_empty() || entry.event.text.is_empty() {
            return;
        }
        let font = self.ctx.event_font().with_color(entry.font_color);
        let (w, _) = surface.text_extent(&entry.event.text, &font);
        let left = inner.x.max(pad);
        let x = if scene.flags.center_event_texts || entry.drawn_as_point {
            (inner.center_x() - w / 2).max(left)
        } else {
            left
        };
        surface.set_clip(inner);
        surface.draw_text(x, rect.y + pad, &entry.event.text, &font);
        surface.clear_clip();
    }

    fn paint_handles(&self, entry: &EventEntry, surface: &mut dyn DrawingSurface) {
        let rect = entry.rect;
        let size = self.ctx.handle_tolerance;
        let y = rect.center_y() - size / 2;
        let square = |x: i32| Rect::new(x - size / 2, y, size, size);
        surface.set_pen(Pen::solid(self.ctx.palette.selection_handle));
        surface.set_brush(Brush::solid(self.ctx.palette.selection_handle));
        let resizable = !entry.drawn_as_point && !entry.event.is_container();
        if resizable {
            surface.draw_rectangle(square(rect.x));
            surface.draw_rectangle(square(rect.right()));
        }
        surface.draw_rectangle(square(rect.center_x()));
    }

    fn paint_hidden_count(&self, scene: &Scene, surface: &mut dyn DrawingSurface) {
        if scene.hidden_event_count == 0 {
            return;
        }
        let font = self.ctx.legend_font();
        let text = format!("{} hidden", scene.hidden_event_count);
        let (w, h) = surface.text_extent(&text, &font);
        let pad = self.ctx.outer_padding;
        surface.draw_text(scene.width - w - pad, scene.height - h - pad, &text, &font);
    }

    fn paint_legend(&self, legend: &Legend, surface: &mut dyn DrawingSurface) {
        let palette = &self.ctx.palette;
        let font = self.ctx.legend_font();
        surface.set_pen(Pen::solid(palette.text));
        surface.set_brush(Brush::solid(palette.legend_background));
        surface.draw_rectangle(legend.rect);
        for entry in &legend.entries {
            surface.set_brush(Brush::solid(entry.color));
            surface.draw_rectangle(entry.swatch);
            let (x, y) = entry.text_origin;
            surface.draw_text(x, y, &entry.name, &font);
        }
    }

    fn paint_balloon(&self, balloon: &Balloon, surface: &mut dyn DrawingSurface) {
        let pad = self.ctx.inner_padding;
        let rect = balloon.rect;
        let title_font = self.ctx.balloon_title_font();
        let body_font = self.ctx.event_font();

        surface.set_pen(Pen::solid(self.ctx.palette.text));
        surface.set_brush(Brush::solid(self.ctx.palette.balloon_background));
        surface.draw_rectangle(rect);
        surface.set_clip(rect);

        let (_, title_h) = surface.text_extent(&balloon.title, &title_font);
        surface.draw_text(rect.x + pad, rect.y + pad, &balloon.title, &title_font);

        let mut text_x = rect.x + pad;
        if let (Some(icon), Some((ix, iy))) = (&balloon.icon, balloon.icon_origin(self.ctx, &*surface)) {
            surface.draw_bitmap(icon, ix, iy);
            text_x += icon.width + pad;
        }
        let line_h = surface.text_extent("", &body_font).1;
        let mut y = rect.y + pad + title_h;
        for line in &balloon.lines {
            surface.draw_text(text_x, y, line, &body_font);
            y += line_h;
        }
        surface.clear_clip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::color::Rgb;
    use crate::era::{Era, EraId};
    use crate::event::Event;
    use crate::instant::Instant;
    use crate::period::TimePeriod;
    use crate::scene::SceneBuilder;
    use crate::surface::{DrawCall, FixedWidthMeasure, PenStyle, RecordingSurface};
    use crate::time_type::TimeType;
    use crate::timeline::{MemoryTimeline, TimelineSource};
    use crate::view::ViewProperties;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    fn january() -> TimePeriod {
        TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap()
    }

    fn paint(tl: &MemoryTimeline, view: &ViewProperties, now: Instant) -> (Scene, RecordingSurface) {
        let ctx = AppContext::default();
        let measure = FixedWidthMeasure::default();
        let scene = SceneBuilder::new(&ctx, &measure, 310, 400)
            .with_now(now)
            .build(tl, view);
        let mut surface = RecordingSurface::new();
        Painter::new(&ctx).paint(&scene, &mut surface);
        (scene, surface)
    }

    fn rect_index(surface: &RecordingSurface, rect: Rect) -> usize {
        surface
            .position(|c| *c == DrawCall::Rectangle(rect))
            .unwrap_or_else(|| panic!("{rect:?} was not drawn"))
    }

    #[test]
    fn layers_are_drawn_back_to_front() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let cat = tl
            .save_category(Category::new(tl.new_category_id(), "Work", Rgb::new(0, 0, 128)))
            .unwrap();
        tl.save_era(Era::new(
            EraId::new(500),
            TimePeriod::new(greg(2020, 1, 5), greg(2020, 1, 15)).unwrap(),
            "Winter",
            Rgb::new(200, 220, 255),
        ))
        .unwrap();
        let id = tl.new_event_id();
        let span = TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 20)).unwrap();
        tl.save_event(Event::new(id, span, "task").with_category(cat)).unwrap();
        let mut view = ViewProperties::new(january());
        view.set_sticky(id, true);

        let (scene, surface) = paint(&tl, &view, greg(2020, 1, 16));
        assert_eq!(surface.calls[2], DrawCall::Rectangle(Rect::new(0, 0, 310, 400)));

        let era = rect_index(&surface, scene.eras[0].rect);
        // Jan 4 2020 was a Saturday.
        let weekend = rect_index(&surface, Rect::new(30, 0, 10, 400));
        rect_index(&surface, Rect::new(40, 0, 10, 400));
        let divider = surface
            .position(|c| *c == DrawCall::Line(0, 200, 310, 200))
            .unwrap();
        let now = surface
            .position(|c| *c == DrawCall::Line(150, 0, 150, 400))
            .unwrap();
        let event = rect_index(&surface, scene.entry(id).unwrap().rect);
        let legend = rect_index(&surface, scene.legend.as_ref().unwrap().rect);
        let balloon = rect_index(&surface, scene.balloons[0].rect);
        assert!(era < weekend);
        assert!(weekend < divider);
        assert!(divider < now);
        assert!(now < event);
        assert!(event < legend);
        assert!(legend < balloon);
        assert!(surface.texts().contains(&"Winter"));
    }

    #[test]
    fn label_color_follows_contrast() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let dark = tl
            .save_category(Category::new(tl.new_category_id(), "Dark", Rgb::new(0, 0, 128)))
            .unwrap();
        let light = tl
            .save_category(Category::new(tl.new_category_id(), "Light", Rgb::new(250, 250, 200)))
            .unwrap();
        let span = |a, b| TimePeriod::new(greg(2020, 1, a), greg(2020, 1, b)).unwrap();
        tl.save_event(Event::new(tl.new_event_id(), span(2, 20), "night").with_category(dark))
            .unwrap();
        tl.save_event(Event::new(tl.new_event_id(), span(3, 21), "day").with_category(light))
            .unwrap();

        let (_, surface) = paint(&tl, &ViewProperties::new(january()), greg(2020, 1, 1));
        let color_of = |label: &str| {
            surface.calls.iter().find_map(|c| match c {
                DrawCall::Text { text, font, .. } if text == label => Some(font.color),
                _ => None,
            })
        };
        assert_eq!(color_of("night"), Some(Rgb::WHITE));
        assert_eq!(color_of("day"), Some(Rgb::BLACK));
    }

    #[test]
    fn event_decorations() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let span = TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 20)).unwrap();
        tl.save_event(
            Event::new(id, span, "task")
                .with_fuzzy(true)
                .with_progress(50)
                .with_description("more")
                .with_locked(true),
        )
        .unwrap();
        let mut view = ViewProperties::new(january());
        view.set_selected(id, true);
        let (scene, surface) = paint(&tl, &view, greg(2020, 1, 1));
        let rect = scene.entry(id).unwrap().rect;

        // Progress bar covers half the box along its bottom edge.
        rect_index(&surface, Rect::new(rect.x, rect.bottom() - 3, rect.width / 2, 3));
        // Fuzzy ends.
        rect_index(&surface, Rect::new(rect.x, rect.y, 9, rect.height));
        let circles = surface
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Circle(..)))
            .count();
        assert_eq!(circles, 2);
        assert!(surface.calls.iter().any(|c| matches!(c, DrawCall::Polygon(p) if p.len() == 3)));
        // Locked events show no handles even when selected.
        let handle = Rect::new(rect.center_x() - 2, rect.center_y() - 2, 5, 5);
        assert!(surface.position(|c| *c == DrawCall::Rectangle(handle)).is_none());
    }

    #[test]
    fn selected_events_get_handles_and_clipped_text() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let span = TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 20)).unwrap();
        tl.save_event(Event::new(id, span, "task")).unwrap();
        let mut view = ViewProperties::new(january());
        view.set_selected(id, true);
        let (scene, surface) = paint(&tl, &view, greg(2020, 1, 1));
        let rect = scene.entry(id).unwrap().rect;

        for x in [rect.x, rect.center_x(), rect.right()] {
            rect_index(&surface, Rect::new(x - 2, rect.center_y() - 2, 5, 5));
        }
        let clip = surface.position(|c| *c == DrawCall::Clip(rect.inset(3, 0))).unwrap();
        assert!(matches!(&surface.calls[clip + 1], DrawCall::Text { text, .. } if text == "task"));
        assert_eq!(surface.calls[clip + 2], DrawCall::ClearClip);
    }

    #[test]
    fn point_events_get_a_stem() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let t = greg(2020, 1, 11);
        let id = tl.new_event_id();
        tl.save_event(Event::point(id, t, "pin")).unwrap();
        let (scene, surface) = paint(&tl, &ViewProperties::new(january()), greg(2020, 1, 1));
        let rect = scene.entry(id).unwrap().rect;
        assert!(surface.calls.contains(&DrawCall::Line(100, rect.bottom(), 100, 200)));
        assert!(surface.calls.contains(&DrawCall::Circle(100, 200, 2)));
    }

    #[test]
    fn period_selection_is_hatched() {
        let tl = MemoryTimeline::new(TimeType::Gregorian);
        let mut view = ViewProperties::new(january());
        view.set_period_selection(Some(TimePeriod::new(greg(2020, 1, 6), greg(2020, 1, 13)).unwrap()));
        let (_, surface) = paint(&tl, &view, greg(2020, 1, 1));
        let at = rect_index(&surface, Rect::new(50, 0, 70, 400));
        assert!(matches!(surface.calls[at - 2], DrawCall::Pen(p) if p.style == PenStyle::Dashed));
    }
}
