// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scenes.
//!
//! A [`Scene`] is the fully laid-out snapshot of one view of a timeline:
//! strip divisions, era bands, event rectangles, balloons and the legend.
//! It copies everything it needs from the timeline and the view at build
//! time, so later changes to either never show through.
//!
//! [`SceneBuilder`] runs the pipeline: metrics → strips → visible events →
//! layout → eras → balloons → legend.

use crate::balloon::Balloon;
use crate::category::Categories;
use crate::color::Rgb;
use crate::config::AppContext;
use crate::era::PaintedEra;
use crate::event::{Event, EventId};
use crate::instant::Instant;
use crate::layout::{layout_events, LayoutContext, PlacedEvent};
use crate::metrics::Metrics;
use crate::period::TimePeriod;
use crate::rect::Rect;
use crate::strip::{choose_strips, Strip, StripKind, StripSeries};
use crate::surface::TextMeasure;
use crate::time_type::TimeType;
use crate::timeline::TimelineSource;
use crate::view::{ViewFlags, ViewProperties};
use tracing::debug;

/// A placed event with everything the painter needs to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub event: Event,
    pub rect: Rect,
    pub drawn_as_point: bool,
    /// Container this subevent is drawn inside.
    pub inside: Option<EventId>,
    pub selected: bool,
    pub color: Rgb,
    pub progress_color: Rgb,
    pub font_color: Rgb,
}

impl EventEntry {
    pub fn id(&self) -> EventId {
        self.event.id
    }
}

/// A painted era clipped to the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraBand {
    pub era: PaintedEra,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb,
    pub swatch: Rect,
    pub text_origin: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub rect: Rect,
    pub entries: Vec<LegendEntry>,
}

/// Immutable, laid-out snapshot of a view.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: i32,
    pub height: i32,
    pub divider_y: i32,
    pub visible_period: TimePeriod,
    pub time_type: TimeType,
    pub metrics: Metrics,
    pub minor_strip: Strip,
    pub major_strip: Strip,
    pub minor_strip_periods: Vec<TimePeriod>,
    pub major_strip_periods: Vec<TimePeriod>,
    /// Saturdays and Sundays, when days are wide enough to show.
    pub weekend_periods: Vec<TimePeriod>,
    /// Draw order.
    pub events: Vec<EventEntry>,
    pub hidden_event_count: usize,
    pub eras: Vec<EraBand>,
    pub x_for_now: Option<i32>,
    /// Sticky balloons first, the hovered one last.
    pub balloons: Vec<Balloon>,
    pub legend: Option<Legend>,
    pub flags: ViewFlags,
    pub period_selection: Option<TimePeriod>,
    /// Pixel reach of the move and resize handles.
    pub handle_tolerance: i32,
}

impl Scene {
    pub fn entry(&self, id: EventId) -> Option<&EventEntry> {
        self.events.iter().find(|e| e.id() == id)
    }

    pub fn is_visible(&self, id: EventId) -> bool {
        self.entry(id).is_some()
    }
}

/// Builds [`Scene`]s for a canvas of a given size.
pub struct SceneBuilder<'a> {
    ctx: &'a AppContext,
    measure: &'a dyn TextMeasure,
    width: i32,
    height: i32,
    now: Option<Instant>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(ctx: &'a AppContext, measure: &'a dyn TextMeasure, width: i32, height: i32) -> Self {
        Self {
            ctx,
            measure,
            width: width.max(0),
            height: height.max(0),
            now: None,
        }
    }

    /// Fix the instant used for the now-line and ends-today events.
    /// Defaults to the wall clock at build time.
    pub fn with_now(mut self, now: Instant) -> Self {
        self.now = Some(now);
        self
    }

    pub fn build(&self, timeline: &dyn TimelineSource, view: &ViewProperties) -> Scene {
        let ctx = self.ctx;
        let time_type = timeline.time_type();
        let now = self.now.unwrap_or_else(|| time_type.now());
        let visible = view.visible_period();
        let flags = view.flags();
        let metrics = Metrics::new(self.width, self.height, visible, view.divider_ratio());

        let (minor_strip, major_strip) = choose_strips(
            visible,
            self.width,
            time_type,
            ctx.week_start,
            ctx.min_legible_strip_width,
            self.measure,
            &ctx.minor_strip_font(),
        );
        let minor_strip_periods: Vec<TimePeriod> = StripSeries::new(minor_strip, visible).collect();
        let major_strip_periods: Vec<TimePeriod> = StripSeries::new(major_strip, visible).collect();
        let weekend_periods: Vec<TimePeriod> = if minor_strip.kind <= StripKind::Week {
            let days = Strip::new(StripKind::Day, time_type, ctx.week_start);
            StripSeries::new(days, visible)
                .filter(TimePeriod::is_weekend_day)
                .collect()
        } else {
            Vec::new()
        };

        let categories = timeline.categories();
        let events = self.visible_events(timeline, view, now);
        let font = ctx.event_font();
        let layout = layout_events(
            events,
            &LayoutContext {
                metrics: &metrics,
                ctx,
                flags,
                measure: self.measure,
                font: &font,
            },
        );

        let entries: Vec<EventEntry> = layout
            .placed
            .into_iter()
            .map(|p| {
                let (color, progress_color, font_color) = self.event_colors(&p.event, categories);
                EventEntry {
                    selected: view.is_selected(p.event.id),
                    event: p.event,
                    rect: p.rect,
                    drawn_as_point: p.drawn_as_point,
                    inside: p.inside,
                    color,
                    progress_color,
                    font_color,
                }
            })
            .collect();

        let eras = self.era_bands(timeline, &metrics, &visible);
        let x_for_now = visible
            .touches(&TimePeriod::point(now))
            .then(|| metrics.x_of(now));

        let mut scene = Scene {
            width: self.width,
            height: self.height,
            divider_y: metrics.divider_y(),
            visible_period: visible,
            time_type,
            metrics,
            minor_strip,
            major_strip,
            minor_strip_periods,
            major_strip_periods,
            weekend_periods,
            events: entries,
            hidden_event_count: layout.hidden_event_count,
            eras,
            x_for_now,
            balloons: Vec::new(),
            legend: None,
            flags,
            period_selection: view.period_selection(),
            handle_tolerance: ctx.handle_tolerance,
        };
        scene.balloons = self.balloons(&scene, view);
        if flags.show_legend {
            scene.legend = self.legend(categories, view);
        }

        debug!(
            visible = %visible,
            minor = ?scene.minor_strip.kind,
            major = ?scene.major_strip.kind,
            placed = scene.events.len(),
            hidden = scene.hidden_event_count,
            eras = scene.eras.len(),
            "built scene"
        );
        scene
    }

    /// Events to lay out: stored events in the window with drag previews
    /// applied, ends-today events extended to `now`, hidden categories
    /// filtered out.
    fn visible_events(&self, timeline: &dyn TimelineSource, view: &ViewProperties, now: Instant) -> Vec<Event> {
        let visible = view.visible_period();
        let categories = timeline.categories();
        // Ends-today events stored wholly before the window still reach it
        // once extended, so the query runs from the start of the calendar.
        let query = TimePeriod::from_unordered(timeline.time_type().min_time(), visible.end());
        let events = view.apply_preview(timeline.events_in(query), &visible);
        events
            .into_iter()
            .filter(|e| e.ends_today || e.period.touches(&visible))
            .map(|mut e| {
                if e.ends_today {
                    e.period = e.period.with_end(now);
                }
                e
            })
            .filter(|e| e.period.touches(&visible))
            .filter(|e| view.is_event_visible(e, categories))
            .collect()
    }

    /// Base color, progress bar color and label color.
    fn event_colors(&self, event: &Event, categories: &Categories) -> (Rgb, Rgb, Rgb) {
        let done = event.data.progress == Some(100);
        let (base, progress, font) = match event.category.and_then(|id| categories.get(id)) {
            Some(c) => {
                let bar = if done { c.done_color } else { c.progress_color };
                (c.color, bar, c.font_color)
            }
            None => {
                let base = self.ctx.palette.default_event;
                (base, base.darken(0.7), None)
            }
        };
        let font = font.unwrap_or_else(|| base.text_color(self.ctx.text_contrast_threshold));
        (base, progress, font)
    }

    fn era_bands(&self, timeline: &dyn TimelineSource, metrics: &Metrics, visible: &TimePeriod) -> Vec<EraBand> {
        let margin = self.ctx.offscreen_margin;
        let inset = self.ctx.era_inset;
        let band_height = (self.height - 2 * inset).max(0);
        timeline
            .eras()
            .all_periods()
            .into_iter()
            .filter(|era| era.period.overlaps(visible))
            .filter_map(|era| {
                let x0 = metrics.x_of(era.period.start());
                let x1 = metrics.x_of(era.period.end());
                if x1 <= x0 {
                    return None;
                }
                let rect = Rect::new(x0, inset, x1 - x0, band_height)
                    .clip_x(-margin, self.width + margin)?;
                Some(EraBand { era, rect })
            })
            .collect()
    }

    fn balloons(&self, scene: &Scene, view: &ViewProperties) -> Vec<Balloon> {
        let make = |entry: &EventEntry, sticky: bool| {
            let placed = PlacedEvent {
                event: entry.event.clone(),
                rect: entry.rect,
                drawn_as_point: entry.drawn_as_point,
                inside: entry.inside,
            };
            Balloon::for_event(&placed, sticky, scene.time_type, self.ctx, self.measure, self.width)
        };
        let mut balloons: Vec<Balloon> = scene
            .events
            .iter()
            .filter(|e| view.is_sticky(e.id()))
            .map(|e| make(e, true))
            .collect();
        if scene.flags.show_balloons_on_hover {
            let hovered = view
                .hovered()
                .filter(|id| !view.is_sticky(*id))
                .and_then(|id| scene.entry(id))
                .filter(|e| e.event.data.has_balloon_content());
            if let Some(entry) = hovered {
                balloons.push(make(entry, false));
            }
        }
        balloons
    }

    fn legend(&self, categories: &Categories, view: &ViewProperties) -> Option<Legend> {
        let visible: Vec<_> = categories
            .sorted_by_name()
            .into_iter()
            .filter(|c| {
                categories
                    .lineage(c.id)
                    .into_iter()
                    .all(|id| view.is_category_visible(id))
            })
            .collect();
        if visible.is_empty() {
            return None;
        }
        let font = self.ctx.legend_font();
        let pad = self.ctx.inner_padding;
        let text_h = self.measure.text_extent("", &font).1;
        let row = text_h + pad;
        let name_w = visible
            .iter()
            .map(|c| self.measure.text_extent(&c.name, &font).0)
            .max()
            .unwrap_or(0);
        let width = 3 * pad + text_h + name_w;
        let height = visible.len() as i32 * row + pad;
        let rect = Rect::new(
            self.ctx.outer_padding,
            self.height - self.ctx.outer_padding - height,
            width,
            height,
        );
        let entries = visible
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let y = rect.y + pad + i as i32 * row;
                LegendEntry {
                    name: c.name.clone(),
                    color: c.color,
                    swatch: Rect::new(rect.x + pad, y, text_h, text_h),
                    text_origin: (rect.x + 2 * pad + text_h, y),
                }
            })
            .collect();
        Some(Legend { rect, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::era::{Era, EraId};
    use crate::instant::TimeDelta;
    use crate::surface::FixedWidthMeasure;
    use crate::timeline::MemoryTimeline;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    fn january() -> TimePeriod {
        TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap()
    }

    fn build(tl: &MemoryTimeline, view: &ViewProperties, now: Instant) -> Scene {
        let ctx = AppContext::default();
        let measure = FixedWidthMeasure::default();
        SceneBuilder::new(&ctx, &measure, 310, 400)
            .with_now(now)
            .build(tl, view)
    }

    #[test]
    fn strips_and_now_line() {
        let tl = MemoryTimeline::new(TimeType::Gregorian);
        let view = ViewProperties::new(january());
        let scene = build(&tl, &view, greg(2020, 1, 16));
        assert_eq!(scene.minor_strip.kind, StripKind::Week);
        assert_eq!(scene.major_strip.kind, StripKind::Month);
        assert_eq!(scene.x_for_now, Some(150));
        assert_eq!(scene.divider_y, 200);
        assert!(scene.minor_strip_periods.windows(2).all(|w| w[0].end() == w[1].start()));

        let scene = build(&tl, &view, greg(2021, 1, 1));
        assert_eq!(scene.x_for_now, None);
    }

    #[test]
    fn ends_today_events_reach_now() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let e = Event::new(id, TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 5)).unwrap(), "ongoing")
            .with_ends_today(true);
        tl.save_event(e).unwrap();
        let view = ViewProperties::new(january());
        let scene = build(&tl, &view, greg(2020, 1, 21));
        let entry = scene.entry(id).unwrap();
        assert_eq!(entry.event.end(), greg(2020, 1, 21));
        assert_eq!(entry.rect.right(), 10 + 191);
    }

    #[test]
    fn ends_today_event_started_before_the_window_is_drawn() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let stored = TimePeriod::new(greg(2019, 1, 1), greg(2019, 2, 1)).unwrap();
        tl.save_event(Event::new(id, stored, "ongoing").with_ends_today(true)).unwrap();
        let past = tl.new_event_id();
        tl.save_event(Event::new(past, stored, "finished")).unwrap();

        let scene = build(&tl, &ViewProperties::new(january()), greg(2020, 1, 20));
        assert!(scene.is_visible(id));
        assert!(!scene.is_visible(past));
        let entry = scene.entry(id).unwrap();
        assert_eq!(entry.event.period, TimePeriod::new(greg(2019, 1, 1), greg(2020, 1, 20)).unwrap());
        assert_eq!(entry.rect.right(), 191);

        // Not yet started: stays out of a window that ends before it.
        let scene = build(
            &tl,
            &ViewProperties::new(TimePeriod::new(greg(2018, 1, 1), greg(2018, 2, 1)).unwrap()),
            greg(2020, 1, 20),
        );
        assert!(!scene.is_visible(id));
    }

    #[test]
    fn hidden_categories_are_filtered_and_legend_lists_visible_ones() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let work = tl
            .save_category(Category::new(tl.new_category_id(), "Work", Rgb::new(200, 0, 0)))
            .unwrap();
        let home = tl
            .save_category(Category::new(tl.new_category_id(), "Home", Rgb::new(0, 200, 0)))
            .unwrap();
        let a = tl.new_event_id();
        tl.save_event(Event::point(a, greg(2020, 1, 10), "a").with_category(work)).unwrap();
        let b = tl.new_event_id();
        tl.save_event(Event::point(b, greg(2020, 1, 20), "b").with_category(home)).unwrap();

        let mut view = ViewProperties::new(january());
        view.set_category_visible(home, false);
        let scene = build(&tl, &view, greg(2020, 1, 1));
        assert!(scene.is_visible(a));
        assert!(!scene.is_visible(b));
        assert_eq!(scene.entry(a).unwrap().color, Rgb::new(200, 0, 0));

        let legend = scene.legend.unwrap();
        let names: Vec<_> = legend.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Work"]);
        assert_eq!(legend.rect.bottom(), 400 - 5);
    }

    #[test]
    fn era_bands_do_not_overlap() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        tl.save_era(Era::new(
            EraId::new(100),
            TimePeriod::new(greg(2020, 1, 5), greg(2020, 1, 15)).unwrap(),
            "A",
            red,
        ))
        .unwrap();
        tl.save_era(Era::new(
            EraId::new(101),
            TimePeriod::new(greg(2020, 1, 10), greg(2020, 3, 1)).unwrap(),
            "B",
            blue,
        ))
        .unwrap();
        let scene = build(&tl, &ViewProperties::new(january()), greg(2020, 1, 1));
        let rects: Vec<Rect> = scene.eras.iter().map(|b| b.rect).collect();
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], Rect::new(40, 0, 50, 400));
        assert_eq!(rects[1], Rect::new(90, 0, 50, 400));
        assert_eq!(rects[2].x, 140);
        assert_eq!(rects[2].right(), 320);
        assert!(rects.windows(2).all(|w| w[0].right() <= w[1].x));
    }

    #[test]
    fn sticky_then_hovered_balloons() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let a = tl.new_event_id();
        tl.save_event(Event::point(a, greg(2020, 1, 10), "a")).unwrap();
        let b = tl.new_event_id();
        tl.save_event(Event::point(b, greg(2020, 1, 20), "b").with_description("notes"))
            .unwrap();

        let mut view = ViewProperties::new(january());
        view.set_sticky(a, true);
        view.set_hovered(Some(b));
        let scene = build(&tl, &view, greg(2020, 1, 1));
        let ids: Vec<_> = scene.balloons.iter().map(|b| b.event_id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(scene.balloons[0].sticky && !scene.balloons[1].sticky);
    }

    #[test]
    fn preview_is_drawn_instead_of_stored_event() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let stored = Event::new(id, TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 10)).unwrap(), "x");
        tl.save_event(stored.clone()).unwrap();
        let mut view = ViewProperties::new(january());
        view.set_preview([stored.moved_by(TimeDelta::from_days(5))]);
        let scene = build(&tl, &view, greg(2020, 1, 1));
        assert_eq!(scene.entry(id).unwrap().rect.x, 60);
    }
}
