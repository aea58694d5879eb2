// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Hit testing against a built [`Scene`].
//!
//! All lookups are linear scans in reverse draw order, so the topmost
//! rectangle wins.  A miss is `None`.

use crate::balloon::Balloon;
use crate::event::Event;
use crate::period::TimePeriod;
use crate::rect::Rect;
use crate::scene::{EventEntry, Scene};

/// Interactive zone of a selected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Move,
    ResizeLeft,
    ResizeRight,
}

impl Scene {
    /// Topmost entry under `(x, y)`.  A subevent is returned unless
    /// `prefer_container` asks for the container around it.
    pub fn entry_at(&self, x: i32, y: i32, prefer_container: bool) -> Option<&EventEntry> {
        let hit = self.events.iter().rev().find(|e| e.rect.contains(x, y))?;
        match hit.inside {
            Some(container) if prefer_container => self.entry(container).or(Some(hit)),
            _ => Some(hit),
        }
    }

    pub fn event_at(&self, x: i32, y: i32, prefer_container: bool) -> Option<&Event> {
        self.entry_at(x, y, prefer_container).map(|e| &e.event)
    }

    pub fn event_with_rect_at(&self, x: i32, y: i32) -> Option<(&Event, Rect)> {
        self.entry_at(x, y, false).map(|e| (&e.event, e.rect))
    }

    /// Balloon under `(x, y)`; the hovered balloon is drawn last and wins.
    pub fn balloon_at(&self, x: i32, y: i32) -> Option<&Balloon> {
        self.balloons.iter().rev().find(|b| b.rect.contains(x, y))
    }

    /// Minor strip period under pixel column `x`.
    pub fn strip_at(&self, x: i32) -> Option<TimePeriod> {
        if x < 0 || x >= self.width {
            return None;
        }
        Some(self.minor_strip.period_containing(self.metrics.time_at(x)))
    }

    /// Handle of a selected, unlocked event under `(x, y)`.
    ///
    /// Edges win over the center.  Containers and events drawn as points
    /// only offer [`Handle::Move`]: their box does not map to their period.
    pub fn hit_handle(&self, x: i32, y: i32) -> Option<Handle> {
        let entry = self.entry_at(x, y, false)?;
        if !entry.selected || entry.event.locked {
            return None;
        }
        let rect = entry.rect;
        let tol = self.handle_tolerance;
        let resizable = !entry.drawn_as_point && !entry.event.is_container();
        if resizable && (x - rect.x).abs() < tol {
            Some(Handle::ResizeLeft)
        } else if resizable && (rect.right() - x).abs() < tol {
            Some(Handle::ResizeRight)
        } else if (x - rect.center_x()).abs() <= tol {
            Some(Handle::Move)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppContext;
    use crate::event::EventId;
    use crate::instant::Instant;
    use crate::scene::SceneBuilder;
    use crate::surface::FixedWidthMeasure;
    use crate::time_type::TimeType;
    use crate::timeline::{MemoryTimeline, TimelineSource};
    use crate::view::ViewProperties;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    fn january() -> TimePeriod {
        TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap()
    }

    fn scene(tl: &MemoryTimeline, view: &ViewProperties) -> Scene {
        let ctx = AppContext::default();
        let measure = FixedWidthMeasure::default();
        SceneBuilder::new(&ctx, &measure, 310, 400)
            .with_now(greg(2020, 1, 1))
            .build(tl, view)
    }

    /// A period event spanning Jan 2 to Jan 20: x 10..191, y 215..233.
    fn one_period(locked: bool) -> (MemoryTimeline, EventId) {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let id = tl.new_event_id();
        let p = TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 20)).unwrap();
        tl.save_event(Event::new(id, p, "task").with_locked(locked)).unwrap();
        (tl, id)
    }

    #[test]
    fn empty_scene_hits_nothing() {
        let tl = MemoryTimeline::new(TimeType::Gregorian);
        let s = scene(&tl, &ViewProperties::new(january()));
        assert!(s.event_at(100, 100, false).is_none());
        assert!(s.balloon_at(100, 100).is_none());
        assert_eq!(s.hit_handle(100, 100), None);
    }

    #[test]
    fn event_rect_lookup() {
        let (tl, id) = one_period(false);
        let s = scene(&tl, &ViewProperties::new(january()));
        let (event, rect) = s.event_with_rect_at(50, 220).unwrap();
        assert_eq!(event.id, id);
        assert_eq!(rect, Rect::new(10, 215, 181, 18));
        assert!(s.event_at(50, 100, false).is_none());
    }

    #[test]
    fn handles_need_selection() {
        let (tl, id) = one_period(false);
        let mut view = ViewProperties::new(january());
        assert_eq!(scene(&tl, &view).hit_handle(12, 220), None);

        view.set_selected(id, true);
        let s = scene(&tl, &view);
        assert_eq!(s.hit_handle(12, 220), Some(Handle::ResizeLeft));
        assert_eq!(s.hit_handle(188, 220), Some(Handle::ResizeRight));
        assert_eq!(s.hit_handle(100, 220), Some(Handle::Move));
        assert_eq!(s.hit_handle(60, 220), None);
    }

    #[test]
    fn locked_events_have_no_handles() {
        let (tl, id) = one_period(true);
        let mut view = ViewProperties::new(january());
        view.set_selected(id, true);
        let s = scene(&tl, &view);
        assert!(s.event_at(188, 220, false).is_some());
        assert_eq!(s.hit_handle(188, 220), None);
    }

    #[test]
    fn subevents_win_unless_container_preferred() {
        let mut tl = MemoryTimeline::new(TimeType::Gregorian);
        let c = tl.new_event_id();
        let span = TimePeriod::new(greg(2020, 1, 2), greg(2020, 1, 20)).unwrap();
        tl.save_event(Event::container(c, span, "box")).unwrap();
        let s1 = tl.new_event_id();
        tl.save_event(Event::subevent(s1, c, span, "inner")).unwrap();

        let view = ViewProperties::new(january());
        let s = scene(&tl, &view);
        let sub_rect = s.entry(s1).unwrap().rect;
        let (x, y) = (sub_rect.center_x(), sub_rect.center_y());
        assert_eq!(s.event_at(x, y, false).map(|e| e.id), Some(s1));
        assert_eq!(s.event_at(x, y, true).map(|e| e.id), Some(c));
        assert_eq!(tl.subevents_of(c).len(), 1);
    }

    #[test]
    fn strip_under_column() {
        let tl = MemoryTimeline::new(TimeType::Gregorian);
        let s = scene(&tl, &ViewProperties::new(january()));
        let week = s.strip_at(155).unwrap();
        assert!(week.contains(s.metrics.time_at(155)));
        assert_eq!(week.delta().whole_days(), 7);
        assert!(s.strip_at(-1).is_none());
        assert!(s.strip_at(310).is_none());
    }

    #[test]
    fn balloon_lookup() {
        let (tl, id) = one_period(false);
        let mut view = ViewProperties::new(january());
        view.set_sticky(id, true);
        let s = scene(&tl, &view);
        let rect = s.balloons[0].rect;
        let hit = s.balloon_at(rect.x + 1, rect.y + 1).unwrap();
        assert_eq!(hit.event_id, id);
    }
}
