// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Timeline events.

use crate::category::CategoryId;
use crate::error::{DomainError, DomainResult};
use crate::instant::{Instant, TimeDelta};
use crate::period::TimePeriod;
use crate::surface::Bitmap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Process-unique event identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventId(u64);

impl EventId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of an event in the container hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    #[default]
    Plain,
    /// Groups subevents; its period is derived from theirs.
    Container,
    Subevent {
        container: EventId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alert {
    pub time: Instant,
    pub text: String,
}

/// Optional payload shown in balloons and indicated on the event box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventData {
    pub description: Option<String>,
    pub icon: Option<Bitmap>,
    pub hyperlink: Option<String>,
    /// Percent complete, `0..=100`.
    pub progress: Option<u8>,
    pub alert: Option<Alert>,
}

impl EventData {
    /// True when there is something a balloon could show.
    pub fn has_balloon_content(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.trim().is_empty()) || self.icon.is_some()
    }

    /// True when the event box gets a data indicator.
    pub fn has_any(&self) -> bool {
        self.has_balloon_content() || self.hyperlink.is_some() || self.alert.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pub id: EventId,
    pub text: String,
    pub period: TimePeriod,
    pub category: Option<CategoryId>,
    pub fuzzy: bool,
    pub locked: bool,
    pub ends_today: bool,
    pub kind: EventKind,
    pub data: EventData,
}

impl Event {
    pub fn new(id: EventId, period: TimePeriod, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            period,
            category: None,
            fuzzy: false,
            locked: false,
            ends_today: false,
            kind: EventKind::Plain,
            data: EventData::default(),
        }
    }

    /// A point event at `t`.
    pub fn point(id: EventId, t: Instant, text: impl Into<String>) -> Self {
        Self::new(id, TimePeriod::point(t), text)
    }

    /// An empty container.  Its period follows its subevents once they exist.
    pub fn container(id: EventId, period: TimePeriod, text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Container,
            ..Self::new(id, period, text)
        }
    }

    /// A subevent of `container`.
    pub fn subevent(id: EventId, container: EventId, period: TimePeriod, text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Subevent { container },
            ..Self::new(id, period, text)
        }
    }

    // ── builder setters ───────────────────────────────────────────────

    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_ends_today(mut self, ends_today: bool) -> Self {
        self.ends_today = ends_today;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: Bitmap) -> Self {
        self.data.icon = Some(icon);
        self
    }

    pub fn with_hyperlink(mut self, url: impl Into<String>) -> Self {
        self.data.hyperlink = Some(url.into());
        self
    }

    pub fn with_progress(mut self, percent: u8) -> Self {
        self.data.progress = Some(percent.min(100));
        self
    }

    pub fn with_alert(mut self, time: Instant, text: impl Into<String>) -> Self {
        self.data.alert = Some(Alert {
            time,
            text: text.into(),
        });
        self
    }

    pub fn with_period(mut self, period: TimePeriod) -> Self {
        self.period = period;
        self
    }

    // ── queries ───────────────────────────────────────────────────────

    #[inline]
    pub fn start(&self) -> Instant {
        self.period.start()
    }

    #[inline]
    pub fn end(&self) -> Instant {
        self.period.end()
    }

    /// True when start and end coincide.
    pub fn is_point(&self) -> bool {
        !self.period.is_period()
    }

    pub fn is_container(&self) -> bool {
        self.kind == EventKind::Container
    }

    pub fn is_subevent(&self) -> bool {
        matches!(self.kind, EventKind::Subevent { .. })
    }

    pub fn container_id(&self) -> Option<EventId> {
        match self.kind {
            EventKind::Subevent { container } => Some(container),
            _ => None,
        }
    }

    /// Layout and draw order key.
    pub fn sort_key(&self) -> (Instant, EventId) {
        (self.start(), self.id)
    }

    /// Fails with [`DomainError::EventLocked`] on a locked event.
    pub fn ensure_unlocked(&self) -> DomainResult<()> {
        if self.locked {
            Err(DomainError::EventLocked(self.id))
        } else {
            Ok(())
        }
    }

    /// A copy shifted by `delta`.
    pub fn moved_by(&self, delta: TimeDelta) -> Self {
        self.clone().with_period(self.period.move_by(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd(n: i64) -> Instant {
        Instant::from_julian_day(n)
    }

    #[test]
    fn kinds() {
        let c = Event::container(EventId::new(1), TimePeriod::point(jd(0)), "c");
        let s = Event::subevent(EventId::new(2), c.id, TimePeriod::point(jd(0)), "s");
        assert!(c.is_container() && !c.is_subevent());
        assert_eq!(s.container_id(), Some(c.id));
        assert!(!Event::point(EventId::new(3), jd(0), "p").is_container());
    }

    #[test]
    fn locked_events_refuse_changes() {
        let e = Event::point(EventId::new(4), jd(0), "x").with_locked(true);
        assert_eq!(e.ensure_unlocked(), Err(DomainError::EventLocked(EventId::new(4))));
        assert!(e.clone().with_locked(false).ensure_unlocked().is_ok());
    }

    #[test]
    fn balloon_content() {
        let e = Event::point(EventId::new(1), jd(0), "x");
        assert!(!e.data.has_balloon_content());
        assert!(!e.clone().with_description("  ").data.has_balloon_content());
        assert!(e.clone().with_description("notes").data.has_balloon_content());
        assert!(e.with_hyperlink("https://example.org").data.has_any());
    }

    #[test]
    fn progress_is_capped() {
        let e = Event::point(EventId::new(1), jd(0), "x").with_progress(140);
        assert_eq!(e.data.progress, Some(100));
    }

    #[test]
    fn moved_by_keeps_length() {
        let p = TimePeriod::new(jd(1), jd(3)).unwrap();
        let e = Event::new(EventId::new(1), p, "x").moved_by(TimeDelta::from_days(2));
        assert_eq!(e.period, TimePeriod::new(jd(3), jd(5)).unwrap());
    }
}
