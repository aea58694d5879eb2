// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Timeline data sources.
//!
//! The rendering core reads events, categories and eras through
//! [`TimelineSource`] and writes back only through `save_event` /
//! `delete_event`.  [`MemoryTimeline`] is the in-process implementation:
//! it owns the id counter and enforces the event and category rules.

use crate::category::{Categories, Category, CategoryId};
use crate::era::{Era, EraId, Eras};
use crate::error::{DomainError, DomainResult};
use crate::event::{Event, EventId, EventKind};
use crate::instant::TimeDelta;
use crate::observer::Observable;
use crate::period::TimePeriod;
use crate::time_type::TimeType;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// What changed in a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineChange {
    EventSaved(EventId),
    EventDeleted(EventId),
    CategorySaved(CategoryId),
    CategoryDeleted(CategoryId),
    EraSaved(EraId),
    EraDeleted(EraId),
}

/// Read/write access to a timeline.
pub trait TimelineSource {
    /// Events whose period touches `period` (closed on both ends), ordered by
    /// `(start, id)`.
    fn events_in(&self, period: TimePeriod) -> Vec<Event>;

    fn event_by_id(&self, id: EventId) -> Option<Event>;

    /// Subevents of a container, ordered by `(start, id)`.
    fn subevents_of(&self, container: EventId) -> Vec<Event>;

    fn categories(&self) -> &Categories;

    fn eras(&self) -> &Eras;

    fn time_type(&self) -> TimeType;

    /// The period a fresh view should open on.
    fn preferred_period(&self) -> TimePeriod;

    /// Insert or replace an event.
    fn save_event(&mut self, event: Event) -> DomainResult<EventId>;

    fn delete_event(&mut self, id: EventId) -> DomainResult<()>;

    fn changes(&self) -> &Observable<TimelineChange>;
}

/// A timeline held in memory.
#[derive(Debug)]
pub struct MemoryTimeline {
    time_type: TimeType,
    events: BTreeMap<EventId, Event>,
    categories: Categories,
    eras: Eras,
    preferred_period: Option<TimePeriod>,
    next_id: AtomicU64,
    changes: Observable<TimelineChange>,
}

impl MemoryTimeline {
    pub fn new(time_type: TimeType) -> Self {
        Self {
            time_type,
            events: BTreeMap::new(),
            categories: Categories::new(),
            eras: Eras::new(),
            preferred_period: None,
            next_id: AtomicU64::new(1),
            changes: Observable::new(),
        }
    }

    fn next_raw_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new_event_id(&self) -> EventId {
        EventId::new(self.next_raw_id())
    }

    pub fn new_category_id(&self) -> CategoryId {
        CategoryId::new(self.next_raw_id())
    }

    pub fn new_era_id(&self) -> EraId {
        EraId::new(self.next_raw_id())
    }

    pub fn set_preferred_period(&mut self, period: TimePeriod) {
        self.preferred_period = Some(period);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    // ── categories ────────────────────────────────────────────────────

    pub fn save_category(&mut self, category: Category) -> DomainResult<CategoryId> {
        let id = category.id;
        self.categories.save(category)?;
        self.changes.notify(TimelineChange::CategorySaved(id));
        Ok(id)
    }

    /// Delete a category.  Events that used it become uncategorized.
    pub fn delete_category(&mut self, id: CategoryId) -> DomainResult<()> {
        self.categories.remove(id)?;
        for event in self.events.values_mut() {
            if event.category == Some(id) {
                event.category = None;
            }
        }
        self.changes.notify(TimelineChange::CategoryDeleted(id));
        Ok(())
    }

    // ── eras ──────────────────────────────────────────────────────────

    pub fn save_era(&mut self, era: Era) -> DomainResult<EraId> {
        if !era.period.is_period() {
            return Err(DomainError::InvalidPeriod {
                start: era.period.start(),
                end: era.period.end(),
            });
        }
        let id = era.id;
        self.eras.save(era);
        self.changes.notify(TimelineChange::EraSaved(id));
        Ok(id)
    }

    pub fn delete_era(&mut self, id: EraId) -> DomainResult<()> {
        self.eras.remove(id)?;
        self.changes.notify(TimelineChange::EraDeleted(id));
        Ok(())
    }

    // ── events ────────────────────────────────────────────────────────

    fn check_event(&self, event: &Event) -> DomainResult<()> {
        if let Some(category) = event.category {
            if !self.categories.contains(category) {
                return Err(DomainError::UnknownCategory(category));
            }
        }
        if let Some(stored) = self.events.get(&event.id) {
            // A locked event may only be unlocked.
            let only_unlocking = Event {
                locked: stored.locked,
                ..event.clone()
            } == *stored;
            if stored.locked && !only_unlocking {
                return Err(DomainError::EventLocked(event.id));
            }
        }
        if let Some(container) = event.container_id() {
            let parent = self
                .events
                .get(&container)
                .ok_or(DomainError::UnknownEvent(container))?;
            if !parent.is_container() {
                return Err(DomainError::NotAContainer(container));
            }
        }
        Ok(())
    }

    /// Container period is the hull of its subevents; an empty container
    /// keeps its own.
    fn refresh_container(&mut self, container: EventId) {
        let hull = self
            .events
            .values()
            .filter(|e| e.container_id() == Some(container))
            .map(|e| e.period)
            .reduce(|a, b| a.hull(&b));
        if let (Some(hull), Some(c)) = (hull, self.events.get_mut(&container)) {
            c.period = hull;
        }
    }

    fn subevent_ids(&self, container: EventId) -> Vec<EventId> {
        self.events
            .values()
            .filter(|e| e.container_id() == Some(container))
            .map(|e| e.id)
            .collect()
    }
}

impl TimelineSource for MemoryTimeline {
    fn events_in(&self, period: TimePeriod) -> Vec<Event> {
        let mut found: Vec<Event> = self
            .events
            .values()
            .filter(|e| e.period.touches(&period))
            .cloned()
            .collect();
        found.sort_by_key(Event::sort_key);
        found
    }

    fn event_by_id(&self, id: EventId) -> Option<Event> {
        self.events.get(&id).cloned()
    }

    fn subevents_of(&self, container: EventId) -> Vec<Event> {
        let mut subs: Vec<Event> = self
            .events
            .values()
            .filter(|e| e.container_id() == Some(container))
            .cloned()
            .collect();
        subs.sort_by_key(Event::sort_key);
        subs
    }

    fn categories(&self) -> &Categories {
        &self.categories
    }

    fn eras(&self) -> &Eras {
        &self.eras
    }

    fn time_type(&self) -> TimeType {
        self.time_type
    }

    fn preferred_period(&self) -> TimePeriod {
        if let Some(period) = self.preferred_period {
            return period;
        }
        let hull = self
            .events
            .values()
            .map(|e| e.period)
            .reduce(|a, b| a.hull(&b));
        match hull {
            Some(hull) if hull.is_period() => {
                let margin = TimeDelta::from_micros(hull.delta().micros() / 10);
                self.time_type.clamp_period(TimePeriod::from_unordered(
                    hull.start() - margin,
                    hull.end() + margin,
                ))
            }
            Some(point) => self.time_type.default_period(point.start()),
            None => self.time_type.default_period(self.time_type.now()),
        }
    }

    fn save_event(&mut self, event: Event) -> DomainResult<EventId> {
        self.check_event(&event)?;
        let id = event.id;
        let previous = self.events.get(&id).cloned();

        // Moving a container carries its subevents along, all or none.
        if let (EventKind::Container, Some(prev)) = (event.kind, &previous) {
            let shift = event.start() - prev.start();
            if !shift.is_zero() {
                let subs = self.subevent_ids(id);
                if let Some(locked) = subs.iter().find(|sub| self.events.get(sub).is_some_and(|s| s.locked)) {
                    return Err(DomainError::EventLocked(*locked));
                }
                for sub in subs {
                    if let Some(s) = self.events.get_mut(&sub) {
                        s.period = s.period.move_by(shift);
                    }
                }
            }
        }

        let new_container = event.container_id();
        self.events.insert(id, event);

        let old_container = previous.as_ref().and_then(Event::container_id);
        for container in [old_container, new_container, Some(id)].into_iter().flatten() {
            if self.events.get(&container).is_some_and(Event::is_container) {
                self.refresh_container(container);
            }
        }
        debug!(event = %id, "saved event");
        self.changes.notify(TimelineChange::EventSaved(id));
        Ok(id)
    }

    fn delete_event(&mut self, id: EventId) -> DomainResult<()> {
        let event = self.events.get(&id).ok_or(DomainError::UnknownEvent(id))?;
        event.ensure_unlocked()?;
        let container = event.container_id();
        let cascade = if event.is_container() {
            self.subevent_ids(id)
        } else {
            Vec::new()
        };

        self.events.remove(&id);
        for sub in &cascade {
            self.events.remove(sub);
        }
        if let Some(container) = container {
            self.refresh_container(container);
        }
        debug!(event = %id, cascaded = cascade.len(), "deleted event");
        for sub in cascade {
            self.changes.notify(TimelineChange::EventDeleted(sub));
        }
        self.changes.notify(TimelineChange::EventDeleted(id));
        Ok(())
    }

    fn changes(&self) -> &Observable<TimelineChange> {
        &self.changes
    }
}
