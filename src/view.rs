// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Per-view mutable state.
//!
//! Every mutator that changes something broadcasts a [`ViewChange`] through
//! [`ViewProperties::changes`] before returning; setting a value to what it
//! already is stays silent.

use crate::category::{Categories, CategoryId};
use crate::error::DomainResult;
use crate::event::{Event, EventId};
use crate::observer::Observable;
use crate::period::TimePeriod;
use crate::time_type::TimeType;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewChange {
    VisiblePeriod,
    DividerRatio,
    Selection,
    StickyBalloons,
    Hovered,
    PeriodSelection,
    CategoryVisibility,
    Flags,
    Preview,
}

/// Display toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewFlags {
    pub show_legend: bool,
    pub show_balloons_on_hover: bool,
    pub draw_point_events_to_right: bool,
    pub never_show_period_as_point: bool,
    pub center_event_texts: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_balloons_on_hover: true,
            draw_point_events_to_right: false,
            never_show_period_as_point: false,
            center_event_texts: false,
        }
    }
}

#[derive(Debug)]
pub struct ViewProperties {
    visible_period: TimePeriod,
    divider_ratio: f64,
    selected: BTreeSet<EventId>,
    sticky: BTreeSet<EventId>,
    hovered: Option<EventId>,
    period_selection: Option<TimePeriod>,
    category_visibility: HashMap<CategoryId, bool>,
    flags: ViewFlags,
    preview: BTreeMap<EventId, Event>,
    changes: Observable<ViewChange>,
}

impl ViewProperties {
    pub fn new(visible_period: TimePeriod) -> Self {
        Self {
            visible_period,
            divider_ratio: 0.5,
            selected: BTreeSet::new(),
            sticky: BTreeSet::new(),
            hovered: None,
            period_selection: None,
            category_visibility: HashMap::new(),
            flags: ViewFlags::default(),
            preview: BTreeMap::new(),
            changes: Observable::new(),
        }
    }

    pub fn changes(&self) -> &Observable<ViewChange> {
        &self.changes
    }

    fn changed(&self, change: ViewChange) {
        self.changes.notify(change);
    }

    // ── visible period ────────────────────────────────────────────────

    pub fn visible_period(&self) -> TimePeriod {
        self.visible_period
    }

    /// Show `period`, or leave the view untouched if the calendar does not
    /// accept it as a window.
    pub fn set_visible_period(&mut self, period: TimePeriod, time_type: TimeType) -> DomainResult<()> {
        let period = time_type.validate_visible_period(period)?;
        if period != self.visible_period {
            self.visible_period = period;
            self.changed(ViewChange::VisiblePeriod);
        }
        Ok(())
    }

    // ── divider ───────────────────────────────────────────────────────

    pub fn divider_ratio(&self) -> f64 {
        self.divider_ratio
    }

    /// Clamped to `[0, 1]`.
    pub fn set_divider_ratio(&mut self, ratio: f64) {
        let ratio = if ratio.is_nan() { 0.5 } else { ratio.clamp(0.0, 1.0) };
        if ratio != self.divider_ratio {
            self.divider_ratio = ratio;
            self.changed(ViewChange::DividerRatio);
        }
    }

    // ── selection ─────────────────────────────────────────────────────

    pub fn is_selected(&self, id: EventId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &BTreeSet<EventId> {
        &self.selected
    }

    pub fn set_selected(&mut self, id: EventId, selected: bool) {
        let changed = if selected {
            self.selected.insert(id)
        } else {
            self.selected.remove(&id)
        };
        if changed {
            self.changed(ViewChange::Selection);
        }
    }

    pub fn toggle_selected(&mut self, id: EventId) {
        let now = !self.is_selected(id);
        self.set_selected(id, now);
    }

    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.changed(ViewChange::Selection);
        }
    }

    /// Click on an event: with `ctrl` the event joins or leaves the
    /// selection; without it the event becomes the only selected one, or
    /// nothing is selected if it was selected before.
    pub fn click_select(&mut self, id: EventId, ctrl: bool) {
        if ctrl {
            self.toggle_selected(id);
            return;
        }
        let was_selected = self.is_selected(id);
        let before = std::mem::take(&mut self.selected);
        if !was_selected {
            self.selected.insert(id);
        }
        if before != self.selected {
            self.changed(ViewChange::Selection);
        }
    }

    /// Drop ids that no longer exist.
    pub fn retain_selected(&mut self, mut keep: impl FnMut(EventId) -> bool) {
        let before = self.selected.len() + self.sticky.len();
        self.selected.retain(|id| keep(*id));
        self.sticky.retain(|id| keep(*id));
        if self.selected.len() + self.sticky.len() != before {
            self.changed(ViewChange::Selection);
        }
    }

    // ── balloons ──────────────────────────────────────────────────────

    pub fn is_sticky(&self, id: EventId) -> bool {
        self.sticky.contains(&id)
    }

    pub fn sticky(&self) -> &BTreeSet<EventId> {
        &self.sticky
    }

    pub fn set_sticky(&mut self, id: EventId, sticky: bool) {
        let changed = if sticky {
            self.sticky.insert(id)
        } else {
            self.sticky.remove(&id)
        };
        if changed {
            self.changed(ViewChange::StickyBalloons);
        }
    }

    pub fn toggle_sticky(&mut self, id: EventId) {
        let now = !self.is_sticky(id);
        self.set_sticky(id, now);
    }

    pub fn hovered(&self) -> Option<EventId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<EventId>) {
        if self.hovered != id {
            self.hovered = id;
            self.changed(ViewChange::Hovered);
        }
    }

    // ── rubber band ───────────────────────────────────────────────────

    pub fn period_selection(&self) -> Option<TimePeriod> {
        self.period_selection
    }

    pub fn set_period_selection(&mut self, period: Option<TimePeriod>) {
        if self.period_selection != period {
            self.period_selection = period;
            self.changed(ViewChange::PeriodSelection);
        }
    }

    // ── categories ────────────────────────────────────────────────────

    /// Categories are visible unless explicitly hidden.
    pub fn is_category_visible(&self, id: CategoryId) -> bool {
        self.category_visibility.get(&id).copied().unwrap_or(true)
    }

    pub fn set_category_visible(&mut self, id: CategoryId, visible: bool) {
        if self.is_category_visible(id) != visible {
            self.category_visibility.insert(id, visible);
            self.changed(ViewChange::CategoryVisibility);
        }
    }

    /// An event is hidden when its category, or any ancestor of it, is
    /// hidden.  Uncategorized events are always visible.
    pub fn is_event_visible(&self, event: &Event, categories: &Categories) -> bool {
        match event.category {
            None => true,
            Some(id) => categories
                .lineage(id)
                .into_iter()
                .all(|cid| self.is_category_visible(cid)),
        }
    }

    // ── flags ─────────────────────────────────────────────────────────

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ViewFlags) {
        if self.flags != flags {
            self.flags = flags;
            self.changed(ViewChange::Flags);
        }
    }

    // ── drag preview ──────────────────────────────────────────────────

    /// Events being dragged, drawn instead of their stored versions until
    /// the drag is committed or cancelled.
    pub fn preview(&self) -> impl Iterator<Item = &Event> {
        self.preview.values()
    }

    pub fn has_preview(&self) -> bool {
        !self.preview.is_empty()
    }

    pub fn set_preview(&mut self, events: impl IntoIterator<Item = Event>) {
        let preview: BTreeMap<EventId, Event> = events.into_iter().map(|e| (e.id, e)).collect();
        if preview != self.preview {
            self.preview = preview;
            self.changed(ViewChange::Preview);
        }
    }

    pub fn take_preview(&mut self) -> Vec<Event> {
        let taken: Vec<Event> = std::mem::take(&mut self.preview).into_values().collect();
        if !taken.is_empty() {
            self.changed(ViewChange::Preview);
        }
        taken
    }

    pub fn clear_preview(&mut self) {
        self.take_preview();
    }

    /// Replace stored events by their previews.  Previews of events not in
    /// `events` are added when they touch `visible`.
    pub fn apply_preview(&self, events: Vec<Event>, visible: &TimePeriod) -> Vec<Event> {
        if self.preview.is_empty() {
            return events;
        }
        let mut seen = BTreeSet::new();
        let mut merged: Vec<Event> = events
            .into_iter()
            .map(|e| {
                seen.insert(e.id);
                self.preview.get(&e.id).cloned().unwrap_or(e)
            })
            .collect();
        merged.extend(
            self.preview
                .values()
                .filter(|e| !seen.contains(&e.id) && e.period.touches(visible))
                .cloned(),
        );
        merged.sort_by_key(Event::sort_key);
        merged
    }
}
