// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Pointer and keyboard input.
//!
//! [`InputController`] is a small state machine driven by the host's mouse
//! and key callbacks.  Each call borrows the current [`Scene`], the timeline,
//! the view and the host for its duration only, through [`InputContext`].
//!
//! ```text
//!             left-down                           left-up / Escape
//!   NoOp ───────────────────► ScrollByDrag     ─────────────────────► NoOp
//!        ├─ Ctrl, empty ────► CreatePeriodByDrag
//!        ├─ Shift, empty ───► ZoomByDrag
//!        ├─ move handle ────► MoveByDrag
//!        └─ resize handle ──► ResizeByDrag
//! ```
//!
//! Drags write a preview into the view; nothing reaches the timeline before
//! left-up.  A commit the timeline rejects is rolled back by dropping the
//! preview.  Calls that make no sense in the current state are ignored.

use crate::config::AppContext;
use crate::error::DomainError;
use crate::event::{Event, EventId};
use crate::hit_test::Handle;
use crate::instant::{Instant, TimeDelta};
use crate::metrics::Metrics;
use crate::period::TimePeriod;
use crate::scene::Scene;
use crate::snap::{snap, snap_period};
use crate::strip::Strip;
use crate::time_type::TimeType;
use crate::timeline::TimelineSource;
use crate::view::ViewProperties;
use std::time::Duration;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    fn any(self) -> bool {
        self.ctrl || self.shift || self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CursorShape {
    #[default]
    Arrow,
    SizeHorizontal,
    Move,
    IBeam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ShowBalloon,
    HideBalloon,
}

/// A one-shot timer the host should run and hand back through
/// [`InputController::timer_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub kind: TimerKind,
    pub delay: Duration,
    /// Firings from an older generation are ignored.
    pub generation: u64,
    pub event: Option<EventId>,
}

/// Services the controller asks of the embedding application.
pub trait InputHost {
    fn create_period_event(&mut self, period: TimePeriod);
    fn create_point_event(&mut self, at: Instant);
    fn edit_event(&mut self, id: EventId);
    fn set_cursor(&mut self, cursor: CursorShape);
    fn request_redraw(&mut self);
    fn schedule_timer(&mut self, request: TimerRequest);
    /// A change was rejected and rolled back.
    fn report_error(&mut self, _error: &DomainError) {}
}

/// What one input call works on.
pub struct InputContext<'a> {
    pub scene: &'a Scene,
    pub timeline: &'a mut dyn TimelineSource,
    pub view: &'a mut ViewProperties,
    pub host: &'a mut dyn InputHost,
}

/// Public name of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    NoOp,
    ScrollByDrag,
    ZoomByDrag,
    CreatePeriodByDrag,
    MoveByDrag,
    ResizeByDrag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
}

/// Frozen at left-down so the drag is computed against the canvas the user
/// grabbed, not the one being redrawn under the cursor.
#[derive(Debug, Clone, Copy)]
struct Grab {
    x: i32,
    metrics: Metrics,
    strip: Strip,
    time_type: TimeType,
}

impl Grab {
    fn time_at(&self, x: i32) -> Instant {
        self.metrics.time_at(x)
    }
}

#[derive(Debug, Clone)]
enum State {
    NoOp,
    ScrollByDrag { grab: Grab },
    ZoomByDrag { grab: Grab, anchor: Instant },
    CreatePeriodByDrag { grab: Grab, anchor: Instant },
    /// `originals[0]` is the grabbed event; subevents of a container follow.
    MoveByDrag { grab: Grab, originals: Vec<Event> },
    ResizeByDrag { grab: Grab, original: Event, edge: Edge },
}

impl State {
    fn mode(&self) -> InputMode {
        match self {
            State::NoOp => InputMode::NoOp,
            State::ScrollByDrag { .. } => InputMode::ScrollByDrag,
            State::ZoomByDrag { .. } => InputMode::ZoomByDrag,
            State::CreatePeriodByDrag { .. } => InputMode::CreatePeriodByDrag,
            State::MoveByDrag { .. } => InputMode::MoveByDrag,
            State::ResizeByDrag { .. } => InputMode::ResizeByDrag,
        }
    }
}

#[derive(Debug)]
pub struct InputController {
    ctx: AppContext,
    state: State,
    cursor: CursorShape,
    balloon_generation: u64,
    /// Hover target of the balloon timer in flight.
    pending_balloon: Option<Option<EventId>>,
}

impl InputController {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: State::NoOp,
            cursor: CursorShape::Arrow,
            balloon_generation: 0,
            pending_balloon: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.state.mode()
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn balloon_generation(&self) -> u64 {
        self.balloon_generation
    }

    fn enter(&mut self, state: State) {
        trace!(from = ?self.state.mode(), to = ?state.mode(), "input transition");
        self.state = state;
    }

    fn grab(&self, scene: &Scene, x: i32) -> Grab {
        Grab {
            x,
            metrics: scene.metrics,
            strip: scene.minor_strip,
            time_type: scene.time_type,
        }
    }

    fn snap(&self, grab: &Grab, t: Instant) -> Instant {
        snap(t, &grab.strip, &grab.metrics, self.ctx.snap_tolerance)
    }

    fn set_cursor(&mut self, host: &mut dyn InputHost, cursor: CursorShape) {
        if self.cursor != cursor {
            self.cursor = cursor;
            host.set_cursor(cursor);
        }
    }

    fn cancel_balloon_timer(&mut self) {
        if self.pending_balloon.take().is_some() {
            self.balloon_generation += 1;
        }
    }

    // ── mouse ─────────────────────────────────────────────────────────

    pub fn left_down(&mut self, x: i32, y: i32, modifiers: Modifiers, ic: &mut InputContext<'_>) {
        if !matches!(self.state, State::NoOp) {
            return;
        }
        self.cancel_balloon_timer();
        let grab = self.grab(ic.scene, x);

        if let Some(handle) = ic.scene.hit_handle(x, y) {
            let Some(stored) = ic
                .scene
                .entry_at(x, y, false)
                .and_then(|e| ic.timeline.event_by_id(e.id()))
            else {
                return;
            };
            if stored.locked {
                return;
            }
            let next = match handle {
                Handle::Move if stored.ends_today => {
                    trace!(event = %stored.id, "ends-today events cannot be moved");
                    return;
                }
                Handle::Move => {
                    let mut originals = ic.timeline.subevents_of(stored.id);
                    if let Some(locked) = originals.iter().find(|s| s.locked) {
                        trace!(event = %stored.id, subevent = %locked.id, "container holds a locked subevent");
                        return;
                    }
                    originals.insert(0, stored);
                    State::MoveByDrag { grab, originals }
                }
                Handle::ResizeLeft => State::ResizeByDrag {
                    grab,
                    original: stored,
                    edge: Edge::Left,
                },
                Handle::ResizeRight if stored.ends_today => {
                    trace!(event = %stored.id, "ends-today events have no right edge");
                    return;
                }
                Handle::ResizeRight => State::ResizeByDrag {
                    grab,
                    original: stored,
                    edge: Edge::Right,
                },
            };
            self.enter(next);
            return;
        }

        match ic.scene.event_at(x, y, false) {
            Some(event) => {
                ic.view.click_select(event.id, modifiers.ctrl);
                ic.host.request_redraw();
            }
            None if !modifiers.any() => {
                ic.view.clear_selection();
                self.enter(State::ScrollByDrag { grab });
                ic.host.request_redraw();
            }
            None if modifiers.ctrl => {
                let anchor = self.snap(&grab, grab.time_at(x));
                self.enter(State::CreatePeriodByDrag { grab, anchor });
            }
            None if modifiers.shift => {
                let anchor = grab.time_at(x);
                self.enter(State::ZoomByDrag { grab, anchor });
            }
            None => {}
        }
    }

    pub fn mouse_moved(&mut self, x: i32, y: i32, modifiers: Modifiers, ic: &mut InputContext<'_>) {
        match self.state.clone() {
            State::NoOp => self.hover(x, y, modifiers, ic),
            State::ScrollByDrag { grab } => {
                let period = grab.metrics.period().move_by(grab.metrics.delta_for(grab.x - x));
                let period = grab.time_type.clamp_period(period);
                if let Err(err) = ic.view.set_visible_period(period, grab.time_type) {
                    trace!(%err, "scroll ignored");
                }
                ic.host.request_redraw();
            }
            State::ZoomByDrag { grab, anchor } => {
                ic.view
                    .set_period_selection(Some(TimePeriod::from_unordered(anchor, grab.time_at(x))));
                ic.host.request_redraw();
            }
            State::CreatePeriodByDrag { grab, anchor } => {
                let period = self.creation_period(&grab, anchor, x);
                ic.view.set_period_selection(Some(period));
                ic.host.request_redraw();
            }
            State::MoveByDrag { grab, originals } => {
                ic.view.set_preview(self.moved(&grab, &originals, x));
                ic.host.request_redraw();
            }
            State::ResizeByDrag { grab, original, edge } => {
                ic.view.set_preview([self.resized(&grab, &original, edge, x)]);
                ic.host.request_redraw();
            }
        }
    }

    pub fn left_up(&mut self, x: i32, _y: i32, ic: &mut InputContext<'_>) {
        match std::mem::replace(&mut self.state, State::NoOp) {
            State::NoOp => return,
            State::ScrollByDrag { .. } => {}
            State::ZoomByDrag { grab, anchor } => {
                ic.view.set_period_selection(None);
                let period = TimePeriod::from_unordered(anchor, grab.time_at(x));
                if period.is_period() {
                    let period = grab.time_type.clamp_period(period);
                    if let Err(err) = ic.view.set_visible_period(period, grab.time_type) {
                        trace!(%err, "zoom ignored");
                    }
                }
            }
            State::CreatePeriodByDrag { grab, anchor } => {
                ic.view.set_period_selection(None);
                let period = self.creation_period(&grab, anchor, x);
                ic.host.create_period_event(period);
            }
            State::MoveByDrag { grab, originals } => {
                // Only the grabbed event is saved; the timeline shifts a
                // container's subevents by the same delta, or rejects all.
                if let Some(primary) = originals.first() {
                    let shift = self.move_shift(&grab, primary, x);
                    commit(primary.moved_by(shift), ic);
                }
            }
            State::ResizeByDrag { grab, original, edge } => {
                let resized = self.resized(&grab, &original, edge, x);
                commit(resized, ic);
            }
        }
        trace!(to = ?InputMode::NoOp, "input transition");
        ic.host.request_redraw();
    }

    pub fn double_click(&mut self, x: i32, y: i32, ic: &mut InputContext<'_>) {
        if !matches!(self.state, State::NoOp) {
            return;
        }
        match ic.scene.event_at(x, y, false) {
            Some(event) => ic.host.edit_event(event.id),
            None => {
                let grab = self.grab(ic.scene, x);
                let at = self.snap(&grab, grab.time_at(x));
                ic.host.create_point_event(at);
            }
        }
    }

    /// `steps > 0` is the wheel rolled away from the user: pan toward the
    /// past, zoom in with Ctrl, raise the divider with Shift.
    pub fn wheel(&mut self, x: i32, steps: i32, modifiers: Modifiers, ic: &mut InputContext<'_>) {
        if steps == 0 || !matches!(self.state, State::NoOp) {
            return;
        }
        let view = &mut *ic.view;
        let time_type = ic.scene.time_type;
        let visible = view.visible_period();
        if modifiers.shift {
            let ratio = view.divider_ratio() - steps as f64 * self.ctx.wheel_divider_step;
            view.set_divider_ratio(ratio);
        } else {
            let next = if modifiers.ctrl {
                let ratio = if ic.scene.width > 0 {
                    x as f64 / ic.scene.width as f64
                } else {
                    0.5
                };
                visible.zoom(steps, ratio)
            } else {
                let shift = visible.delta().scale(-steps as f64 * self.ctx.wheel_scroll_fraction);
                Some(time_type.clamp_period(visible.move_by(shift)))
            };
            match next {
                Some(period) => {
                    if let Err(err) = view.set_visible_period(period, time_type) {
                        trace!(%err, "wheel navigation ignored");
                    }
                }
                None => trace!("zoom would collapse the visible period"),
            }
        }
        ic.host.request_redraw();
    }

    // ── keyboard ──────────────────────────────────────────────────────

    /// Escape abandons the drag in progress and its preview.
    pub fn key_down(&mut self, key: Key, ic: &mut InputContext<'_>) {
        if key != Key::Escape || matches!(self.state, State::NoOp) {
            return;
        }
        if let State::ScrollByDrag { grab } = &self.state {
            if let Err(err) = ic.view.set_visible_period(grab.metrics.period(), grab.time_type) {
                trace!(%err, "scroll cancel ignored");
            }
        }
        ic.view.clear_preview();
        ic.view.set_period_selection(None);
        self.enter(State::NoOp);
        ic.host.request_redraw();
    }

    // ── balloons ──────────────────────────────────────────────────────

    pub fn timer_fired(&mut self, request: TimerRequest, ic: &mut InputContext<'_>) {
        if request.generation != self.balloon_generation {
            trace!(generation = request.generation, "stale balloon timer");
            return;
        }
        self.pending_balloon = None;
        match request.kind {
            TimerKind::ShowBalloon => ic.view.set_hovered(request.event),
            TimerKind::HideBalloon => ic.view.set_hovered(None),
        }
        ic.host.request_redraw();
    }

    fn hover(&mut self, x: i32, y: i32, modifiers: Modifiers, ic: &mut InputContext<'_>) {
        let scene = ic.scene;
        let cursor = match scene.hit_handle(x, y) {
            Some(Handle::Move) => CursorShape::Move,
            Some(Handle::ResizeLeft | Handle::ResizeRight) => CursorShape::SizeHorizontal,
            None if modifiers.ctrl && scene.event_at(x, y, false).is_none() => CursorShape::IBeam,
            None => CursorShape::Arrow,
        };
        self.set_cursor(ic.host, cursor);

        if !scene.flags.show_balloons_on_hover {
            return;
        }
        let over_balloon = scene
            .balloon_at(x, y)
            .filter(|b| !b.sticky)
            .map(|b| b.event_id);
        let target = over_balloon.or_else(|| {
            scene
                .event_at(x, y, false)
                .filter(|e| e.data.has_balloon_content() && !ic.view.is_sticky(e.id))
                .map(|e| e.id)
        });

        if target == ic.view.hovered() {
            self.cancel_balloon_timer();
            return;
        }
        if self.pending_balloon == Some(target) {
            return;
        }
        self.balloon_generation += 1;
        self.pending_balloon = Some(target);
        let (kind, delay) = match target {
            Some(_) => (TimerKind::ShowBalloon, self.ctx.balloon_show_delay),
            None => (TimerKind::HideBalloon, self.ctx.balloon_hide_delay),
        };
        ic.host.schedule_timer(TimerRequest {
            kind,
            delay,
            generation: self.balloon_generation,
            event: target,
        });
    }

    // ── drag geometry ─────────────────────────────────────────────────

    fn creation_period(&self, grab: &Grab, anchor: Instant, x: i32) -> TimePeriod {
        snap_period(
            anchor,
            grab.time_at(x),
            &grab.strip,
            &grab.metrics,
            self.ctx.snap_tolerance,
        )
    }

    /// The grabbed event shifted by the cursor travel, with the start (or
    /// failing that the end) snapped to a strip boundary.  Subevents follow.
    fn moved(&self, grab: &Grab, originals: &[Event], x: i32) -> Vec<Event> {
        let Some(primary) = originals.first() else {
            return Vec::new();
        };
        let shift = self.move_shift(grab, primary, x);
        originals.iter().map(|e| e.moved_by(shift)).collect()
    }

    fn move_shift(&self, grab: &Grab, primary: &Event, x: i32) -> TimeDelta {
        let raw = grab.time_at(x) - grab.time_at(grab.x);
        self.snapped_shift(grab, &primary.period, raw)
    }

    fn snapped_shift(&self, grab: &Grab, period: &TimePeriod, raw: TimeDelta) -> TimeDelta {
        let start = period.start() + raw;
        let snapped = self.snap(grab, start);
        if snapped != start {
            return snapped - period.start();
        }
        let end = period.end() + raw;
        self.snap(grab, end) - period.end()
    }

    /// A dragged edge that crosses the other one stops there.
    fn resized(&self, grab: &Grab, original: &Event, edge: Edge, x: i32) -> Event {
        let t = self.snap(grab, grab.time_at(x));
        let period = match edge {
            Edge::Left => original.period.with_start(t),
            Edge::Right => original.period.with_end(t),
        };
        original.clone().with_period(period)
    }
}

/// Save a dragged event; on rejection the preview is dropped, which leaves
/// the stored event as it was.
fn commit(event: Event, ic: &mut InputContext<'_>) {
    ic.view.clear_preview();
    let id = event.id;
    if let Err(err) = ic.timeline.save_event(event) {
        warn!(event = %id, %err, "drag rejected, rolled back");
        ic.host.report_error(&err);
    }
}
