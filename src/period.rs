// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time periods.
//!
//! This module provides:
//! - [`TimePeriod`]: an ordered pair of [`Instant`]s with `start <= end`
//! - [`union_of`]: merge a set of periods into sorted, disjoint runs

use crate::error::{DomainError, DomainResult};
use crate::instant::{Instant, TimeDelta, MICROS_PER_DAY};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval between two instants.
///
/// Set operations ([`overlaps`](Self::overlaps),
/// [`intersection`](Self::intersection)) treat the period as the half-open
/// range `[start, end)`.  Visibility queries use
/// [`touches`](Self::touches), which is closed on both sides so that point
/// periods (`start == end`) can be found.
///
/// # Examples
///
/// ```
/// use timescene::{Instant, TimePeriod};
///
/// let start = Instant::from_julian_day(2_451_545);
/// let end = Instant::from_julian_day(2_451_546);
/// let period = TimePeriod::new(start, end).unwrap();
/// assert_eq!(period.delta().whole_days(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimePeriod {
    start: Instant,
    end: Instant,
}

impl TimePeriod {
    /// Creates a new period, rejecting `start > end`.
    pub fn new(start: Instant, end: Instant) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a period from two instants in any order.
    pub fn from_unordered(a: Instant, b: Instant) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-length period at `t`.
    pub fn point(t: Instant) -> Self {
        Self { start: t, end: t }
    }

    /// A period starting at `start` and lasting `delta`.
    ///
    /// # Panics
    ///
    /// If `delta` is negative.
    pub fn starting_at(start: Instant, delta: TimeDelta) -> Self {
        assert!(!delta.is_negative(), "negative period length: {delta:?}");
        Self {
            start,
            end: start + delta,
        }
    }

    #[inline]
    pub const fn start(&self) -> Instant {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> Instant {
        self.end
    }

    /// `end - start`, never negative.
    #[inline]
    pub fn delta(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Midpoint of the period.
    #[inline]
    pub fn mean_time(&self) -> Instant {
        self.start.mean(self.end)
    }

    /// True for periods with a positive length.
    #[inline]
    pub fn is_period(&self) -> bool {
        self.start < self.end
    }

    /// Half-open containment; a point period contains only its own instant.
    pub fn contains(&self, t: Instant) -> bool {
        if self.start == self.end {
            t == self.start
        } else {
            self.start <= t && t < self.end
        }
    }

    /// True if `other` lies entirely within `self`.
    pub fn encloses(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Half-open overlap: touching periods do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Closed overlap: touching periods and contained points count.
    pub fn touches(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the overlapping sub-period between `self` and `other`.
    ///
    /// If one period ends exactly when the other starts, the intersection is
    /// empty and `None` is returned.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Smallest period covering both.
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True if the period is exactly one calendar day falling on a
    /// Saturday or a Sunday.
    pub fn is_weekend_day(&self) -> bool {
        self.start.micros_of_day() == 0
            && self.delta().micros() == MICROS_PER_DAY
            && self.start.weekday_index() >= 5
    }

    // ── navigation ────────────────────────────────────────────────────

    /// Shift both ends by `delta`.
    pub fn move_by(&self, delta: TimeDelta) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Same length, centred on `t`.
    pub fn center_on(&self, t: Instant) -> Self {
        self.move_by(t - self.mean_time())
    }

    /// Returns a copy with a new start, clamped so it never passes `end`.
    pub fn with_start(&self, start: Instant) -> Self {
        Self {
            start: start.min(self.end),
            end: self.end,
        }
    }

    /// Returns a copy with a new end, clamped so it never precedes `start`.
    pub fn with_end(&self, end: Instant) -> Self {
        Self {
            start: self.start,
            end: end.max(self.start),
        }
    }

    /// Zoom in (`times > 0`) or out (`times < 0`) by steps of a fifth of the
    /// current length.  `ratio` in `[0, 1]` is the anchor position: the
    /// instant at that fraction of the period keeps its place.
    ///
    /// Returns `None` when zooming in would collapse the period.
    pub fn zoom(&self, times: i32, ratio: f64) -> Option<Self> {
        let ratio = ratio.clamp(0.0, 1.0);
        let delta = self.delta();
        let step = times as f64 / 5.0;
        let start = self.start.checked_add(delta.scale(step * ratio))?;
        let end = self.end.checked_add(delta.scale(-step * (1.0 - ratio)))?;
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Merge `periods` into their union: sorted, pairwise disjoint, with
/// touching runs joined.  Zero-length periods are dropped.
///
/// The function sorts a copy and then runs a single O(n) pass.
pub fn union_of(periods: &[TimePeriod]) -> Vec<TimePeriod> {
    let mut sorted: Vec<TimePeriod> = periods.iter().copied().filter(|p| p.is_period()).collect();
    sorted.sort_by_key(|p| (p.start, p.end));

    let mut merged: Vec<TimePeriod> = Vec::with_capacity(sorted.len());
    for p in sorted {
        match merged.last_mut() {
            Some(last) if p.start <= last.end => {
                if p.end > last.end {
                    last.end = p.end;
                }
            }
            _ => merged.push(p),
        }
    }
    merged
}
