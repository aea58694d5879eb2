// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Integer instants and durations.
//!
//! [`Instant`] is the core time type of the crate.  It stores a chronological
//! **julian day number** (days start at midnight, JD 2 451 545 is
//! 2000-01-01) plus the **microseconds elapsed since midnight** of that day.
//! [`TimeDelta`] is a signed count of microseconds.
//!
//! All arithmetic is exact and goes through a 128-bit intermediate.  A result
//! outside [`Instant::MIN`]..=[`Instant::MAX`] is an invariant violation and
//! panics with the operands in the message: callers are expected to stay
//! inside the range of their calendar (see [`TimeType`](crate::TimeType)).
//!
//! Conversions to floating point quantities go through `qtty` so that the
//! unit travels with the value.

use chrono::{DateTime, Utc};
use qtty::{Day, Days, Second, Seconds};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Chronological julian day of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

// ═══════════════════════════════════════════════════════════════════════════
// TimeDelta
// ═══════════════════════════════════════════════════════════════════════════

/// A signed duration with microsecond resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeDelta {
    micros: i64,
}

impl TimeDelta {
    pub const ZERO: Self = Self { micros: 0 };

    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    #[inline]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self::from_micros(seconds * MICROS_PER_SECOND)
    }

    #[inline]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self::from_micros(minutes * MICROS_PER_MINUTE)
    }

    #[inline]
    pub const fn from_hours(hours: i64) -> Self {
        Self::from_micros(hours * MICROS_PER_HOUR)
    }

    #[inline]
    pub const fn from_days(days: i64) -> Self {
        Self::from_micros(days * MICROS_PER_DAY)
    }

    /// Build a delta from a (possibly fractional) day quantity, rounding to
    /// the nearest microsecond.
    pub fn from_days_quantity(days: Days) -> Self {
        let micros = (days.value() * MICROS_PER_DAY as f64).round();
        assert!(
            micros.is_finite() && micros.abs() < i64::MAX as f64,
            "time delta out of range: {days:?}"
        );
        Self::from_micros(micros as i64)
    }

    #[inline]
    pub const fn micros(&self) -> i64 {
        self.micros
    }

    /// Whole days, truncated toward zero.
    #[inline]
    pub const fn whole_days(&self) -> i64 {
        self.micros / MICROS_PER_DAY
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.micros == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.micros < 0
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self::from_micros(self.micros.abs())
    }

    /// The delta as a floating point day quantity.
    #[inline]
    pub fn as_days(&self) -> Days {
        Days::new(self.micros as f64 / MICROS_PER_DAY as f64)
    }

    /// The delta as a floating point second quantity.
    #[inline]
    pub fn as_seconds(&self) -> Seconds {
        self.as_days().to::<Second>()
    }

    /// Multiply by a real factor, rounding to the nearest microsecond.
    pub fn scale(self, factor: f64) -> Self {
        let micros = (self.micros as f64 * factor).round();
        assert!(
            micros.is_finite() && micros.abs() < i64::MAX as f64,
            "time delta scale overflow: {self:?} * {factor}"
        );
        Self::from_micros(micros as i64)
    }

    /// `self / other` as a real number. Returns 0 when `other` is zero.
    pub fn ratio(self, other: Self) -> f64 {
        if other.micros == 0 {
            0.0
        } else {
            self.micros as f64 / other.micros as f64
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.micros.checked_add(rhs.micros).map(Self::from_micros)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.micros.checked_mul(rhs).map(Self::from_micros)
    }
}

impl From<Seconds> for TimeDelta {
    fn from(seconds: Seconds) -> Self {
        Self::from_days_quantity(seconds.to::<Day>())
    }
}

impl From<TimeDelta> for Days {
    fn from(delta: TimeDelta) -> Self {
        delta.as_days()
    }
}

impl Add for TimeDelta {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("time delta overflow: {self:?} + {rhs:?}"))
    }
}

impl Sub for TimeDelta {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.micros
            .checked_sub(rhs.micros)
            .map(Self::from_micros)
            .unwrap_or_else(|| panic!("time delta overflow: {self:?} - {rhs:?}"))
    }
}

impl Neg for TimeDelta {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_micros(-self.micros)
    }
}

impl Mul<i64> for TimeDelta {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        self.checked_mul(rhs)
            .unwrap_or_else(|| panic!("time delta overflow: {self:?} * {rhs}"))
    }
}

impl Div<i64> for TimeDelta {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        assert!(rhs != 0, "time delta divided by zero");
        Self::from_micros(self.micros / rhs)
    }
}

impl fmt::Display for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.micros < 0 { "-" } else { "" };
        let total = self.micros.unsigned_abs();
        let days = total / MICROS_PER_DAY as u64;
        let rest = total % MICROS_PER_DAY as u64;
        let seconds = rest / MICROS_PER_SECOND as u64;
        write!(
            f,
            "{sign}{days}d {:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Instant
// ═══════════════════════════════════════════════════════════════════════════

/// A point in time: julian day plus microseconds of day.
///
/// The pair is always normalised (`0 <= micros_of_day < MICROS_PER_DAY`), so
/// the derived lexicographic ordering is the chronological ordering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instant {
    julian_day: i64,
    micros_of_day: i64,
}

impl Instant {
    /// Smallest julian day any calendar may use.
    pub const MIN_JULIAN_DAY: i64 = -50_000_000;
    /// Largest julian day any calendar may use.
    pub const MAX_JULIAN_DAY: i64 = 50_000_000;

    pub const MIN: Self = Self {
        julian_day: Self::MIN_JULIAN_DAY,
        micros_of_day: 0,
    };
    pub const MAX: Self = Self {
        julian_day: Self::MAX_JULIAN_DAY,
        micros_of_day: MICROS_PER_DAY - 1,
    };

    /// Midnight at the start of `julian_day`.
    #[inline]
    pub fn from_julian_day(julian_day: i64) -> Self {
        Self::new(julian_day, 0)
    }

    /// Build an instant, carrying `micros_of_day` overflow into the day.
    ///
    /// # Panics
    ///
    /// If the normalised value falls outside [`Instant::MIN`]..=[`Instant::MAX`].
    pub fn new(julian_day: i64, micros_of_day: i64) -> Self {
        let total = julian_day as i128 * MICROS_PER_DAY as i128 + micros_of_day as i128;
        Self::from_total_micros(total).unwrap_or_else(|| {
            panic!("instant out of range: julian day {julian_day}, {micros_of_day} µs")
        })
    }

    /// Build from the julian day of a date and a wall clock time.
    pub fn from_day_and_time(julian_day: i64, hour: u32, minute: u32, second: u32) -> Self {
        let micros = hour as i64 * MICROS_PER_HOUR
            + minute as i64 * MICROS_PER_MINUTE
            + second as i64 * MICROS_PER_SECOND;
        Self::new(julian_day, micros)
    }

    /// Microseconds since julian day zero, or `None` outside the valid range.
    pub fn from_total_micros(total: i128) -> Option<Self> {
        let day = MICROS_PER_DAY as i128;
        let julian_day = total.div_euclid(day);
        let micros_of_day = total.rem_euclid(day);
        if julian_day < Self::MIN_JULIAN_DAY as i128 || julian_day > Self::MAX_JULIAN_DAY as i128 {
            return None;
        }
        Some(Self {
            julian_day: julian_day as i64,
            micros_of_day: micros_of_day as i64,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────

    #[inline]
    pub const fn julian_day(&self) -> i64 {
        self.julian_day
    }

    #[inline]
    pub const fn micros_of_day(&self) -> i64 {
        self.micros_of_day
    }

    #[inline]
    pub fn total_micros(&self) -> i128 {
        self.julian_day as i128 * MICROS_PER_DAY as i128 + self.micros_of_day as i128
    }

    /// Fractional julian date as a day quantity.
    pub fn julian_date(&self) -> Days {
        Days::new(self.julian_day as f64 + self.micros_of_day as f64 / MICROS_PER_DAY as f64)
    }

    /// `(hour, minute, second)` of the wall clock.
    pub fn hms(&self) -> (u32, u32, u32) {
        let seconds = self.micros_of_day / MICROS_PER_SECOND;
        (
            (seconds / 3600) as u32,
            ((seconds / 60) % 60) as u32,
            (seconds % 60) as u32,
        )
    }

    /// Day of week, Monday = 0 … Sunday = 6.
    #[inline]
    pub fn weekday_index(&self) -> u32 {
        self.julian_day.rem_euclid(7) as u32
    }

    /// Midnight of the same day.
    #[inline]
    pub fn start_of_day(&self) -> Self {
        Self {
            julian_day: self.julian_day,
            micros_of_day: 0,
        }
    }

    /// The same wall-clock time rounded down to a multiple of `unit_micros`.
    pub fn floor_within_day(&self, unit_micros: i64) -> Self {
        debug_assert!(unit_micros > 0);
        Self {
            julian_day: self.julian_day,
            micros_of_day: self.micros_of_day - self.micros_of_day % unit_micros,
        }
    }

    // ── UTC helpers ───────────────────────────────────────────────────

    /// Build an instant from a `chrono::DateTime<Utc>`, truncated to the
    /// microsecond.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        let micros = datetime.timestamp() as i128 * MICROS_PER_SECOND as i128
            + (datetime.timestamp_subsec_nanos() / 1_000) as i128;
        let total = UNIX_EPOCH_JULIAN_DAY as i128 * MICROS_PER_DAY as i128 + micros;
        Self::from_total_micros(total)
            .unwrap_or_else(|| panic!("UTC timestamp out of instant range: {datetime}"))
    }

    /// Convert to a `chrono::DateTime<Utc>`.
    ///
    /// Returns `None` if the value falls outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let since_epoch =
            self.total_micros() - UNIX_EPOCH_JULIAN_DAY as i128 * MICROS_PER_DAY as i128;
        let micros = i64::try_from(since_epoch).ok()?;
        DateTime::<Utc>::from_timestamp_micros(micros)
    }

    // ── arithmetic ────────────────────────────────────────────────────

    pub fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        Self::from_total_micros(self.total_micros() + delta.micros() as i128)
    }

    pub fn checked_sub(self, delta: TimeDelta) -> Option<Self> {
        Self::from_total_micros(self.total_micros() - delta.micros() as i128)
    }

    /// Add, clamping to `[lo, hi]` instead of panicking.
    pub fn saturating_add_within(self, delta: TimeDelta, lo: Self, hi: Self) -> Self {
        let total = self.total_micros() + delta.micros() as i128;
        if total <= lo.total_micros() {
            lo
        } else if total >= hi.total_micros() {
            hi
        } else {
            Self::from_total_micros(total).unwrap_or(hi)
        }
    }

    /// Midpoint between two instants.
    pub fn mean(self, other: Self) -> Self {
        let total = (self.total_micros() + other.total_micros()).div_euclid(2);
        Self::from_total_micros(total).unwrap_or_else(|| {
            panic!("instant mean out of range: {self:?}, {other:?}")
        })
    }
}

impl Add<TimeDelta> for Instant {
    type Output = Self;
    #[inline]
    fn add(self, rhs: TimeDelta) -> Self {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("time arithmetic overflow: {self:?} + {rhs:?}"))
    }
}

impl AddAssign<TimeDelta> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDelta) {
        *self = *self + rhs;
    }
}

impl Sub<TimeDelta> for Instant {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("time arithmetic overflow: {self:?} - {rhs:?}"))
    }
}

impl SubAssign<TimeDelta> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: TimeDelta) {
        *self = *self - rhs;
    }
}

impl Sub for Instant {
    type Output = TimeDelta;
    #[inline]
    fn sub(self, rhs: Self) -> TimeDelta {
        // MAX - MIN is below i64::MAX microseconds.
        TimeDelta::from_micros((self.total_micros() - rhs.total_micros()) as i64)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(
            f,
            "JD {} {:02}:{:02}:{:02}.{:06}",
            self.julian_day,
            h,
            m,
            s,
            self.micros_of_day % MICROS_PER_SECOND
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
