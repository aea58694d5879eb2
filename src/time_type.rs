// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Calendars.
//!
//! Every calendar shares the [`Instant`] representation; a [`TimeType`]
//! only decides how julian days map to `(year, month, day)` triples, how
//! those are labelled, and which range of time may be shown.
//!
//! | Variant | Calendar | Range |
//! |---------|----------|-------|
//! | [`TimeType::Gregorian`] | Proleptic Gregorian (via `chrono`) | JD 0 … 9990-01-01 |
//! | [`TimeType::Pharaonic`] | Egyptian civil: 12 × 30 days + 5 epagomenal | 1 Thoth year 1 … JD 5 369 833 |

use crate::config::WeekStart;
use crate::error::{DomainError, DomainResult};
use crate::instant::{Instant, TimeDelta, MICROS_PER_DAY};
use crate::period::TimePeriod;
use chrono::{Datelike, NaiveDate, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Julian day of 0000-12-31 in the proleptic Gregorian calendar, so that
/// `julian_day = GREGORIAN_CE_OFFSET + num_days_from_ce`.
const GREGORIAN_CE_OFFSET: i64 = 1_721_425;

/// 9990-01-01, the last instant shown by both calendars.
const LAST_JULIAN_DAY: i64 = 5_369_833;

/// 1 Thoth of year 1 (era of Nabonassar).
const PHARAONIC_EPOCH: i64 = 1_448_638;
const PHARAONIC_YEAR_DAYS: i64 = 365;
const PHARAONIC_MONTH_DAYS: u32 = 30;

const GREGORIAN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const PHARAONIC_MONTHS: [&str; 13] = [
    "Thoth",
    "Phaophi",
    "Athyr",
    "Choiak",
    "Tybi",
    "Mechir",
    "Phamenoth",
    "Pharmuthi",
    "Pachon",
    "Payni",
    "Epiphi",
    "Mesore",
    "Epagomenae",
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A calendar date. Months and days are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// The calendar a timeline is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeType {
    #[default]
    Gregorian,
    Pharaonic,
}

impl TimeType {
    pub const fn name(&self) -> &'static str {
        match self {
            TimeType::Gregorian => "gregorian",
            TimeType::Pharaonic => "pharaonic",
        }
    }

    // ── range ─────────────────────────────────────────────────────────

    pub fn min_time(&self) -> Instant {
        match self {
            TimeType::Gregorian => Instant::from_julian_day(0),
            TimeType::Pharaonic => Instant::from_julian_day(PHARAONIC_EPOCH),
        }
    }

    pub fn max_time(&self) -> Instant {
        Instant::from_julian_day(LAST_JULIAN_DAY)
    }

    /// Shortest visible period a view may zoom to.
    pub const fn min_zoom_delta(&self) -> TimeDelta {
        TimeDelta::from_minutes(1)
    }

    /// Longest visible period a view may zoom to (1200 years).
    pub const fn max_zoom_delta(&self) -> TimeDelta {
        TimeDelta::from_days(1200 * 365)
    }

    pub fn contains(&self, t: Instant) -> bool {
        self.min_time() <= t && t <= self.max_time()
    }

    /// Clamp an instant into the calendar range.
    pub fn clamp(&self, t: Instant) -> Instant {
        t.max(self.min_time()).min(self.max_time())
    }

    /// Clamp a visible period into the calendar range, keeping its length
    /// when it fits.
    pub fn clamp_period(&self, period: TimePeriod) -> TimePeriod {
        let (lo, hi) = (self.min_time(), self.max_time());
        if period.start() < lo {
            let end = lo.saturating_add_within(period.delta(), lo, hi);
            return TimePeriod::from_unordered(lo, end);
        }
        if period.end() > hi {
            let start = hi.saturating_add_within(-period.delta(), lo, hi);
            return TimePeriod::from_unordered(start, hi);
        }
        period
    }

    /// Accept a period as a visible window, or say why not.
    pub fn validate_visible_period(&self, period: TimePeriod) -> DomainResult<TimePeriod> {
        let out_of_range = DomainError::PeriodOutOfRange {
            start: period.start(),
            end: period.end(),
        };
        if !self.contains(period.start()) || !self.contains(period.end()) {
            return Err(out_of_range);
        }
        let delta = period.delta();
        if delta < self.min_zoom_delta() || delta > self.max_zoom_delta() {
            return Err(out_of_range);
        }
        Ok(period)
    }

    // ── dates ─────────────────────────────────────────────────────────

    /// Calendar date of the day containing `t`.
    pub fn to_date(&self, t: Instant) -> CalendarDate {
        let jd = t.julian_day();
        match self {
            TimeType::Gregorian => {
                let date = gregorian_date(jd);
                CalendarDate {
                    year: date.year(),
                    month: date.month(),
                    day: date.day(),
                }
            }
            TimeType::Pharaonic => {
                let days = jd - PHARAONIC_EPOCH;
                let year = days.div_euclid(PHARAONIC_YEAR_DAYS) + 1;
                let day_of_year = days.rem_euclid(PHARAONIC_YEAR_DAYS) as u32;
                CalendarDate {
                    year: year as i32,
                    month: day_of_year / PHARAONIC_MONTH_DAYS + 1,
                    day: day_of_year % PHARAONIC_MONTH_DAYS + 1,
                }
            }
        }
    }

    /// Midnight of the given date, or `None` for a date that does not exist.
    pub fn from_date(&self, year: i32, month: u32, day: u32) -> Option<Instant> {
        if month == 0 || month > self.months_in_year() || day == 0 {
            return None;
        }
        if day > self.days_in_month(year, month) {
            return None;
        }
        let jd = match self {
            TimeType::Gregorian => {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                GREGORIAN_CE_OFFSET + date.num_days_from_ce() as i64
            }
            TimeType::Pharaonic => {
                PHARAONIC_EPOCH
                    + (year as i64 - 1) * PHARAONIC_YEAR_DAYS
                    + ((month - 1) * PHARAONIC_MONTH_DAYS + day - 1) as i64
            }
        };
        if jd < Instant::MIN_JULIAN_DAY || jd > Instant::MAX_JULIAN_DAY {
            return None;
        }
        Some(Instant::from_julian_day(jd))
    }

    /// Like [`from_date`](Self::from_date), with the day clamped to the
    /// length of the month.
    pub fn from_date_clamped(&self, year: i32, month: u32, day: u32) -> Option<Instant> {
        let month = month.clamp(1, self.months_in_year());
        self.from_date(year, month, self.clamp_day(year, month, day))
    }

    pub const fn months_in_year(&self) -> u32 {
        match self {
            TimeType::Gregorian => 12,
            TimeType::Pharaonic => 13,
        }
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match self {
            TimeType::Gregorian => {
                let (next_year, next_month) = if month >= 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                match (
                    NaiveDate::from_ymd_opt(year, month, 1),
                    NaiveDate::from_ymd_opt(next_year, next_month, 1),
                ) {
                    (Some(first), Some(next)) => (next - first).num_days() as u32,
                    _ => 31,
                }
            }
            TimeType::Pharaonic => {
                if month == 13 {
                    5
                } else {
                    PHARAONIC_MONTH_DAYS
                }
            }
        }
    }

    /// `min(day, days_in_month(year, month))`, and at least 1.
    pub fn clamp_day(&self, year: i32, month: u32, day: u32) -> u32 {
        day.clamp(1, self.days_in_month(year, month))
    }

    pub fn month_name(&self, month: u32) -> &'static str {
        let index = month.saturating_sub(1) as usize;
        match self {
            TimeType::Gregorian => GREGORIAN_MONTHS.get(index).copied().unwrap_or("?"),
            TimeType::Pharaonic => PHARAONIC_MONTHS.get(index).copied().unwrap_or("?"),
        }
    }

    pub fn month_abbreviation(&self, month: u32) -> &'static str {
        let name = self.month_name(month);
        name.get(..3).unwrap_or(name)
    }

    /// Week number of the week (starting on `week_start`) that contains `t`.
    pub fn week_number(&self, t: Instant, week_start: WeekStart) -> u32 {
        match self {
            TimeType::Gregorian => {
                // ISO weeks start on Monday; a Sunday-started week is numbered
                // after the Monday that follows its first day.
                let mut jd = t.julian_day();
                if week_start == WeekStart::Sunday && t.weekday_index() == 6 {
                    jd += 1;
                }
                gregorian_date(jd).iso_week().week()
            }
            TimeType::Pharaonic => {
                let day_of_year = (t.julian_day() - PHARAONIC_EPOCH).rem_euclid(PHARAONIC_YEAR_DAYS);
                (day_of_year / 7) as u32 + 1
            }
        }
    }

    // ── labels ────────────────────────────────────────────────────────

    /// Year as shown to users (`"2020"`, `"44 BC"`).
    pub fn format_year(&self, year: i32) -> String {
        match self {
            TimeType::Gregorian if year <= 0 => format!("{} BC", 1 - year as i64),
            _ => year.to_string(),
        }
    }

    pub fn weekday_abbreviation(&self, t: Instant) -> &'static str {
        WEEKDAYS[t.weekday_index() as usize]
    }

    /// `"15 Jan 2020"`.
    pub fn format_date(&self, t: Instant) -> String {
        let date = self.to_date(t);
        format!(
            "{} {} {}",
            date.day,
            self.month_abbreviation(date.month),
            self.format_year(date.year)
        )
    }

    /// `"15 Jan 2020 14:05"`.
    pub fn format_instant(&self, t: Instant) -> String {
        let (h, m, _) = t.hms();
        format!("{} {:02}:{:02}", self.format_date(t), h, m)
    }

    /// Human readable period, omitting the time of day when both ends fall
    /// on midnight.
    pub fn format_period(&self, period: TimePeriod) -> String {
        let whole_days = period.start().micros_of_day() == 0 && period.end().micros_of_day() == 0;
        let fmt = |t: Instant| {
            if whole_days {
                self.format_date(t)
            } else {
                self.format_instant(t)
            }
        };
        if period.is_period() {
            format!("{} - {}", fmt(period.start()), fmt(period.end()))
        } else {
            fmt(period.start())
        }
    }

    // ── now ───────────────────────────────────────────────────────────

    /// The current wall-clock instant, clamped into the calendar range.
    pub fn now(&self) -> Instant {
        self.clamp(Instant::from_utc(Utc::now()))
    }

    /// A sensible initial window: the 30 days around `now`.
    pub fn default_period(&self, now: Instant) -> TimePeriod {
        let half = TimeDelta::from_micros(15 * MICROS_PER_DAY);
        self.clamp_period(TimePeriod::from_unordered(now - half, now + half))
    }
}

fn gregorian_date(julian_day: i64) -> NaiveDate {
    let days = julian_day - GREGORIAN_CE_OFFSET;
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .unwrap_or_else(|| panic!("julian day {julian_day} outside the Gregorian date range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    #[test]
    fn gregorian_j2000() {
        assert_eq!(greg(2000, 1, 1).julian_day(), 2_451_545);
        let date = TimeType::Gregorian.to_date(Instant::from_julian_day(2_451_545));
        assert_eq!(date, CalendarDate { year: 2000, month: 1, day: 1 });
    }

    #[test]
    fn gregorian_range_constants() {
        assert_eq!(greg(9990, 1, 1).julian_day(), LAST_JULIAN_DAY);
        let min = TimeType::Gregorian.to_date(TimeType::Gregorian.min_time());
        assert_eq!(min, CalendarDate { year: -4713, month: 11, day: 24 });
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(TimeType::Gregorian.from_date(2021, 2, 29).is_none());
        assert!(TimeType::Gregorian.from_date(2020, 13, 1).is_none());
        assert!(TimeType::Gregorian.from_date(2020, 2, 29).is_some());
    }

    #[test]
    fn clamp_day_uses_month_length() {
        let g = TimeType::Gregorian;
        assert_eq!(g.clamp_day(2021, 2, 31), 28);
        assert_eq!(g.clamp_day(2020, 2, 31), 29);
        assert_eq!(g.clamp_day(2020, 4, 31), 30);
        assert_eq!(g.clamp_day(2020, 1, 15), 15);
        assert_eq!(g.from_date_clamped(2021, 2, 31), g.from_date(2021, 2, 28));
    }

    #[test]
    fn pharaonic_roundtrip() {
        let p = TimeType::Pharaonic;
        let t = p.from_date(10, 13, 5).unwrap();
        assert_eq!(p.to_date(t), CalendarDate { year: 10, month: 13, day: 5 });
        let next = Instant::from_julian_day(t.julian_day() + 1);
        assert_eq!(p.to_date(next), CalendarDate { year: 11, month: 1, day: 1 });
        assert_eq!(p.days_in_month(3, 13), 5);
        assert!(p.from_date(3, 13, 6).is_none());
        assert_eq!(p.month_name(1), "Thoth");
    }

    #[test]
    fn labels() {
        let g = TimeType::Gregorian;
        assert_eq!(g.format_year(0), "1 BC");
        assert_eq!(g.format_year(-43), "44 BC");
        assert_eq!(g.format_date(greg(2020, 1, 15)), "15 Jan 2020");
        let noon = greg(2020, 1, 15) + TimeDelta::from_hours(12);
        assert_eq!(g.format_instant(noon), "15 Jan 2020 12:00");
        assert_eq!(g.weekday_abbreviation(greg(2020, 1, 15)), "Wed");
    }

    #[test]
    fn format_period_drops_midnight_times() {
        let g = TimeType::Gregorian;
        let p = TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap();
        assert_eq!(g.format_period(p), "1 Jan 2020 - 1 Feb 2020");
        assert_eq!(g.format_period(TimePeriod::point(greg(2020, 1, 1))), "1 Jan 2020");
    }

    #[test]
    fn iso_week_numbers() {
        let g = TimeType::Gregorian;
        // 2020-01-06 is the Monday of ISO week 2.
        assert_eq!(g.week_number(greg(2020, 1, 6), WeekStart::Monday), 2);
        // 2020-01-05 is a Sunday, first day of the Sunday-started week 2.
        assert_eq!(g.week_number(greg(2020, 1, 5), WeekStart::Sunday), 2);
        assert_eq!(g.week_number(greg(2020, 1, 5), WeekStart::Monday), 1);
    }

    #[test]
    fn visible_period_validation() {
        let g = TimeType::Gregorian;
        let ok = TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap();
        assert!(g.validate_visible_period(ok).is_ok());

        let tiny = TimePeriod::starting_at(greg(2020, 1, 1), TimeDelta::from_seconds(10));
        assert!(g.validate_visible_period(tiny).is_err());

        let before = TimePeriod::new(Instant::from_julian_day(-10), greg(2020, 1, 1)).unwrap();
        assert!(g.validate_visible_period(before).is_err());
    }

    #[test]
    fn clamp_period_keeps_length() {
        let g = TimeType::Gregorian;
        let p = TimePeriod::new(Instant::from_julian_day(-10), Instant::from_julian_day(20)).unwrap();
        let clamped = g.clamp_period(p);
        assert_eq!(clamped.start(), g.min_time());
        assert_eq!(clamped.delta(), p.delta());
    }
}
