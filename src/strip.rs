// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Strips: the calendar granularities drawn as background divisions.
//!
//! A [`Strip`] is a capability record: a [`StripKind`] tag plus the calendar
//! and week start it is evaluated in.  Every kind answers the same four
//! questions (`start`, `increment`, `label`, `font_hint`).
//!
//! [`choose_strips`] picks the finest minor strip that stays legible at the
//! current zoom and pairs it with the next coarser strip.  [`StripSeries`]
//! walks the aligned strip periods that cover a visible window.

use crate::config::WeekStart;
use crate::instant::{Instant, TimeDelta, MICROS_PER_HOUR, MICROS_PER_MINUTE};
use crate::period::TimePeriod;
use crate::surface::{Font, TextMeasure};
use crate::time_type::TimeType;
use qtty::Days;

/// Extra pixels kept around a measured label when judging legibility.
const LABEL_MARGIN: i32 = 10;

/// Calendar granularity, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StripKind {
    Minute,
    Hour,
    WeekdayName,
    Day,
    Week,
    Month,
    Year,
    Decade,
    Century,
    Millennium,
}

impl StripKind {
    /// Candidates for the minor strip, finest first.
    pub const MINOR_CANDIDATES: [StripKind; 9] = [
        StripKind::Minute,
        StripKind::Hour,
        StripKind::WeekdayName,
        StripKind::Day,
        StripKind::Week,
        StripKind::Month,
        StripKind::Year,
        StripKind::Decade,
        StripKind::Century,
    ];

    /// The strip drawn above this one when it is the minor strip.
    pub const fn major(self) -> StripKind {
        match self {
            StripKind::Minute => StripKind::Hour,
            StripKind::Hour => StripKind::Day,
            StripKind::WeekdayName | StripKind::Day | StripKind::Week => StripKind::Month,
            StripKind::Month => StripKind::Year,
            StripKind::Year => StripKind::Decade,
            StripKind::Decade => StripKind::Century,
            StripKind::Century | StripKind::Millennium => StripKind::Millennium,
        }
    }

    /// Whole years spanned by the year-based kinds.
    const fn years(self) -> Option<i32> {
        match self {
            StripKind::Year => Some(1),
            StripKind::Decade => Some(10),
            StripKind::Century => Some(100),
            StripKind::Millennium => Some(1000),
            _ => None,
        }
    }
}

/// Font variation a strip asks for when labelling one of its periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontHint {
    Normal,
    Weekend,
}

/// A strip kind bound to a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strip {
    pub kind: StripKind,
    pub time_type: TimeType,
    pub week_start: WeekStart,
}

impl Strip {
    pub const fn new(kind: StripKind, time_type: TimeType, week_start: WeekStart) -> Self {
        Self {
            kind,
            time_type,
            week_start,
        }
    }

    /// The coarser strip paired with this one.
    pub const fn major(&self) -> Strip {
        Strip::new(self.kind.major(), self.time_type, self.week_start)
    }

    /// Start of the strip period containing `t`.
    pub fn start(&self, t: Instant) -> Instant {
        match self.kind {
            StripKind::Minute => t.floor_within_day(MICROS_PER_MINUTE),
            StripKind::Hour => t.floor_within_day(MICROS_PER_HOUR),
            StripKind::WeekdayName | StripKind::Day => t.start_of_day(),
            StripKind::Week => {
                let offset = (t.weekday_index() + 7 - self.week_start.weekday_index()) % 7;
                t.start_of_day() - TimeDelta::from_days(offset as i64)
            }
            StripKind::Month => {
                let date = self.time_type.to_date(t);
                self.date_start(date.year, date.month)
            }
            StripKind::Year | StripKind::Decade | StripKind::Century | StripKind::Millennium => {
                let span = self.kind.years().unwrap_or(1);
                let year = self.time_type.to_date(t).year;
                self.date_start(year.div_euclid(span) * span, 1)
            }
        }
    }

    /// Start of the strip period following the one that starts at `start`.
    pub fn increment(&self, start: Instant) -> Instant {
        match self.kind {
            StripKind::Minute => start + TimeDelta::from_minutes(1),
            StripKind::Hour => start + TimeDelta::from_hours(1),
            StripKind::WeekdayName | StripKind::Day => start + TimeDelta::from_days(1),
            StripKind::Week => start + TimeDelta::from_days(7),
            StripKind::Month => {
                let date = self.time_type.to_date(start);
                if date.month >= self.time_type.months_in_year() {
                    self.date_start(date.year + 1, 1)
                } else {
                    self.date_start(date.year, date.month + 1)
                }
            }
            StripKind::Year | StripKind::Decade | StripKind::Century | StripKind::Millennium => {
                let span = self.kind.years().unwrap_or(1);
                self.date_start(self.time_type.to_date(start).year + span, 1)
            }
        }
    }

    /// The strip period that contains `t`.
    pub fn period_containing(&self, t: Instant) -> TimePeriod {
        let start = self.start(t);
        TimePeriod::from_unordered(start, self.increment(start))
    }

    /// Label for the strip period starting at `t`.  Major labels carry enough
    /// context to stand alone.
    pub fn label(&self, t: Instant, major: bool) -> String {
        let tt = self.time_type;
        let date = tt.to_date(t);
        let (hour, minute, _) = t.hms();
        match self.kind {
            StripKind::Minute if major => tt.format_instant(t),
            StripKind::Minute => format!("{minute:02}"),
            StripKind::Hour if major => format!("{} {hour:02}:00", tt.format_date(t)),
            StripKind::Hour => format!("{hour:02}"),
            StripKind::WeekdayName if major => {
                format!("{} {}", tt.weekday_abbreviation(t), tt.format_date(t))
            }
            StripKind::WeekdayName => format!("{} {}", tt.weekday_abbreviation(t), date.day),
            StripKind::Day if major => tt.format_date(t),
            StripKind::Day => date.day.to_string(),
            StripKind::Week => {
                let week = format!("Week {}", tt.week_number(t, self.week_start));
                if major {
                    let last = self.increment(t) - TimeDelta::from_days(1);
                    format!("{week} ({} - {})", tt.format_date(t), tt.format_date(last))
                } else {
                    week
                }
            }
            StripKind::Month if major => {
                format!("{} {}", tt.month_name(date.month), tt.format_year(date.year))
            }
            StripKind::Month => tt.month_abbreviation(date.month).to_owned(),
            StripKind::Year => tt.format_year(date.year),
            StripKind::Decade => self.decade_label(date.year),
            StripKind::Century => self.ordinal_label(date.year, 100, "century"),
            StripKind::Millennium => self.ordinal_label(date.year, 1000, "millennium"),
        }
    }

    /// Day strips render weekends differently.
    pub fn font_hint(&self, period: &TimePeriod) -> FontHint {
        match self.kind {
            StripKind::Day | StripKind::WeekdayName if period.is_weekend_day() => FontHint::Weekend,
            _ => FontHint::Normal,
        }
    }

    /// Average length of one strip period.
    pub fn average_length(&self) -> Days {
        let year_days = match self.time_type {
            TimeType::Gregorian => 365.2425,
            TimeType::Pharaonic => 365.0,
        };
        let days = match self.kind {
            StripKind::Minute => 1.0 / 1440.0,
            StripKind::Hour => 1.0 / 24.0,
            StripKind::WeekdayName | StripKind::Day => 1.0,
            StripKind::Week => 7.0,
            StripKind::Month => year_days / self.time_type.months_in_year() as f64,
            kind => year_days * kind.years().unwrap_or(1) as f64,
        };
        Days::new(days)
    }

    fn date_start(&self, year: i32, month: u32) -> Instant {
        self.time_type
            .from_date(year, month, 1)
            .unwrap_or_else(|| {
                panic!(
                    "{:?} strip boundary {year}-{month} outside the {} instant range",
                    self.kind,
                    self.time_type.name()
                )
            })
    }

    fn decade_label(&self, year: i32) -> String {
        match self.time_type {
            TimeType::Gregorian if year <= 0 => format!("{}s BC", 1 - year as i64),
            _ => format!("{year}s"),
        }
    }

    fn ordinal_label(&self, year: i32, span: i32, noun: &str) -> String {
        let start = year.div_euclid(span) * span;
        let before_era = matches!(self.time_type, TimeType::Gregorian) && start < 0;
        let n = if before_era {
            (-start / span) as i64
        } else {
            (start / span + 1) as i64
        };
        if before_era {
            format!("{} {noun} BC", ordinal(n))
        } else {
            format!("{} {noun}", ordinal(n))
        }
    }
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Pick `(minor, major)` for a visible period drawn `width` pixels wide.
///
/// The minor strip is the finest candidate whose average pixel width is at
/// least `max(min_legible_width, sample label width + margin)`.
pub fn choose_strips(
    period: TimePeriod,
    width: i32,
    time_type: TimeType,
    week_start: WeekStart,
    min_legible_width: i32,
    measure: &dyn TextMeasure,
    font: &Font,
) -> (Strip, Strip) {
    let period_days = period.delta().as_days().value();
    let fallback = Strip::new(StripKind::Century, time_type, week_start);
    if period_days <= 0.0 || width <= 0 {
        return (fallback, fallback.major());
    }
    for kind in StripKind::MINOR_CANDIDATES {
        let strip = Strip::new(kind, time_type, week_start);
        let px = strip.average_length().value() / period_days * width as f64;
        let sample = strip.label(strip.start(period.start()), false);
        let (label_w, _) = measure.text_extent(&sample, font);
        let needed = min_legible_width.max(label_w + LABEL_MARGIN);
        if px >= needed as f64 {
            return (strip, strip.major());
        }
    }
    (fallback, fallback.major())
}

/// Lazy ascending sequence of strip periods covering a visible window.
///
/// Cloning yields an independent iterator restarted from the same point.
#[derive(Debug, Clone)]
pub struct StripSeries {
    strip: Strip,
    next: Instant,
    until: Instant,
}

impl StripSeries {
    /// Strip periods that intersect `visible`, stopping at the calendar end.
    pub fn new(strip: Strip, visible: TimePeriod) -> Self {
        Self {
            strip,
            next: strip.start(visible.start()),
            until: visible.end().min(strip.time_type.max_time()),
        }
    }

    pub fn strip(&self) -> Strip {
        self.strip
    }
}

impl Iterator for StripSeries {
    type Item = TimePeriod;

    fn next(&mut self) -> Option<TimePeriod> {
        if self.next >= self.until {
            return None;
        }
        let start = self.next;
        let end = self.strip.increment(start);
        self.next = end;
        Some(TimePeriod::from_unordered(start, end))
    }
}
