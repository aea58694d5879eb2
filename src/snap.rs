// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Snapping instants to minor strip boundaries.

use crate::instant::Instant;
use crate::metrics::Metrics;
use crate::period::TimePeriod;
use crate::strip::Strip;

/// Snap `t` to the start of its strip period, or to the start of the next
/// one, when that boundary lies less than `tolerance` pixels away.
///
/// The left boundary wins a tie.  Boundaries are fixed points, so
/// `snap(snap(t)) == snap(t)`.
pub fn snap(t: Instant, strip: &Strip, metrics: &Metrics, tolerance: i32) -> Instant {
    let left = strip.start(t);
    let right = strip.increment(left);
    let x = metrics.x_of(t);
    if (x - metrics.x_of(left)).abs() < tolerance {
        left
    } else if (metrics.x_of(right) - x).abs() < tolerance {
        right
    } else {
        t
    }
}

/// Snap both ends of a period drawn between two instants in any order.
pub fn snap_period(a: Instant, b: Instant, strip: &Strip, metrics: &Metrics, tolerance: i32) -> TimePeriod {
    TimePeriod::from_unordered(
        snap(a, strip, metrics, tolerance),
        snap(b, strip, metrics, tolerance),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeekStart;
    use crate::instant::TimeDelta;
    use crate::strip::StripKind;
    use crate::time_type::TimeType;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    fn setup() -> (Strip, Metrics) {
        // 31 days over 310 px: 10 px per day, 70 px per week.
        let visible = TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap();
        (
            Strip::new(StripKind::Week, TimeType::Gregorian, WeekStart::Monday),
            Metrics::new(310, 100, visible, 0.5),
        )
    }

    #[test]
    fn snaps_to_near_boundaries() {
        let (strip, m) = setup();
        // Monday 2020-01-13 is a week boundary.
        let just_after = greg(2020, 1, 13) + TimeDelta::from_hours(12);
        assert_eq!(snap(just_after, &strip, &m, 10), greg(2020, 1, 13));

        let just_before = greg(2020, 1, 19) + TimeDelta::from_hours(12);
        assert_eq!(snap(just_before, &strip, &m, 10), greg(2020, 1, 20));

        let middle = greg(2020, 1, 16);
        assert_eq!(snap(middle, &strip, &m, 10), middle);
    }

    #[test]
    fn snapping_twice_changes_nothing() {
        let (strip, m) = setup();
        for hours in (0..31 * 24).step_by(7) {
            let t = greg(2020, 1, 1) + TimeDelta::from_hours(hours);
            let once = snap(t, &strip, &m, 10);
            assert_eq!(snap(once, &strip, &m, 10), once);
        }
    }

    #[test]
    fn snap_period_orders_ends() {
        let (strip, m) = setup();
        let p = snap_period(
            greg(2020, 1, 20) + TimeDelta::from_hours(3),
            greg(2020, 1, 13) + TimeDelta::from_hours(3),
            &strip,
            &m,
            10,
        );
        assert_eq!(p, TimePeriod::new(greg(2020, 1, 13), greg(2020, 1, 20)).unwrap());
    }
}
