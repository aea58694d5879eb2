// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time ↔ pixel mapping.
//!
//! All conversions are exact integer arithmetic on microseconds with 128-bit
//! intermediates, so a 1200-year window on a wide canvas cannot overflow.

use crate::instant::Instant;
use crate::period::TimePeriod;

/// Pixel coordinates are kept well inside `i32` so that rectangle arithmetic
/// on them (adding widths and paddings) cannot overflow.
const X_LIMIT: i128 = (i32::MAX / 4) as i128;

/// Linear map between a visible period and a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    width: i32,
    height: i32,
    period: TimePeriod,
    divider_ratio: f64,
}

impl Metrics {
    pub fn new(width: i32, height: i32, period: TimePeriod, divider_ratio: f64) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            period,
            divider_ratio: divider_ratio.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn period(&self) -> TimePeriod {
        self.period
    }

    #[inline]
    pub fn divider_ratio(&self) -> f64 {
        self.divider_ratio
    }

    fn total_micros(&self) -> i128 {
        self.period.end().total_micros() - self.period.start().total_micros()
    }

    /// Pixel x of `t`.  Not clipped to the canvas.
    pub fn x_of(&self, t: Instant) -> i32 {
        let total = self.total_micros();
        if self.width == 0 || total == 0 {
            return 0;
        }
        let offset = t.total_micros() - self.period.start().total_micros();
        let x = div_round_half_even(offset * self.width as i128, total);
        x.clamp(-X_LIMIT, X_LIMIT) as i32
    }

    /// Inclusive pixel width of `period`.
    pub fn width_of(&self, period: &TimePeriod) -> i32 {
        self.x_of(period.end()) - self.x_of(period.start()) + 1
    }

    /// Instant at pixel `x`, rounded down to the microsecond.
    pub fn time_at(&self, x: i32) -> Instant {
        if self.width == 0 {
            return self.period.start();
        }
        let offset = (self.total_micros() * x as i128).div_euclid(self.width as i128);
        let total = self.period.start().total_micros() + offset;
        Instant::from_total_micros(total).unwrap_or(if offset < 0 {
            Instant::MIN
        } else {
            Instant::MAX
        })
    }

    /// Length of the period covered by `dx` pixels.
    pub fn delta_for(&self, dx: i32) -> crate::instant::TimeDelta {
        self.time_at(dx) - self.time_at(0)
    }

    /// Pixel row of the divider line.
    pub fn divider_y(&self) -> i32 {
        (self.divider_ratio * self.height as f64).round() as i32
    }
}

fn div_round_half_even(n: i128, d: i128) -> i128 {
    debug_assert!(d > 0);
    let q = n.div_euclid(d);
    let twice_r = 2 * n.rem_euclid(d);
    if twice_r > d || (twice_r == d && q % 2 != 0) {
        q + 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instant::TimeDelta;
    use crate::time_type::TimeType;

    fn greg(y: i32, m: u32, d: u32) -> Instant {
        TimeType::Gregorian.from_date(y, m, d).unwrap()
    }

    fn january(width: i32) -> Metrics {
        let p = TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap();
        Metrics::new(width, 200, p, 0.5)
    }

    #[test]
    fn x_of_mid_month() {
        let m = january(310);
        let noon = greg(2020, 1, 16) + TimeDelta::from_hours(12);
        assert_eq!(m.x_of(noon), 155);
        assert_eq!(m.x_of(greg(2020, 1, 16)), 150);
        assert_eq!(m.x_of(greg(2020, 1, 1)), 0);
        assert_eq!(m.x_of(greg(2020, 2, 1)), 310);
    }

    #[test]
    fn x_of_extrapolates_outside() {
        let m = january(310);
        assert_eq!(m.x_of(greg(2019, 12, 31)), -10);
        assert_eq!(m.x_of(greg(2020, 2, 2)), 320);
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(div_round_half_even(5, 2), 2);
        assert_eq!(div_round_half_even(7, 2), 4);
        assert_eq!(div_round_half_even(-5, 2), -2);
        assert_eq!(div_round_half_even(10, 3), 3);
        assert_eq!(div_round_half_even(11, 3), 4);
    }

    #[test]
    fn time_at_inverts_x_of() {
        let m = january(310);
        assert_eq!(m.time_at(0), greg(2020, 1, 1));
        assert_eq!(m.time_at(150), greg(2020, 1, 16));
        assert_eq!(m.time_at(310), greg(2020, 2, 1));
        assert_eq!(m.delta_for(10), TimeDelta::from_days(1));
    }

    #[test]
    fn width_of_is_inclusive() {
        let m = january(310);
        let day = TimePeriod::starting_at(greg(2020, 1, 2), TimeDelta::from_days(1));
        assert_eq!(m.width_of(&day), 11);
        assert_eq!(m.width_of(&TimePeriod::point(greg(2020, 1, 2))), 1);
    }

    #[test]
    fn degenerate_canvas() {
        let m = january(0);
        assert_eq!(m.x_of(greg(2020, 1, 20)), 0);
        assert_eq!(m.time_at(40), greg(2020, 1, 1));

        let point = Metrics::new(100, 100, TimePeriod::point(greg(2020, 1, 1)), 0.5);
        assert_eq!(point.x_of(greg(2021, 1, 1)), 0);
    }

    #[test]
    fn divider_rounds() {
        let p = TimePeriod::new(greg(2020, 1, 1), greg(2020, 2, 1)).unwrap();
        assert_eq!(Metrics::new(10, 201, p, 0.5).divider_y(), 101);
        assert_eq!(Metrics::new(10, 200, p, 1.5).divider_y(), 200);
    }

    #[test]
    fn wide_period_does_not_overflow() {
        let tt = TimeType::Gregorian;
        let p = TimePeriod::new(tt.min_time(), tt.max_time()).unwrap();
        let m = Metrics::new(i32::MAX / 8, 100, p, 0.5);
        assert_eq!(m.x_of(tt.min_time()), 0);
        assert_eq!(m.x_of(tt.max_time()), i32::MAX / 8);
    }
}
