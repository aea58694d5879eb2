use proptest::prelude::*;
use timescene::{
    union_of, AppContext, ColorMix, Era, EraId, Eras, Event, FixedWidthMeasure, Instant,
    MemoryTimeline, Metrics, Rgb, SceneBuilder, Strip, StripKind, TimeDelta, TimePeriod, TimeType,
    TimelineSource, ViewProperties, WeekStart,
};

const JAN_1_2020: i64 = 2_458_850;

fn day(n: i64) -> Instant {
    Instant::from_julian_day(JAN_1_2020 + n)
}

fn january() -> TimePeriod {
    TimePeriod::new(day(0), day(31)).unwrap()
}

fn era_strategy() -> impl Strategy<Value = Vec<(i64, i64, (u8, u8, u8))>> {
    prop::collection::vec((0i64..100, 1i64..50, any::<(u8, u8, u8)>()), 0..7)
}

fn eras_from(raw: &[(i64, i64, (u8, u8, u8))]) -> Vec<Era> {
    raw.iter()
        .enumerate()
        .map(|(i, &(start, len, (r, g, b)))| {
            Era::new(
                EraId::new(i as u64 + 1),
                TimePeriod::new(day(start), day(start + len)).unwrap(),
                format!("era {i}"),
                Rgb::new(r, g, b),
            )
        })
        .collect()
}

/// `(start hour, length in hours or 0 for a point, text length)`.
fn event_strategy() -> impl Strategy<Value = Vec<(i64, i64, usize)>> {
    prop::collection::vec((0i64..(31 * 24), prop_oneof![Just(0i64), 1i64..400], 0usize..12), 0..25)
}

fn timeline_from(raw: &[(i64, i64, usize)]) -> MemoryTimeline {
    let mut timeline = MemoryTimeline::new(TimeType::Gregorian);
    for &(start, len, text_len) in raw {
        let start = day(0) + TimeDelta::from_hours(start);
        let period = TimePeriod::starting_at(start, TimeDelta::from_hours(len));
        let id = timeline.new_event_id();
        timeline
            .save_event(Event::new(id, period, "x".repeat(text_len)))
            .unwrap();
    }
    timeline
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn era_bands_are_sorted_and_disjoint(raw in era_strategy()) {
        let bands = Eras::from_eras(eras_from(&raw)).all_periods();
        for pair in bands.windows(2) {
            prop_assert!(pair[0].period.end() <= pair[1].period.start());
        }
    }

    #[test]
    fn era_bands_cover_the_same_time(raw in era_strategy()) {
        let eras = eras_from(&raw);
        let bands = Eras::from_eras(eras.clone()).all_periods();
        let input: Vec<TimePeriod> = eras.iter().map(|e| e.period).collect();
        let output: Vec<TimePeriod> = bands.iter().map(|b| b.period).collect();
        prop_assert_eq!(union_of(&output), union_of(&input));
    }

    #[test]
    fn era_band_color_is_mean_of_covering_eras(raw in era_strategy()) {
        let eras = eras_from(&raw);
        for band in Eras::from_eras(eras.clone()).all_periods() {
            let mut covering = Vec::new();
            for era in &eras {
                // Every band lies inside or outside each era, never across it.
                prop_assert!(!era.period.overlaps(&band.period) || era.period.encloses(&band.period));
                if era.period.encloses(&band.period) {
                    covering.push(era.color);
                }
            }
            let mix: ColorMix = covering.into_iter().collect();
            prop_assert_eq!(mix.mean(), Some(band.color));
        }
    }

    #[test]
    fn x_of_inverts_time_at(
        start in -1_000_000i64..1_000_000,
        length_micros in 60_000_000i64..(400 * 365 * 86_400_000_000),
        width in 1i32..2000,
    ) {
        let visible = TimePeriod::starting_at(
            Instant::from_julian_day(JAN_1_2020 + start),
            TimeDelta::from_micros(length_micros),
        );
        let metrics = Metrics::new(width, 100, visible, 0.5);
        for x in 0..width {
            let back = metrics.x_of(metrics.time_at(x));
            prop_assert!((back - x).abs() <= 1, "x = {}, back = {}", x, back);
        }
    }

    #[test]
    fn snapping_is_idempotent(
        offset_micros in 0i64..(31 * 86_400_000_000),
        width in 50i32..3000,
        kind in prop::sample::select(vec![
            StripKind::Hour,
            StripKind::Day,
            StripKind::Week,
            StripKind::Month,
            StripKind::Year,
        ]),
    ) {
        let metrics = Metrics::new(width, 100, january(), 0.5);
        let strip = Strip::new(kind, TimeType::Gregorian, WeekStart::Monday);
        let t = day(0) + TimeDelta::from_micros(offset_micros);
        let once = timescene::snap(t, &strip, &metrics, 10);
        prop_assert_eq!(timescene::snap(once, &strip, &metrics, 10), once);
    }

    #[test]
    fn laid_out_events_never_collide(raw in event_strategy()) {
        let timeline = timeline_from(&raw);
        let ctx = AppContext::default();
        let measure = FixedWidthMeasure::default();
        let scene = SceneBuilder::new(&ctx, &measure, 620, 300)
            .with_now(day(0))
            .build(&timeline, &ViewProperties::new(january()));

        prop_assert_eq!(scene.events.len() + scene.hidden_event_count, timeline.event_count());
        for (i, a) in scene.events.iter().enumerate() {
            for b in &scene.events[i + 1..] {
                prop_assert!(
                    !a.rect.inflate(ctx.outer_padding).intersects(&b.rect),
                    "{:?} and {:?} collide", a.rect, b.rect
                );
            }
        }
    }

    #[test]
    fn hit_test_finds_what_layout_placed(
        raw in event_strategy(),
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
    ) {
        let timeline = timeline_from(&raw);
        let ctx = AppContext::default();
        let measure = FixedWidthMeasure::default();
        let scene = SceneBuilder::new(&ctx, &measure, 620, 300)
            .with_now(day(0))
            .build(&timeline, &ViewProperties::new(january()));

        for entry in &scene.events {
            let inner = entry.rect.inset(1, 1);
            if inner.is_empty() {
                continue;
            }
            let x = inner.x + ((inner.width - 1) as f64 * fx) as i32;
            let y = inner.y + ((inner.height - 1) as f64 * fy) as i32;
            let hit = scene.event_at(x, y, false).map(|e| e.id);
            prop_assert_eq!(hit, Some(entry.id()));
        }
    }
}
