//! Time-window conflict detection.
//!
//! Simulates one synthetic day: a clock starts at the configured day start
//! and advances by each stop's drive time and dwell time in order. A stop
//! is in conflict when the visit would still be running at its closing
//! time. Conflicts are advisory; stops are never dropped or reordered.
//!
//! Itineraries that run past midnight are not modelled: the clock keeps
//! counting, and windows are always compared against the same day.

use crate::domain::{Stop, WallTime};

/// Whether the scheduler has anything to do for these stops.
pub fn needs_schedule(stops: &[Stop]) -> bool {
    stops.iter().any(Stop::has_window)
}

/// Annotate each stop with its simulated visit start and conflict flag.
///
/// Must run sequentially: every stop's clock depends on the previous
/// stop's visit. Missing drive times count as zero.
pub fn schedule_stops(stops: Vec<Stop>, day_start: WallTime) -> Vec<Stop> {
    let mut clock = day_start;

    stops
        .into_iter()
        .map(|stop| {
            let arrival = clock.plus_minutes(stop.drive_minutes_from_prev.unwrap_or(0));
            let open = stop.open_time.unwrap_or(WallTime::START_OF_DAY);
            let close = stop.close_time.unwrap_or(WallTime::END_OF_DAY);

            let visit_start = arrival.max(open);
            let visit_end = visit_start.plus_minutes(stop.dwell_minutes);
            clock = visit_end;

            Stop {
                estimated_arrival: Some(visit_start.format_12h()),
                has_conflict: Some(visit_end > close),
                ..stop
            }
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_stop() -> impl Strategy<Value = Stop> {
        (
            proptest::option::of(0u32..240),
            proptest::option::of(0u32..1440),
            proptest::option::of(0u32..1440),
            0u32..180,
        )
            .prop_map(|(drive, open, close, dwell)| {
                let mut s = Stop::new("s", "somewhere")
                    .with_times(open.map(WallTime::from_minutes), close.map(WallTime::from_minutes))
                    .with_dwell(dwell);
                s.drive_minutes_from_prev = drive;
                s
            })
    }

    fn parse_12h(s: &str) -> u32 {
        let (clock, suffix) = s.split_once(' ').unwrap();
        let (h, m) = clock.split_once(':').unwrap();
        let h: u32 = h.parse().unwrap();
        let m: u32 = m.parse().unwrap();
        let h24 = match (h, suffix) {
            (12, "AM") => 0,
            (12, "PM") => 12,
            (h, "PM") => h + 12,
            (h, _) => h,
        };
        h24 * 60 + m
    }

    proptest! {
        /// Every stop is annotated, length and order are preserved.
        #[test]
        fn annotates_every_stop(stops in proptest::collection::vec(arb_stop(), 0..12)) {
            let out = schedule_stops(stops.clone(), WallTime::from_minutes(480));
            prop_assert_eq!(out.len(), stops.len());
            for (before, after) in stops.iter().zip(&out) {
                prop_assert!(after.estimated_arrival.is_some());
                prop_assert!(after.has_conflict.is_some());
                prop_assert_eq!(&before.id, &after.id);
            }
        }

        /// A visit never starts before the stop opens (within the first day).
        #[test]
        fn never_starts_before_opening(stop in arb_stop()) {
            let out = schedule_stops(vec![stop.clone()], WallTime::from_minutes(0));
            let start = parse_12h(out[0].estimated_arrival.as_deref().unwrap());
            let open = stop.open_time.map(|t| t.minutes()).unwrap_or(0);
            let drive = stop.drive_minutes_from_prev.unwrap_or(0);
            prop_assert_eq!(start, open.max(drive));
        }
    }
}
