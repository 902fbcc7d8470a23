//! Nearest-neighbour stop reordering.
//!
//! A greedy tour: start at the origin (or the first stop), repeatedly hop
//! to the closest unvisited stop by great-circle distance. Not optimal,
//! but O(n²) and fine for human-sized itineraries. Stops that could not be
//! geocoded never take part in distance comparisons; they are appended at
//! the end in their original relative order.

use tracing::debug;

use crate::domain::{Coordinate, Stop};

use super::geocoder::Geocoder;
use super::resolve::backfill_coordinates;

/// Order `stops` greedily by proximity, starting from `anchor`.
///
/// With no anchor the first stop is used if it has coordinates (it stays
/// first). If neither is available the stops are returned as given.
pub fn nearest_neighbor_order(anchor: Option<Coordinate>, stops: Vec<Stop>) -> Vec<Stop> {
    let mut remaining: Vec<Option<Stop>> = stops.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    let mut current = match anchor {
        Some(anchor) => anchor,
        None => match remaining.first().and_then(|s| s.as_ref()).and_then(Stop::coordinate) {
            Some(first) => {
                ordered.extend(remaining[0].take());
                first
            }
            None => return remaining.into_iter().flatten().collect(),
        },
    };

    loop {
        let nearest = remaining
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let coordinate = slot.as_ref()?.coordinate()?;
                Some((i, current.haversine_m(&coordinate), coordinate))
            })
            // Earliest index wins ties.
            .fold(None, |best: Option<(usize, f64, Coordinate)>, candidate| match best {
                Some(b) if b.1 <= candidate.1 => Some(b),
                _ => Some(candidate),
            });

        let Some((index, _, coordinate)) = nearest else {
            break;
        };

        ordered.extend(remaining[index].take());
        current = coordinate;
    }

    // Whatever is left has no coordinates.
    ordered.extend(remaining.into_iter().flatten());
    ordered
}

/// Geocode what is missing, then reorder by nearest neighbour.
///
/// Two stops or fewer are returned untouched. The origin (if any) and the
/// stops are geocoded concurrently.
pub async fn reorder_stops(geocoder: &Geocoder, origin: Option<&str>, stops: Vec<Stop>) -> Vec<Stop> {
    if stops.len() <= 2 {
        return stops;
    }

    let origin = origin.map(str::trim).filter(|o| !o.is_empty());

    let (stops, anchor) = tokio::join!(backfill_coordinates(geocoder, stops), async {
        match origin {
            Some(origin) => geocoder.resolve(origin).await,
            None => None,
        }
    });

    if origin.is_some() && anchor.is_none() {
        debug!(origin, "Origin not geocoded, anchoring on first stop");
    }

    nearest_neighbor_order(anchor, stops)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_stops() -> impl Strategy<Value = Vec<Stop>> {
        proptest::collection::vec(
            proptest::option::of((-60.0f64..60.0, -170.0f64..170.0)),
            0..15,
        )
        .prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, coord)| {
                    let stop = Stop::new(i.to_string(), format!("{i} st"));
                    match coord {
                        Some((lat, lng)) => stop.with_coordinate(Coordinate::new(lat, lng)),
                        None => stop,
                    }
                })
                .collect()
        })
    }

    proptest! {
        /// Output is a permutation of the input.
        #[test]
        fn output_is_permutation(
            stops in arb_stops(),
            anchor in proptest::option::of((-60.0f64..60.0, -170.0f64..170.0)),
        ) {
            let anchor = anchor.map(|(lat, lng)| Coordinate::new(lat, lng));
            let out = nearest_neighbor_order(anchor, stops.clone());

            let mut before: Vec<_> = stops.iter().map(|s| s.id.clone()).collect();
            let mut after: Vec<_> = out.iter().map(|s| s.id.clone()).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }

        /// With an anchor, every stop with coordinates precedes every stop without.
        #[test]
        fn coordinated_stops_come_first(stops in arb_stops()) {
            let out = nearest_neighbor_order(Some(Coordinate::new(0.0, 0.0)), stops);
            let first_missing = out.iter().position(|s| s.coordinate().is_none());
            if let Some(idx) = first_missing {
                prop_assert!(out[idx..].iter().all(|s| s.coordinate().is_none()));
            }
        }
    }
}
