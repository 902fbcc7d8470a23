//! Stop resolution: search stops → places, then coordinate backfill.
//!
//! Per-stop states:
//!
//! - `specific` / `resolved`: passed through untouched
//! - `search` → `resolved` when a place is found
//! - `search` → `search` + note when nothing is found (or there is no
//!   query); the note is the only way to tell "attempted and failed" from
//!   "never attempted"
//!
//! Corridor endpoints always come from the original request, never from a
//! sibling's resolution, so every stop can be resolved concurrently.

use futures::future::join_all;
use tracing::debug;

use crate::domain::{Stop, StopType};

use super::geocoder::Geocoder;
use super::places::PlaceFinder;

/// Resolve every `search` stop against its corridor.
///
/// For stop `i` the corridor runs from original stop `i-1` (or `origin`
/// for the first stop) to original stop `i+1` (or the final stop's address
/// for the last one). Output is index-aligned with `stops`.
pub async fn resolve_search_stops(places: &PlaceFinder, origin: &str, stops: &[Stop]) -> Vec<Stop> {
    let Some(last) = stops.last() else {
        return Vec::new();
    };
    let final_destination = last.address.as_str();

    let futures = stops.iter().enumerate().map(|(i, stop)| {
        let prev = if i > 0 { stops[i - 1].address.as_str() } else { origin };
        let next = stops
            .get(i + 1)
            .map(|s| s.address.as_str())
            .unwrap_or(final_destination);
        resolve_one(places, stop, prev, next)
    });

    join_all(futures).await
}

async fn resolve_one(places: &PlaceFinder, stop: &Stop, prev: &str, next: &str) -> Stop {
    if stop.stop_type != StopType::Search {
        return stop.clone();
    }

    let Some(query) = stop.pending_query() else {
        debug!(stop = %stop.id, "Search stop has no query");
        return stop
            .clone()
            .with_note("No search query provided; using as-is");
    };

    match places.find_along_corridor(query, prev, next).await {
        Some(place) => {
            debug!(stop = %stop.id, query, place = %place.name, "Resolved search stop");
            Stop {
                address: place.address,
                label: stop.label.clone().or(Some(place.name)),
                notes: None,
                stop_type: StopType::Resolved,
                ..stop.clone()
            }
            .with_coordinate(place.coordinate)
        }
        None => {
            debug!(stop = %stop.id, query, "Could not resolve search stop");
            stop.clone()
                .with_note(format!("Could not find '{query}' along route; using as-is"))
        }
    }
}

/// Geocode every stop that has no coordinates yet.
///
/// Lookups run concurrently; stops that already carry coordinates, and
/// stops whose lookup fails, come back unchanged.
pub async fn backfill_coordinates(geocoder: &Geocoder, stops: Vec<Stop>) -> Vec<Stop> {
    let futures = stops.into_iter().map(|stop| async move {
        if stop.coordinate().is_some() {
            return stop;
        }
        match geocoder.resolve(&stop.address).await {
            Some(coordinate) => stop.with_coordinate(coordinate),
            None => {
                debug!(stop = %stop.id, address = %stop.address, "Stop left without coordinates");
                stop
            }
        }
    });

    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::FutureExt;

    use super::*;
    use crate::domain::Coordinate;
    use crate::planner::PlannerConfig;
    use crate::providers::{Place, PlaceSearchProvider, ProviderFuture, SearchBias, StubProvider};

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    fn tools(stub: &Arc<StubProvider>) -> (Geocoder, PlaceFinder) {
        let geocoder = Geocoder::new(vec![stub.clone()]);
        let places = PlaceFinder::new(geocoder.clone(), stub.clone(), &PlannerConfig::default());
        (geocoder, places)
    }

    fn corridor_stub() -> StubProvider {
        StubProvider::new()
            .with_coordinate("Home", c(0.0, 0.0))
            .with_coordinate("Office", c(0.0, 0.4))
            .with_coordinate("Gym", c(0.0, 0.8))
            .with_place("coffee", Some("Cafe"), "1 Bean St", c(0.0, 0.2))
    }

    #[tokio::test]
    async fn search_stop_is_resolved() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let stops = vec![
            Stop::new("a", "Office"),
            Stop::search("b", "coffee", "somewhere for coffee"),
            Stop::new("c", "Gym"),
        ];

        let out = resolve_search_stops(&places, "Home", &stops).await;

        assert_eq!(out[0], stops[0]);
        assert_eq!(out[2], stops[2]);
        assert_eq!(out[1].stop_type, StopType::Resolved);
        assert_eq!(out[1].address, "1 Bean St");
        assert_eq!(out[1].label.as_deref(), Some("Cafe"));
        assert_eq!(out[1].coordinate(), Some(c(0.0, 0.2)));
        assert_eq!(out[1].notes, None);
    }

    #[tokio::test]
    async fn corridor_uses_original_neighbours() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let stops = vec![
            Stop::new("a", "Office"),
            Stop::search("b", "coffee", "placeholder"),
            Stop::new("c", "Gym"),
        ];

        resolve_search_stops(&places, "Home", &stops).await;

        // Office (0, 0.4) → Gym (0, 0.8): midpoint lng 0.6
        let bias = stub.searches()[0].1.unwrap();
        assert!((bias.center.lng - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn first_stop_corridor_starts_at_origin() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let stops = vec![Stop::search("a", "coffee", "x"), Stop::new("b", "Office")];

        resolve_search_stops(&places, "Home", &stops).await;

        // Home (0, 0) → Office (0, 0.4): midpoint lng 0.2
        let bias = stub.searches()[0].1.unwrap();
        assert!((bias.center.lng - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn caller_label_is_kept() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let mut stop = Stop::search("a", "coffee", "x");
        stop.label = Some("Morning coffee".into());

        let out = resolve_search_stops(&places, "Home", &[stop, Stop::new("b", "Gym")]).await;

        assert_eq!(out[0].label.as_deref(), Some("Morning coffee"));
        assert_eq!(out[0].stop_type, StopType::Resolved);
    }

    #[tokio::test]
    async fn unresolved_stop_keeps_type_and_gains_note() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let stop = Stop::search("a", "unicorn stable", "Unicorn placeholder");

        let out = resolve_search_stops(&places, "Home", std::slice::from_ref(&stop)).await;

        assert_eq!(out[0].stop_type, StopType::Search);
        assert_eq!(out[0].address, "Unicorn placeholder");
        assert_eq!(
            out[0].notes.as_deref(),
            Some("Could not find 'unicorn stable' along route; using as-is")
        );
        assert_eq!(Stop { notes: None, ..out[0].clone() }, stop);
    }

    #[tokio::test]
    async fn search_stop_without_query_gets_note() {
        let stub = Arc::new(corridor_stub());
        let (_, places) = tools(&stub);
        let mut stop = Stop::search("a", "", "x");
        stop.search_query = None;

        let out = resolve_search_stops(&places, "Home", &[stop]).await;

        assert_eq!(out[0].stop_type, StopType::Search);
        assert!(out[0].notes.as_deref().unwrap().contains("No search query"));
        assert!(stub.searches().is_empty());
    }

    /// Place search that answers after a per-query delay and records the
    /// order in which answers were produced.
    struct SlowPlaces {
        delays_ms: Vec<(&'static str, u64)>,
        finished: std::sync::Mutex<Vec<String>>,
    }

    impl PlaceSearchProvider for SlowPlaces {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn text_search<'a>(
            &'a self,
            query: &'a str,
            _bias: Option<SearchBias>,
        ) -> ProviderFuture<'a, Place> {
            let delay = self
                .delays_ms
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, ms)| *ms)
                .unwrap_or(0);
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                self.finished.lock().unwrap().push(query.to_string());
                Ok(Place {
                    address: format!("{query} address"),
                    name: Some(query.to_string()),
                    coordinate: c(0.0, 0.0),
                })
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn output_follows_input_order_not_completion_order() {
        let stub = Arc::new(corridor_stub());
        let search = Arc::new(SlowPlaces {
            delays_ms: vec![("first", 80), ("second", 40), ("third", 0)],
            finished: std::sync::Mutex::new(Vec::new()),
        });
        let places = PlaceFinder::new(
            Geocoder::new(vec![stub.clone()]),
            search.clone(),
            &PlannerConfig::default(),
        );
        let stops = vec![
            Stop::search("a", "first", "x"),
            Stop::new("b", "Office"),
            Stop::search("c", "second", "y"),
            Stop::search("d", "third", "z"),
        ];

        let out = resolve_search_stops(&places, "Home", &stops).await;

        assert_eq!(*search.finished.lock().unwrap(), ["third", "second", "first"]);
        let ids: Vec<_> = out.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        assert_eq!(out[0].address, "first address");
        assert_eq!(out[1], stops[1]);
        assert_eq!(out[2].address, "second address");
        assert_eq!(out[3].address, "third address");
    }

    #[tokio::test]
    async fn backfill_only_touches_missing_coordinates() {
        let stub = Arc::new(corridor_stub());
        let (geocoder, _) = tools(&stub);
        let known = Stop::new("a", "Home").with_coordinate(c(5.0, 5.0));
        let missing = Stop::new("b", "Gym");
        let unknown = Stop::new("c", "Nowhere");

        let out = backfill_coordinates(&geocoder, vec![known.clone(), missing, unknown.clone()]).await;

        assert_eq!(out[0], known);
        assert_eq!(out[1].coordinate(), Some(c(0.0, 0.8)));
        assert_eq!(out[2], unknown);
        assert_eq!(stub.geocode_calls(), 2);
    }
}
