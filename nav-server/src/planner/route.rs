//! Route pipeline: resolve stops, fetch directions, detect conflicts.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{DirectionsResult, RouteRequest, Stop, StopType};
use crate::providers::{DirectionsProvider, PlaceSearchProvider};

use super::config::PlannerConfig;
use super::directions::DirectionsClient;
use super::geocoder::Geocoder;
use super::places::PlaceFinder;
use super::reorder::reorder_stops;
use super::resolve::{backfill_coordinates, resolve_search_stops};
use super::schedule::{needs_schedule, schedule_stops};

/// Error from route resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The request has no stops
    #[error("route request has no stops")]
    EmptyStops,
}

/// Result of route resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Stops in request order, resolved and annotated.
    pub stops: Vec<Stop>,

    /// `None` when directions were unavailable.
    pub directions: Option<DirectionsResult>,
}

/// Orchestrates the route pipeline over a set of providers.
///
/// Holds no per-request state; one planner can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct RoutePlanner {
    geocoder: Geocoder,
    places: PlaceFinder,
    directions: DirectionsClient,
    config: PlannerConfig,
}

impl RoutePlanner {
    /// Create a planner. The geocoder is shared with place search.
    pub fn new(
        geocoder: Geocoder,
        search: Arc<dyn PlaceSearchProvider>,
        directions: Arc<dyn DirectionsProvider>,
        config: PlannerConfig,
    ) -> Self {
        let places = PlaceFinder::new(geocoder.clone(), search, &config);
        Self {
            geocoder,
            places,
            directions: DirectionsClient::new(directions),
            config,
        }
    }

    /// Resolve an itinerary into geocoded, time-annotated stops.
    ///
    /// Never fails because a provider did: unresolved stops carry a note,
    /// stops that cannot be geocoded lack coordinates, and without
    /// directions there are no drive times or conflict flags. The output
    /// has the same stops in the same order as the request.
    pub async fn resolve_route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        let (Some(last), Some(origin)) = (request.stops.last(), request.origin_address()) else {
            return Err(RouteError::EmptyStops);
        };
        debug!(
            stops = request.stops.len(),
            origin,
            destination = %last.address,
            "Resolving route"
        );

        let stops: Vec<Stop> = request
            .stops
            .iter()
            .cloned()
            .map(Stop::without_derived)
            .collect();
        let stops = resolve_search_stops(&self.places, origin, &stops).await;
        let stops = backfill_coordinates(&self.geocoder, stops).await;

        let (waypoints, destination) = match stops.split_last() {
            Some((dest, rest)) => (
                rest.iter().map(|s| s.address.clone()).collect::<Vec<_>>(),
                dest.address.clone(),
            ),
            None => return Err(RouteError::EmptyStops),
        };

        let directions = self
            .directions
            .route(origin, &destination, &waypoints, request.preferences.as_ref())
            .await;

        let stops = match &directions {
            Some(directions) => {
                let stops = attach_legs(stops, directions);
                if needs_schedule(&stops) {
                    schedule_stops(stops, self.config.day_start)
                } else {
                    stops
                }
            }
            None => stops,
        };

        info!(
            stops = stops.len(),
            resolved = stops.iter().filter(|s| s.stop_type == StopType::Resolved).count(),
            conflicts = stops.iter().filter(|s| s.has_conflict == Some(true)).count(),
            directions = directions.is_some(),
            "Route resolved"
        );

        Ok(RouteResponse { stops, directions })
    }

    /// Reorder stops by nearest neighbour, geocoding as needed.
    pub async fn reorder_stops(&self, origin: Option<&str>, stops: Vec<Stop>) -> Vec<Stop> {
        let count = stops.len();
        let stops = reorder_stops(&self.geocoder, origin, stops).await;
        debug!(stops = count, "Stops reordered");
        stops
    }
}

/// Copy each leg's duration and distance onto the stop it arrives at.
///
/// Legs and stops are index-aligned; surplus on either side is ignored.
fn attach_legs(stops: Vec<Stop>, directions: &DirectionsResult) -> Vec<Stop> {
    stops
        .into_iter()
        .enumerate()
        .map(|(i, stop)| match directions.legs.get(i) {
            Some(leg) => Stop {
                drive_minutes_from_prev: Some(leg.duration_minutes),
                distance_meters: Some((leg.distance_km * 1000.0).round() as u64),
                ..stop
            },
            None => stop,
        })
        .collect()
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
