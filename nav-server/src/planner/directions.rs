//! Drive-time lookup for an ordered route.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{DirectionsResult, RoutePreferences};
use crate::providers::{Avoidances, DirectionsProvider, RawLeg, RouteQuery};

impl From<&RoutePreferences> for Avoidances {
    fn from(prefs: &RoutePreferences) -> Self {
        Self {
            highways: prefs.avoids_highways(),
            tolls: prefs.avoid_tolls,
            ferries: prefs.avoid_ferries,
        }
    }
}

/// Requests per-leg durations and distances from a directions provider.
///
/// Waypoints are sent in exactly the order given. Reordering is a separate,
/// opt-in step.
#[derive(Clone)]
pub struct DirectionsClient {
    provider: Arc<dyn DirectionsProvider>,
}

impl DirectionsClient {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        Self { provider }
    }

    /// Route from `origin` through `waypoints` to `destination`.
    ///
    /// Returns `None` when the provider is unconfigured, fails, times out or
    /// has no route. Callers proceed without drive-time annotations.
    pub async fn route(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
        preferences: Option<&RoutePreferences>,
    ) -> Option<DirectionsResult> {
        let query = RouteQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            waypoints: waypoints.to_vec(),
            avoid: preferences.map(Avoidances::from).unwrap_or_default(),
        };

        let legs = match self.provider.compute_route(&query).await {
            Ok(legs) => legs,
            Err(e) if e.is_not_found() => {
                debug!(provider = self.provider.name(), origin, destination, "No route found");
                return None;
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    waypoints = waypoints.len(),
                    error = %e,
                    "Directions unavailable"
                );
                return None;
            }
        };

        if legs.is_empty() {
            debug!(provider = self.provider.name(), "Route has no legs");
            return None;
        }

        let raw: Vec<(u64, u64)> = legs
            .iter()
            .map(|RawLeg { duration_secs, distance_meters }| (*duration_secs, *distance_meters))
            .collect();

        Some(DirectionsResult::from_raw_legs(&raw))
    }
}
