//! Place lookup for "search along route" stops.
//!
//! A fuzzy stop such as "coffee" is matched by searching near the middle of
//! the corridor between its neighbours. The search radius scales with the
//! corridor length so that a short hop looks nearby and a long one looks
//! further afield, within fixed bounds.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Coordinate, METERS_PER_DEGREE};
use crate::providers::{PlaceSearchProvider, SearchBias};

use super::config::PlannerConfig;
use super::geocoder::Geocoder;

/// A place resolved from a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundPlace {
    /// Routable address. The coordinate as `lat,lng` text when the
    /// provider gave no address.
    pub address: String,
    /// Place name, or the query itself if the provider had none.
    pub name: String,
    pub coordinate: Coordinate,
}

/// Search radius for a corridor between `a` and `b`, in meters.
///
/// Half the straight-line degree distance converted at ~111 km per degree,
/// clamped to `[min_m, max_m]` and truncated to whole meters.
pub fn corridor_radius_m(a: &Coordinate, b: &Coordinate, min_m: u32, max_m: u32) -> u32 {
    let half_span = a.angular_distance(b) * METERS_PER_DEGREE / 2.0;
    // NaN (from non-finite input) falls to the lower bound.
    let clamped = half_span.max(f64::from(min_m)).min(f64::from(max_m));
    clamped as u32
}

/// Resolves free-text queries to places, optionally biased to a corridor.
#[derive(Clone)]
pub struct PlaceFinder {
    geocoder: Geocoder,
    search: Arc<dyn PlaceSearchProvider>,
    min_radius_m: u32,
    max_radius_m: u32,
}

impl PlaceFinder {
    pub fn new(
        geocoder: Geocoder,
        search: Arc<dyn PlaceSearchProvider>,
        config: &PlannerConfig,
    ) -> Self {
        Self {
            geocoder,
            search,
            min_radius_m: config.min_search_radius_m,
            max_radius_m: config.max_search_radius_m,
        }
    }

    /// Find `query` near the corridor between two addresses.
    ///
    /// Both endpoints are geocoded concurrently. If either cannot be
    /// geocoded the search falls back to an unbiased text search.
    pub async fn find_along_corridor(
        &self,
        query: &str,
        point_a: &str,
        point_b: &str,
    ) -> Option<FoundPlace> {
        let (a, b) = tokio::join!(self.geocoder.resolve(point_a), self.geocoder.resolve(point_b));

        let (Some(a), Some(b)) = (a, b) else {
            debug!(query, point_a, point_b, "Corridor endpoints not geocoded, searching unbiased");
            return self.find_anywhere(query).await;
        };

        let bias = SearchBias {
            center: a.midpoint(&b),
            radius_m: corridor_radius_m(&a, &b, self.min_radius_m, self.max_radius_m),
        };

        self.run_search(query, Some(bias)).await
    }

    /// Find `query` with no location bias.
    pub async fn find_anywhere(&self, query: &str) -> Option<FoundPlace> {
        self.run_search(query, None).await
    }

    async fn run_search(&self, query: &str, bias: Option<SearchBias>) -> Option<FoundPlace> {
        match self.search.text_search(query, bias).await {
            Ok(place) => Some(FoundPlace {
                address: if place.address.trim().is_empty() {
                    place.coordinate.to_query_param()
                } else {
                    place.address
                },
                name: place
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| query.to_string()),
                coordinate: place.coordinate,
            }),
            Err(e) => {
                debug!(
                    provider = self.search.name(),
                    query,
                    biased = bias.is_some(),
                    error = %e,
                    "Place search found nothing"
                );
                None
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Radius always lies within the configured bounds.
        #[test]
        fn radius_within_bounds(
            lat_a in -90.0f64..90.0,
            lng_a in -180.0f64..180.0,
            lat_b in -90.0f64..90.0,
            lng_b in -180.0f64..180.0,
        ) {
            let r = corridor_radius_m(
                &Coordinate::new(lat_a, lng_a),
                &Coordinate::new(lat_b, lng_b),
                5_000,
                50_000,
            );
            prop_assert!((5_000..=50_000).contains(&r));
        }

        /// Moving the endpoints apart never shrinks the radius.
        #[test]
        fn radius_monotone_in_span(span in 0.0f64..2.0, extra in 0.0f64..2.0) {
            let origin = Coordinate::new(0.0, 0.0);
            let near = corridor_radius_m(&origin, &Coordinate::new(span, 0.0), 5_000, 50_000);
            let far = corridor_radius_m(&origin, &Coordinate::new(span + extra, 0.0), 5_000, 50_000);
            prop_assert!(near <= far);
        }
    }
}
