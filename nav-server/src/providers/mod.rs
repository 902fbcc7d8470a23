//! Outbound provider collaborators.
//!
//! The pipeline talks to three capabilities: geocoding, place text search
//! and multi-waypoint directions. Each capability is a trait so that
//! concrete providers can be chained, decorated or stubbed:
//!
//! - [`GoogleMapsClient`] implements all three against Google Maps
//! - [`NominatimClient`] is a keyless, coarse geocoder used as fallback
//! - [`CachedGeocodeProvider`] memoises any geocoder
//! - [`StubProvider`] serves canned answers for tests and offline runs
//!
//! Trait methods return boxed futures so providers can be held as trait
//! objects in an ordered chain.

mod cache;
mod error;
mod google;
mod nominatim;
mod stub;

use futures::future::BoxFuture;

use crate::domain::Coordinate;

pub use cache::{CachedGeocodeProvider, GeocodeCache, GeocodeCacheConfig};
pub use error::ProviderError;
pub use google::{GoogleConfig, GoogleMapsClient};
pub use nominatim::{NominatimClient, NominatimConfig};
pub use stub::{StubData, StubProvider};

/// Future returned by provider calls.
pub type ProviderFuture<'a, T> = BoxFuture<'a, Result<T, ProviderError>>;

/// A place returned by a text search.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Display address; empty if the provider omitted it.
    pub address: String,
    /// Place name, if the provider returned one.
    pub name: Option<String>,
    pub coordinate: Coordinate,
}

/// Location bias for a text search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBias {
    pub center: Coordinate,
    pub radius_m: u32,
}

/// Provider-level avoidance modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avoidances {
    pub highways: bool,
    pub tolls: bool,
    pub ferries: bool,
}

impl Avoidances {
    /// True when no modifier is set.
    pub fn is_empty(&self) -> bool {
        !(self.highways || self.tolls || self.ferries)
    }
}

/// An ordered directions query. Waypoints are visited in the given order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
    pub avoid: Avoidances,
}

/// One leg as reported by a directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLeg {
    pub duration_secs: u64,
    pub distance_meters: u64,
}

/// Address → coordinate lookup.
pub trait GeocodeProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, Coordinate>;
}

/// Free-text place search. Only the first-ranked result is returned.
pub trait PlaceSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn text_search<'a>(
        &'a self,
        query: &'a str,
        bias: Option<SearchBias>,
    ) -> ProviderFuture<'a, Place>;
}

/// Multi-waypoint driving directions.
pub trait DirectionsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Compute legs for `query`, one per hop in request order.
    fn compute_route<'a>(&'a self, query: &'a RouteQuery) -> ProviderFuture<'a, Vec<RawLeg>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avoidances_empty() {
        assert!(Avoidances::default().is_empty());
        assert!(
            !Avoidances {
                ferries: true,
                ..Default::default()
            }
            .is_empty()
        );
    }
}
