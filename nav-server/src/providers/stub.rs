//! Stub provider for testing without API access.
//!
//! Serves canned geocodes, places and directions from memory or from a JSON
//! fixture file, and records every call so tests can assert on what the
//! pipeline asked for. Also usable for running the server offline.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use serde::Deserialize;

use crate::domain::Coordinate;

use super::{
    DirectionsProvider, GeocodeProvider, Place, PlaceSearchProvider, ProviderError,
    ProviderFuture, RawLeg, RouteQuery, SearchBias,
};

/// Assumed driving speed when legs are derived from coordinates.
const DEFAULT_SPEED_KMH: f64 = 40.0;

fn default_speed() -> f64 {
    DEFAULT_SPEED_KMH
}

/// A canned place answer.
#[derive(Debug, Clone, Deserialize)]
pub struct StubPlace {
    pub address: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// A canned directions leg.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubLeg {
    pub duration_secs: u64,
    pub distance_meters: u64,
}

/// Fixture data for [`StubProvider`].
///
/// If `legs` is set, every directions call returns exactly those legs.
/// Otherwise legs are estimated from the geocoded endpoints of each hop
/// at `speed_kmh`, and a hop with an unknown endpoint means "no route".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubData {
    /// Address → coordinate.
    #[serde(default)]
    pub coordinates: HashMap<String, Coordinate>,

    /// Search query → place.
    #[serde(default)]
    pub places: HashMap<String, StubPlace>,

    #[serde(default)]
    pub legs: Option<Vec<StubLeg>>,

    #[serde(default = "default_speed")]
    pub speed_kmh: f64,
}

impl Default for StubData {
    fn default() -> Self {
        Self {
            coordinates: HashMap::new(),
            places: HashMap::new(),
            legs: None,
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

/// In-memory provider implementing geocoding, place search and directions.
#[derive(Debug, Default)]
pub struct StubProvider {
    data: StubData,
    geocode_calls: AtomicUsize,
    searches: Mutex<Vec<(String, Option<SearchBias>)>>,
    routes: Mutex<Vec<RouteQuery>>,
}

impl StubProvider {
    /// Create an empty stub. Every lookup answers `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stub from fixture data.
    pub fn from_data(data: StubData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Load fixture data from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|e| ProviderError::Api {
            status: 0,
            message: format!("Failed to read {:?}: {}", path, e),
        })?;

        let data: StubData = serde_json::from_str(&json).map_err(|e| ProviderError::Json {
            message: format!("Failed to parse {:?}: {}", path, e),
        })?;

        Ok(Self::from_data(data))
    }

    pub fn with_coordinate(mut self, address: impl Into<String>, coordinate: Coordinate) -> Self {
        self.data.coordinates.insert(address.into(), coordinate);
        self
    }

    pub fn with_place(
        mut self,
        query: impl Into<String>,
        name: Option<&str>,
        address: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        self.data.places.insert(
            query.into(),
            StubPlace {
                address: address.into(),
                name: name.map(str::to_string),
                lat: coordinate.lat,
                lng: coordinate.lng,
            },
        );
        self
    }

    /// Fix the directions answer to these (seconds, meters) legs.
    pub fn with_legs(mut self, legs: &[(u64, u64)]) -> Self {
        self.data.legs = Some(
            legs.iter()
                .map(|&(duration_secs, distance_meters)| StubLeg {
                    duration_secs,
                    distance_meters,
                })
                .collect(),
        );
        self
    }

    /// Number of geocode calls made so far.
    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    /// Every text search made so far, in call order.
    pub fn searches(&self) -> Vec<(String, Option<SearchBias>)> {
        self.searches
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Every directions query made so far, in call order.
    pub fn route_queries(&self) -> Vec<RouteQuery> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn lookup(&self, address: &str) -> Result<Coordinate, ProviderError> {
        self.data
            .coordinates
            .get(address.trim())
            .copied()
            .ok_or(ProviderError::NotFound)
    }

    fn estimate_legs(&self, query: &RouteQuery) -> Result<Vec<RawLeg>, ProviderError> {
        let points: Vec<&str> = std::iter::once(query.origin.as_str())
            .chain(query.waypoints.iter().map(String::as_str))
            .chain(std::iter::once(query.destination.as_str()))
            .collect();

        points
            .windows(2)
            .map(|hop| {
                let from = self.lookup(hop[0])?;
                let to = self.lookup(hop[1])?;
                let meters = from.haversine_m(&to);
                let hours = meters / 1000.0 / self.data.speed_kmh;
                Ok(RawLeg {
                    duration_secs: (hours * 3600.0).round() as u64,
                    distance_meters: meters.round() as u64,
                })
            })
            .collect()
    }
}

impl GeocodeProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, Coordinate> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.lookup(address);
        async move { result }.boxed()
    }
}

impl PlaceSearchProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn text_search<'a>(
        &'a self,
        query: &'a str,
        bias: Option<SearchBias>,
    ) -> ProviderFuture<'a, Place> {
        if let Ok(mut searches) = self.searches.lock() {
            searches.push((query.to_string(), bias));
        }

        let result = self
            .data
            .places
            .get(query)
            .map(|p| Place {
                address: p.address.clone(),
                name: p.name.clone(),
                coordinate: Coordinate::new(p.lat, p.lng),
            })
            .ok_or(ProviderError::NotFound);

        async move { result }.boxed()
    }
}

impl DirectionsProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn compute_route<'a>(&'a self, query: &'a RouteQuery) -> ProviderFuture<'a, Vec<RawLeg>> {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(query.clone());
        }

        let result = match &self.data.legs {
            Some(legs) => Ok(legs
                .iter()
                .map(|l| RawLeg {
                    duration_secs: l.duration_secs,
                    distance_meters: l.distance_meters,
                })
                .collect()),
            None => self.estimate_legs(query),
        };

        async move { result }.boxed()
    }
}
