//! Google Maps API request and response DTOs.
//!
//! These types map directly to the Geocoding, Places Text Search and
//! Routes v2 JSON payloads. Only the fields the pipeline consumes are
//! modelled; everything else (polylines, steps, viewport...) is ignored.

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;
use crate::providers::{Avoidances, Place, ProviderError, RawLeg, RouteQuery};

/// Status string Google returns for a successful lookup.
const STATUS_OK: &str = "OK";

/// Status string Google returns when the lookup matched nothing.
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Geometry block shared by geocode and place results.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// Response from the Geocoding API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<GeocodeResult>,

    /// Human-readable detail for non-OK statuses.
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

/// Response from the Places Text Search API.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<PlaceResult>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

/// Request body for `directions/v2:computeRoutes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRoutesRequest {
    pub origin: AddressWaypoint,
    pub destination: AddressWaypoint,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intermediates: Vec<AddressWaypoint>,
    pub travel_mode: &'static str,
    pub routing_preference: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_modifiers: Option<RouteModifiers>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressWaypoint {
    pub address: String,
}

/// Avoidance flags. Unset flags are omitted from the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteModifiers {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_highways: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_tolls: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_ferries: bool,
}

impl From<Avoidances> for RouteModifiers {
    fn from(avoid: Avoidances) -> Self {
        Self {
            avoid_highways: avoid.highways,
            avoid_tolls: avoid.tolls,
            avoid_ferries: avoid.ferries,
        }
    }
}

impl ComputeRoutesRequest {
    /// Build a driving request, waypoints in the order given.
    pub fn from_query(query: &RouteQuery) -> Self {
        Self {
            origin: AddressWaypoint {
                address: query.origin.clone(),
            },
            destination: AddressWaypoint {
                address: query.destination.clone(),
            },
            intermediates: query
                .waypoints
                .iter()
                .map(|address| AddressWaypoint {
                    address: address.clone(),
                })
                .collect(),
            travel_mode: "DRIVE",
            routing_preference: "TRAFFIC_AWARE",
            route_modifiers: (!query.avoid.is_empty()).then(|| query.avoid.into()),
        }
    }
}

/// Response from `directions/v2:computeRoutes`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeRoutesResponse {
    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub legs: Vec<RouteLegDto>,
}

/// A route leg. Routes v2 omits zero-valued fields entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLegDto {
    /// Duration as a protobuf string, e.g. "1234s".
    pub duration: Option<String>,
    pub distance_meters: Option<u64>,
}

/// Parse a protobuf duration string ("1234s", "12.5s") into whole seconds.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let secs: f64 = s.trim().strip_suffix('s')?.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.floor() as u64)
}

/// Map a non-OK payload status to an error.
fn status_error(status: String, detail: Option<String>) -> ProviderError {
    if status == STATUS_ZERO_RESULTS {
        return ProviderError::NotFound;
    }
    match detail {
        Some(detail) => ProviderError::Status(format!("{status}: {detail}")),
        None => ProviderError::Status(status),
    }
}

/// Extract the first coordinate from a Geocoding API body.
pub fn parse_geocode(body: &str) -> Result<Coordinate, ProviderError> {
    let response: GeocodeResponse = serde_json::from_str(body).map_err(ProviderError::json)?;

    if response.status != STATUS_OK {
        return Err(status_error(response.status, response.error_message));
    }

    response
        .results
        .first()
        .map(|r| Coordinate::new(r.geometry.location.lat, r.geometry.location.lng))
        .ok_or(ProviderError::NotFound)
}

/// Extract the first place from a Places Text Search body.
pub fn parse_place(body: &str) -> Result<Place, ProviderError> {
    let response: PlacesResponse = serde_json::from_str(body).map_err(ProviderError::json)?;

    if response.status != STATUS_OK {
        return Err(status_error(response.status, response.error_message));
    }

    let place = response.results.into_iter().next().ok_or(ProviderError::NotFound)?;

    Ok(Place {
        address: place.formatted_address.unwrap_or_default(),
        name: place.name,
        coordinate: Coordinate::new(place.geometry.location.lat, place.geometry.location.lng),
    })
}

/// Extract per-leg measurements of the first route from a Routes v2 body.
pub fn parse_routes(body: &str) -> Result<Vec<RawLeg>, ProviderError> {
    let response: ComputeRoutesResponse =
        serde_json::from_str(body).map_err(ProviderError::json)?;

    let route = response.routes.into_iter().next().ok_or(ProviderError::NotFound)?;

    route
        .legs
        .iter()
        .map(|leg| {
            let duration_secs = match leg.duration.as_deref() {
                Some(d) => parse_duration_secs(d).ok_or_else(|| ProviderError::Json {
                    message: format!("invalid leg duration: {d}"),
                })?,
                None => 0,
            };
            Ok(RawLeg {
                duration_secs,
                distance_meters: leg.distance_meters.unwrap_or(0),
            })
        })
        .collect()
}
