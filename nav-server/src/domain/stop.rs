//! Itinerary stops.

use serde::{Deserialize, Serialize};

use super::{Coordinate, WallTime};

/// Dwell time applied when the caller does not specify one.
pub const DEFAULT_DWELL_MINUTES: u32 = 20;

fn default_dwell() -> u32 {
    DEFAULT_DWELL_MINUTES
}

/// How a stop's location is specified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopType {
    /// The caller gave a concrete address.
    #[default]
    Specific,
    /// A free-text query to be matched to a place along the route.
    Search,
    /// A search stop that has been matched to a concrete place.
    Resolved,
}

/// One entry of an itinerary.
///
/// Caller-supplied fields describe the stop; the remaining fields are
/// derived by the pipeline and stay `None` until the phase that owns them
/// has run. Pipeline phases never mutate a stop they were given: they
/// return a new value built with the `with_*` helpers below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// Caller-assigned id, unique within one request.
    pub id: String,

    /// Free-text address. For search stops this is a placeholder until
    /// resolution succeeds.
    pub address: String,

    /// Display name.
    #[serde(default)]
    pub label: Option<String>,

    /// Diagnostic text added by the pipeline.
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub stop_type: StopType,

    /// Query used to find a place for `search` stops.
    #[serde(default)]
    pub search_query: Option<String>,

    #[serde(default)]
    pub open_time: Option<WallTime>,

    #[serde(default)]
    pub close_time: Option<WallTime>,

    #[serde(default = "default_dwell")]
    pub dwell_minutes: u32,

    /// Start of the simulated visit, as a 12-hour clock string.
    #[serde(default)]
    pub estimated_arrival: Option<String>,

    #[serde(default)]
    pub drive_minutes_from_prev: Option<u32>,

    /// Length of the leg arriving at this stop.
    #[serde(default)]
    pub distance_meters: Option<u64>,

    #[serde(default)]
    pub has_conflict: Option<bool>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Stop {
    /// Create a specific stop at an address with default scheduling.
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            label: None,
            notes: None,
            stop_type: StopType::Specific,
            search_query: None,
            open_time: None,
            close_time: None,
            dwell_minutes: DEFAULT_DWELL_MINUTES,
            estimated_arrival: None,
            drive_minutes_from_prev: None,
            distance_meters: None,
            has_conflict: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Create a search stop. `placeholder` is used as the address until
    /// the query is resolved.
    pub fn search(
        id: impl Into<String>,
        query: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            stop_type: StopType::Search,
            search_query: Some(query.into()),
            ..Self::new(id, placeholder)
        }
    }

    /// The stop's coordinate, if both latitude and longitude are known.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    /// Whether the stop declares an opening or closing time.
    pub fn has_window(&self) -> bool {
        self.open_time.is_some() || self.close_time.is_some()
    }

    /// The search query, if this is a search stop with a non-blank query.
    pub fn pending_query(&self) -> Option<&str> {
        if self.stop_type != StopType::Search {
            return None;
        }
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Drop every pipeline-owned annotation.
    ///
    /// Requests often echo back an earlier response; schedule, leg and note
    /// fields from that run must not survive into the next one. Caller
    /// input (address, label, window, dwell, coordinates) is kept.
    pub fn without_derived(self) -> Self {
        Self {
            notes: None,
            estimated_arrival: None,
            drive_minutes_from_prev: None,
            distance_meters: None,
            has_conflict: None,
            ..self
        }
    }

    pub fn with_coordinate(self, coordinate: Coordinate) -> Self {
        Self {
            latitude: Some(coordinate.lat),
            longitude: Some(coordinate.lng),
            ..self
        }
    }

    pub fn with_note(self, note: impl Into<String>) -> Self {
        Self {
            notes: Some(note.into()),
            ..self
        }
    }

    pub fn with_times(mut self, open: Option<WallTime>, close: Option<WallTime>) -> Self {
        self.open_time = open;
        self.close_time = close;
        self
    }

    pub fn with_dwell(mut self, minutes: u32) -> Self {
        self.dwell_minutes = minutes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_derived_keeps_caller_fields() {
        let mut stop = Stop::search("a", "coffee", "Coffee")
            .with_coordinate(Coordinate::new(1.0, 2.0))
            .with_note("Could not find 'coffee' along route; using as-is")
            .with_dwell(45);
        stop.label = Some("Morning coffee".into());
        stop.estimated_arrival = Some("3:00 PM".into());
        stop.drive_minutes_from_prev = Some(99);
        stop.distance_meters = Some(5);
        stop.has_conflict = Some(true);

        let clean = stop.clone().without_derived();

        assert_eq!(clean.notes, None);
        assert_eq!(clean.estimated_arrival, None);
        assert_eq!(clean.drive_minutes_from_prev, None);
        assert_eq!(clean.distance_meters, None);
        assert_eq!(clean.has_conflict, None);
        assert_eq!(clean.label.as_deref(), Some("Morning coffee"));
        assert_eq!(clean.coordinate(), Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(clean.dwell_minutes, 45);
        assert_eq!(clean.pending_query(), Some("coffee"));
    }

    #[test]
    fn deserialize_minimal_stop_applies_defaults() {
        let stop: Stop = serde_json::from_str(r#"{"id":"a","address":"1 Main St"}"#).unwrap();

        assert_eq!(stop.stop_type, StopType::Specific);
        assert_eq!(stop.dwell_minutes, DEFAULT_DWELL_MINUTES);
        assert_eq!(stop.coordinate(), None);
        assert_eq!(stop.has_conflict, None);
        assert!(!stop.has_window());
    }

    #[test]
    fn deserialize_search_stop_with_window() {
        let json = r#"{
            "id": "s1",
            "address": "coffee",
            "stopType": "search",
            "searchQuery": "Blue Bottle Coffee",
            "openTime": "07:00",
            "closeTime": "15:30",
            "dwellMinutes": 0
        }"#;
        let stop: Stop = serde_json::from_str(json).unwrap();

        assert_eq!(stop.stop_type, StopType::Search);
        assert_eq!(stop.pending_query(), Some("Blue Bottle Coffee"));
        assert_eq!(stop.open_time, Some(WallTime::from_minutes(420)));
        assert_eq!(stop.dwell_minutes, 0);
        assert!(stop.has_window());
    }

    #[test]
    fn negative_dwell_is_rejected() {
        let json = r#"{"id":"a","address":"x","dwellMinutes":-5}"#;
        assert!(serde_json::from_str::<Stop>(json).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let stop = Stop::new("a", "1 Main St").with_coordinate(Coordinate::new(1.0, 2.0));
        let value = serde_json::to_value(&stop).unwrap();

        assert_eq!(value["stopType"], "specific");
        assert_eq!(value["dwellMinutes"], 20);
        assert_eq!(value["latitude"], 1.0);
        assert!(value["estimatedArrival"].is_null());
    }

    #[test]
    fn pending_query_ignores_blank_and_non_search() {
        assert_eq!(Stop::search("s", "   ", "x").pending_query(), None);

        let mut specific = Stop::new("a", "x");
        specific.search_query = Some("pizza".into());
        assert_eq!(specific.pending_query(), None);
    }

    #[test]
    fn coordinate_requires_both_components() {
        let mut stop = Stop::new("a", "x");
        stop.latitude = Some(0.0);
        assert_eq!(stop.coordinate(), None);
        stop.longitude = Some(0.0);
        assert_eq!(stop.coordinate(), Some(Coordinate::new(0.0, 0.0)));
    }
}
