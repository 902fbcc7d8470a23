//! Route requests, preferences and directions results.

use serde::{Deserialize, Serialize};

use super::Stop;

/// User routing preferences for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutePreferences {
    /// Prefer scenic roads. There is no provider primitive for this, so it
    /// is expressed as highway avoidance.
    pub scenic: bool,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
    /// Free text from the client. Accepted but not interpreted.
    pub preference_notes: Option<String>,
}

impl RoutePreferences {
    /// Whether highways should be avoided. Scenic implies it.
    pub fn avoids_highways(&self) -> bool {
        self.scenic || self.avoid_highways
    }
}

/// A request to resolve an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Starting address. Defaults to the first stop's address.
    #[serde(default)]
    pub origin: Option<String>,

    pub stops: Vec<Stop>,

    #[serde(default)]
    pub preferences: Option<RoutePreferences>,
}

impl RouteRequest {
    pub fn new(stops: Vec<Stop>) -> Self {
        Self {
            origin: None,
            stops,
            preferences: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_preferences(mut self, preferences: RoutePreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// The effective origin: the explicit origin if it is non-blank,
    /// otherwise the first stop's address.
    pub fn origin_address(&self) -> Option<&str> {
        self.origin
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .or_else(|| self.stops.first().map(|s| s.address.as_str()))
    }
}

/// One hop of a directions response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsLeg {
    /// Whole minutes, floor-divided from the provider's seconds.
    pub duration_minutes: u32,
    /// Kilometres rounded to one decimal place.
    pub distance_km: f64,
}

/// Per-leg drive times for an ordered route.
///
/// Totals are sums over the legs rather than the provider's route totals,
/// so they always agree with what is shown per stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsResult {
    pub legs: Vec<DirectionsLeg>,
    pub total_duration_minutes: u32,
    pub total_distance_km: f64,
}

impl DirectionsResult {
    /// Build a result from raw leg measurements (seconds, meters).
    pub fn from_raw_legs(raw: &[(u64, u64)]) -> Self {
        let legs: Vec<DirectionsLeg> = raw
            .iter()
            .map(|&(secs, meters)| DirectionsLeg {
                duration_minutes: u32::try_from(secs / 60).unwrap_or(u32::MAX),
                distance_km: round_km(meters),
            })
            .collect();

        let total_duration_minutes = legs
            .iter()
            .fold(0u32, |acc, leg| acc.saturating_add(leg.duration_minutes));
        let total_meters: u64 = raw.iter().map(|&(_, meters)| meters).sum();

        Self {
            legs,
            total_duration_minutes,
            total_distance_km: round_km(total_meters),
        }
    }
}

/// Meters to kilometres, rounded to 0.1.
fn round_km(meters: u64) -> f64 {
    (meters as f64 / 100.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenic_implies_highway_avoidance() {
        let prefs = RoutePreferences {
            scenic: true,
            ..Default::default()
        };
        assert!(prefs.avoids_highways());
        assert!(!RoutePreferences::default().avoids_highways());
    }

    #[test]
    fn preferences_deserialize_with_missing_fields() {
        let prefs: RoutePreferences = serde_json::from_str(r#"{"avoidTolls":true}"#).unwrap();
        assert!(prefs.avoid_tolls);
        assert!(!prefs.scenic);
        assert_eq!(prefs.preference_notes, None);
    }

    #[test]
    fn origin_defaults_to_first_stop() {
        let req = RouteRequest::new(vec![Stop::new("a", "First"), Stop::new("b", "Second")]);
        assert_eq!(req.origin_address(), Some("First"));

        let req = req.with_origin("Home");
        assert_eq!(req.origin_address(), Some("Home"));

        let blank = RouteRequest::new(vec![Stop::new("a", "First")]).with_origin("  ");
        assert_eq!(blank.origin_address(), Some("First"));
    }

    #[test]
    fn legs_floor_minutes_and_round_km() {
        let result = DirectionsResult::from_raw_legs(&[(1799, 12_345), (60, 50), (59, 0)]);

        assert_eq!(result.legs[0].duration_minutes, 29);
        assert_eq!(result.legs[0].distance_km, 12.3);
        assert_eq!(result.legs[1].duration_minutes, 1);
        assert_eq!(result.legs[1].distance_km, 0.1);
        assert_eq!(result.legs[2].duration_minutes, 0);
        assert_eq!(result.legs[2].distance_km, 0.0);
    }

    #[test]
    fn totals_are_sums_of_legs() {
        let result = DirectionsResult::from_raw_legs(&[(600, 1_040), (1_200, 1_040)]);

        assert_eq!(result.total_duration_minutes, 30);
        // Summed meters, not summed rounded kilometres.
        assert_eq!(result.total_distance_km, 2.1);
    }

    #[test]
    fn directions_serialize_camel_case() {
        let value = serde_json::to_value(DirectionsResult::from_raw_legs(&[(120, 1_000)])).unwrap();
        assert_eq!(value["legs"][0]["durationMinutes"], 2);
        assert_eq!(value["totalDistanceKm"], 1.0);
    }
}
