//! Configuration for the route planner.

use crate::domain::WallTime;

/// Configuration parameters for route resolution.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Clock value at which the simulated day starts.
    pub day_start: WallTime,

    /// Smallest corridor search radius (meters).
    /// Close endpoints would otherwise yield a radius that misses the place.
    pub min_search_radius_m: u32,

    /// Largest corridor search radius (meters).
    /// Distant endpoints would otherwise dilute relevance.
    pub max_search_radius_m: u32,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(day_start: WallTime, min_search_radius_m: u32, max_search_radius_m: u32) -> Self {
        Self {
            day_start,
            min_search_radius_m,
            max_search_radius_m: max_search_radius_m.max(min_search_radius_m),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            day_start: WallTime::from_minutes(8 * 60), // 08:00
            min_search_radius_m: 5_000,
            max_search_radius_m: 50_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.day_start.to_string(), "08:00");
        assert_eq!(config.min_search_radius_m, 5_000);
        assert_eq!(config.max_search_radius_m, 50_000);
    }

    #[test]
    fn custom_config_keeps_bounds_ordered() {
        let config = PlannerConfig::new(WallTime::from_minutes(420), 8_000, 2_000);

        assert_eq!(config.day_start.to_string(), "07:00");
        assert_eq!(config.min_search_radius_m, 8_000);
        assert_eq!(config.max_search_radius_m, 8_000);
    }
}
