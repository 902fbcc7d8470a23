//! Domain types for itinerary resolution.
//!
//! Stops, route requests and directions results are plain values: every
//! pipeline phase takes them by value or reference and returns new ones.

mod coordinate;
mod route;
mod stop;
mod time;

pub use coordinate::{Coordinate, EARTH_RADIUS_M, METERS_PER_DEGREE};
pub use route::{DirectionsLeg, DirectionsResult, RoutePreferences, RouteRequest};
pub use stop::{DEFAULT_DWELL_MINUTES, Stop, StopType};
pub use time::{TimeError, WallTime};
