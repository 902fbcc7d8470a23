//! Route resolution pipeline.
//!
//! Turns a caller's itinerary into an annotated route:
//!
//! 1. `search` stops are resolved to concrete places along the corridor
//!    between their neighbours
//! 2. every stop without coordinates is geocoded
//! 3. drive times are fetched for the stops in the given order
//! 4. if any stop has a time window, a synthetic day is simulated to flag
//!    visits that overrun closing time
//!
//! Nearest-neighbour reordering is a separate entry point; the pipeline
//! never reorders on its own. Every provider failure degrades the result
//! rather than failing the request.

mod config;
mod directions;
mod geocoder;
mod places;
mod reorder;
mod resolve;
mod route;
mod schedule;

pub use config::PlannerConfig;
pub use directions::DirectionsClient;
pub use geocoder::Geocoder;
pub use places::{FoundPlace, PlaceFinder, corridor_radius_m};
pub use reorder::{nearest_neighbor_order, reorder_stops};
pub use resolve::{backfill_coordinates, resolve_search_stops};
pub use route::{RouteError, RoutePlanner, RouteResponse};
pub use schedule::{needs_schedule, schedule_stops};
