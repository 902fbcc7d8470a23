//! Web layer for the route planner.
//!
//! JSON endpoints for resolving routes and reordering stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{API_KEY_HEADER, AppError, create_router};
pub use state::AppState;
