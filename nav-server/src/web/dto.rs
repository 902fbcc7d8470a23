//! Data transfer objects for web requests and responses.
//!
//! Route requests and responses reuse the domain types directly; only the
//! reorder endpoint and errors need their own shapes.

use serde::{Deserialize, Serialize};

use crate::domain::Stop;

/// Request to reorder stops by proximity.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Starting address; the first stop anchors the tour when absent.
    #[serde(default)]
    pub origin: Option<String>,

    pub stops: Vec<Stop>,
}

/// Reordered stops.
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub stops: Vec<Stop>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
