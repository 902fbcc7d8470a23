//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::domain::RouteRequest;
use crate::planner::{RouteError, RouteResponse};

use super::dto::*;
use super::state::AppState;

/// Header carrying a per-request Google Maps key.
pub const API_KEY_HEADER: &str = "x-google-maps-key";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/route", post(resolve_route))
        .route("/optimize", post(resolve_route))
        .route("/route/optimize-order", post(optimize_order))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The caller's API key, if the header is present and non-blank.
fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Parse a JSON body, logging what was rejected.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "Rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Resolve, route and schedule an itinerary.
async fn resolve_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RouteResponse>, AppError> {
    let request: RouteRequest = parse_json(&body)?;
    let planner = state.planner(api_key(&headers));
    let response = planner.resolve_route(&request).await?;
    Ok(Json(response))
}

/// Reorder stops by nearest neighbour.
async fn optimize_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReorderResponse>, AppError> {
    let request: ReorderRequest = parse_json(&body)?;
    let planner = state.planner(api_key(&headers));
    let stops = planner
        .reorder_stops(request.origin.as_deref(), request.stops)
        .await;
    Ok(Json(ReorderResponse { stops }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::EmptyStops => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, error = %message, "Request rejected");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
