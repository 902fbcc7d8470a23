//! Google Maps HTTP client.
//!
//! Provides geocoding, place text search and Routes v2 directions behind
//! the provider traits. Handles the API key, request timeouts and a
//! concurrency limit shared by every clone of the client.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reqwest::header::{HeaderName, HeaderValue};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::domain::Coordinate;
use crate::providers::{
    DirectionsProvider, GeocodeProvider, Place, PlaceSearchProvider, ProviderError,
    ProviderFuture, RawLeg, RouteQuery, SearchBias,
};

use super::types::{ComputeRoutesRequest, parse_geocode, parse_place, parse_routes};

/// Default base URL for the Geocoding and Places APIs.
const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Default base URL for the Routes API.
const DEFAULT_ROUTES_BASE_URL: &str = "https://routes.googleapis.com";

/// Only leg durations and distances are needed; everything else is dropped
/// server-side.
const ROUTES_FIELD_MASK: &str = "routes.legs.duration,routes.legs.distanceMeters";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the Google Maps client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// API key. `None` means the provider is not configured.
    pub api_key: Option<String>,
    /// Base URL for Geocoding and Places
    pub maps_base_url: String,
    /// Base URL for Routes v2
    pub routes_base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GoogleConfig {
    /// Create a new config. Blank keys count as no key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            maps_base_url: DEFAULT_MAPS_BASE_URL.to_string(),
            routes_base_url: DEFAULT_ROUTES_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom base URLs (for testing).
    pub fn with_base_urls(mut self, maps: impl Into<String>, routes: impl Into<String>) -> Self {
        self.maps_base_url = maps.into();
        self.routes_base_url = routes.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Google Maps API client.
///
/// Cheap to clone: clones share the connection pool and the semaphore.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    maps_base_url: String,
    routes_base_url: String,
    semaphore: Arc<Semaphore>,
    /// Longest wait for a free slot; the request timeout only starts after.
    queue_timeout: Duration,
}

impl GoogleMapsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GoogleConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_http(http, config))
    }

    /// Create a client on top of an existing HTTP handle.
    pub fn with_http(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self {
            http,
            api_key: config.api_key,
            maps_base_url: config.maps_base_url,
            routes_base_url: config.routes_base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            queue_timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// A client that uses `api_key` instead of the configured key.
    ///
    /// Used for per-request keys supplied by the client app. The HTTP pool
    /// and concurrency limit are shared with `self`.
    pub fn with_api_key(&self, api_key: &str) -> Self {
        let api_key = api_key.trim();
        Self {
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
            ..self.clone()
        }
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("google maps api key"))
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>, ProviderError> {
        tokio::time::timeout(self.queue_timeout, self.semaphore.acquire())
            .await
            .map_err(|_| ProviderError::QueueTimeout)?
            .map_err(|_| ProviderError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let _permit = self.permit().await?;

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }

    /// Geocode an address to its first matching coordinate.
    pub async fn geocode_address(&self, address: &str) -> Result<Coordinate, ProviderError> {
        let key = self.key()?;
        let url = format!("{}/maps/api/geocode/json", self.maps_base_url);

        let request = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", key)]);

        let body = self.send(request).await?;
        parse_geocode(&body)
    }

    /// Run a Places text search, optionally biased around a point.
    pub async fn search_text(
        &self,
        query: &str,
        bias: Option<SearchBias>,
    ) -> Result<Place, ProviderError> {
        let key = self.key()?;
        let url = format!("{}/maps/api/place/textsearch/json", self.maps_base_url);

        let mut params = vec![("query", query.to_string()), ("key", key.to_string())];
        if let Some(bias) = bias {
            params.push(("location", bias.center.to_query_param()));
            params.push(("radius", bias.radius_m.to_string()));
        }

        let body = self.send(self.http.get(&url).query(&params)).await?;
        parse_place(&body)
    }

    /// Compute a driving route with Routes v2.
    pub async fn compute_routes(&self, query: &RouteQuery) -> Result<Vec<RawLeg>, ProviderError> {
        let key = self.key()?;
        let url = format!("{}/directions/v2:computeRoutes", self.routes_base_url);

        let api_key = HeaderValue::from_str(key).map_err(|_| ProviderError::Api {
            status: 0,
            message: "Invalid API key format".to_string(),
        })?;

        let request = self
            .http
            .post(&url)
            .header(HeaderName::from_static("x-goog-api-key"), api_key)
            .header(
                HeaderName::from_static("x-goog-fieldmask"),
                HeaderValue::from_static(ROUTES_FIELD_MASK),
            )
            .json(&ComputeRoutesRequest::from_query(query));

        let body = self.send(request).await?;
        parse_routes(&body)
    }
}

impl GeocodeProvider for GoogleMapsClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, Coordinate> {
        self.geocode_address(address).boxed()
    }
}

impl PlaceSearchProvider for GoogleMapsClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn text_search<'a>(
        &'a self,
        query: &'a str,
        bias: Option<SearchBias>,
    ) -> ProviderFuture<'a, Place> {
        self.search_text(query, bias).boxed()
    }
}

impl DirectionsProvider for GoogleMapsClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn compute_route<'a>(&'a self, query: &'a RouteQuery) -> ProviderFuture<'a, Vec<RawLeg>> {
        self.compute_routes(query).boxed()
    }
}
