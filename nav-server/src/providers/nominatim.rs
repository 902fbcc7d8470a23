//! Nominatim (OpenStreetMap) geocoding client.
//!
//! Keyless and coarse: good enough for street + city granularity, which is
//! all the fallback path needs. The public instance allows roughly one
//! request per second and requires an identifying User-Agent, so the
//! client defaults to a single in-flight request.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::domain::Coordinate;

use super::{GeocodeProvider, ProviderError, ProviderFuture};

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default User-Agent sent with every request.
const DEFAULT_USER_AGENT: &str = concat!("nav-server/", env!("CARGO_PKG_VERSION"));

/// A search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: 1,
            timeout_secs: 15,
        }
    }

    /// Set a custom base URL (self-hosted instance or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
    /// Longest wait for a free slot; the request timeout only starts after.
    queue_timeout: Duration,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|_| ProviderError::Api {
                status: 0,
                message: "Invalid User-Agent format".to_string(),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            queue_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Look up the best match for a free-text address.
    pub async fn search(&self, address: &str) -> Result<Coordinate, ProviderError> {
        let _permit = tokio::time::timeout(self.queue_timeout, self.semaphore.acquire())
            .await
            .map_err(|_| ProviderError::QueueTimeout)?
            .map_err(|_| ProviderError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/search", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        parse_search(&body)
    }
}

/// Extract the first coordinate from a `/search?format=json` body.
pub fn parse_search(body: &str) -> Result<Coordinate, ProviderError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body).map_err(ProviderError::json)?;

    let place = places.first().ok_or(ProviderError::NotFound)?;

    let lat = place.lat.parse::<f64>().map_err(|e| ProviderError::Json {
        message: format!("invalid lat {:?}: {e}", place.lat),
    })?;
    let lng = place.lon.parse::<f64>().map_err(|e| ProviderError::Json {
        message: format!("invalid lon {:?}: {e}", place.lon),
    })?;

    Ok(Coordinate::new(lat, lng))
}

impl GeocodeProvider for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, Coordinate> {
        self.search(address).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.timeout_secs, 15);
        assert!(config.user_agent.starts_with("nav-server/"));
    }

    #[test]
    fn config_with_base_url() {
        let config = NominatimConfig::new()
            .with_base_url("http://localhost:8080")
            .with_timeout(3);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
    }

    #[tokio::test]
    async fn queued_lookup_gives_up_after_timeout() {
        let config = NominatimConfig::new()
            .with_base_url("http://0.0.0.0:1")
            .with_timeout(1);
        let client = NominatimClient::new(config).unwrap();

        // Occupy the only slot.
        let _held = client.semaphore.acquire().await.unwrap();

        let err = client.search("1 Main St").await.unwrap_err();
        assert!(matches!(err, ProviderError::QueueTimeout));
    }

    #[test]
    fn parse_first_hit() {
        let body = r#"[
            {"place_id": 1, "lat": "37.4852", "lon": "-122.2364", "display_name": "Redwood City, CA"},
            {"place_id": 2, "lat": "0", "lon": "0"}
        ]"#;
        assert_eq!(parse_search(body).unwrap(), Coordinate::new(37.4852, -122.2364));
    }

    #[test]
    fn parse_empty_is_not_found() {
        assert!(parse_search("[]").unwrap_err().is_not_found());
    }

    #[test]
    fn parse_bad_coordinate() {
        let err = parse_search(r#"[{"lat": "north", "lon": "1"}]"#).unwrap_err();
        assert!(err.to_string().contains("invalid lat"));
    }
}
