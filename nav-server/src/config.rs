//! Service configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::providers::{GeocodeCacheConfig, GoogleConfig, NominatimConfig};

/// Default listen address.
const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);

/// Default timeout for every outbound request (seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,

    /// Google Maps key. `None` leaves the primary providers unconfigured.
    pub google_api_key: Option<String>,

    pub http_timeout_secs: u64,

    /// Nominatim endpoint. `None` uses the public instance.
    pub nominatim_url: Option<String>,

    /// Whether to geocode via Nominatim when Google comes up empty.
    pub fallback_geocoder: bool,

    /// Serve every provider from this fixture file instead of the network.
    pub stub_data: Option<PathBuf>,

    pub geocode_cache: GeocodeCacheConfig,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = match get("NAV_BIND_ADDR") {
            Some(v) => v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "NAV_BIND_ADDR",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_BIND_ADDR,
        };

        let defaults = GeocodeCacheConfig::default();
        let ttl_secs = parse_u64(
            "NAV_GEOCODE_CACHE_TTL_SECS",
            get("NAV_GEOCODE_CACHE_TTL_SECS"),
            defaults.ttl.as_secs(),
        )?;
        let capacity = parse_u64(
            "NAV_GEOCODE_CACHE_CAPACITY",
            get("NAV_GEOCODE_CACHE_CAPACITY"),
            defaults.max_capacity,
        )?;

        Ok(Self {
            bind_addr,
            google_api_key: get("GOOGLE_MAPS_API_KEY"),
            http_timeout_secs: parse_u64(
                "NAV_HTTP_TIMEOUT_SECS",
                get("NAV_HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            nominatim_url: get("NAV_NOMINATIM_URL"),
            fallback_geocoder: !parse_flag(
                "NAV_DISABLE_FALLBACK_GEOCODER",
                get("NAV_DISABLE_FALLBACK_GEOCODER"),
            )?,
            stub_data: get("NAV_STUB_DATA").map(PathBuf::from),
            geocode_cache: GeocodeCacheConfig {
                ttl: Duration::from_secs(ttl_secs),
                max_capacity: capacity,
            },
        })
    }

    pub fn google(&self) -> GoogleConfig {
        GoogleConfig::new(self.google_api_key.clone()).with_timeout(self.http_timeout_secs)
    }

    pub fn nominatim(&self) -> NominatimConfig {
        let config = NominatimConfig::new().with_timeout(self.http_timeout_secs);
        match &self.nominatim_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}

fn parse_u64(name: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            name,
            value: v.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(false);
    };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: v,
            reason: "expected true or false".to_string(),
        }),
    }
}
