//! Application state for the web layer.

use std::sync::Arc;

use tracing::info;

use crate::config::ServiceConfig;
use crate::planner::{Geocoder, PlannerConfig, RoutePlanner};
use crate::providers::{
    CachedGeocodeProvider, GeocodeCache, GeocodeProvider, GoogleMapsClient, NominatimClient,
    ProviderError, StubProvider,
};

/// Where providers come from.
#[derive(Clone)]
enum Providers {
    /// Google first, optionally Nominatim as a geocoding fallback.
    Live {
        google: GoogleMapsClient,
        google_cache: GeocodeCache,
        fallback: Option<Arc<dyn GeocodeProvider>>,
    },

    /// Everything served from a fixture.
    Stub(Arc<StubProvider>),
}

/// Shared application state.
///
/// Long-lived HTTP clients and caches live here; a [`RoutePlanner`] is
/// assembled per request so a caller-supplied API key can be swapped in.
#[derive(Clone)]
pub struct AppState {
    providers: Providers,
    config: Arc<PlannerConfig>,
}

impl AppState {
    /// Build state from service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ProviderError> {
        if let Some(path) = &config.stub_data {
            info!(path = %path.display(), "Serving providers from stub data");
            let stub = StubProvider::from_json_file(path)?;
            return Ok(Self::with_stub(Arc::new(stub), PlannerConfig::default()));
        }

        let google = GoogleMapsClient::new(config.google())?;
        if !google.is_configured() {
            info!("GOOGLE_MAPS_API_KEY not set; Google providers disabled unless a request supplies a key");
        }

        let fallback: Option<Arc<dyn GeocodeProvider>> = if config.fallback_geocoder {
            let nominatim = NominatimClient::new(config.nominatim())?;
            let cache = GeocodeCache::new(&config.geocode_cache);
            Some(Arc::new(CachedGeocodeProvider::new(nominatim, cache)))
        } else {
            None
        };

        Ok(Self {
            providers: Providers::Live {
                google,
                google_cache: GeocodeCache::new(&config.geocode_cache),
                fallback,
            },
            config: Arc::new(PlannerConfig::default()),
        })
    }

    /// State backed entirely by a stub provider.
    pub fn with_stub(stub: Arc<StubProvider>, config: PlannerConfig) -> Self {
        Self {
            providers: Providers::Stub(stub),
            config: Arc::new(config),
        }
    }

    /// Assemble a planner, using `api_key` in place of the configured
    /// Google key when given.
    pub fn planner(&self, api_key: Option<&str>) -> RoutePlanner {
        let config = self.config.as_ref().clone();

        match &self.providers {
            Providers::Stub(stub) => RoutePlanner::new(
                Geocoder::new(vec![stub.clone() as Arc<dyn GeocodeProvider>]),
                stub.clone(),
                stub.clone(),
                config,
            ),
            Providers::Live {
                google,
                google_cache,
                fallback,
            } => {
                let google = match api_key {
                    Some(key) => google.with_api_key(key),
                    None => google.clone(),
                };

                let mut chain: Vec<Arc<dyn GeocodeProvider>> = vec![Arc::new(
                    CachedGeocodeProvider::new(google.clone(), google_cache.clone()),
                )];
                chain.extend(fallback.iter().cloned());

                let google = Arc::new(google);
                RoutePlanner::new(Geocoder::new(chain), google.clone(), google, config)
            }
        }
    }
}
