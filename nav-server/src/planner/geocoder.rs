//! Address geocoding over an ordered provider chain.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Coordinate;
use crate::providers::GeocodeProvider;

/// Resolves addresses by trying each provider in order.
///
/// The first provider to return a coordinate wins. Missing credentials,
/// provider errors, timeouts and empty results all fall through to the
/// next provider; nothing is retried. Cheap to clone.
#[derive(Clone, Default)]
pub struct Geocoder {
    providers: Vec<Arc<dyn GeocodeProvider>>,
}

impl Geocoder {
    /// Create a geocoder over `providers`, tried in the given order.
    pub fn new(providers: Vec<Arc<dyn GeocodeProvider>>) -> Self {
        Self { providers }
    }

    /// Geocode `address`, or `None` if every provider came up empty.
    pub async fn resolve(&self, address: &str) -> Option<Coordinate> {
        if address.trim().is_empty() {
            return None;
        }

        for provider in &self.providers {
            match provider.geocode(address).await {
                Ok(coordinate) => return Some(coordinate),
                Err(e) => {
                    debug!(
                        provider = provider.name(),
                        address,
                        error = %e,
                        "Geocode failed, trying next provider"
                    );
                }
            }
        }

        None
    }
}
