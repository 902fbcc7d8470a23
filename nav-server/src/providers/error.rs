//! Provider error types.

/// Errors from an outbound geocoding, place-search or directions provider.
///
/// None of these are fatal to a route request: the pipeline components
/// log them and degrade the affected phase.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No credential or endpoint configured for this provider
    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP succeeded but the payload reported a non-OK status
    #[error("provider status {0}")]
    Status(String),

    /// Response body could not be parsed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Waited too long for a free request slot
    #[error("timed out waiting for a request slot")]
    QueueTimeout,

    /// Provider answered successfully with zero results
    #[error("no results")]
    NotFound,
}

impl ProviderError {
    /// Whether the provider answered but had nothing to offer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }

    pub(crate) fn json(err: serde_json::Error) -> Self {
        ProviderError::Json {
            message: err.to_string(),
        }
    }
}
