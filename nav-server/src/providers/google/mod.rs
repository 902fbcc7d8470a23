//! Google Maps provider.
//!
//! Key characteristics of the Google APIs as used here:
//! - Geocoding and Places report failures in a `status` field of a 200
//!   response (`ZERO_RESULTS`, `REQUEST_DENIED`, ...)
//! - Routes v2 is a POST with the key and a field mask in headers, and
//!   reports leg durations as protobuf strings ("1834s")
//! - A missing key is a normal state: every call fails fast with
//!   `NotConfigured` so the fallback chain can take over

mod client;
mod types;

pub use client::{GoogleConfig, GoogleMapsClient};
