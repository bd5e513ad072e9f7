//! Configuration for reverse geocoding.

use std::time::Duration;

/// Public OpenStreetMap Nominatim endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default HTTP timeout for a lookup.
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Nominatim geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service.
    pub url: String,

    /// User-Agent header; the public service rejects anonymous clients.
    pub user_agent: String,

    /// HTTP timeout per lookup.
    pub timeout: Duration,

    /// Preferred language for place names (`Accept-Language`).
    pub language: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS),
            language: None,
        }
    }
}

/// User-Agent identifying this library version.
pub fn default_user_agent() -> String {
    format!("whereami/{}", crate::VERSION)
}
