//! Error types for reverse geocoding.

use thiserror::Error;

/// Errors that can occur during a reverse geocoding lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The lookup was superseded by a newer one.
    #[error("Geocoding request cancelled")]
    Cancelled,

    /// The coordinate cannot be geocoded.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The service answered with a non-success status.
    #[error("Geocoding service returned HTTP {0}")]
    StatusError(u16),

    /// JSON deserialization failed.
    #[error("Failed to parse response: {0}")]
    JsonError(String),
}
