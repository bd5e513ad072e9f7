//! Outcome types returned to callers.

use thiserror::Error;

use super::error::ProviderError;
use super::fix::LocationFix;
use crate::geocoder::{GeocodeError, Placemark};

/// Outcome of a location request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationResponse {
    /// A fix passed the freshness/accuracy filter.
    Updated(LocationFix),
    /// The provider failed to retrieve the location.
    Failed(ProviderError),
    /// The user or system refused location access.
    Unauthorized,
}

impl LocationResponse {
    /// The fix, if this is a successful update.
    pub fn fix(&self) -> Option<&LocationFix> {
        match self {
            Self::Updated(fix) => Some(fix),
            _ => None,
        }
    }
}

/// Why a place lookup failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceError {
    /// No fix could be obtained.
    #[error(transparent)]
    Location(#[from] ProviderError),

    /// Reverse geocoding failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Outcome of a place lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceResponse {
    /// Reverse geocoding found the current place.
    Found(Placemark),
    /// Reverse geocoding succeeded but returned nothing.
    NotFound,
    /// Locating or geocoding failed.
    Failure(PlaceError),
    /// The user or system refused location access.
    Unauthorized,
}
