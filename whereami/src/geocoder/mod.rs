//! Reverse geocoding - mapping coordinates to a human-readable place.
//!
//! The [`ReverseGeocoder`] trait abstracts over geocoding services so the
//! session can describe the current place without knowing how the lookup is
//! done. [`NominatimGeocoder`] talks to a Nominatim-compatible HTTP API.
//!
//! # Architecture
//!
//! ```text
//! LocationSession::describe_place()
//!     │
//!     ├── locate() → LocationFix
//!     │
//!     └── ReverseGeocoder::reverse_geocode(coordinate)
//!             │
//!             └── NominatimGeocoder (reqwest) → Vec<Placemark>
//! ```
//!
//! Cancellation of an in-flight lookup is owned by the session: the geocoder
//! future is simply dropped.

mod config;
mod error;
mod nominatim;

pub use config::{
    default_user_agent, GeocoderConfig, DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_NOMINATIM_URL,
};
pub use error::GeocodeError;
pub use nominatim::NominatimGeocoder;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::coord::Coordinate;

/// Human-readable description of a place.
///
/// Every descriptive field is optional; services fill in what they know.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    /// Coordinate of the place (may differ slightly from the queried one).
    pub coordinate: Coordinate,
    /// Name of the place (landmark, building, or street address).
    pub name: Option<String>,
    /// Street name.
    pub thoroughfare: Option<String>,
    /// Street number.
    pub sub_thoroughfare: Option<String>,
    /// City, town or village.
    pub locality: Option<String>,
    /// State, province or region.
    pub administrative_area: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code, uppercase.
    pub iso_country_code: Option<String>,
}

impl Placemark {
    /// Create an empty placemark at a coordinate.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            name: None,
            thoroughfare: None,
            sub_thoroughfare: None,
            locality: None,
            administrative_area: None,
            postal_code: None,
            country: None,
            iso_country_code: None,
        }
    }

    /// Street address line ("5 Avenue Anatole France"), if a street is known.
    pub fn street_address(&self) -> Option<String> {
        let street = self.thoroughfare.as_deref()?;
        Some(match self.sub_thoroughfare.as_deref() {
            Some(number) => format!("{} {}", number, street),
            None => street.to_string(),
        })
    }
}

impl fmt::Display for Placemark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.name, &self.locality, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();

        if parts.is_empty() {
            write!(f, "{}", self.coordinate)
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Trait for reverse geocoding services.
///
/// Implementations return every candidate place for the coordinate, best
/// match first. An empty list means the lookup succeeded but found nothing.
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the places at a coordinate.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Vec<Placemark>, GeocodeError>> + Send;
}

// Allow Arc<G> to be used as geocoder
impl<G: ReverseGeocoder> ReverseGeocoder for Arc<G> {
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Vec<Placemark>, GeocodeError>> + Send {
        (**self).reverse_geocode(coordinate)
    }
}
