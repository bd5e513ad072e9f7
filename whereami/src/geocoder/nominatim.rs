//! Nominatim reverse geocoder.
//!
//! Queries `GET {url}/reverse?format=jsonv2&lat=..&lon=..&addressdetails=1`
//! and converts the single result into a [`Placemark`]. Nominatim reports
//! "nothing here" (open sea, unmapped areas) as a JSON body with an `error`
//! field and HTTP 200, which maps to an empty result.

use serde::Deserialize;

use super::config::GeocoderConfig;
use super::error::GeocodeError;
use super::{Placemark, ReverseGeocoder};
use crate::coord::Coordinate;

/// Top-level `jsonv2` reverse response.
///
/// We only deserialize what a placemark needs; other fields are ignored.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    region: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

/// Reverse geocoder backed by a Nominatim-compatible service.
///
/// Uses a reusable `reqwest::Client` with connection pooling and timeouts.
pub struct NominatimGeocoder {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder from configuration.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::HttpError(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create a geocoder against the public endpoint.
    pub fn with_defaults() -> Result<Self, GeocodeError> {
        Self::new(GeocoderConfig::default())
    }

    /// The reverse endpoint URL.
    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.config.url.trim_end_matches('/'))
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Placemark>, GeocodeError> {
        coordinate
            .validate()
            .map_err(|e| GeocodeError::InvalidCoordinate(e.to_string()))?;

        let mut request = self.http.get(self.reverse_url()).query(&[
            ("format", "jsonv2".to_string()),
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("addressdetails", "1".to_string()),
        ]);
        if let Some(language) = &self.config.language {
            request = request.header(reqwest::header::ACCEPT_LANGUAGE, language.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GeocodeError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::StatusError(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GeocodeError::HttpError(e.to_string()))?;

        let placemarks = parse_reverse_response(&bytes, coordinate)?;

        tracing::debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            found = placemarks.len(),
            "Reverse geocoding completed"
        );

        Ok(placemarks)
    }
}

/// Parse a `jsonv2` reverse body into placemarks.
///
/// `queried` is used when the response omits its own coordinate.
fn parse_reverse_response(body: &[u8], queried: Coordinate) -> Result<Vec<Placemark>, GeocodeError> {
    let response: ReverseResponse =
        serde_json::from_slice(body).map_err(|e| GeocodeError::JsonError(e.to_string()))?;

    if let Some(error) = &response.error {
        tracing::trace!(error = %error, "Nominatim found no place");
        return Ok(Vec::new());
    }

    Ok(vec![to_placemark(response, queried)])
}

fn to_placemark(response: ReverseResponse, queried: Coordinate) -> Placemark {
    let coordinate = match (&response.lat, &response.lon) {
        (Some(lat), Some(lon)) => match (lat.parse(), lon.parse()) {
            (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon),
            _ => queried,
        },
        _ => queried,
    };

    let address = response.address.unwrap_or_default();

    let street = match (&address.house_number, &address.road) {
        (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
        (None, Some(road)) => Some(road.clone()),
        _ => None,
    };

    // Prefer the feature name, then the street, then the first display segment
    let name = non_empty(response.name).or(street).or_else(|| {
        response
            .display_name
            .as_deref()
            .and_then(|d| d.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    });

    Placemark {
        coordinate,
        name,
        thoroughfare: address.road,
        sub_thoroughfare: address.house_number,
        locality: address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.hamlet)
            .or(address.municipality),
        administrative_area: address.state.or(address.region),
        postal_code: address.postcode,
        country: address.country,
        iso_country_code: address.country_code.map(|c| c.to_uppercase()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
