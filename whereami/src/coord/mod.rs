//! Geographic coordinates
//!
//! Provides the [`Coordinate`] type shared by fixes, providers and geocoders,
//! range validation, and great-circle distance used by the distance filter.

mod types;


pub use types::{Coordinate, CoordError, EARTH_RADIUS_M, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Parses a `"lat,lon"` pair into a coordinate.
///
/// Whitespace around either component is ignored. The result is validated.
pub fn parse_coordinate(value: &str) -> Result<Coordinate, CoordError> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or(CoordError::InvalidLatitude(f64::NAN))?;

    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| CoordError::InvalidLatitude(f64::NAN))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| CoordError::InvalidLongitude(f64::NAN))?;

    let coordinate = Coordinate::new(latitude, longitude);
    coordinate.validate()?;
    Ok(coordinate)
}
