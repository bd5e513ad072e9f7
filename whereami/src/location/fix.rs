//! Location fix - a single reported position sample.

use std::time::{Duration, Instant};

use crate::coord::Coordinate;

/// A single position sample reported by a location provider.
///
/// Fixes are immutable once received. The `timestamp` is when the provider
/// measured the position, which may be earlier than when the fix reached us;
/// consumers judge freshness from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    /// Measured position.
    pub coordinate: Coordinate,

    /// Radius of uncertainty in meters (68% confidence).
    pub horizontal_accuracy: f64,

    /// Altitude in meters above mean sea level, if reported.
    pub altitude: Option<f64>,

    /// Speed over ground in meters per second, if reported.
    pub speed: Option<f64>,

    /// Course over ground in degrees from true north, if reported.
    pub course: Option<f64>,

    /// When this position was measured.
    pub timestamp: Instant,
}

impl LocationFix {
    /// Create a fix measured just now.
    pub fn new(coordinate: Coordinate, horizontal_accuracy: f64) -> Self {
        Self::with_timestamp(coordinate, horizontal_accuracy, Instant::now())
    }

    /// Create a fix measured at a specific instant.
    pub fn with_timestamp(
        coordinate: Coordinate,
        horizontal_accuracy: f64,
        timestamp: Instant,
    ) -> Self {
        Self {
            coordinate,
            horizontal_accuracy,
            altitude: None,
            speed: None,
            course: None,
            timestamp,
        }
    }

    /// Create a fix that was measured `age` ago.
    ///
    /// Falls back to "now" if the monotonic clock cannot represent the offset.
    pub fn with_age(coordinate: Coordinate, horizontal_accuracy: f64, age: Duration) -> Self {
        let now = Instant::now();
        let timestamp = now.checked_sub(age).unwrap_or(now);
        Self::with_timestamp(coordinate, horizontal_accuracy, timestamp)
    }

    /// Attach altitude in meters.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Attach speed (m/s) and course (degrees).
    pub fn with_motion(mut self, speed: f64, course: f64) -> Self {
        self.speed = Some(speed);
        self.course = Some(course);
        self
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }

    /// Age of this fix relative to now.
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }

    /// Age of this fix relative to a reference instant.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }
}
