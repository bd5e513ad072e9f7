//! gpsd JSON protocol parsing.
//!
//! gpsd speaks newline-delimited JSON objects tagged by a `class` field. Only
//! three classes matter here:
//!
//! - **VERSION** - banner sent on connect
//! - **TPV** - time/position/velocity report
//! - **ERROR** - daemon-side failure
//!
//! Everything else (`DEVICES`, `WATCH`, `SKY`, ...) is ignored.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::trace;

use super::error::GpsdError;
use crate::coord::Coordinate;
use crate::location::LocationFix;

/// Command enabling JSON watch mode.
pub const WATCH_ENABLE: &str = "?WATCH={\"enable\":true,\"json\":true};\n";

/// Command disabling watch mode.
pub const WATCH_DISABLE: &str = "?WATCH={\"enable\":false};\n";

/// Minimum TPV mode carrying a horizontal position (2D fix).
const MODE_2D: u8 = 2;

/// A decoded gpsd report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "class")]
pub enum Report {
    #[serde(rename = "VERSION")]
    Version(VersionReport),

    #[serde(rename = "TPV")]
    Tpv(TpvReport),

    #[serde(rename = "ERROR")]
    Error(ErrorReport),

    #[serde(other)]
    Other,
}

/// Daemon banner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VersionReport {
    #[serde(default)]
    pub release: String,

    #[serde(default)]
    pub proto_major: u32,

    #[serde(default)]
    pub proto_minor: u32,
}

/// Daemon-side error message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorReport {
    #[serde(default)]
    pub message: String,
}

/// Time/position/velocity report.
///
/// All fields are optional on the wire; `mode` 0/1 means no fix.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TpvReport {
    #[serde(default)]
    pub mode: u8,

    /// RFC 3339 measurement time.
    pub time: Option<String>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Legacy altitude field (gpsd < 3.20).
    pub alt: Option<f64>,

    #[serde(rename = "altMSL")]
    pub alt_msl: Option<f64>,

    /// Estimated horizontal position error, meters.
    pub eph: Option<f64>,

    /// Estimated longitude error, meters.
    pub epx: Option<f64>,

    /// Estimated latitude error, meters.
    pub epy: Option<f64>,

    /// Speed over ground, m/s.
    pub speed: Option<f64>,

    /// Course over ground, degrees from true north.
    pub track: Option<f64>,
}

impl TpvReport {
    /// Horizontal accuracy in meters.
    ///
    /// Uses `eph` when present, else the larger of `epx`/`epy`. Infinity when
    /// the receiver reports no error estimate at all.
    pub fn horizontal_accuracy(&self) -> f64 {
        if let Some(eph) = self.eph {
            return eph;
        }
        match (self.epx, self.epy) {
            (Some(x), Some(y)) => x.max(y),
            (Some(e), None) | (None, Some(e)) => e,
            (None, None) => f64::INFINITY,
        }
    }

    /// Age of the measurement relative to `now_utc`.
    ///
    /// Reports without a time are treated as just measured. Timestamps in the
    /// future (clock skew) count as age zero.
    pub fn age(&self, now_utc: chrono::DateTime<chrono::Utc>) -> Result<Duration, GpsdError> {
        let Some(time) = self.time.as_deref() else {
            return Ok(Duration::ZERO);
        };

        let measured = chrono::DateTime::parse_from_rfc3339(time)
            .map_err(|e| GpsdError::JsonError(format!("bad TPV time {:?}: {}", time, e)))?;

        Ok(now_utc
            .signed_duration_since(measured)
            .to_std()
            .unwrap_or(Duration::ZERO))
    }

    /// Convert to a [`LocationFix`].
    ///
    /// Returns `None` for reports without a 2D fix or position, or with an
    /// unparseable time. The fix timestamp is an `Instant` offset back from
    /// `now` by the measurement age, so freshness checks see the real age.
    pub fn to_fix(&self, now_utc: chrono::DateTime<chrono::Utc>, now: Instant) -> Option<LocationFix> {
        if self.mode < MODE_2D {
            trace!(mode = self.mode, "TPV without position fix");
            return None;
        }

        let (lat, lon) = (self.lat?, self.lon?);

        let age = match self.age(now_utc) {
            Ok(age) => age,
            Err(e) => {
                trace!(error = %e, "Skipping TPV");
                return None;
            }
        };
        let Some(timestamp) = now.checked_sub(age) else {
            trace!(age_secs = age.as_secs(), "TPV older than the monotonic clock");
            return None;
        };

        let mut fix = LocationFix::with_timestamp(
            Coordinate::new(lat, lon),
            self.horizontal_accuracy(),
            timestamp,
        );
        if let Some(altitude) = self.alt_msl.or(self.alt) {
            fix = fix.with_altitude(altitude);
        }
        if let (Some(speed), Some(track)) = (self.speed, self.track) {
            fix = fix.with_motion(speed, track);
        }
        Some(fix)
    }
}

/// Parse one line from the daemon.
pub fn parse_report(line: &str) -> Result<Report, GpsdError> {
    Ok(serde_json::from_str(line.trim())?)
}
