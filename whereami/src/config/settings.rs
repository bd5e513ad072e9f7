//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::location::{AuthorizationMode, PrecisionProfile};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// Location session settings
    pub location: LocationSettings,
    /// gpsd connection settings
    pub gpsd: GpsdSettings,
    /// Reverse geocoder settings
    pub geocoder: GeocoderSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Location session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    /// Precision profile: "default", "low", "medium", or "high"
    pub profile: PrecisionProfile,
    /// Maximum fix age in seconds
    pub max_age_secs: u64,
    /// Authorization to request: "when_in_use" or "always"
    pub authorization: AuthorizationMode,
    /// Keep delivering fixes instead of stopping after the first
    pub continuous: bool,
}

/// gpsd configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsdSettings {
    /// Host running gpsd
    pub host: String,
    /// gpsd TCP port
    pub port: u16,
    /// Connect/handshake timeout in seconds
    pub connect_timeout_secs: u64,
}

/// Reverse geocoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    /// Nominatim-compatible base URL
    pub url: String,
    /// User-Agent override (None uses the built-in one)
    pub user_agent: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Preferred language for place names
    pub language: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log directory
    pub directory: PathBuf,
    /// Log file name within the directory
    pub file: String,
}
