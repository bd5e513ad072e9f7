//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the per-section `Default`
//! implementations.

use crate::geocoder::{DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_NOMINATIM_URL};
use crate::gpsd::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};
use crate::location::{AuthorizationMode, PrecisionProfile, DEFAULT_MAX_AGE};

use super::file::config_directory;
use super::settings::*;

/// Default maximum fix age in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = DEFAULT_MAX_AGE.as_secs();

/// Default log directory name under the config directory.
pub const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "whereami.log";

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            profile: PrecisionProfile::Default,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            authorization: AuthorizationMode::WhenInUse,
            continuous: false,
        }
    }
}

impl Default for GpsdSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_GPSD_HOST.to_string(),
            port: DEFAULT_GPSD_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: None,
            timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
            language: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join(DEFAULT_LOG_DIR_NAME),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
