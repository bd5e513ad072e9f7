//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let user_agent = config.geocoder.user_agent.as_deref().unwrap_or("");
    let language = config.geocoder.language.as_deref().unwrap_or("");

    format!(
        r#"[location]
; Precision profile (distance filter / desired accuracy / accuracy threshold):
;   default - 50m / nearest ten meters / 500m
;   low     - 500m / kilometer / 2000m
;   medium  - 100m / hundred meters / 1000m
;   high    - 10m / best for navigation / 200m
profile = {}
; Fixes at least this many seconds old are ignored (default: 40)
max_age_secs = {}
; Authorization to request: when_in_use or always (always allows background updates)
authorization = {}
; Keep delivering fixes instead of stopping after the first (true/false)
continuous = {}

[gpsd]
; Host and port of the gpsd daemon
host = {}
port = {}
; Seconds allowed for connecting and receiving the VERSION banner
connect_timeout_secs = {}

[geocoder]
; Nominatim-compatible reverse geocoding service
url = {}
; User-Agent sent with each lookup (empty uses the built-in one)
; The public OpenStreetMap service requires an identifying User-Agent
user_agent = {}
; HTTP timeout in seconds
timeout_secs = {}
; Preferred language for place names, e.g. en, fr (empty uses the service default)
language = {}

[logging]
; Directory for log files
directory = {}
; Log file name (cleared at the start of each run)
file = {}
"#,
        config.location.profile,
        config.location.max_age_secs,
        config.location.authorization,
        config.location.continuous,
        config.gpsd.host,
        config.gpsd.port,
        config.gpsd.connect_timeout_secs,
        config.geocoder.url,
        user_agent,
        config.geocoder.timeout_secs,
        language,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
