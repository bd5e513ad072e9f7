//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = section.get("profile") {
            config.location.profile = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "location".to_string(),
                key: "profile".to_string(),
                value: v.to_string(),
                reason: "must be one of: default, low, medium, high".to_string(),
            })?;
        }
        if let Some(v) = section.get("max_age_secs") {
            config.location.max_age_secs =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "location".to_string(),
                    key: "max_age_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("authorization") {
            config.location.authorization =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "location".to_string(),
                    key: "authorization".to_string(),
                    value: v.to_string(),
                    reason: "must be 'when_in_use' or 'always'".to_string(),
                })?;
        }
        if let Some(v) = section.get("continuous") {
            config.location.continuous =
                parse_bool(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "location".to_string(),
                    key: "continuous".to_string(),
                    value: v.to_string(),
                    reason: "must be true/false, yes/no, 1/0, or on/off".to_string(),
                })?;
        }
    }

    // [gpsd] section
    if let Some(section) = ini.section(Some("gpsd")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                config.gpsd.host = v.to_string();
            }
        }
        if let Some(v) = section.get("port") {
            config.gpsd.port = match v.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "gpsd".to_string(),
                        key: "port".to_string(),
                        value: v.to_string(),
                        reason: "must be a port number (1-65535)".to_string(),
                    });
                }
            };
        }
        if let Some(v) = section.get("connect_timeout_secs") {
            config.gpsd.connect_timeout_secs =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "gpsd".to_string(),
                    key: "connect_timeout_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
    }

    // [geocoder] section
    if let Some(section) = ini.section(Some("geocoder")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(ConfigFileError::InvalidValue {
                    section: "geocoder".to_string(),
                    key: "url".to_string(),
                    value: v.to_string(),
                    reason: "must be a URL starting with 'http://' or 'https://'".to_string(),
                });
            }
            config.geocoder.url = v.to_string();
        }
        if let Some(v) = section.get("user_agent") {
            config.geocoder.user_agent = optional_string(v);
        }
        if let Some(v) = section.get("timeout_secs") {
            config.geocoder.timeout_secs =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "geocoder".to_string(),
                    key: "timeout_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("language") {
            config.geocoder.language = optional_string(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

/// Parse a strictly positive integer.
pub(super) fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Parse the boolean spellings accepted in config files.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Convert empty string to None, non-empty to Some.
pub(super) fn optional_string(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::location::{AuthorizationMode, PrecisionProfile};

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_is_default() {
        let config = parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.location.max_age_secs, DEFAULT_MAX_AGE_SECS);
    }

    #[test]
    fn test_parse_location_section() {
        let config = parse(
            "[location]\nprofile = HIGH\nmax_age_secs = 15\nauthorization = always\ncontinuous = yes\n",
        )
        .unwrap();

        assert_eq!(config.location.profile, PrecisionProfile::High);
        assert_eq!(config.location.max_age_secs, 15);
        assert_eq!(config.location.authorization, AuthorizationMode::Always);
        assert!(config.location.continuous);
    }

    #[test]
    fn test_parse_gpsd_and_geocoder() {
        let config = parse(
            "[gpsd]\nhost = gps.local\nport = 3000\n\n[geocoder]\nurl = http://localhost:8080\nuser_agent = test-agent\nlanguage = fr\ntimeout_secs = 3\n",
        )
        .unwrap();

        assert_eq!(config.gpsd.host, "gps.local");
        assert_eq!(config.gpsd.port, 3000);
        assert_eq!(config.geocoder.url, "http://localhost:8080");
        assert_eq!(config.geocoder.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(config.geocoder.language.as_deref(), Some("fr"));
        assert_eq!(config.geocoder.timeout_secs, 3);
    }

    #[test]
    fn test_empty_optional_values_are_none() {
        let config = parse("[geocoder]\nuser_agent =\nlanguage =\n").unwrap();
        assert!(config.geocoder.user_agent.is_none());
        assert!(config.geocoder.language.is_none());
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let err = parse("[location]\nprofile = extreme\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section, key, value, ..
            } => {
                assert_eq!(section, "location");
                assert_eq!(key, "profile");
                assert_eq!(value, "extreme");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(parse("[location]\nmax_age_secs = 0\n").is_err());
        assert!(parse("[location]\nmax_age_secs = soon\n").is_err());
        assert!(parse("[gpsd]\nport = 0\n").is_err());
        assert!(parse("[gpsd]\nport = 70000\n").is_err());
        assert!(parse("[location]\ncontinuous = maybe\n").is_err());
        assert!(parse("[geocoder]\nurl = nominatim.local\n").is_err());
    }

    #[test]
    fn test_parse_bool_spellings() {
        for v in ["true", "YES", "1", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["false", "no", "0", "Off"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool("perhaps"), None);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/logs");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("logs"));
        }
        assert_eq!(expand_tilde("/var/log"), PathBuf::from("/var/log"));
    }
}
