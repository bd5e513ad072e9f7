//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::file::ConfigFile;
use super::parser::{expand_tilde, optional_string, parse_bool, parse_positive};
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Location settings
    LocationProfile,
    LocationMaxAgeSecs,
    LocationAuthorization,
    LocationContinuous,

    // gpsd settings
    GpsdHost,
    GpsdPort,
    GpsdConnectTimeoutSecs,

    // Geocoder settings
    GeocoderUrl,
    GeocoderUserAgent,
    GeocoderTimeoutSecs,
    GeocoderLanguage,

    // Logging settings
    LoggingDirectory,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "location.profile").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::LocationProfile => "location.profile",
            ConfigKey::LocationMaxAgeSecs => "location.max_age_secs",
            ConfigKey::LocationAuthorization => "location.authorization",
            ConfigKey::LocationContinuous => "location.continuous",
            ConfigKey::GpsdHost => "gpsd.host",
            ConfigKey::GpsdPort => "gpsd.port",
            ConfigKey::GpsdConnectTimeoutSecs => "gpsd.connect_timeout_secs",
            ConfigKey::GeocoderUrl => "geocoder.url",
            ConfigKey::GeocoderUserAgent => "geocoder.user_agent",
            ConfigKey::GeocoderTimeoutSecs => "geocoder.timeout_secs",
            ConfigKey::GeocoderLanguage => "geocoder.language",
            ConfigKey::LoggingDirectory => "logging.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "location").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "profile").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LocationProfile => config.location.profile.to_string(),
            ConfigKey::LocationMaxAgeSecs => config.location.max_age_secs.to_string(),
            ConfigKey::LocationAuthorization => config.location.authorization.to_string(),
            ConfigKey::LocationContinuous => config.location.continuous.to_string(),
            ConfigKey::GpsdHost => config.gpsd.host.clone(),
            ConfigKey::GpsdPort => config.gpsd.port.to_string(),
            ConfigKey::GpsdConnectTimeoutSecs => config.gpsd.connect_timeout_secs.to_string(),
            ConfigKey::GeocoderUrl => config.geocoder.url.clone(),
            ConfigKey::GeocoderUserAgent => {
                config.geocoder.user_agent.clone().unwrap_or_default()
            }
            ConfigKey::GeocoderTimeoutSecs => config.geocoder.timeout_secs.to_string(),
            ConfigKey::GeocoderLanguage => config.geocoder.language.clone().unwrap_or_default(),
            ConfigKey::LoggingDirectory => path_to_string(&config.logging.directory),
            ConfigKey::LoggingFile => config.logging.file.clone(),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before
    /// setting; the config is left untouched on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .and_then(|()| self.apply(config, value))
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Parse and store an already validated value.
    fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            ConfigKey::LocationProfile => config.location.profile = value.parse()?,
            ConfigKey::LocationMaxAgeSecs => {
                config.location.max_age_secs = parse_positive(value).ok_or(POSITIVE)?
            }
            ConfigKey::LocationAuthorization => config.location.authorization = value.parse()?,
            ConfigKey::LocationContinuous => {
                config.location.continuous = parse_bool(value).ok_or(BOOLEAN)?
            }
            ConfigKey::GpsdHost => config.gpsd.host = value.to_string(),
            ConfigKey::GpsdPort => {
                config.gpsd.port = value.parse().map_err(|_| PORT.to_string())?
            }
            ConfigKey::GpsdConnectTimeoutSecs => {
                config.gpsd.connect_timeout_secs = parse_positive(value).ok_or(POSITIVE)?
            }
            ConfigKey::GeocoderUrl => config.geocoder.url = value.to_string(),
            ConfigKey::GeocoderUserAgent => config.geocoder.user_agent = optional_string(value),
            ConfigKey::GeocoderTimeoutSecs => {
                config.geocoder.timeout_secs = parse_positive(value).ok_or(POSITIVE)?
            }
            ConfigKey::GeocoderLanguage => config.geocoder.language = optional_string(value),
            ConfigKey::LoggingDirectory => config.logging.directory = expand_tilde(value),
            ConfigKey::LoggingFile => config.logging.file = value.to_string(),
        }
        Ok(())
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::LocationProfile => {
                Box::new(OneOfSpec::new(&["default", "low", "medium", "high"]))
            }
            ConfigKey::LocationMaxAgeSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::LocationAuthorization => {
                Box::new(OneOfSpec::new(&["when_in_use", "in_use", "always"]))
            }
            ConfigKey::LocationContinuous => Box::new(BooleanSpec),
            ConfigKey::GpsdHost => Box::new(NonEmptySpec),
            ConfigKey::GpsdPort => Box::new(PortSpec),
            ConfigKey::GpsdConnectTimeoutSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::GeocoderUrl => Box::new(UrlSpec),
            ConfigKey::GeocoderUserAgent => Box::new(AnyStringSpec),
            ConfigKey::GeocoderTimeoutSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::GeocoderLanguage => Box::new(AnyStringSpec),
            ConfigKey::LoggingDirectory => Box::new(NonEmptySpec),
            ConfigKey::LoggingFile => Box::new(NonEmptySpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LocationProfile,
            ConfigKey::LocationMaxAgeSecs,
            ConfigKey::LocationAuthorization,
            ConfigKey::LocationContinuous,
            ConfigKey::GpsdHost,
            ConfigKey::GpsdPort,
            ConfigKey::GpsdConnectTimeoutSecs,
            ConfigKey::GeocoderUrl,
            ConfigKey::GeocoderUserAgent,
            ConfigKey::GeocoderTimeoutSecs,
            ConfigKey::GeocoderLanguage,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingFile,
        ]
    }
}

const POSITIVE: &str = "must be a positive integer";
const BOOLEAN: &str = "must be true/false, yes/no, 1/0, or on/off";
const PORT: &str = "must be a port number (1-65535)";

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification that accepts any string value.
struct AnyStringSpec;

impl ValueSpecification for AnyStringSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Specification that requires the value to be one of a set of options.
struct OneOfSpec {
    options: &'static [&'static str],
}

impl OneOfSpec {
    fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl ValueSpecification for OneOfSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.trim().to_lowercase();
        if self.options.iter().any(|opt| *opt == lower) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", self.options.join(", ")))
        }
    }
}

/// Specification for strictly positive integer values.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_positive(value).map(|_| ()).ok_or_else(|| POSITIVE.to_string())
    }
}

/// Specification for TCP port numbers.
struct PortSpec;

impl ValueSpecification for PortSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(()),
            _ => Err(PORT.to_string()),
        }
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_bool(value).map(|_| ()).ok_or_else(|| BOOLEAN.to_string())
    }
}

/// Specification for non-empty values (hosts, paths, file names).
struct NonEmptySpec;

impl ValueSpecification for NonEmptySpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Specification for URL values.
struct UrlSpec;

impl ValueSpecification for UrlSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(())
        } else {
            Err("must be a URL starting with 'http://' or 'https://'".to_string())
        }
    }
}
