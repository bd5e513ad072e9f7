//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use whereami::config::{ConfigFileError, ConfigKeyError};
use whereami::geocoder::GeocodeError;
use whereami::gpsd::GpsdError;
use whereami::location::{PlaceError, ProviderError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to read or write config.ini
    ConfigFile(ConfigFileError),
    /// Invalid gpsd settings
    Gpsd(GpsdError),
    /// Failed to create the geocoder
    Geocoder(GeocodeError),
    /// Location access was refused
    Unauthorized,
    /// No fix could be obtained
    Location(ProviderError),
    /// Place lookup failed
    Place(PlaceError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Unauthorized => {
                eprintln!();
                eprintln!("Location access is granted when gpsd is reachable. Check that:");
                eprintln!("  1. gpsd is running: systemctl status gpsd");
                eprintln!("  2. The address is right: whereami config get gpsd.host");
                eprintln!("  3. A GPS device is attached: gpsctl");
            }
            CliError::Location(ProviderError::Disconnected(_)) => {
                eprintln!();
                eprintln!("The connection to gpsd was lost before a fix arrived.");
            }
            CliError::Location(ProviderError::LocationUnknown) => {
                eprintln!();
                eprintln!("No usable fix yet. Try again outdoors or with --max-age raised.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration file error: {}", e),
            CliError::Gpsd(e) => write!(f, "Invalid gpsd settings: {}", e),
            CliError::Geocoder(e) => write!(f, "Failed to create geocoder: {}", e),
            CliError::Unauthorized => write!(f, "Location access not authorized"),
            CliError::Location(e) => write!(f, "Failed to get location: {}", e),
            CliError::Place(e) => write!(f, "Failed to describe place: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Gpsd(e) => Some(e),
            CliError::Geocoder(e) => Some(e),
            CliError::Location(e) => Some(e),
            CliError::Place(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ConfigKeyError> for CliError {
    fn from(e: ConfigKeyError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<GpsdError> for CliError {
    fn from(e: GpsdError) -> Self {
        CliError::Gpsd(e)
    }
}

impl From<GeocodeError> for CliError {
    fn from(e: GeocodeError) -> Self {
        CliError::Geocoder(e)
    }
}
