//! Configuration file handling for ~/.whereami/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use super::settings::*;

use crate::geocoder::{default_user_agent, GeocoderConfig};
use crate::gpsd::GpsdConfig;
use crate::location::{SessionConfig, UpdateMode};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.whereami/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.whereami/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
        }
        Ok(path)
    }

    /// Session configuration derived from the `[location]` section.
    pub fn session_config(&self) -> SessionConfig {
        let location = &self.location;
        SessionConfig::default()
            .with_profile(&location.profile)
            .with_max_age(Duration::from_secs(location.max_age_secs))
            .with_authorization_mode(location.authorization)
            .with_update_mode(UpdateMode::from_continuous(location.continuous))
    }

    /// gpsd connection configuration from the `[gpsd]` section.
    pub fn gpsd_config(&self) -> GpsdConfig {
        GpsdConfig {
            host: self.gpsd.host.clone(),
            port: self.gpsd.port,
            connect_timeout: Duration::from_secs(self.gpsd.connect_timeout_secs),
        }
    }

    /// Geocoder configuration from the `[geocoder]` section.
    pub fn geocoder_config(&self) -> GeocoderConfig {
        GeocoderConfig {
            url: self.geocoder.url.clone(),
            user_agent: self
                .geocoder
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
            timeout: Duration::from_secs(self.geocoder.timeout_secs),
            language: self.geocoder.language.clone(),
        }
    }
}

/// Get the path to the config directory (~/.whereami).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".whereami")
}

/// Get the path to the config file (~/.whereami/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
