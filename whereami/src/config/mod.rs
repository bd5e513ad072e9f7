//! Configuration file support for whereami.
//!
//! User settings live in `~/.whereami/config.ini`:
//!
//! ```ini
//! [location]
//! profile = default
//! max_age_secs = 40
//! authorization = when_in_use
//! continuous = false
//!
//! [gpsd]
//! host = 127.0.0.1
//! port = 2947
//!
//! [geocoder]
//! url = https://nominatim.openstreetmap.org
//!
//! [logging]
//! directory = ~/.whereami/logs
//! file = whereami.log
//! ```
//!
//! # Example
//!
//! ```ignore
//! use whereami::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::load()?;
//! ConfigKey::LocationProfile.set(&mut config, "high")?;
//! config.save()?;
//!
//! let session_config = config.session_config();
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::{DEFAULT_LOG_DIR_NAME, DEFAULT_LOG_FILE, DEFAULT_MAX_AGE_SECS};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    ConfigFile, GeocoderSettings, GpsdSettings, LocationSettings, LoggingSettings,
};
