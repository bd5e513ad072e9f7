//! Common types and utilities shared across CLI commands.

use clap::Args;
use whereami::config::ConfigFile;
use whereami::gpsd::GpsdConfig;
use whereami::location::{AuthorizationMode, PrecisionProfile};

use crate::error::CliError;

/// Session options accepted by every location command.
///
/// Each flag overrides the matching `config.ini` setting for this run only.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// Precision profile: default, low, medium or high
    #[arg(long, global = true)]
    pub profile: Option<PrecisionProfile>,

    /// Ignore fixes at least this many seconds old
    #[arg(long, global = true, value_name = "SECS")]
    pub max_age: Option<u64>,

    /// Request "always" authorization (allows background updates)
    #[arg(long, global = true)]
    pub always: bool,

    /// gpsd address
    #[arg(long, global = true, value_name = "HOST:PORT")]
    pub gpsd: Option<String>,

    /// Nominatim-compatible reverse geocoding URL
    #[arg(long, global = true, value_name = "URL")]
    pub geocoder_url: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl SessionArgs {
    /// Overlay command-line flags onto the loaded configuration.
    ///
    /// CLI takes precedence, then config.
    pub fn apply_to(&self, config: &mut ConfigFile) -> Result<(), CliError> {
        if let Some(profile) = self.profile {
            config.location.profile = profile;
        }

        if let Some(max_age) = self.max_age {
            if max_age == 0 {
                return Err(CliError::Config(
                    "--max-age must be a positive number of seconds".to_string(),
                ));
            }
            config.location.max_age_secs = max_age;
        }

        if self.always {
            config.location.authorization = AuthorizationMode::Always;
        }

        if let Some(address) = &self.gpsd {
            let gpsd = GpsdConfig::from_address(address)?;
            config.gpsd.host = gpsd.host;
            config.gpsd.port = gpsd.port;
        }

        if let Some(url) = &self.geocoder_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "--geocoder-url must start with http:// or https:// (got '{}')",
                    url
                )));
            }
            config.geocoder.url = url.clone();
        }

        Ok(())
    }

    /// Log filter used when RUST_LOG is not set.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "whereami=debug"
        } else {
            "warn"
        }
    }
}
