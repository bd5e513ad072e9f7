//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and session creation
//! to reduce duplication across command handlers.

use tokio::sync::mpsc;
use tracing::info;
use whereami::config::ConfigFile;
use whereami::geocoder::NominatimGeocoder;
use whereami::gpsd::GpsdProvider;
use whereami::location::{LocationFix, LocationResponse, LocationSession};
use whereami::logging::{init_logging, LoggingGuard};

use crate::commands::common::SessionArgs;
use crate::error::CliError;

/// Session type used by every location command.
pub type CliSession = LocationSession<GpsdProvider, NominatimGeocoder>;

/// Buffer between the gpsd connection task and the session.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration with command-line overrides applied
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new(args: &SessionArgs) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let mut config = ConfigFile::load()?;
        args.apply_to(&mut config)?;

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            args.log_level(),
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("whereami v{}", whereami::VERSION);
        info!(
            gpsd = %self.config.gpsd_config().address(),
            profile = %self.config.location.profile,
            "whereami CLI: {} command",
            command
        );
    }

    /// Connect to gpsd and build a session driven by its events.
    ///
    /// Must be called from within the Tokio runtime.
    pub fn create_session(&self) -> Result<CliSession, CliError> {
        let geocoder = NominatimGeocoder::new(self.config.geocoder_config())?;

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let provider = GpsdProvider::spawn(self.config.gpsd_config(), events_tx);

        let session =
            LocationSession::with_config(provider, geocoder, self.config.session_config());
        session.attach(events_rx);

        info!("Session created");
        Ok(session)
    }

    /// Request authorization, failing with [`CliError::Unauthorized`] if refused.
    pub async fn authorize(&self, session: &CliSession) -> Result<(), CliError> {
        if session.request_authorization().await {
            Ok(())
        } else {
            Err(CliError::Unauthorized)
        }
    }
}

/// Turn a location response into the accepted fix or a CLI error.
pub fn expect_fix(response: LocationResponse) -> Result<LocationFix, CliError> {
    match response {
        LocationResponse::Updated(fix) => Ok(fix),
        LocationResponse::Failed(e) => Err(CliError::Location(e)),
        LocationResponse::Unauthorized => Err(CliError::Unauthorized),
    }
}

/// Format a fix as `lat lng acc` for scripting.
pub fn format_fix(fix: &LocationFix) -> String {
    format!(
        "{:.6} {:.6} {:.1}",
        fix.latitude(),
        fix.longitude(),
        fix.horizontal_accuracy
    )
}
