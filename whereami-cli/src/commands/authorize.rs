//! Authorize command - request location access and print the outcome.

use tracing::info;
use whereami::location::LocationProvider;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the authorize command.
///
/// Exits with an error when access is refused so scripts can test the result.
pub async fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("authorize");
    let session = runner.create_session()?;

    let granted = session.request_authorization().await;
    let status = session.provider().authorization_status();
    info!(granted, status = %status, "Authorization resolved");

    if granted {
        println!("Authorized ({})", status);
        Ok(())
    } else {
        println!("Not authorized ({})", status);
        Err(CliError::Unauthorized)
    }
}
