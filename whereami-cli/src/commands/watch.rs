//! Watch command - stream accepted fixes until a count is reached or Ctrl-C.

use std::time::Duration;

use tracing::{info, warn};
use whereami::location::{LocationResponse, LocationUpdates, ProviderError, UpdateMode};

use crate::error::CliError;
use crate::runner::{format_fix, CliRunner, CliSession};

/// Pause before asking gpsd again after the connection dropped.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Run the watch command.
pub async fn run(runner: &CliRunner, count: Option<usize>) -> Result<(), CliError> {
    runner.log_startup("watch");
    let session = runner.create_session()?;
    runner.authorize(&session).await?;

    let updates = session.start_updates(UpdateMode::Continuous);
    follow(runner, &session, updates, UpdateMode::Continuous, count).await
}

/// Print fixes from `updates` until `count` fixes, Ctrl-C, or the end of the
/// sequence.
///
/// Provider errors are reported on stderr and watching continues. When gpsd
/// drops the connection, authorization is requested again after a short
/// pause and updates restart in `mode`.
pub async fn follow(
    runner: &CliRunner,
    session: &CliSession,
    mut updates: LocationUpdates,
    mode: UpdateMode,
    count: Option<usize>,
) -> Result<(), CliError> {
    let mut received = 0usize;

    let result = loop {
        if count.is_some_and(|limit| received >= limit) {
            break Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break Ok(());
            }
            response = updates.next() => match response {
                Some(LocationResponse::Updated(fix)) => {
                    received += 1;
                    println!("{}", format_fix(&fix));
                }
                Some(LocationResponse::Failed(ProviderError::Disconnected(reason))) => {
                    warn!(reason = %reason, "gpsd connection lost while watching");
                    eprintln!("Warning: gpsd connection lost ({}), reconnecting", reason);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    if let Err(e) = runner.authorize(session).await {
                        break Err(e);
                    }
                    updates = session.start_updates(mode);
                }
                Some(LocationResponse::Failed(e)) => {
                    warn!(error = %e, "Provider error while watching");
                    eprintln!("Warning: {}", e);
                }
                Some(LocationResponse::Unauthorized) => break Err(CliError::Unauthorized),
                None => break Ok(()),
            },
        }
    };

    session.stop_updates();
    info!(received, "Stopped watching");
    result
}
