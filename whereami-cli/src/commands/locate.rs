//! Locate command - print the current position as `lat lng acc`.
//!
//! With `location.continuous = true` the command keeps printing every
//! accepted fix, like `watch`, until Ctrl-C.

use tracing::info;

use crate::commands::watch;
use crate::error::CliError;
use crate::runner::{expect_fix, format_fix, CliRunner};

/// Run the locate command.
pub async fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("locate");
    let session = runner.create_session()?;

    let mode = session.config().update_mode;
    if !mode.is_continuous() {
        let fix = expect_fix(session.locate().await)?;
        println!("{}", format_fix(&fix));
        return Ok(());
    }

    info!("Continuous updates configured, following position");
    runner.authorize(&session).await?;
    let updates = session.start_configured_updates();
    watch::follow(runner, &session, updates, mode, None).await
}
