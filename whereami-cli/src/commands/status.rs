//! Status command - report the authorization state and daemon reachability.
//!
//! gpsd has no stored permission: authorization lives only as long as the
//! session that requested it, so a fresh process always starts "not
//! determined". The daemon line comes from a separate connection that does
//! not touch the session.

use whereami::gpsd::{self, GpsdError};
use whereami::location::LocationProvider;

use crate::error::CliError;
use crate::runner::{CliRunner, CliSession};

/// Run the status command.
pub async fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("status");
    let session = runner.create_session()?;

    let gpsd_config = runner.config().gpsd_config();
    let daemon = gpsd::daemon_release(&gpsd_config).await;

    print!("{}", render(&session));
    println!(
        "gpsd daemon:          {} at {}",
        daemon_line(&daemon),
        gpsd_config.address()
    );
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn daemon_line(daemon: &Result<String, GpsdError>) -> String {
    match daemon {
        Ok(release) => format!("reachable (release {})", release),
        Err(e) => format!("unreachable ({})", e),
    }
}

fn render(session: &CliSession) -> String {
    let config = session.config();
    format!(
        "Permission requested: {}\n\
         Authorized:           {}\n\
         Status:               {}\n\
         Requested mode:       {}\n\
         Maximum fix age:      {}s\n\
         Accuracy threshold:   {}m\n",
        yes_no(session.has_permission_been_requested()),
        yes_no(session.is_authorized()),
        session.provider().authorization_status(),
        config.authorization_mode,
        config.max_age.as_secs(),
        config.precision.horizontal_accuracy,
    )
}
