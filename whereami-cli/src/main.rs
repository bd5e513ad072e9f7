//! whereami - command-line front end for the location session.
//!
//! Location commands talk to gpsd and, for `describe`, a Nominatim-compatible
//! reverse geocoder. Settings come from `~/.whereami/config.ini`; the global
//! flags override them for a single run.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::SessionArgs;
use commands::config::ConfigCommands;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "whereami")]
#[command(version = whereami::VERSION)]
#[command(about = "Find out where you are from gpsd fixes", long_about = None)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show authorization state and whether gpsd is reachable
    ///
    /// Authorization is held per process, so a fresh run always reports
    /// "not determined"; the gpsd line checks the daemon without authorizing.
    Status,

    /// Request location access and print the result
    Authorize,

    /// Print one fresh, accurate fix as "lat lng accuracy"
    Locate,

    /// Print fixes continuously until Ctrl-C
    Watch {
        /// Stop after this many fixes
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Describe the current place using reverse geocoding
    Describe,

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let runner = match cli.command {
        // Config commands work on the file directly and skip logging setup
        Commands::Config { command } => return commands::config::run(command),
        _ => CliRunner::new(&cli.session)?,
    };

    match cli.command {
        Commands::Status => commands::status::run(&runner).await,
        Commands::Authorize => commands::authorize::run(&runner).await,
        Commands::Locate => commands::locate::run(&runner).await,
        Commands::Watch { count } => commands::watch::run(&runner, count).await,
        Commands::Describe => commands::describe::run(&runner).await,
        Commands::Config { .. } => Ok(()),
    }
}
