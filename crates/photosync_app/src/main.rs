mod cli;
mod commands;
mod config;
mod logging;
mod runner;
mod traffic;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, CliCommand};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    logging::initialize(
        config.log,
        photosync_logging::level_for_verbosity(cli.verbose),
    );

    match cli.command {
        CliCommand::Replay { files, sync, watch } => {
            commands::run_replay(&config, &files, sync, watch)
        }
        CliCommand::Status { watch } => commands::run_status(&config, watch),
    }
}
