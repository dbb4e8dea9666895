use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// Capture media listings from recorded page traffic and hand them to the
/// local transfer agent.
#[derive(Debug, Parser)]
#[command(name = "photosync")]
#[command(about = "Capture media from recorded traffic and sync it to the local agent", long_about = None)]
pub struct Cli {
    /// Path to the RON config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE, value_name = "FILE")]
    pub config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run capture files (HAR or JSON Lines) through the capture pipeline.
    Replay {
        /// Capture files, processed in order as one session.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Submit the pending queue to the agent afterwards.
        #[arg(long)]
        sync: bool,

        /// Follow agent progress for up to N seconds once the files are replayed.
        #[arg(long, value_name = "SECS", default_value = "0")]
        watch: u64,
    },

    /// Follow the agent's progress.
    Status {
        /// Stop after N seconds even if the agent has not finished.
        #[arg(long, value_name = "SECS", default_value = "30")]
        watch: u64,
    },
}
