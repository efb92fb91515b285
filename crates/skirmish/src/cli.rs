//! Command-line interface for skirmish.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Skirmish - a two-player duel on a 5x5 board, played through a room relay
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Two-player 5x5 duel with a WebSocket room relay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file for the chosen subcommand
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the room relay
    Relay {
        /// Host to bind to
        #[arg(long, env = "SKIRMISH_HOST")]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long, env = "SKIRMISH_PORT")]
        port: Option<u16>,
    },

    /// Play in the console against another client on the relay
    Play {
        /// Relay base URL
        #[arg(long, env = "SKIRMISH_RELAY_URL")]
        relay: Option<String>,

        /// Room to join
        #[arg(long, conflicts_with = "create")]
        room: Option<String>,

        /// Create a new room with a random id
        #[arg(long)]
        create: bool,

        /// Apply distributed moves without checking them
        #[arg(long)]
        no_verify: bool,
    },
}
