//! Command-line interface for tiktaktok.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tiktaktok - pairs WebSocket clients into tic-tac-toe games
#[derive(Parser, Debug)]
#[command(name = "tiktaktok")]
#[command(about = "WebSocket server pairing players into tic-tac-toe games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and validate configuration, then print it
    CheckConfig {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
