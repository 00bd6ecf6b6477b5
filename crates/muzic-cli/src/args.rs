//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "muzic_config.toml";

#[derive(Parser)]
#[command(name = "muzic")]
#[command(about = "Muzic - stream music from your terminal")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in through the provider's authorization page
    Login,

    /// Show the current user's profile
    Profile {
        /// Fetch a fresh profile instead of using the cached snapshot
        #[arg(long)]
        refresh: bool,
    },

    /// Start playback of a track, album or playlist URI
    Play {
        /// Provider URI, e.g. spotify:track:4uLU6hMCjMI75M1A2tKUQC
        uri: String,
    },

    /// Show the session state
    Status,

    /// Clear the stored session
    Logout,
}
