//! Muzic CLI application
//!
//! Drives the login flow from a terminal and issues a handful of
//! authenticated Web API calls:
//!
//! - `muzic login`            # open the authorization page, paste the callback
//! - `muzic profile`          # show the current user's profile
//! - `muzic play <uri>`       # start playback of a URI
//! - `muzic status`           # show session state
//! - `muzic logout`           # clear the stored session

mod args;
mod commands;
mod console;

use clap::Parser;

use crate::console::CLIConsole;

pub use args::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize logging with environment-based filtering
    // Set RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::route(cli).await {
        CLIConsole::new(false).error(&e.to_string());
        std::process::exit(1);
    }
}
