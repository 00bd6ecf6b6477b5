//! CLI command implementations

mod login;
mod logout;
mod play;
mod profile;
mod status;

use std::sync::Arc;

use muzic_core::auth::{FileStorage, OAuthClient, OAuthConfig, SessionManager, TokenStore};
use muzic_core::config::AppConfig;
use muzic_core::error::MuzicResult;

use crate::args::{Cli, Commands};
use crate::console::CLIConsole;

/// Dispatch the parsed CLI to its command
pub async fn route(cli: Cli) -> MuzicResult<()> {
    let config = AppConfig::load(&cli.config_file)?;
    let console = CLIConsole::new(cli.verbose);

    match cli.command {
        Commands::Login => {
            config.validate()?;
            login::run(&config, &console).await
        }
        Commands::Profile { refresh } => {
            config.validate()?;
            profile::run(&config, &console, refresh).await
        }
        Commands::Play { uri } => {
            config.validate()?;
            play::run(&config, &console, &uri).await
        }
        Commands::Status => status::run(&config, &console).await,
        Commands::Logout => logout::run(&config, &console).await,
    }
}

/// Build the session manager every command shares: one OAuth client over
/// the configured provider and one token store.
fn build_session(config: &AppConfig) -> MuzicResult<Arc<SessionManager>> {
    let oauth = OAuthClient::new(
        OAuthConfig::new(
            config.authorize_url.clone(),
            config.token_url.clone(),
            config.client_id.clone(),
            config.redirect_uri.clone(),
        )
        .with_scopes(config.scopes.iter().cloned()),
    );

    let store = match &config.store_dir {
        Some(dir) => TokenStore::new(Box::new(FileStorage::new(dir))),
        None => TokenStore::with_default_storage()?,
    };

    Ok(Arc::new(SessionManager::new(oauth, store)))
}
