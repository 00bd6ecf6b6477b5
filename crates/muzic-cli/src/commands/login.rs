//! Interactive login through the provider's authorization page

use std::sync::Arc;

use dialoguer::Input;
use muzic_core::api::WebApi;
use muzic_core::config::AppConfig;
use muzic_core::error::{MuzicError, MuzicResult};

use crate::console::CLIConsole;

pub async fn run(config: &AppConfig, console: &CLIConsole) -> MuzicResult<()> {
    let session = super::build_session(config)?;

    let url = session.generate_auth_url().await?;

    console.print_header("Login");
    println!("{url}");
    println!();

    if open::that(&url).is_ok() {
        console.info("Opened the authorization page in your browser");
    } else {
        console.warn("Could not open a browser; visit the URL above manually");
    }

    let callback: String = Input::new()
        .with_prompt("Paste the callback URI you were redirected to")
        .interact_text()
        .map_err(|e| MuzicError::Io(e.to_string()))?;

    session.complete_authorization(callback.trim()).await?;
    console.success("Logged in");

    // Greet with the freshly-fetched profile; a failure here does not undo
    // the login
    let api = WebApi::new(config.api_base_url.clone(), Arc::clone(&session));
    match api.current_user_profile().await {
        Ok(profile) => {
            let name = profile.display_name.unwrap_or(profile.id);
            console.success(&format!("Welcome, {name}"));
        }
        Err(e) => console.warn(&format!("Could not fetch your profile: {e}")),
    }

    Ok(())
}
