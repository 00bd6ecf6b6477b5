//! Show the session state

use muzic_core::config::AppConfig;
use muzic_core::error::MuzicResult;

use crate::console::CLIConsole;

pub async fn run(config: &AppConfig, console: &CLIConsole) -> MuzicResult<()> {
    let session = super::build_session(config)?;
    let snapshot = session.auth_session().await?;

    console.print_header("Session");
    if snapshot.is_authenticated {
        console.success("Authenticated");
    } else if snapshot.code_verifier.is_some() {
        console.warn("Login in progress; complete it with `muzic login`");
    } else {
        console.warn("Not authenticated; run `muzic login`");
    }

    if let Some(profile) = snapshot.user_profile {
        let name = profile.display_name.unwrap_or(profile.id);
        println!("account: {name}");
    }

    Ok(())
}
