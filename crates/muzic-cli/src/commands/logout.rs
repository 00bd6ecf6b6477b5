//! Clear the stored session

use muzic_core::config::AppConfig;
use muzic_core::error::MuzicResult;

use crate::console::CLIConsole;

pub async fn run(config: &AppConfig, console: &CLIConsole) -> MuzicResult<()> {
    let session = super::build_session(config)?;
    session.logout().await?;
    console.success("Logged out");
    Ok(())
}
