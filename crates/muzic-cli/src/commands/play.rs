//! Start playback of a URI

use muzic_core::api::WebApi;
use muzic_core::config::AppConfig;
use muzic_core::error::MuzicResult;

use crate::console::CLIConsole;

pub async fn run(config: &AppConfig, console: &CLIConsole, uri: &str) -> MuzicResult<()> {
    let session = super::build_session(config)?;
    let api = WebApi::new(config.api_base_url.clone(), session);

    api.play(uri).await?;
    console.success(&format!("Playing {uri}"));
    Ok(())
}
