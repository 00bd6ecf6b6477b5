//! Show the current user's profile

use std::sync::Arc;

use muzic_core::api::{UserProfile, WebApi};
use muzic_core::config::AppConfig;
use muzic_core::error::MuzicResult;

use crate::console::CLIConsole;

pub async fn run(config: &AppConfig, console: &CLIConsole, refresh: bool) -> MuzicResult<()> {
    let session = super::build_session(config)?;

    let cached = session.cached_profile().await?;
    let profile = match (cached, refresh) {
        (Some(profile), false) => {
            console.info("Using the cached profile snapshot");
            profile
        }
        _ => {
            let api = WebApi::new(config.api_base_url.clone(), Arc::clone(&session));
            api.current_user_profile().await?
        }
    };

    print_profile(console, &profile);
    Ok(())
}

fn print_profile(console: &CLIConsole, profile: &UserProfile) {
    console.print_header("Profile");
    println!("id:           {}", profile.id);
    if let Some(name) = &profile.display_name {
        println!("display name: {name}");
    }
    if let Some(email) = &profile.email {
        println!("email:        {email}");
    }
    if let Some(country) = &profile.country {
        println!("country:      {country}");
    }
    if let Some(product) = &profile.product {
        println!("product:      {product}");
    }
    if let Some(followers) = &profile.followers {
        println!("followers:    {}", followers.total);
    }
}
