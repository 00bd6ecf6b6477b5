//! Minimal Web API surface: the user profile and the single playback call

mod client;
mod models;

pub use client::WebApi;
pub use models::{ExplicitContent, ExternalUrls, Followers, Image, UserProfile};
