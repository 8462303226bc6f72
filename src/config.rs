use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub accounts_url: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
}

impl Config {
    /// Refresh credentials are only usable when both halves are present
    pub fn refresh_credentials(&self) -> Option<(&str, &str)> {
        match (&self.refresh_token, &self.client_id) {
            (Some(token), Some(client_id)) => Some((token.as_str(), client_id.as_str())),
            _ => None,
        }
    }
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let access_token = std::env::var("SPOTIFY_ACCESS_TOKEN")
        .context("SPOTIFY_ACCESS_TOKEN is not set (log in first and export the token)")?;

    Ok(Config {
        api_base_url: optional_var("SPOTIFY_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        accounts_url: optional_var("SPOTIFY_ACCOUNTS_URL")
            .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
        access_token,
        refresh_token: optional_var("SPOTIFY_REFRESH_TOKEN"),
        client_id: optional_var("SPOTIFY_CLIENT_ID"),
    })
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
