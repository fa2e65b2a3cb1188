use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:3000/api/spotify/callback";
pub const DEFAULT_MARKET: &str = "US";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub token_file: PathBuf,
    /// Overrides the token file when set
    pub access_token: Option<String>,
    pub default_market: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            token_file: PathBuf::from(".spotify_token.json"),
            access_token: None,
            default_market: DEFAULT_MARKET.to_string(),
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Client id and optional secret, required only for signing in
    pub fn client_credentials(&self) -> Result<(&str, Option<&str>)> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| anyhow!("Missing SPOTIFY_CLIENT_ID in environment or .env"))?;
        Ok((client_id, self.client_secret.as_deref()))
    }
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let var = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let defaults = Config::default();

    let http_timeout = match var("HTTP_TIMEOUT_SECS") {
        Some(raw) => Duration::from_secs(
            raw.parse()
                .map_err(|e| anyhow!("Invalid HTTP_TIMEOUT_SECS '{raw}': {e}"))?,
        ),
        None => defaults.http_timeout,
    };

    let default_market = var("SPOTIFY_MARKET")
        .map(|market| market.to_uppercase())
        .unwrap_or(defaults.default_market);
    if !is_market_code(&default_market) {
        return Err(anyhow!(
            "SPOTIFY_MARKET must be a two-letter country code, got '{default_market}'"
        ));
    }

    Ok(Config {
        api_base_url: var("SPOTIFY_API_BASE").unwrap_or(defaults.api_base_url),
        accounts_base_url: var("SPOTIFY_ACCOUNTS_BASE").unwrap_or(defaults.accounts_base_url),
        client_id: var("SPOTIFY_CLIENT_ID"),
        client_secret: var("SPOTIFY_CLIENT_SECRET"),
        redirect_uri: redirect_uri(var("SPOTIFY_REDIRECT_URI")),
        token_file: var("SPOTIFY_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_file),
        access_token: var("SPOTIFY_ACCESS_TOKEN"),
        default_market,
        http_timeout,
    })
}

/// The callback has to use 127.0.0.1 so the redirect and the stored verifier agree on the host
fn redirect_uri(configured: Option<String>) -> String {
    match configured {
        Some(uri) if !uri.contains("localhost") => uri,
        _ => DEFAULT_REDIRECT_URI.to_string(),
    }
}

pub fn is_market_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}
