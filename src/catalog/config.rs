use serde::{Deserialize, Serialize};

/// Environment variable overriding `catalog.client_id`.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
/// Environment variable overriding `catalog.client_secret`.
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Spotify Web API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Client-credentials app id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client-credentials app secret
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Web API base URL (default: https://api.spotify.com/v1)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Token endpoint (default: https://accounts.spotify.com/api/token)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Market used to pick playable track versions, e.g. "US"
    #[serde(default)]
    pub market: Option<String>,
    /// Results requested per search
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

fn default_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}
fn default_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}
fn default_search_limit() -> u32 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            market: None,
            search_limit: default_search_limit(),
        }
    }
}

impl CatalogConfig {
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_url(mut self, auth_url: &str) -> Self {
        self.auth_url = auth_url.to_string();
        self
    }

    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = Some(client_id.to_string());
        self.client_secret = Some(client_secret.to_string());
        self
    }

    /// Apply credential overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
            if !id.is_empty() {
                self.client_id = Some(id);
            }
        }
        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            if !secret.is_empty() {
                self.client_secret = Some(secret);
            }
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}
