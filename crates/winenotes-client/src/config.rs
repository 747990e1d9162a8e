//! Client configuration loaded from environment variables.

use winenotes_shared::constants::DEFAULT_API_URL;

/// Environment variable naming the API base location.
pub const API_URL_VAR: &str = "WINE_NOTES_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base location of the REST API, without a trailing slash.
    /// Env: `WINE_NOTES_API_URL`
    /// Default: `http://localhost:8000`
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                tracing::warn!("Empty {API_URL_VAR}, using default");
            } else {
                config.api_url = url.to_string();
            }
        }

        config
    }
}
