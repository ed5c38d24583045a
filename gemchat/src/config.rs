//! Runtime configuration: API credentials and the resolved settings handed
//! to the server and the terminal chat.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::gemini::ChatConfig;

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Base URL of the Gemini REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upper bound on a single generation call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration errors. Any of these stops startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key found. Put GEMINI_API_KEY=... in a .env file.")]
    MissingApiKey,

    #[error("Failed to read system prompt from {}: {source}", path.display())]
    Prompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// API key for the model provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Resolve the key through `lookup`, trying [`API_KEY_VARS`] in order.
    /// Blank values are treated as unset.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .map(Self::new)
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Everything needed to talk to the provider, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: ApiKey,
    pub base_url: String,
    pub request_timeout: Duration,
    /// Fixed chat configuration used for every session and every reset.
    pub chat: ChatConfig,
}

/// Warning to print for the outcome of loading `.env`.
///
/// A missing file stays silent. A file that exists but cannot be read or
/// parsed is reported.
pub fn dotenv_warning(loaded: &Result<PathBuf, dotenvy::Error>) -> Option<String> {
    match loaded {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("warning: could not load .env: {e}")),
    }
}
