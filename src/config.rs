//! Client configuration
//!
//! Credentials and retry/rate-limit knobs. The fetch engine consumes these
//! values as opaque inputs; they can come from code, a YAML file, or the
//! environment.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default first backoff sleep for the legacy retry policy
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Default retry bound for the legacy retry policy
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on 429 re-admission retries in the Helix dialect
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Configuration for a Twitch client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Client identifier, sent on every request
    pub client_id: String,
    /// OAuth token; requests go unauthenticated when absent
    pub oauth_token: Option<String>,
    /// First backoff sleep when retrying legacy-dialect GETs on 5xx
    pub initial_backoff: Duration,
    /// Retry bound for legacy-dialect GETs
    pub max_retries: u32,
    /// Per-request timeout
    pub timeout: Duration,
    /// How many times a Helix request is re-admitted after a 429
    pub max_rate_limit_retries: u32,
}

impl ClientConfig {
    /// Create a config with the given client id and defaults elsewhere
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            oauth_token: None,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
        }
    }

    /// Set the OAuth token
    #[must_use]
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.oauth_token = Some(token.into());
        self
    }

    /// Set the legacy retry backoff parameters
    #[must_use]
    pub fn backoff(mut self, initial: Duration, max_retries: u32) -> Self {
        self.initial_backoff = initial;
        self.max_retries = max_retries;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the 429 re-admission bound
    #[must_use]
    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Load configuration from a YAML file
    ///
    /// ```yaml
    /// credentials:
    ///   client_id: abc123
    ///   oauth_token: def456
    /// general:
    ///   initial_backoff: 0.5   # seconds
    ///   max_retries: 3
    /// ```
    ///
    /// Missing sections fall back to defaults; a missing `client_id` is a
    /// config error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(raw)?;

        let credentials = file.credentials.unwrap_or_default();
        let client_id = credentials
            .client_id
            .ok_or_else(|| crate::Error::config("missing credentials.client_id"))?;

        let mut config = Self::new(client_id);
        config.oauth_token = credentials.oauth_token;

        if let Some(general) = file.general {
            if let Some(secs) = general.initial_backoff {
                config.initial_backoff = Duration::from_secs_f64(secs);
            }
            if let Some(retries) = general.max_retries {
                config.max_retries = retries;
            }
        }

        Ok(config)
    }

    /// Load credentials from `TWITCH_CLIENT_ID` / `TWITCH_OAUTH_TOKEN`
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("TWITCH_CLIENT_ID")
            .map_err(|_| crate::Error::config("TWITCH_CLIENT_ID is not set"))?;
        let mut config = Self::new(client_id);
        config.oauth_token = std::env::var("TWITCH_OAUTH_TOKEN").ok();
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    credentials: Option<CredentialsSection>,
    general: Option<GeneralSection>,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsSection {
    client_id: Option<String>,
    oauth_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeneralSection {
    initial_backoff: Option<f64>,
    max_retries: Option<u32>,
}
