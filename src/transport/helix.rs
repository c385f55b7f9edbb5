//! Helix dialect transport
//!
//! Issues single GET requests against the Helix API with bearer auth and
//! rate-budget admission. The only transient failure this dialect signals is
//! 429: the request is re-admitted through the budget and reissued, bounded
//! by `max_rate_limit_retries`. Everything else non-2xx is fatal and
//! surfaces as [`Error::HttpStatus`].

use super::rate_limit::RateBudget;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::params::Params;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Production Helix base URL
pub const BASE_HELIX_URL: &str = "https://api.twitch.tv/helix/";

const RATELIMIT_REMAINING: &str = "Ratelimit-Remaining";
const RATELIMIT_RESET: &str = "Ratelimit-Reset";

/// Transport for the newer (Helix) API dialect
#[derive(Debug, Clone)]
pub struct HelixTransport {
    client: Client,
    base_url: String,
    client_id: String,
    oauth_token: Option<String>,
    budget: RateBudget,
    max_rate_limit_retries: u32,
}

impl HelixTransport {
    /// Create a transport with a fresh rate budget
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_budget(config, RateBudget::new())
    }

    /// Create a transport sharing an existing rate budget
    pub fn with_budget(config: &ClientConfig, budget: RateBudget) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: BASE_HELIX_URL.to_string(),
            client_id: config.client_id.clone(),
            oauth_token: config.oauth_token.clone(),
            budget,
            max_rate_limit_retries: config.max_rate_limit_retries,
        }
    }

    /// Override the base URL (mock servers in tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// The rate budget this transport draws from
    pub fn budget(&self) -> &RateBudget {
        &self.budget
    }

    /// Issue one GET request and decode the JSON body
    ///
    /// Waits for budget admission first; publishes rate-limit headers from
    /// every response, including 429s, so the next admission check sees the
    /// freshest window.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value> {
        let url = self.build_url(path)?;
        let pairs = params.pairs();

        let mut attempts = 0u32;
        loop {
            self.budget.acquire().await;

            let mut req = self
                .client
                .get(url.as_str())
                .header("Client-ID", &self.client_id);
            if let Some(token) = &self.oauth_token {
                req = req.header("Authorization", format!("Bearer {token}"));
            }
            if !pairs.is_empty() {
                req = req.query(&pairs);
            }

            let response = req.send().await?;
            let status = response.status();
            self.publish_rate_headers(response.headers()).await;

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts >= self.max_rate_limit_retries {
                    return Err(Error::RateLimited { attempts });
                }
                attempts += 1;
                warn!(
                    attempt = attempts,
                    path, "rate limited (429), waiting for admission and reissuing"
                );
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::http_status(status.as_u16(), body));
            }

            debug!(%url, "GET succeeded");
            return Ok(response.json().await?);
        }
    }

    async fn publish_rate_headers(&self, headers: &HeaderMap) {
        let remaining = header_u64(headers, RATELIMIT_REMAINING);
        let reset = header_u64(headers, RATELIMIT_RESET);
        if remaining.is_some() || reset.is_some() {
            self.budget.record(remaining, reset).await;
        }
    }

    fn build_url(&self, path: &str) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)?;
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}
