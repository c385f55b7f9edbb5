//! Legacy (v5) dialect transport
//!
//! The legacy API has no rate-limit headers; its failure mode is transient
//! 5xx responses, masked here with doubling backoff on GETs. Writes are
//! fire-once: retrying a non-idempotent POST/PUT/DELETE risks duplicate side
//! effects, so only reads participate in the retry policy.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::params::Params;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Production legacy base URL
pub const BASE_KRAKEN_URL: &str = "https://api.twitch.tv/kraken/";

const ACCEPT_V5: &str = "application/vnd.twitchtv.v5+json";

/// Transport for the legacy (v5) API dialect
#[derive(Debug, Clone)]
pub struct KrakenTransport {
    client: Client,
    base_url: String,
    client_id: String,
    oauth_token: Option<String>,
    initial_backoff: Duration,
    max_retries: u32,
}

impl KrakenTransport {
    /// Create a transport from client configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: BASE_KRAKEN_URL.to_string(),
            client_id: config.client_id.clone(),
            oauth_token: config.oauth_token.clone(),
            initial_backoff: config.initial_backoff,
            max_retries: config.max_retries,
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

    /// GET with retry, decoding the JSON body
    pub async fn get_json(&self, path: &str, params: &Params) -> Result<Value> {
        let response = self.get_raw(path, params).await?;
        Ok(response.json().await?)
    }

    /// GET with retry, returning the raw response (non-JSON endpoints)
    ///
    /// A 5xx response is retried with doubling backoff up to `max_retries`
    /// further attempts; the last response in hand is then status-checked,
    /// so a persistent failure surfaces as [`Error::HttpStatus`]. Responses
    /// below 500, success and client error alike, end the retry loop at once.
    pub async fn get_raw(&self, path: &str, params: &Params) -> Result<Response> {
        let url = self.build_url(path)?;
        let pairs = params.pairs();

        let mut response = self.send(Method::GET, &url, &pairs, None).await?;
        if response.status().is_server_error() {
            let mut backoff = self.initial_backoff;
            for attempt in 0..self.max_retries {
                warn!(
                    status = response.status().as_u16(),
                    attempt = attempt + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    %url,
                    "server error, backing off before retry"
                );
                tokio::time::sleep(backoff).await;
                response = self.send(Method::GET, &url, &pairs, None).await?;
                if !response.status().is_server_error() {
                    break;
                }
                backoff *= 2;
            }
        }

        check_status(response).await
    }

    /// POST, fire-once
    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        params: &Params,
    ) -> Result<Option<Value>> {
        self.write(Method::POST, path, body, params).await
    }

    /// PUT, fire-once
    pub async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        params: &Params,
    ) -> Result<Option<Value>> {
        self.write(Method::PUT, path, body, params).await
    }

    /// DELETE, fire-once
    pub async fn delete(&self, path: &str, params: &Params) -> Result<Option<Value>> {
        self.write(Method::DELETE, path, None, params).await
    }

    /// Shared write path: one request, 200 yields a body, other 2xx yield none
    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &Params,
    ) -> Result<Option<Value>> {
        let url = self.build_url(path)?;
        let pairs = params.pairs();

        let response = self.send(method, &url, &pairs, body).await?;
        let response = check_status(response).await?;

        if response.status() == StatusCode::OK {
            Ok(Some(response.json().await?))
        } else {
            Ok(None)
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &url::Url,
        pairs: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut req = self
            .client
            .request(method, url.as_str())
            .header("Accept", ACCEPT_V5)
            .header("Client-ID", &self.client_id);
        if let Some(token) = &self.oauth_token {
            req = req.header("Authorization", format!("OAuth {token}"));
        }
        if !pairs.is_empty() {
            req = req.query(pairs);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        debug!(%url, status = response.status().as_u16(), "request completed");
        Ok(response)
    }

    fn build_url(&self, path: &str) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)?;
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

/// Surface non-2xx responses as [`Error::HttpStatus`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::http_status(status.as_u16(), body))
    }
}
