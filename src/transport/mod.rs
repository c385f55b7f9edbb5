//! HTTP transports for the two API dialects
//!
//! The upstream API speaks two incompatible conventions. Each gets its own
//! transport rather than conditional branches in one client:
//! - [`HelixTransport`] — newer dialect: bearer auth, cursor pagination,
//!   header-advertised rate budget, 429 re-admission.
//! - [`KrakenTransport`] — legacy v5 dialect: `OAuth` auth scheme, doubling
//!   backoff on 5xx for GETs, fire-once writes.

use crate::error::Result;
use crate::params::Params;
use async_trait::async_trait;
use serde_json::Value;

mod helix;
mod kraken;
mod rate_limit;

pub use helix::{HelixTransport, BASE_HELIX_URL};
pub use kraken::{KrakenTransport, BASE_KRAKEN_URL};
pub use rate_limit::RateBudget;

/// One-page fetch seam shared by both dialect transports
///
/// The fetch engine pulls pages through this trait; which dialect (and so
/// which retry/rate-limit behavior) applies is the endpoint glue's choice.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Issue one GET request and decode the JSON body
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value>;
}

#[async_trait]
impl Fetch for HelixTransport {
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value> {
        self.get(path, params).await
    }
}

#[async_trait]
impl Fetch for KrakenTransport {
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value> {
        self.get_json(path, params).await
    }
}
