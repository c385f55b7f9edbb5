//! Legacy (v5) API endpoints
//!
//! A small surface over the legacy transport. These endpoints predate the
//! cursor envelope: list responses arrive under endpoint-specific keys and
//! some list parameters are comma-joined rather than repeated.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pagination::PageFetcher;
use crate::params::Params;
use crate::resources::{Record, ResourceKind};
use crate::transport::{Fetch, KrakenTransport};
use serde_json::Value;
use std::sync::Arc;

const MAX_LIMIT: u32 = 100;

/// Legacy broadcast type filter, comma-joinable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastType {
    Archive,
    Highlight,
    Upload,
}

impl BroadcastType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Highlight => "highlight",
            Self::Upload => "upload",
        }
    }
}

/// Client for the legacy v5 API dialect
#[derive(Debug, Clone)]
pub struct KrakenClient {
    transport: KrakenTransport,
}

impl KrakenClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            transport: KrakenTransport::new(config),
        }
    }

    /// Create a client over an existing transport (tests use mock base URLs)
    pub fn with_transport(transport: KrakenTransport) -> Self {
        Self { transport }
    }

    fn fetcher(&self) -> Arc<dyn Fetch> {
        Arc::new(self.transport.clone())
    }

    /// Fetch one channel by id
    pub async fn get_channel(&self, channel_id: &str) -> Result<Record> {
        let body = self
            .transport
            .get_json(&format!("channels/{channel_id}"), &Params::new())
            .await?;
        record_from(&body, ResourceKind::Channel)
    }

    /// Top videos sitewide; `broadcast_type` is comma-joined per the v5 contract
    pub async fn get_top_videos(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        game: Option<String>,
        broadcast_types: Option<Vec<BroadcastType>>,
    ) -> Result<Vec<Record>> {
        let limit = limit.unwrap_or(10);
        if limit > MAX_LIMIT {
            return Err(Error::invalid_argument(format!(
                "maximum number of objects to return is {MAX_LIMIT}"
            )));
        }

        let mut params = Params::new();
        params.set("limit", limit);
        params.set("offset", offset.unwrap_or(0));
        params.set_opt("game", game);
        params.set_joined(
            "broadcast_type",
            broadcast_types
                .map(|types| types.iter().map(|t| t.as_str().to_string()).collect()),
        );

        PageFetcher::new(self.fetcher(), "videos/top", params, ResourceKind::Video)
            .with_data_key("vods")
            .fetch()
            .await
    }

    /// Videos for one channel
    pub async fn get_channel_videos(
        &self,
        channel_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Record>> {
        let limit = limit.unwrap_or(10);
        if limit > MAX_LIMIT {
            return Err(Error::invalid_argument(format!(
                "maximum number of objects to return is {MAX_LIMIT}"
            )));
        }

        let mut params = Params::new();
        params.set("limit", limit);
        params.set("offset", offset.unwrap_or(0));

        PageFetcher::new(
            self.fetcher(),
            format!("channels/{channel_id}/videos"),
            params,
            ResourceKind::Video,
        )
        .with_data_key("videos")
        .fetch()
        .await
    }

    /// Create a collection owned by a channel
    pub async fn create_collection(&self, channel_id: &str, title: &str) -> Result<Record> {
        let body = self
            .transport
            .post(
                &format!("channels/{channel_id}/collections"),
                Some(&serde_json::json!({ "title": title })),
                &Params::new(),
            )
            .await?
            .ok_or_else(|| Error::Other("create collection returned no body".to_string()))?;
        record_from(&body, ResourceKind::Other)
    }

    /// Rename a collection
    pub async fn update_collection(&self, collection_id: &str, title: &str) -> Result<()> {
        self.transport
            .put(
                &format!("collections/{collection_id}"),
                Some(&serde_json::json!({ "title": title })),
                &Params::new(),
            )
            .await?;
        Ok(())
    }

    /// Delete a collection
    pub async fn delete_collection(&self, collection_id: &str) -> Result<()> {
        self.transport
            .delete(&format!("collections/{collection_id}"), &Params::new())
            .await?;
        Ok(())
    }
}

fn record_from(body: &Value, kind: ResourceKind) -> Result<Record> {
    body.as_object()
        .map(|object| Record::construct_from(kind, object))
        .ok_or_else(|| Error::Other("expected a JSON object response".to_string()))
}
