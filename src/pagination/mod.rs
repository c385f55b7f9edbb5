//! Paginated fetch engine
//!
//! [`Cursor`] is the lazy cursor-paginated sequence over Helix endpoints: it
//! pulls one page of records per network round trip, driven entirely by the
//! caller's `advance()` calls. [`PageFetcher`] is the one-shot variant for
//! endpoints that return everything in a single page.
//!
//! The server signals the last page by omitting `pagination.cursor` from the
//! response envelope. Once that happens (or a page comes back empty) the
//! sequence is exhausted: further `advance()` calls report `None` without
//! issuing any request.

use crate::error::{Error, Result};
use crate::params::Params;
use crate::resources::{Record, ResourceKind};
use crate::transport::Fetch;
use futures::Stream;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// One-shot retrieval of a flat record list
///
/// For endpoints documented as non-paginated (lookup by id list, legacy
/// flat lists). One request, no cursor handling. The record array lives
/// under `data` unless the endpoint names another envelope key.
pub struct PageFetcher {
    transport: Arc<dyn Fetch>,
    path: String,
    params: Params,
    kind: ResourceKind,
    data_key: String,
}

impl PageFetcher {
    /// Create a fetcher for one endpoint call
    pub fn new(
        transport: Arc<dyn Fetch>,
        path: impl Into<String>,
        params: Params,
        kind: ResourceKind,
    ) -> Self {
        Self {
            transport,
            path: path.into(),
            params,
            kind,
            data_key: "data".to_string(),
        }
    }

    /// Read the record array from an endpoint-specific envelope key
    /// (legacy v5 lists arrive under keys like `vods` or `videos`)
    #[must_use]
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    /// Issue the request and map the response's record array to records
    pub async fn fetch(self) -> Result<Vec<Record>> {
        let envelope = self.transport.fetch(&self.path, &self.params).await?;
        extract_records(&envelope, &self.path, &self.data_key, self.kind)
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Lazy cursor-paginated sequence of records
///
/// Holds fetch parameters, the continuation cursor, and a buffer of records
/// from the last page. `advance()` is the only suspension point: each call
/// completes its network I/O (if any) before returning, so abandoning the
/// sequence at any point leaves nothing in flight.
pub struct Cursor {
    transport: Arc<dyn Fetch>,
    path: String,
    params: Params,
    kind: ResourceKind,
    cursor: Option<String>,
    buffer: VecDeque<Record>,
    requests_issued: u64,
    total: Option<u64>,
}

impl Cursor {
    /// Create a sequence over one endpoint
    pub fn new(
        transport: Arc<dyn Fetch>,
        path: impl Into<String>,
        params: Params,
        kind: ResourceKind,
    ) -> Self {
        Self {
            transport,
            path: path.into(),
            params,
            kind,
            cursor: None,
            buffer: VecDeque::new(),
            requests_issued: 0,
            total: None,
        }
    }

    /// Produce the next record, fetching a page when the buffer runs dry
    ///
    /// Returns `Ok(None)` once the sequence is exhausted; the sequence stays
    /// exhausted and issues no further requests no matter how many more
    /// times this is called. A failed fetch leaves the sequence state
    /// unchanged, so the same call may simply be retried.
    pub async fn advance(&mut self) -> Result<Option<Record>> {
        if let Some(record) = self.buffer.pop_front() {
            return Ok(Some(record));
        }

        // No cursor after at least one request means the server sent its
        // last page; report exhaustion without touching the network.
        if self.requests_issued > 0 && self.cursor.is_none() {
            return Ok(None);
        }

        self.next_page().await?;

        match self.buffer.pop_front() {
            Some(record) => Ok(Some(record)),
            None => {
                // An empty page terminates the sequence even if a cursor
                // came along with it.
                self.cursor = None;
                Ok(None)
            }
        }
    }

    /// Drain up to `limit` records
    pub async fn collect(&mut self, limit: usize) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while records.len() < limit {
            match self.advance().await? {
                Some(record) => records.push(record),
                None => break,
            }
        }
        Ok(records)
    }

    /// The current continuation cursor, if the server issued one
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Total result count, when the endpoint provides one
    ///
    /// Some endpoints never do; that is part of the contract, and calling
    /// this before an envelope carried a `total` fails with
    /// [`Error::TotalNotProvided`].
    pub fn total(&self) -> Result<u64> {
        self.total.ok_or(Error::TotalNotProvided)
    }

    /// Number of requests issued so far
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Consume the sequence into a `futures::Stream` of records
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> {
        futures::stream::try_unfold(self, |mut cursor| async move {
            Ok(cursor.advance().await?.map(|record| (record, cursor)))
        })
    }

    /// Fetch the next page through the transport and refill the buffer
    async fn next_page(&mut self) -> Result<()> {
        if let Some(cursor) = &self.cursor {
            self.params.set("after", cursor);
        }

        let envelope = self.transport.fetch(&self.path, &self.params).await?;
        self.requests_issued += 1;

        self.buffer = extract_records(&envelope, &self.path, "data", self.kind)?.into();
        self.cursor = envelope
            .get("pagination")
            .and_then(|p| p.get("cursor"))
            .and_then(Value::as_str)
            .map(String::from);
        if let Some(total) = envelope.get("total").and_then(Value::as_u64) {
            self.total = Some(total);
        }

        Ok(())
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("cursor", &self.cursor)
            .field("buffered", &self.buffer.len())
            .field("requests_issued", &self.requests_issued)
            .finish_non_exhaustive()
    }
}

/// Map an envelope's record array into records
fn extract_records(
    envelope: &Value,
    path: &str,
    key: &str,
    kind: ResourceKind,
) -> Result<Vec<Record>> {
    let data = envelope
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Other(format!("response from '{path}' has no '{key}' array")))?;

    Ok(data
        .iter()
        .filter_map(Value::as_object)
        .map(|object| Record::construct_from(kind, object))
        .collect())
}

#[cfg(test)]
mod tests;
