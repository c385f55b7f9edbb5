//! # Twitch API client
//!
//! An async client for the Twitch API's two dialects, built around a lazy,
//! cursor-driven paginated fetch engine.
//!
//! ## Features
//!
//! - **Cursor pagination**: pull-based [`pagination::Cursor`] sequences that
//!   fetch one page per advance and stop cleanly on the server's last page
//! - **Rate-limit handling**: a shared [`transport::RateBudget`] tracks the
//!   budget the server advertises through response headers and gates new
//!   requests; 429s are absorbed and reissued within a bounded number of
//!   re-admissions
//! - **Transient-failure masking**: the legacy dialect retries 5xx GETs with
//!   doubling backoff
//! - **Typed records**: decoded objects become ordered
//!   [`resources::Record`]s with nested sub-resources and parsed timestamps
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twitch_client::{ClientConfig, HelixClient, StreamsQuery};
//!
//! #[tokio::main]
//! async fn main() -> twitch_client::Result<()> {
//!     let config = ClientConfig::new("my-client-id").oauth_token("my-token");
//!     let client = HelixClient::new(&config);
//!
//!     let mut streams = client.get_streams(StreamsQuery::default())?;
//!     while let Some(stream) = streams.advance().await? {
//!         println!("{:?} viewers: {:?}", stream.get_str("user_name"),
//!                  stream.get_i64("viewer_count"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            HelixClient / KrakenClient                   │
//! │     validate args → build params → hand to engine       │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │
//! ┌──────────────┬───────────┴───────────┬──────────────────┐
//! │  Pagination  │       Transport       │    Resources     │
//! ├──────────────┼───────────────────────┼──────────────────┤
//! │ Cursor       │ Helix: budget + 429   │ Record / Value   │
//! │ PageFetcher  │ Kraken: 5xx backoff   │ nested kinds     │
//! │              │ RateBudget (shared)   │ timestamps       │
//! └──────────────┴───────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Client configuration
pub mod config;

/// Query parameter construction
pub mod params;

/// Typed API resources
pub mod resources;

/// Dialect transports and the shared rate budget
pub mod transport;

/// The paginated fetch engine
pub mod pagination;

/// Helix (newer dialect) endpoints
pub mod helix;

/// Legacy v5 endpoints
pub mod kraken;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use helix::{ClipsQuery, HelixClient, Paged, StreamsQuery, VideosQuery};
pub use kraken::KrakenClient;
pub use pagination::{Cursor, PageFetcher};
pub use params::Params;
pub use resources::{Record, ResourceKind, Value};
pub use transport::{Fetch, RateBudget};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
