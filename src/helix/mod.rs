//! Helix API endpoints
//!
//! Thin glue over the fetch engine: each method validates its arguments,
//! builds query parameters, and hands off to a [`Cursor`] or [`PageFetcher`].
//! Validation failures surface as [`Error::InvalidArgument`] before any
//! request is made.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pagination::{Cursor, PageFetcher};
use crate::params::Params;
use crate::resources::{Record, ResourceKind};
use crate::transport::{Fetch, HelixTransport, RateBudget};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const MAX_IDS: usize = 100;

/// Video period filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoPeriod {
    #[default]
    All,
    Day,
    Week,
    Month,
}

impl VideoPeriod {
    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Video sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSort {
    #[default]
    Time,
    Trending,
    Views,
}

impl VideoSort {
    fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Trending => "trending",
            Self::Views => "views",
        }
    }
}

/// Video type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoType {
    #[default]
    All,
    Upload,
    Archive,
    Highlight,
}

impl VideoType {
    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upload => "upload",
            Self::Archive => "archive",
            Self::Highlight => "highlight",
        }
    }
}

/// Filters for `get_streams` / `get_streams_metadata`
#[derive(Debug, Clone, Default)]
pub struct StreamsQuery {
    pub after: Option<String>,
    pub before: Option<String>,
    pub community_ids: Option<Vec<String>>,
    pub game_ids: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub user_ids: Option<Vec<String>>,
    pub user_logins: Option<Vec<String>>,
    pub page_size: Option<u32>,
}

/// Filters for `get_clips`
#[derive(Debug, Clone, Default)]
pub struct ClipsQuery {
    pub broadcaster_id: Option<String>,
    pub game_id: Option<String>,
    pub clip_ids: Option<Vec<String>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub page_size: Option<u32>,
}

/// Filters for `get_videos`
#[derive(Debug, Clone, Default)]
pub struct VideosQuery {
    pub video_ids: Option<Vec<String>>,
    pub user_id: Option<String>,
    pub game_id: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub language: Option<String>,
    pub period: VideoPeriod,
    pub sort: VideoSort,
    pub video_type: VideoType,
    pub page_size: Option<u32>,
}

/// Result of an endpoint that is paginated only for some filter shapes
#[derive(Debug)]
pub enum Paged {
    /// Filtered (by broadcaster, game, or user): cursor-paginated
    Paginated(Cursor),
    /// Looked up by id list: a single flat page
    Flat(Vec<Record>),
}

/// Client for the Helix API dialect
#[derive(Debug, Clone)]
pub struct HelixClient {
    transport: HelixTransport,
}

impl HelixClient {
    /// Create a client with its own rate budget
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            transport: HelixTransport::new(config),
        }
    }

    /// Create a client sharing a budget with other clients for the same credential
    pub fn with_budget(config: &ClientConfig, budget: RateBudget) -> Self {
        Self {
            transport: HelixTransport::with_budget(config, budget),
        }
    }

    /// Create a client over an existing transport (tests use mock base URLs)
    pub fn with_transport(transport: HelixTransport) -> Self {
        Self { transport }
    }

    fn fetcher(&self) -> Arc<dyn Fetch> {
        Arc::new(self.transport.clone())
    }

    /// Streams, most-recent first, cursor-paginated
    pub fn get_streams(&self, query: StreamsQuery) -> Result<Cursor> {
        Ok(Cursor::new(
            self.fetcher(),
            "streams",
            streams_params(&query)?,
            ResourceKind::Stream,
        ))
    }

    /// Stream metadata, same filters as `get_streams`
    pub fn get_streams_metadata(&self, query: StreamsQuery) -> Result<Cursor> {
        Ok(Cursor::new(
            self.fetcher(),
            "streams/metadata",
            streams_params(&query)?,
            ResourceKind::StreamMetadata,
        ))
    }

    /// Look up games by id or name; single page
    pub async fn get_games(
        &self,
        game_ids: Option<Vec<String>>,
        names: Option<Vec<String>>,
    ) -> Result<Vec<Record>> {
        ensure_at_most(&game_ids, MAX_IDS, "Game IDs")?;
        ensure_at_most(&names, MAX_IDS, "Game names")?;

        let mut params = Params::new();
        params.set_list("id", game_ids);
        params.set_list("name", names);

        PageFetcher::new(self.fetcher(), "games", params, ResourceKind::Game)
            .fetch()
            .await
    }

    /// Top games by viewer count, cursor-paginated
    pub fn get_top_games(
        &self,
        after: Option<String>,
        before: Option<String>,
        page_size: Option<u32>,
    ) -> Result<Cursor> {
        let page_size = validate_page_size(page_size)?;

        let mut params = Params::new();
        params.set_opt("after", after);
        params.set_opt("before", before);
        params.set("first", page_size);

        Ok(Cursor::new(
            self.fetcher(),
            "games/top",
            params,
            ResourceKind::Game,
        ))
    }

    /// Clips: paginated when filtered by broadcaster or game, flat for id lookup
    pub async fn get_clips(&self, query: ClipsQuery) -> Result<Paged> {
        if query.broadcaster_id.is_none() && query.game_id.is_none() && query.clip_ids.is_none() {
            return Err(Error::invalid_argument(
                "at least one of broadcaster_id, game_id, clip_ids must be provided",
            ));
        }
        ensure_at_most(&query.clip_ids, MAX_IDS, "Clip IDs")?;
        let page_size = validate_page_size(query.page_size)?;

        let paginated = query.broadcaster_id.is_some() || query.game_id.is_some();

        let mut params = Params::new();
        params.set_opt("broadcaster_id", query.broadcaster_id);
        params.set_opt("game_id", query.game_id);
        params.set_list("id", query.clip_ids);
        params.set_opt("after", query.after);
        params.set_opt("before", query.before);

        if paginated {
            params.set("first", page_size);
            Ok(Paged::Paginated(Cursor::new(
                self.fetcher(),
                "clips",
                params,
                ResourceKind::Clip,
            )))
        } else {
            let records =
                PageFetcher::new(self.fetcher(), "clips", params, ResourceKind::Clip)
                    .fetch()
                    .await?;
            Ok(Paged::Flat(records))
        }
    }

    /// Videos: paginated when filtered by user or game, flat for id lookup
    pub async fn get_videos(&self, query: VideosQuery) -> Result<Paged> {
        ensure_at_most(&query.video_ids, MAX_IDS, "Video IDs")?;
        if query.video_ids.is_none() && query.user_id.is_none() && query.game_id.is_none() {
            return Err(Error::invalid_argument(
                "at least one of video_ids, user_id, game_id must be provided",
            ));
        }

        let mut params = Params::new();
        params.set_list("id", query.video_ids);
        params.set_opt("user_id", query.user_id.clone());
        params.set_opt("game_id", query.game_id.clone());

        if query.user_id.is_some() || query.game_id.is_some() {
            let page_size = validate_page_size(query.page_size)?;
            params.set_opt("after", query.after);
            params.set_opt("before", query.before);
            params.set("first", page_size);
            params.set_opt("language", query.language);
            params.set("period", query.period.as_str());
            params.set("sort", query.sort.as_str());
            params.set("type", query.video_type.as_str());

            Ok(Paged::Paginated(Cursor::new(
                self.fetcher(),
                "videos",
                params,
                ResourceKind::Video,
            )))
        } else {
            let records = PageFetcher::new(
                self.fetcher(),
                "videos",
                params,
                ResourceKind::Video,
            )
            .fetch()
            .await?;
            Ok(Paged::Flat(records))
        }
    }

    /// Follow relationships from or to a user, cursor-paginated with a total
    pub fn get_user_follows(
        &self,
        from_id: Option<String>,
        to_id: Option<String>,
        after: Option<String>,
        page_size: Option<u32>,
    ) -> Result<Cursor> {
        if from_id.is_none() && to_id.is_none() {
            return Err(Error::invalid_argument("from_id or to_id must be provided"));
        }
        let page_size = validate_page_size(page_size)?;

        let mut params = Params::new();
        params.set_opt("after", after);
        params.set("first", page_size);
        params.set_opt("from_id", from_id);
        params.set_opt("to_id", to_id);

        Ok(Cursor::new(
            self.fetcher(),
            "users/follows",
            params,
            ResourceKind::Follow,
        ))
    }
}

fn streams_params(query: &StreamsQuery) -> Result<Params> {
    ensure_at_most(&query.community_ids, MAX_IDS, "Community IDs")?;
    ensure_at_most(&query.game_ids, MAX_IDS, "Game IDs")?;
    ensure_at_most(&query.languages, MAX_IDS, "languages")?;
    ensure_at_most(&query.user_ids, MAX_IDS, "User IDs")?;
    ensure_at_most(&query.user_logins, MAX_IDS, "User login names")?;
    let page_size = validate_page_size(query.page_size)?;

    let mut params = Params::new();
    params.set_opt("after", query.after.clone());
    params.set_opt("before", query.before.clone());
    params.set_list("community_id", query.community_ids.clone());
    params.set("first", page_size);
    params.set_list("game_id", query.game_ids.clone());
    params.set_list("language", query.languages.clone());
    params.set_list("user_id", query.user_ids.clone());
    params.set_list("user_login", query.user_logins.clone());
    Ok(params)
}

fn ensure_at_most(list: &Option<Vec<String>>, max: usize, what: &str) -> Result<()> {
    match list {
        Some(values) if values.len() > max => Err(Error::invalid_argument(format!(
            "maximum of {max} {what} can be supplied"
        ))),
        _ => Ok(()),
    }
}

fn validate_page_size(page_size: Option<u32>) -> Result<u32> {
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size > MAX_PAGE_SIZE {
        return Err(Error::invalid_argument(format!(
            "maximum number of objects to return is {MAX_PAGE_SIZE}"
        )));
    }
    Ok(page_size)
}
