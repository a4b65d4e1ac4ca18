//! The `SourceAdapter` trait implemented by every provider

use crate::error::Result;
use crate::track::{SourceId, Track};
use serde::Serialize;
use std::fmt::Debug;

/// Capabilities describing which operations an adapter supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterCapabilities {
    /// Supports free text search
    pub supports_search: bool,
    /// Supports trending / popular listings
    pub supports_trending: bool,
    /// Results may carry a download URL
    pub supports_download: bool,
}

impl AdapterCapabilities {
    /// Search and trending, no download
    pub fn search_and_trending() -> Self {
        Self {
            supports_search: true,
            supports_trending: true,
            supports_download: false,
        }
    }

    /// Every capability
    pub fn full() -> Self {
        Self {
            supports_download: true,
            ..Self::search_and_trending()
        }
    }
}

/// Common interface for music providers
///
/// Implementations talk to one external provider and return tracks already
/// normalized through [`crate::TrackBuilder`]. An empty result is a success;
/// errors are reserved for transport and parse failures.
///
/// # Example
///
/// ```ignore
/// use fedsource::{AdapterCapabilities, Result, SourceAdapter, SourceId, Track};
///
/// #[derive(Debug)]
/// struct Silent;
///
/// #[async_trait::async_trait]
/// impl SourceAdapter for Silent {
///     fn id(&self) -> SourceId { SourceId::Demo }
///     fn name(&self) -> &str { "Silent" }
///     fn capabilities(&self) -> AdapterCapabilities { AdapterCapabilities::search_and_trending() }
///     async fn search(&self, _q: &str, _page: u32, _size: u32) -> Result<Vec<Track>> { Ok(vec![]) }
///     async fn trending(&self, _limit: u32) -> Result<Vec<Track>> { Ok(vec![]) }
/// }
/// ```
#[async_trait::async_trait]
pub trait SourceAdapter: Debug + Send + Sync {
    /// Source identifier, also the prefix family of produced track ids
    fn id(&self) -> SourceId;

    /// Human-readable provider name
    fn name(&self) -> &str;

    fn capabilities(&self) -> AdapterCapabilities;

    /// Searches the provider
    ///
    /// `page` starts at 1 and `page_size` is strictly positive.
    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>>;

    /// Returns up to `limit` popular tracks
    async fn trending(&self, limit: u32) -> Result<Vec<Track>>;

    /// Smallest request able to tell whether the provider answers
    async fn probe(&self) -> Result<()> {
        self.search("test", 1, 1).await.map(|_| ())
    }

    /// Drops memoized discovery or mirror state
    fn invalidate(&self) {}
}
