//! Generic Internet Archive audio search
//!
//! Unlike [`crate::archive`], this adapter does not look up item files and
//! only keeps what the advanced search already returns.

use crate::archive::{Doc, advanced_search};
use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder};

/// Default Internet Archive base URL
pub const DEFAULT_BASE_URL: &str = "https://archive.org";

/// Seed query used for trending
pub const TRENDING_SEED: &str = "audio";

const FIELDS: &[&str] = &[
    "identifier",
    "title",
    "creator",
    "collection",
    "language",
    "downloads",
    "stream_url",
    "download_url",
];

fn into_track(doc: Doc) -> Option<Track> {
    let identifier = doc.identifier?;
    Some(
        TrackBuilder::new(SourceId::InternetArchive, identifier)
            .name(doc.title)
            .artist(doc.creator)
            .album(doc.collection.or_else(|| Some("Internet Archive".to_string())))
            .preview_url(doc.stream_url)
            .download_url(doc.download_url)
            .language(doc.language)
            .license(Some("Public Domain"))
            .build(),
    )
}

#[derive(Debug)]
pub struct InternetArchiveAdapter {
    http: HttpClient,
    base_url: String,
}

impl InternetArchiveAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for InternetArchiveAdapter {
    fn id(&self) -> SourceId {
        SourceId::InternetArchive
    }

    fn name(&self) -> &str {
        "Internet Archive"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let q = format!("{} AND mediatype:audio", query.trim());
        let docs = advanced_search(
            &self.http,
            &self.base_url,
            &q,
            page_size,
            page,
            Some("downloads desc"),
            FIELDS,
        )
        .await?;
        Ok(docs.into_iter().filter_map(into_track).collect())
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.search(TRENDING_SEED, 1, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_mapping() {
        let doc: Doc = serde_json::from_value(json!({
            "identifier": "old-time-radio",
            "title": "Episode 1",
            "collection": ["oldtimeradio", "audio"],
            "stream_url": "https://archive.org/stream/1.mp3"
        }))
        .unwrap();

        let track = into_track(doc).unwrap();
        assert_eq!(track.id, "ia_old-time-radio");
        assert_eq!(track.album, "oldtimeradio");
        assert_eq!(track.license.as_deref(), Some("Public Domain"));
        assert!(track.is_playable());
        assert!(!track.is_downloadable());
    }
}
