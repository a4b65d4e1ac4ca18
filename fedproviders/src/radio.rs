//! Radio Browser adapter
//!
//! Stations are exposed as tracks with a zero duration (live streams).

use crate::http::{HttpClient, page_offset, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_string,
};
use serde::Deserialize;

/// Default Radio Browser mirror
pub const DEFAULT_BASE_URL: &str = "https://de1.api.radio-browser.info/json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Station {
    stationuuid: Option<String>,
    name: Option<String>,
    organization: Option<String>,
    country: Option<String>,
    favicon: Option<String>,
    url_resolved: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    tags: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    language: Option<String>,
}

impl Station {
    fn into_track(self) -> Option<Track> {
        let id = self.stationuuid?;
        Some(
            TrackBuilder::new(SourceId::Radio, id)
                .name(self.name)
                .artist(self.organization.or_else(|| Some("Radio Station".to_string())))
                .album(self.country.or_else(|| Some("Live Radio".to_string())))
                .duration_ms(0)
                .image_url(self.favicon)
                .preview_url(self.url_resolved)
                .genre(self.tags)
                .language(self.language)
                .build(),
        )
    }
}

#[derive(Debug)]
pub struct RadioAdapter {
    http: HttpClient,
    base_url: String,
}

impl RadioAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }

    async fn stations(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Track>> {
        let url = format!("{}{}", self.base_url, path);
        let stations: Vec<Station> = self.http.get_json(&url, query).await?;
        Ok(stations.into_iter().filter_map(Station::into_track).collect())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for RadioAdapter {
    fn id(&self) -> SourceId {
        SourceId::Radio
    }

    fn name(&self) -> &str {
        "Radio Browser"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::search_and_trending()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.stations(
            "/stations/search",
            &[
                ("name", query.to_string()),
                ("limit", page_size.to_string()),
                ("offset", page_offset(page, page_size).to_string()),
                ("hidebroken", "true".to_string()),
            ],
        )
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.stations(
            "/stations/topvote",
            &[
                ("limit", limit.to_string()),
                ("hidebroken", "true".to_string()),
            ],
        )
        .await
    }
}
