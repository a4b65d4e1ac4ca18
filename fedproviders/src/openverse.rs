//! Openverse adapter (Creative Commons audio aggregator)
//!
//! Anonymous clients are limited to 20 items per page and get 401 or 429
//! once their quota is spent; both are reported as rate limiting. A query
//! without results is retried once on its first word.

use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_string,
    lenient_string_list,
};
use serde::Deserialize;
use tracing::debug;

/// Default Openverse audio endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openverse.engineering/v1/audio/";

/// Anonymous page size limit
pub const MAX_PAGE_SIZE: u32 = 20;

const BROADER_PAGE_SIZE: u32 = 10;
const PROVIDERS: &str = "jamendo,wikimedia,commons,ccmixter,archive";
const TRENDING_QUERY: &str = "music audio";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    results: Vec<AudioItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AudioItem {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    title: Option<String>,
    creator: Option<String>,
    provider: Option<String>,
    audio: Option<String>,
    url: Option<String>,
    download_url: Option<String>,
    thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    tags: Vec<String>,
    license: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    language: Option<String>,
}

impl AudioItem {
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let audio = [self.audio, self.url, self.download_url]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())?;
        let genre = (!self.tags.is_empty()).then(|| self.tags.join(", "));
        Some(
            TrackBuilder::new(SourceId::Openverse, id)
                .name(self.title)
                .artist(self.creator)
                .album(self.provider.or_else(|| Some("Openverse".to_string())))
                .duration_ms(0)
                .image_url(self.thumbnail)
                .preview_url(Some(audio.clone()))
                .download_url(Some(audio))
                .genre(genre.or_else(|| Some("Creative Commons".to_string())))
                .language(self.language)
                .license(self.license.or_else(|| Some("CC".to_string())))
                .build(),
        )
    }
}

fn to_tracks(response: Response) -> Vec<Track> {
    response
        .results
        .into_iter()
        .filter_map(AudioItem::into_track)
        .collect()
}

#[derive(Debug)]
pub struct OpenverseAdapter {
    http: HttpClient,
    base_url: String,
}

impl OpenverseAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        let mut base_url = trim_base(&settings.base_url);
        base_url.push('/');
        Self { http, base_url }
    }

    async fn query(&self, q: &str, page: u32, page_size: u32, sort: Option<&str>) -> Result<Response> {
        let mut params = vec![
            ("q", q.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("source", PROVIDERS.to_string()),
            ("type", "audio".to_string()),
        ];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        self.http.get_json(&self.base_url, &params).await
    }
}

#[async_trait::async_trait]
impl SourceAdapter for OpenverseAdapter {
    fn id(&self) -> SourceId {
        SourceId::Openverse
    }

    fn name(&self) -> &str {
        "Openverse"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let size = page_size.min(MAX_PAGE_SIZE);
        let response = self.query(query, page, size, None).await?;
        if !response.results.is_empty() {
            return Ok(to_tracks(response));
        }

        let Some(first_word) = query.split_whitespace().next() else {
            return Ok(Vec::new());
        };
        debug!(query = %query, broader = %first_word, "Openverse empty, retrying broader");
        let broader = self
            .query(first_word, page, size.min(BROADER_PAGE_SIZE), None)
            .await?;
        Ok(to_tracks(broader))
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        let response = self
            .query(TRENDING_QUERY, 1, limit.min(MAX_PAGE_SIZE), Some("popularity"))
            .await?;
        Ok(to_tracks(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audio_item_normalization() {
        let response: Response = serde_json::from_value(json!({
            "results": [
                {"id": "a-1", "title": "Rain", "creator": "Field", "provider": "wikimedia",
                 "url": "https://upload.example/rain.ogg", "tags": [{"name": "x"}], "license": "by"},
                {"id": "a-2", "title": "Nothing"}
            ]
        }))
        .unwrap();

        let tracks = to_tracks(response);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "ov_a-1");
        assert_eq!(tracks[0].album, "wikimedia");
        assert_eq!(tracks[0].preview_url, tracks[0].download_url);
        assert_eq!(tracks[0].license.as_deref(), Some("by"));
        assert_eq!(tracks[0].genre.as_deref(), Some("x"));
        assert_eq!(tracks[0].duration_ms, 0);
    }

    #[test]
    fn test_base_url_keeps_trailing_slash() {
        let adapter = OpenverseAdapter::new(
            HttpClient::new().unwrap(),
            &EndpointSettings::new("http://localhost:1/v1/audio"),
        );
        assert_eq!(adapter.base_url, "http://localhost:1/v1/audio/");
    }
}
