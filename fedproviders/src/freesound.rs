//! Freesound adapter (community sound library)

use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_f64,
    lenient_string,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Default Freesound API base URL
pub const DEFAULT_BASE_URL: &str = "https://freesound.org/api";

/// Seed query used for trending
pub const TRENDING_SEED: &str = "music";

const FIELDS: &str = "id,name,username,license,previews,download,duration,tags";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    results: Vec<Sound>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Sound {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    name: Option<String>,
    #[serde(alias = "user")]
    username: Option<String>,
    preview: Option<String>,
    previews: HashMap<String, String>,
    download: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    license: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    tags: Option<String>,
}

impl Sound {
    fn into_track(mut self) -> Option<Track> {
        let id = self.id?;
        let preview = self
            .preview
            .or_else(|| self.previews.remove("preview-hq-mp3"))
            .or_else(|| self.previews.remove("preview-lq-mp3"));
        Some(
            TrackBuilder::new(SourceId::Freesound, id)
                .name(self.name)
                .artist(self.username.or_else(|| Some("Freesound User".to_string())))
                .album(Some("Freesound"))
                .duration_secs(self.duration)
                .preview_url(preview)
                .download_url(self.download)
                .genre(self.tags)
                .license(self.license)
                .build(),
        )
    }
}

#[derive(Debug)]
pub struct FreesoundAdapter {
    http: HttpClient,
    base_url: String,
}

impl FreesoundAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for FreesoundAdapter {
    fn id(&self) -> SourceId {
        SourceId::Freesound
    }

    fn name(&self) -> &str {
        "Freesound"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let url = format!("{}/search/text/", self.base_url);
        let params = [
            ("query", query.to_string()),
            ("page_size", page_size.to_string()),
            ("page", page.to_string()),
            ("fields", FIELDS.to_string()),
        ];
        let response: Response = self.http.get_json(&url, &params).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(Sound::into_track)
            .collect())
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
    fn test_preview_falls_back_to_previews_map() {
        let sound: Sound = serde_json::from_value(json!({
            "id": 12,
            "name": "Rain loop",
            "user": "field",
            "previews": {"preview-hq-mp3": "https://cdn.freesound.org/12-hq.mp3"},
            "duration": 7.5
        }))
        .unwrap();

        let track = sound.into_track().unwrap();
        assert_eq!(track.id, "freesound_12");
        assert_eq!(track.artist, "field");
        assert_eq!(
            track.preview_url.as_deref(),
            Some("https://cdn.freesound.org/12-hq.mp3")
        );
        assert_eq!(track.duration_ms, 7_500);
        assert!(!track.is_downloadable());
    }
}
