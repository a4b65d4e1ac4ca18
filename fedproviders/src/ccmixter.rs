//! ccMixter adapter (Creative Commons remixes)

use crate::http::{HttpClient, page_offset, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_f64,
    lenient_string, lenient_string_list,
};
use serde::Deserialize;
use serde_json::Value;

/// Default ccMixter API base URL
pub const DEFAULT_BASE_URL: &str = "http://ccmixter.org/api";

/// Seed query used for trending
pub const TRENDING_SEED: &str = "remix";

const LICENSE: &str = "CC-BY";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Upload {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    name: Option<String>,
    user_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    art: Option<String>,
    download_url: Option<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    tags: Vec<String>,
}

impl Upload {
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let genre = (!self.tags.is_empty()).then(|| self.tags.join(", "));
        Some(
            TrackBuilder::new(SourceId::CcMixter, id)
                .name(self.name)
                .artist(self.user_name)
                .album(Some("ccMixter"))
                .duration_secs(self.duration)
                .image_url(self.art)
                .preview_url(self.download_url.clone())
                .download_url(self.download_url)
                .genre(genre)
                .license(Some(LICENSE))
                .build(),
        )
    }
}

/// Accepts `{"results": [...]}` or a bare array
fn to_tracks(body: Value) -> Vec<Track> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Upload>(item).ok())
        .filter_map(Upload::into_track)
        .collect()
}

#[derive(Debug)]
pub struct CcMixterAdapter {
    http: HttpClient,
    base_url: String,
}

impl CcMixterAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CcMixterAdapter {
    fn id(&self) -> SourceId {
        SourceId::CcMixter
    }

    fn name(&self) -> &str {
        "ccMixter"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let url = format!("{}/query", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("limit", page_size.to_string()),
            ("offset", page_offset(page, page_size).to_string()),
            ("f", "json".to_string()),
        ];
        let body: Value = self.http.get_json(&url, &params).await?;
        Ok(to_tracks(body))
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.search(TRENDING_SEED, 1, limit).await
    }
}
