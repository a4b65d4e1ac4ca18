//! Optional self-hosted provider gateway
//!
//! The gateway is a proxy run next to the engine. It answers `/search` and
//! `/trending` with loosely shaped track objects, either under `results` or
//! as a top-level array. It is only registered when a base URL is
//! configured.

use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, first_non_empty,
    lenient_f64, lenient_string,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GatewayTrack {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "trackId", deserialize_with = "lenient_string")]
    track_id: Option<String>,
    #[serde(rename = "videoId", deserialize_with = "lenient_string")]
    video_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    uid: Option<String>,
    title: Option<String>,
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    artist: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    album: Option<String>,
    playlist: Option<String>,
    #[serde(rename = "durationMs", deserialize_with = "lenient_f64")]
    duration_ms: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    image: Option<String>,
    thumbnail: Option<String>,
    artwork: Option<String>,
    #[serde(rename = "streamUrl")]
    stream_url: Option<String>,
    url: Option<String>,
    #[serde(rename = "audioUrl")]
    audio_url: Option<String>,
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    genre: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    language: Option<String>,
}

fn first(values: [&Option<String>; 3]) -> Option<String> {
    first_non_empty(values.map(|v| v.as_deref())).map(str::to_string)
}

impl GatewayTrack {
    fn into_track(self) -> Option<Track> {
        let id = first_non_empty([
            self.id.as_deref(),
            self.track_id.as_deref(),
            self.video_id.as_deref(),
            self.uid.as_deref(),
        ])?
        .to_string();

        let mut builder = TrackBuilder::new(SourceId::Gateway, id)
            .name(first_non_empty([self.title.as_deref(), self.name.as_deref()]))
            .artist(first([&self.artist, &self.uploader, &self.channel]))
            .album(
                first_non_empty([self.album.as_deref(), self.playlist.as_deref()])
                    .or(Some("Single")),
            )
            .image_url(first([&self.image, &self.thumbnail, &self.artwork]))
            .preview_url(first([&self.stream_url, &self.url, &self.audio_url]))
            .download_url(self.download_url)
            .genre(self.genre)
            .language(self.language);

        builder = match self.duration_ms {
            Some(ms) if ms.is_finite() && ms > 0.0 => builder.duration_ms(ms as u64),
            _ => builder.duration_secs(self.duration),
        };
        Some(builder.build())
    }
}

/// Accepts `{"results": [...]}` or a bare array
fn extract_items(body: Value) -> Vec<GatewayTrack> {
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
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn to_tracks(body: Value) -> Vec<Track> {
    extract_items(body)
        .into_iter()
        .filter_map(GatewayTrack::into_track)
        .collect()
}

#[derive(Debug)]
pub struct GatewayAdapter {
    http: HttpClient,
    base_url: String,
}

impl GatewayAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Track>> {
        let url = format!("{}{}", self.base_url, path);
        let body: Value = self.http.get_json(&url, query).await?;
        Ok(to_tracks(body))
    }
}

#[async_trait::async_trait]
impl SourceAdapter for GatewayAdapter {
    fn id(&self) -> SourceId {
        SourceId::Gateway
    }

    fn name(&self) -> &str {
        "Provider Gateway"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.fetch(
            "/search",
            &[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("limit", page_size.to_string()),
                ("language", "all".to_string()),
            ],
        )
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.fetch(
            "/trending",
            &[("limit", limit.to_string()), ("language", "all".to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_both_layouts_are_accepted() {
        let wrapped = json!({"results": [{"id": 1, "title": "A", "streamUrl": "s"}]});
        let bare = json!([{"videoId": "v", "name": "B", "url": "u"}, {"title": "no id"}]);

        let a = to_tracks(wrapped);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].id, "gateway_1");
        assert_eq!(a[0].album, "Single");

        let b = to_tracks(bare);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].id, "gateway_v");
        assert_eq!(b[0].preview_url.as_deref(), Some("u"));
        assert!(to_tracks(json!("oops")).is_empty());
    }

    #[test]
    fn test_duration_prefers_milliseconds() {
        let tracks = to_tracks(json!([
            {"id": "a", "durationMs": 1500, "duration": 99},
            {"id": "b", "duration": "3"}
        ]));
        assert_eq!(tracks[0].duration_ms, 1500);
        assert_eq!(tracks[1].duration_ms, 3000);
        assert_eq!(tracks[0].source, SourceId::Gateway);
    }
}
