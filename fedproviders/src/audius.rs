//! Audius adapter
//!
//! Audius is served by a network of discovery nodes. The discovery endpoint
//! lists the healthy ones; one is picked at random and kept until an error
//! forces a new discovery.

use crate::http::{HttpClient, page_offset, trim_base};
use crate::settings::AudiusSettings;
use fedsource::{
    AdapterCapabilities, HostResolver, Result, SourceAdapter, SourceId, Track, TrackBuilder,
    lenient_bool, lenient_f64, lenient_string,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Default discovery endpoint
pub const DEFAULT_DISCOVERY_URL: &str = "https://api.audius.co";

/// Default `app_name` sent with every request
pub const DEFAULT_APP_NAME: &str = "fedmusic";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AudiusUser {
    name: Option<String>,
    handle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AudiusTrack {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    title: Option<String>,
    user: AudiusUser,
    #[serde(deserialize_with = "lenient_string")]
    album: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    artwork: Option<Value>,
    #[serde(deserialize_with = "lenient_bool")]
    downloadable: bool,
    #[serde(deserialize_with = "lenient_string")]
    genre: Option<String>,
}

/// Picks the largest artwork rendition
fn artwork_url(artwork: Option<&Value>) -> Option<String> {
    match artwork? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["480x480", "150x150", "1000x1000"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug)]
pub struct AudiusAdapter {
    http: HttpClient,
    discovery_url: String,
    app_name: String,
    resolver: HostResolver,
}

impl AudiusAdapter {
    pub fn new(http: HttpClient, settings: &AudiusSettings) -> Self {
        Self {
            http,
            discovery_url: trim_base(&settings.discovery_url),
            app_name: settings.app_name.clone(),
            resolver: HostResolver::new("audius"),
        }
    }

    /// Adapter bound to a fixed node, skipping discovery
    pub fn with_host(http: HttpClient, host: &str, app_name: &str) -> Self {
        Self {
            http,
            discovery_url: String::new(),
            app_name: app_name.to_string(),
            resolver: HostResolver::pinned("audius", trim_base(host)),
        }
    }

    async fn host(&self) -> Result<String> {
        let http = &self.http;
        let url = &self.discovery_url;
        self.resolver
            .resolve(|| async move {
                let hosts: Envelope<String> = http.get_json(url, &[] as &[(&str, &str)]).await?;
                Ok(hosts.data)
            })
            .await
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Track>> {
        let host = self.host().await?;
        let url = format!("{host}{path}");
        match self.http.get_json::<Envelope<AudiusTrack>, _>(&url, query).await {
            Ok(body) => Ok(self.to_tracks(&host, body.data)),
            Err(e) => {
                // The node may have left the network
                self.resolver.invalidate();
                Err(e)
            }
        }
    }

    fn to_tracks(&self, host: &str, tracks: Vec<AudiusTrack>) -> Vec<Track> {
        tracks
            .into_iter()
            .filter_map(|t| {
                let id = t.id?;
                let stream = format!("{host}/v1/tracks/{id}/stream?app_name={}", self.app_name);
                let download = t
                    .downloadable
                    .then(|| format!("{host}/v1/tracks/{id}/download?app_name={}", self.app_name));
                Some(
                    TrackBuilder::new(SourceId::Audius, &id)
                        .name(t.title)
                        .artist(t.user.name.or(t.user.handle))
                        .album(t.album.or_else(|| Some("Single".to_string())))
                        .duration_secs(t.duration)
                        .image_url(artwork_url(t.artwork.as_ref()))
                        .preview_url(Some(stream))
                        .download_url(download)
                        .genre(t.genre)
                        .build(),
                )
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for AudiusAdapter {
    fn id(&self) -> SourceId {
        SourceId::Audius
    }

    fn name(&self) -> &str {
        "Audius"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        debug!(query = %query, page, page_size, "Audius search");
        self.fetch(
            "/v1/tracks/search",
            &[
                ("query", query.to_string()),
                ("limit", page_size.to_string()),
                ("offset", page_offset(page, page_size).to_string()),
                ("app_name", self.app_name.clone()),
            ],
        )
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.fetch(
            "/v1/tracks/trending",
            &[
                ("limit", limit.to_string()),
                ("app_name", self.app_name.clone()),
            ],
        )
        .await
    }

    fn invalidate(&self) {
        self.resolver.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artwork_url_prefers_large_rendition() {
        let art = json!({"150x150": "small", "480x480": "large"});
        assert_eq!(artwork_url(Some(&art)).as_deref(), Some("large"));
        assert_eq!(artwork_url(Some(&json!("plain"))).as_deref(), Some("plain"));
        assert_eq!(artwork_url(Some(&json!(null))), None);
        assert_eq!(artwork_url(None), None);
    }

    #[test]
    fn test_to_tracks_builds_stream_and_download_urls() {
        let http = HttpClient::new().unwrap();
        let adapter = AudiusAdapter::with_host(http, "https://node.example/", "app");
        let raw: Vec<AudiusTrack> = serde_json::from_value(json!([
            {"id": "a1", "title": "One", "user": {"handle": "h"}, "duration": 61, "downloadable": true},
            {"id": "a2", "title": "Two", "user": {"name": "N"}, "downloadable": false},
            {"title": "no id"}
        ]))
        .unwrap();

        let tracks = adapter.to_tracks("https://node.example", raw);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "audius_a1");
        assert_eq!(tracks[0].artist, "h");
        assert_eq!(tracks[0].album, "Single");
        assert_eq!(tracks[0].duration_ms, 61_000);
        assert_eq!(
            tracks[0].preview_url.as_deref(),
            Some("https://node.example/v1/tracks/a1/stream?app_name=app")
        );
        assert_eq!(
            tracks[0].download_url.as_deref(),
            Some("https://node.example/v1/tracks/a1/download?app_name=app")
        );
        assert!(tracks[1].download_url.is_none());
    }
}
