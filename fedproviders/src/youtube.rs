//! Video-platform music adapter, reached through unofficial proxies
//!
//! Proxies often answer with an empty list when they are rate limited, so an
//! empty answer moves on to the next proxy. Results link to the watch page
//! and are never downloadable.

use crate::http::HttpClient;
use fedsource::{
    AdapterCapabilities, MirrorSet, Result, SourceAdapter, SourceId, Track, TrackBuilder,
    first_non_empty, lenient_f64, lenient_string,
};
use serde::Deserialize;
use serde_json::Value;

/// Known public proxies
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://ytmusicapi.vercel.app",
    "https://ytmusicapi-git-main.vercel.app",
    "https://ytmusicapi-git-develop.vercel.app",
    "https://ytmusicapi-git-master.vercel.app",
];

const WATCH_URL: &str = "https://music.youtube.com/watch?v=";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoItem {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    name: Option<String>,
    title: Option<String>,
    artist: Value,
    album: Value,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    artwork_url: Option<String>,
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnail {
    url: Option<String>,
}

/// Either a plain string or an object with a `name`
fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

impl VideoItem {
    fn into_track(self) -> Option<Track> {
        let id = first_non_empty([self.video_id.as_deref(), self.id.as_deref()])?.to_string();
        let name = first_non_empty([self.name.as_deref(), self.title.as_deref()]).map(str::to_string);
        let image = self
            .artwork_url
            .or_else(|| self.thumbnails.into_iter().find_map(|t| t.url));
        Some(
            TrackBuilder::new(SourceId::Youtube, &id)
                .name(name)
                .artist(name_of(&self.artist))
                .album(name_of(&self.album).or_else(|| Some("YouTube Music".to_string())))
                .duration_secs(self.duration)
                .image_url(image)
                .preview_url(Some(format!("{WATCH_URL}{id}")))
                .genre(Some("YouTube Music"))
                .build(),
        )
    }
}

fn to_tracks(items: Vec<VideoItem>, limit: u32) -> Vec<Track> {
    items
        .into_iter()
        .take(limit as usize)
        .filter_map(VideoItem::into_track)
        .collect()
}

#[derive(Debug)]
pub struct YoutubeAdapter {
    http: HttpClient,
    mirrors: MirrorSet,
}

impl YoutubeAdapter {
    pub fn new(http: HttpClient, mirrors: MirrorSet) -> Self {
        Self { http, mirrors }
    }

    async fn fetch(&self, path: &str, query: Vec<(&str, String)>, limit: u32) -> Result<Vec<Track>> {
        let http = &self.http;
        let query = &query;
        self.mirrors
            .try_each_non_empty(move |base, _| async move {
                let url = format!("{base}{path}");
                let items: Vec<VideoItem> = http.get_json(&url, query).await?;
                Ok(to_tracks(items, limit))
            })
            .await
    }
}

#[async_trait::async_trait]
impl SourceAdapter for YoutubeAdapter {
    fn id(&self) -> SourceId {
        SourceId::Youtube
    }

    fn name(&self) -> &str {
        "YouTube Music"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::search_and_trending()
    }

    async fn search(&self, query: &str, _page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.fetch(
            "/search",
            vec![
                ("query", format!("{query} music")),
                ("type", "song".to_string()),
                ("limit", page_size.to_string()),
            ],
            page_size,
        )
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.fetch("/trending", vec![("limit", limit.to_string())], limit)
            .await
    }

    fn invalidate(&self) {
        self.mirrors.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_item_normalization() {
        let items: Vec<VideoItem> = serde_json::from_value(json!([
            {"videoId": "abc", "title": "Song", "artist": {"name": "Band"}, "duration": 200,
             "thumbnails": [{"url": "thumb"}]},
            {"id": "def", "name": "Other", "artist": "Solo", "album": {"name": "LP"}},
            {"name": "no id"}
        ]))
        .unwrap();

        let tracks = to_tracks(items, 10);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "yt_abc");
        assert_eq!(tracks[0].artist, "Band");
        assert_eq!(tracks[0].album, "YouTube Music");
        assert_eq!(tracks[0].image_url.as_deref(), Some("thumb"));
        assert_eq!(
            tracks[0].preview_url.as_deref(),
            Some("https://music.youtube.com/watch?v=abc")
        );
        assert!(tracks[0].download_url.is_none());
        assert_eq!(tracks[1].artist, "Solo");
        assert_eq!(tracks[1].album, "LP");
    }
}
