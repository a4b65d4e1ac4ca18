//! Deezer adapter (public API, 30 second previews)
//!
//! The API is reached directly first and through a CORS relay afterwards.
//! Tracks without a preview are dropped and none is ever downloadable.

use crate::http::{HttpClient, page_offset};
use fedsource::{
    AdapterCapabilities, MirrorSet, Result, SourceAdapter, SourceId, Track, TrackBuilder,
    lenient_f64, lenient_string,
};
use serde::Deserialize;

/// Direct API then relay, each a prefix for the API paths
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://api.deezer.com",
    "https://cors-anywhere.herokuapp.com/https://api.deezer.com",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeezerAlbum {
    title: Option<String>,
    cover_medium: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeezerTrack {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    title: Option<String>,
    artist: Named,
    album: DeezerAlbum,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    preview: Option<String>,
}

impl DeezerTrack {
    fn into_track(self, genre: &str) -> Option<Track> {
        let id = self.id?;
        let preview = self.preview.filter(|p| !p.trim().is_empty())?;
        Some(
            TrackBuilder::new(SourceId::Deezer, id)
                .name(self.title)
                .artist(self.artist.name)
                .album(self.album.title.or_else(|| Some("Deezer".to_string())))
                .duration_secs(self.duration)
                .image_url(self.album.cover_medium)
                .preview_url(Some(preview))
                .genre(Some(genre))
                .build(),
        )
    }
}

fn to_tracks(response: Response, genre: &str) -> Vec<Track> {
    response
        .data
        .into_iter()
        .filter_map(|t| t.into_track(genre))
        .collect()
}

#[derive(Debug)]
pub struct DeezerAdapter {
    http: HttpClient,
    mirrors: MirrorSet,
}

impl DeezerAdapter {
    pub fn new(http: HttpClient, mirrors: MirrorSet) -> Self {
        Self { http, mirrors }
    }

    async fn fetch(&self, path: &str, query: Vec<(&str, String)>, genre: &str) -> Result<Vec<Track>> {
        let http = &self.http;
        let query = &query;
        self.mirrors
            .try_each_non_empty(move |base, _| async move {
                let url = format!("{base}{path}");
                let response: Response = http.get_json(&url, query).await?;
                Ok(to_tracks(response, genre))
            })
            .await
    }
}

#[async_trait::async_trait]
impl SourceAdapter for DeezerAdapter {
    fn id(&self) -> SourceId {
        SourceId::Deezer
    }

    fn name(&self) -> &str {
        "Deezer"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::search_and_trending()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.fetch(
            "/search",
            vec![
                ("q", query.to_string()),
                ("limit", page_size.to_string()),
                ("index", page_offset(page, page_size).to_string()),
            ],
            "Deezer Music",
        )
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.fetch("/chart/0/tracks", vec![("limit", limit.to_string())], "Trending")
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
    fn test_tracks_without_preview_are_dropped() {
        let response: Response = serde_json::from_value(json!({
            "data": [
                {"id": 3135556, "title": "Harder", "duration": 224,
                 "artist": {"name": "Daft Punk"},
                 "album": {"title": "Discovery", "cover_medium": "cover"},
                 "preview": "https://cdns-preview.dzcdn.net/x.mp3"},
                {"id": 2, "title": "Silent", "preview": ""},
                {"id": 3, "title": "None"}
            ]
        }))
        .unwrap();

        let tracks = to_tracks(response, "Trending");
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "dz_3135556");
        assert_eq!(tracks[0].duration_ms, 224_000);
        assert_eq!(tracks[0].album, "Discovery");
        assert_eq!(tracks[0].genre.as_deref(), Some("Trending"));
        assert!(!tracks[0].is_downloadable());
    }
}
