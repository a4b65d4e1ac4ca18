//! Jamendo adapter (Creative Commons catalog)

use crate::http::{HttpClient, page_offset, trim_base};
use crate::settings::JamendoSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_f64,
    lenient_string,
};
use serde::Deserialize;

/// Default Jamendo API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.jamendo.com/v3.0";

/// Public client id usable without registration
pub const DEFAULT_CLIENT_ID: &str = "e4686ec0";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    results: Vec<JamendoTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Genres {
    genres: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MusicInfo {
    tags: Genres,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JamendoTrack {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    name: Option<String>,
    artist_name: Option<String>,
    album_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    image: Option<String>,
    audio: Option<String>,
    audiodownload: Option<String>,
    license_ccurl: Option<String>,
    musicinfo: MusicInfo,
}

impl JamendoTrack {
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let download = self.audiodownload.or_else(|| self.audio.clone());
        Some(
            TrackBuilder::new(SourceId::Jamendo, id)
                .name(self.name)
                .artist(self.artist_name)
                .album(self.album_name)
                .duration_secs(self.duration)
                .image_url(self.image)
                .preview_url(self.audio)
                .download_url(download)
                .genre(self.musicinfo.tags.genres.into_iter().next())
                .license(self.license_ccurl)
                .build(),
        )
    }
}

#[derive(Debug)]
pub struct JamendoAdapter {
    http: HttpClient,
    base_url: String,
    client_id: String,
}

impl JamendoAdapter {
    pub fn new(http: HttpClient, settings: &JamendoSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
            client_id: settings.client_id.clone(),
        }
    }

    async fn tracks(&self, extra: Vec<(&str, String)>) -> Result<Vec<Track>> {
        let mut query = vec![
            ("client_id", self.client_id.clone()),
            ("format", "json".to_string()),
            ("include", "musicinfo".to_string()),
            ("audioformat", "mp31".to_string()),
        ];
        query.extend(extra);

        let url = format!("{}/tracks/", self.base_url);
        let response: Response = self.http.get_json(&url, &query).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(JamendoTrack::into_track)
            .collect())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for JamendoAdapter {
    fn id(&self) -> SourceId {
        SourceId::Jamendo
    }

    fn name(&self) -> &str {
        "Jamendo"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.tracks(vec![
            ("search", query.to_string()),
            ("limit", page_size.to_string()),
            ("offset", page_offset(page, page_size).to_string()),
        ])
        .await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.tracks(vec![
            ("limit", limit.to_string()),
            ("order", "popularity_week".to_string()),
        ])
        .await
    }
}
