//! Free Music Archive adapter
//!
//! The archive has no trending endpoint; trending is a search on a fixed
//! seed query.

use crate::http::{HttpClient, trim_base};
use crate::settings::EndpointSettings;
use fedsource::{
    AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder, lenient_f64,
    lenient_string,
};
use serde::Deserialize;

/// Default Free Music Archive API base URL
pub const DEFAULT_BASE_URL: &str = "https://freemusicarchive.org/api";

/// Seed query used for trending
pub const TRENDING_SEED: &str = "creative commons";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    dataset: Vec<FmaTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FmaTrack {
    #[serde(deserialize_with = "lenient_string")]
    track_id: Option<String>,
    track_title: Option<String>,
    artist_name: Option<String>,
    album_title: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    track_duration: Option<f64>,
    track_image_file: Option<String>,
    track_file: Option<String>,
    genre_handle: Option<String>,
    track_license: Option<String>,
}

impl FmaTrack {
    fn into_track(self) -> Option<Track> {
        let id = self.track_id?;
        Some(
            TrackBuilder::new(SourceId::Fma, id)
                .name(self.track_title)
                .artist(self.artist_name)
                .album(self.album_title.or_else(|| Some("Free Music Archive".to_string())))
                .duration_secs(self.track_duration)
                .image_url(self.track_image_file)
                .preview_url(self.track_file.clone())
                .download_url(self.track_file)
                .genre(self.genre_handle)
                .license(self.track_license)
                .build(),
        )
    }
}

#[derive(Debug)]
pub struct FmaAdapter {
    http: HttpClient,
    base_url: String,
}

impl FmaAdapter {
    pub fn new(http: HttpClient, settings: &EndpointSettings) -> Self {
        Self {
            http,
            base_url: trim_base(&settings.base_url),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for FmaAdapter {
    fn id(&self) -> SourceId {
        SourceId::Fma
    }

    fn name(&self) -> &str {
        "Free Music Archive"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let url = format!("{}/tracks", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("limit", page_size.to_string()),
            ("page", page.to_string()),
        ];
        let response: Response = self.http.get_json(&url, &params).await?;
        Ok(response
            .dataset
            .into_iter()
            .filter_map(FmaTrack::into_track)
            .collect())
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.search(TRENDING_SEED, 1, limit).await
    }
}
