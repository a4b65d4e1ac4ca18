//! Musiq adapter (Indian catalog through community mirrors)
//!
//! The catalog is only reachable through unofficial mirrors which frequently
//! disappear, so this source is the main client of the circuit breaker.
//! Mirrors expose the search either at `/search/songs` or at
//! `/api/search/songs` depending on their version; both are tried.

use crate::http::{HttpClient, trim_base};
use crate::settings::MusiqSettings;
use fedsource::{
    AdapterCapabilities, MirrorSet, Result, SourceAdapter, SourceError, SourceId, Track,
    TrackBuilder, lenient_f64, lenient_string,
};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Known catalog mirrors
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://saavn.me",
    "https://saavn.dev",
    "https://jio-saavn-api.vercel.app",
    "https://saavn-api.vercel.app",
    "https://saavn-api-git-main.vercel.app",
    "https://saavn-api-eta.vercel.app",
];

/// Language assumed when a song carries none
pub const DEFAULT_LANGUAGE: &str = "hindi";

/// Seed queries used to build a trending list
pub const TRENDING_SEEDS: &[&str] = &[
    "hindi",
    "bollywood",
    "punjabi",
    "tamil",
    "telugu",
    "malayalam",
    "arijit singh",
    "jubin nautiyal",
    "pritam",
    "ar rahman",
    "anirudh",
    "shreya ghoshal",
];

const SEARCH_PATHS: &[&str] = &["/search/songs", "/api/search/songs"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Album {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Song {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(alias = "title")]
    name: Option<String>,
    #[serde(rename = "primaryArtists", deserialize_with = "lenient_string")]
    primary_artists: Option<String>,
    artists: Value,
    album: Option<Album>,
    #[serde(deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    image: Value,
    #[serde(rename = "downloadUrl")]
    download_url: Value,
    #[serde(deserialize_with = "lenient_string")]
    genre: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    language: Option<String>,
    #[serde(rename = "primaryLanguages", deserialize_with = "lenient_string")]
    primary_languages: Option<String>,
}

/// Joins artist names from either `[{name}]` or `{primary: [{name}]}`
fn artist_names(artists: &Value) -> Option<String> {
    let list = match artists {
        Value::Array(items) => items,
        Value::Object(map) => map.get("primary")?.as_array()?,
        _ => return None,
    };
    let names: Vec<&str> = list
        .iter()
        .filter_map(|a| a.get("name").and_then(Value::as_str))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// Link at `preferred` (or the first one) in a `[{link|url}]` list
fn pick_link(value: &Value, preferred: usize) -> Option<String> {
    let list = match value {
        Value::String(s) => return Some(s.clone()),
        Value::Array(items) => items,
        _ => return None,
    };
    let link = |item: &Value| {
        item.get("link")
            .or_else(|| item.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    list.get(preferred)
        .and_then(link)
        .or_else(|| list.first().and_then(link))
}

/// Extracts the result list from `data.results` or `results`
fn extract_results(body: Value) -> Result<Vec<Value>> {
    let results = body
        .pointer("/data/results")
        .or_else(|| body.get("results"))
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    match results {
        Value::Array(items) => Ok(items),
        _ => Err(SourceError::other("unexpected musiq payload")),
    }
}

#[derive(Debug)]
pub struct MusiqAdapter {
    http: HttpClient,
    mirrors: MirrorSet,
    default_language: String,
}

impl MusiqAdapter {
    pub fn new(http: HttpClient, settings: &MusiqSettings, mirrors: MirrorSet) -> Self {
        Self {
            http,
            mirrors,
            default_language: settings.default_language.clone(),
        }
    }

    /// Adapter trying `mirrors` in the given order
    pub fn with_mirrors(http: HttpClient, mirrors: Vec<String>) -> Self {
        Self {
            http,
            mirrors: MirrorSet::new("musiq", mirrors),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Tries each search path of one mirror, splitting `budget` between them
    async fn fetch_from(
        &self,
        base: &str,
        query: &str,
        page: u32,
        budget: Duration,
    ) -> Result<Vec<Value>> {
        let base = trim_base(base);
        let path_timeout = budget / SEARCH_PATHS.len() as u32;
        let params = [("query", query.to_string()), ("page", page.to_string())];
        let mut last = None;
        for path in SEARCH_PATHS {
            let url = format!("{base}{path}");
            match self
                .http
                .get_json_timeout::<Value, _>(&url, &params, path_timeout)
                .await
                .and_then(extract_results)
            {
                Ok(items) => return Ok(items),
                Err(e) => {
                    debug!(url = %url, error = %e, "Musiq path failed");
                    last = Some(e);
                }
            }
        }
        Err(last.unwrap_or_else(|| SourceError::other("no search path")))
    }

    fn to_track(&self, raw: Value) -> Option<Track> {
        let song: Song = serde_json::from_value(raw).ok()?;
        let id = song.id?;
        let url = pick_link(&song.download_url, 4);
        let artist = song.primary_artists.or_else(|| artist_names(&song.artists));
        let language = song
            .language
            .or(song.primary_languages)
            .or_else(|| Some(self.default_language.clone()));
        Some(
            TrackBuilder::new(SourceId::Musiq, id)
                .name(song.name)
                .artist(artist)
                .album(song.album.and_then(|a| a.name).or_else(|| Some("Single".to_string())))
                .duration_secs(song.duration)
                .image_url(pick_link(&song.image, 2))
                .preview_url(url.clone())
                .download_url(url)
                .genre(song.genre)
                .language(language)
                .build(),
        )
    }
}

#[async_trait::async_trait]
impl SourceAdapter for MusiqAdapter {
    fn id(&self) -> SourceId {
        SourceId::Musiq
    }

    fn name(&self) -> &str {
        "Musiq"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        let items = self
            .mirrors
            .try_each(move |base, budget| async move {
                self.fetch_from(&base, query, page, budget).await
            })
            .await?;
        Ok(items
            .into_iter()
            .take(page_size as usize)
            .filter_map(|raw| self.to_track(raw))
            .collect())
    }

    /// Searches a randomly picked seed query
    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        let seed = TRENDING_SEEDS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(DEFAULT_LANGUAGE);
        self.search(seed, 1, limit).await
    }

    fn invalidate(&self) {
        self.mirrors.reset();
    }
}
