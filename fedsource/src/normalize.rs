//! Track record normalizer
//!
//! Providers disagree on almost everything: field names, whether numbers are
//! sent as strings, whether a language is a string or a list. Adapters
//! deserialize their payloads into lenient `#[serde(default)]` structs using
//! the helpers below, then hand the raw values to [`TrackBuilder`] which
//! applies the canonical defaults.

use crate::track::{SourceId, Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;

/// Builder turning provider fields into a canonical [`Track`]
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    source: SourceId,
    native_id: String,
    name: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    duration_ms: u64,
    image_url: Option<String>,
    preview_url: Option<String>,
    download_url: Option<String>,
    genre: Option<String>,
    language: Option<String>,
    license: Option<String>,
}

/// Trims and drops blank strings
fn clean<S: Into<String>>(value: Option<S>) -> Option<String> {
    value
        .map(Into::into)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TrackBuilder {
    /// Starts a track for `source`; the final id is `<prefix>_<native_id>`
    pub fn new(source: SourceId, native_id: impl Display) -> Self {
        Self {
            source,
            native_id: native_id.to_string(),
            name: None,
            artist: None,
            album: None,
            duration_ms: 0,
            image_url: None,
            preview_url: None,
            download_url: None,
            genre: None,
            language: None,
            license: None,
        }
    }

    pub fn name<S: Into<String>>(mut self, name: Option<S>) -> Self {
        self.name = clean(name);
        self
    }

    pub fn artist<S: Into<String>>(mut self, artist: Option<S>) -> Self {
        self.artist = clean(artist);
        self
    }

    pub fn album<S: Into<String>>(mut self, album: Option<S>) -> Self {
        self.album = clean(album);
        self
    }

    /// Duration in seconds; negative or non-finite values count as unknown
    pub fn duration_secs(mut self, secs: Option<f64>) -> Self {
        self.duration_ms = secs
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| (s * 1000.0).round() as u64)
            .unwrap_or(0);
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn image_url<S: Into<String>>(mut self, url: Option<S>) -> Self {
        self.image_url = clean(url);
        self
    }

    pub fn preview_url<S: Into<String>>(mut self, url: Option<S>) -> Self {
        self.preview_url = clean(url);
        self
    }

    pub fn download_url<S: Into<String>>(mut self, url: Option<S>) -> Self {
        self.download_url = clean(url);
        self
    }

    pub fn genre<S: Into<String>>(mut self, genre: Option<S>) -> Self {
        self.genre = clean(genre);
        self
    }

    pub fn language<S: Into<String>>(mut self, language: Option<S>) -> Self {
        self.language = clean(language);
        self
    }

    pub fn license<S: Into<String>>(mut self, license: Option<S>) -> Self {
        self.license = clean(license);
        self
    }

    /// Builds the track, filling display sentinels for missing strings
    pub fn build(self) -> Track {
        Track {
            id: format!("{}_{}", self.source.id_prefix(), self.native_id),
            name: self.name.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: self.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: self.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            duration_ms: self.duration_ms,
            image_url: self.image_url,
            preview_url: self.preview_url,
            download_url: self.download_url,
            source: self.source,
            genre: self.genre,
            language: self.language,
            license: self.license,
        }
    }
}

/// Returns the first non-blank value
pub fn first_non_empty<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    values
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

// ============================================================================
// Lenient serde helpers
// ============================================================================

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.into_iter().find_map(value_to_string),
        Value::Object(mut map) => map.remove("name").and_then(value_to_string),
        Value::Null => None,
    }
}

fn value_to_f64(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Accepts a string, a number, a boolean, a `{name}` object or a list
/// (first usable element)
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

/// Accepts a number or a numeric string
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_f64))
}

/// Accepts a list of strings, a comma separated string, or nothing
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts a boolean, 0/1 or "true"/"false"
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1" | "yes"),
        _ => false,
    })
}
