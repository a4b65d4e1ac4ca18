//! Canonical track record and source identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel used when a provider does not give a title
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Sentinel used when a provider does not give an artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Sentinel used when a provider does not give an album
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

// ============================================================================
// Source identifiers
// ============================================================================

/// Identifies the adapter a track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Audius,
    Jamendo,
    Radio,
    Musiq,
    Archive,
    Youtube,
    Deezer,
    Openverse,
    Gateway,
    Fma,
    CcMixter,
    Freesound,
    #[serde(rename = "internet_archive")]
    InternetArchive,
    Incompetech,
    Bensound,
    /// Static fallback content
    Demo,
}

impl SourceId {
    /// Every known source, in registration order
    pub const ALL: [SourceId; 16] = [
        SourceId::Audius,
        SourceId::Jamendo,
        SourceId::Radio,
        SourceId::Musiq,
        SourceId::Archive,
        SourceId::Youtube,
        SourceId::Deezer,
        SourceId::Openverse,
        SourceId::Gateway,
        SourceId::Fma,
        SourceId::CcMixter,
        SourceId::Freesound,
        SourceId::InternetArchive,
        SourceId::Incompetech,
        SourceId::Bensound,
        SourceId::Demo,
    ];

    /// Stable string identifier (used in config keys, filters and JSON)
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Audius => "audius",
            SourceId::Jamendo => "jamendo",
            SourceId::Radio => "radio",
            SourceId::Musiq => "musiq",
            SourceId::Archive => "archive",
            SourceId::Youtube => "youtube",
            SourceId::Deezer => "deezer",
            SourceId::Openverse => "openverse",
            SourceId::Gateway => "gateway",
            SourceId::Fma => "fma",
            SourceId::CcMixter => "ccmixter",
            SourceId::Freesound => "freesound",
            SourceId::InternetArchive => "internet_archive",
            SourceId::Incompetech => "incompetech",
            SourceId::Bensound => "bensound",
            SourceId::Demo => "demo",
        }
    }

    /// Prefix put in front of the native id to build a [`Track::id`]
    ///
    /// Prefixes are unique per source and never contain `_`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SourceId::Youtube => "yt",
            SourceId::Deezer => "dz",
            SourceId::Openverse => "ov",
            SourceId::InternetArchive => "ia",
            other => other.as_str(),
        }
    }

    /// Finds the source of a track from its prefixed id
    pub fn from_track_id(track_id: &str) -> Option<SourceId> {
        let prefix = track_id.split('_').next()?;
        SourceId::ALL
            .iter()
            .copied()
            .find(|source| source.id_prefix() == prefix)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SourceId::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == needle)
            .ok_or(UnknownSource(needle))
    }
}

// ============================================================================
// Track
// ============================================================================

/// Canonical track record produced by every adapter
///
/// Tracks are built through [`crate::TrackBuilder`], which applies the
/// defaults for missing fields, and are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Source-prefixed identifier (e.g. `audius_123`)
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    /// Duration in milliseconds, 0 for live streams or unknown length
    pub duration_ms: u64,
    pub image_url: Option<String>,
    /// Streamable URL; tracks without it are not playable
    pub preview_url: Option<String>,
    pub download_url: Option<String>,
    pub source: SourceId,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
}

impl Track {
    /// Whether the track can be played (has a preview URL)
    pub fn is_playable(&self) -> bool {
        self.preview_url.is_some()
    }

    /// Whether the track can be downloaded
    pub fn is_downloadable(&self) -> bool {
        self.download_url.is_some()
    }

    /// Source recovered from the id prefix
    pub fn provenance(&self) -> Option<SourceId> {
        SourceId::from_track_id(&self.id)
    }

    /// Lower-cased language, empty when unknown
    pub fn language_lowercase(&self) -> String {
        self.language
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_roundtrip_through_str() {
        for source in SourceId::ALL {
            assert_eq!(source.as_str().parse::<SourceId>().unwrap(), source);
        }
        assert_eq!(" Musiq ".parse::<SourceId>().unwrap(), SourceId::Musiq);
        assert!("spotify".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_id_prefixes_are_unique() {
        let mut prefixes: Vec<_> = SourceId::ALL.iter().map(|s| s.id_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), SourceId::ALL.len());
        assert!(prefixes.iter().all(|p| !p.contains('_')));
    }

    #[test]
    fn test_provenance_from_track_id() {
        assert_eq!(SourceId::from_track_id("audius_abc"), Some(SourceId::Audius));
        assert_eq!(SourceId::from_track_id("yt_xyz"), Some(SourceId::Youtube));
        assert_eq!(
            SourceId::from_track_id("ia_some_identifier"),
            Some(SourceId::InternetArchive)
        );
        assert_eq!(SourceId::from_track_id("nope_1"), None);
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(
            serde_json::to_string(&SourceId::InternetArchive).unwrap(),
            "\"internet_archive\""
        );
        assert_eq!(serde_json::to_string(&SourceId::CcMixter).unwrap(), "\"ccmixter\"");
        assert_eq!(serde_json::to_string(&SourceId::Youtube).unwrap(), "\"youtube\"");
    }
}
