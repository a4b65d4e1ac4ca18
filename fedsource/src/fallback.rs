//! Static fallback content
//!
//! Always-available tracks returned when no live provider yields anything
//! usable. Every track is tagged [`SourceId::Demo`] with an id of the form
//! `demo_<family>_<n>`, so fallback content can never be mistaken for (or
//! deduplicated against) real provider results.

use crate::normalize::TrackBuilder;
use crate::track::{SourceId, Track};

const SAMPLE_700K: &str =
    "https://file-examples.com/storage/fe68c17451deb8b63ffe1ba/2017/11/file_example_MP3_700KB.mp3";
const SAMPLE_1M: &str =
    "https://file-examples.com/storage/fe68c17451deb8b63ffe1ba/2017/11/file_example_MP3_1MG.mp3";
const SAMPLE_2M: &str =
    "https://file-examples.com/storage/fe68c17451deb8b63ffe1ba/2017/11/file_example_MP3_2MG.mp3";

struct DemoEntry {
    name: &'static str,
    artist: &'static str,
    album: &'static str,
    duration_ms: u64,
    url: &'static str,
    downloadable: bool,
    genre: &'static str,
    language: Option<&'static str>,
    license: Option<&'static str>,
}

const fn entry(
    name: &'static str,
    artist: &'static str,
    album: &'static str,
    duration_ms: u64,
    url: &'static str,
    genre: &'static str,
) -> DemoEntry {
    DemoEntry {
        name,
        artist,
        album,
        duration_ms,
        url,
        downloadable: true,
        genre,
        language: None,
        license: None,
    }
}

const GENERIC: &[DemoEntry] = &[
    entry("Sample Audio", "Demo Artist", "Test Collection", 30_000, SAMPLE_700K, "Demo"),
    entry("Test Music", "Sample Artist", "Audio Tests", 25_000, SAMPLE_1M, "Sample"),
    entry("Audio Example", "Example Artist", "Demo Album", 20_000, SAMPLE_2M, "Example"),
];

const INDIAN: &[DemoEntry] = &[
    DemoEntry {
        language: Some("hindi"),
        ..entry("Bollywood Hits 2024", "Various Artists", "Indian Music Collection", 180_000, SAMPLE_700K, "Bollywood")
    },
    DemoEntry {
        language: Some("hindi"),
        ..entry("Hindi Romantic Songs", "Bollywood Stars", "Love Collection", 200_000, SAMPLE_1M, "Hindi")
    },
    DemoEntry {
        language: Some("punjabi"),
        ..entry("Punjabi Beats", "Punjabi Artists", "Punjabi Collection", 160_000, SAMPLE_2M, "Punjabi")
    },
];

const VIDEO: &[DemoEntry] = &[
    DemoEntry {
        language: Some("hindi"),
        ..entry("Bollywood Hits 2024 - Demo", "Various Artists", "Video Music Demo", 180_000, SAMPLE_700K, "Bollywood")
    },
    DemoEntry {
        language: Some("hindi"),
        ..entry("Hindi Romantic Songs - Demo", "Bollywood Stars", "Video Music Demo", 180_000, SAMPLE_1M, "Hindi")
    },
    DemoEntry {
        language: Some("hindi"),
        ..entry("Punjabi Beats - Demo", "Punjabi Artists", "Video Music Demo", 180_000, SAMPLE_2M, "Punjabi")
    },
    DemoEntry {
        language: Some("english"),
        ..entry("English Pop Hits - Demo", "International Stars", "Video Music Demo", 180_000, SAMPLE_700K, "Pop")
    },
    DemoEntry {
        language: Some("hindi"),
        ..entry("Tamil Melodies - Demo", "Tamil Artists", "Video Music Demo", 180_000, SAMPLE_1M, "Tamil")
    },
];

const CHART: &[DemoEntry] = &[
    DemoEntry {
        downloadable: false,
        language: Some("english"),
        ..entry("Popular Pop Hits", "Various Artists", "Pop Collection", 180_000, SAMPLE_700K, "Pop")
    },
    DemoEntry {
        downloadable: false,
        language: Some("english"),
        ..entry("Hip Hop Classics", "Hip Hop Artists", "Hip Hop", 200_000, SAMPLE_1M, "Hip Hop")
    },
    DemoEntry {
        downloadable: false,
        language: Some("english"),
        ..entry("Electronic Beats", "EDM Producers", "Electronic", 160_000, SAMPLE_2M, "Electronic")
    },
    DemoEntry {
        downloadable: false,
        language: Some("english"),
        ..entry("Rock Anthems", "Rock Bands", "Rock", 220_000, SAMPLE_700K, "Rock")
    },
    DemoEntry {
        downloadable: false,
        language: Some("english"),
        ..entry("R&B Soul", "R&B Artists", "R&B", 190_000, SAMPLE_1M, "R&B")
    },
];

const COMMONS: &[DemoEntry] = &[
    DemoEntry {
        language: Some("english"),
        license: Some("CC"),
        ..entry("Creative Commons Music", "CC Artists", "Openverse Collection", 180_000, SAMPLE_700K, "Creative Commons")
    },
    DemoEntry {
        language: Some("english"),
        license: Some("PD"),
        ..entry("Public Domain Audio", "Public Domain", "Openverse PD", 200_000, SAMPLE_1M, "Public Domain")
    },
];

/// Families of demo content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Generic,
    Indian,
    Video,
    Chart,
    Commons,
}

impl Family {
    fn tag(self) -> &'static str {
        match self {
            Family::Generic => "generic",
            Family::Indian => "indian",
            Family::Video => "yt",
            Family::Chart => "dz",
            Family::Commons => "ov",
        }
    }

    fn entries(self) -> &'static [DemoEntry] {
        match self {
            Family::Generic => GENERIC,
            Family::Indian => INDIAN,
            Family::Video => VIDEO,
            Family::Chart => CHART,
            Family::Commons => COMMONS,
        }
    }

    fn tracks(self) -> Vec<Track> {
        self.entries()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let url = Some(e.url);
                TrackBuilder::new(SourceId::Demo, format!("{}_{}", self.tag(), i + 1))
                    .name(Some(e.name))
                    .artist(Some(e.artist))
                    .album(Some(e.album))
                    .duration_ms(e.duration_ms)
                    .preview_url(url)
                    .download_url(url.filter(|_| e.downloadable))
                    .genre(Some(e.genre))
                    .language(e.language)
                    .license(e.license)
                    .build()
            })
            .collect()
    }
}

fn matches_query(track: &Track, needle: &str) -> bool {
    track.name.to_lowercase().contains(needle)
        || track.artist.to_lowercase().contains(needle)
        || track
            .genre
            .as_deref()
            .is_some_and(|g| g.to_lowercase().contains(needle))
}

/// Narrows `tracks` to the ones matching `query`, keeping them all when
/// nothing matches
fn filter_or_all(tracks: Vec<Track>, query: Option<&str>) -> Vec<Track> {
    let needle = match query.map(|q| q.trim().to_lowercase()) {
        Some(q) if !q.is_empty() => q,
        _ => return tracks,
    };
    let filtered: Vec<Track> = tracks
        .iter()
        .filter(|t| matches_query(t, &needle))
        .cloned()
        .collect();
    if filtered.is_empty() { tracks } else { filtered }
}

/// Static, always-available content
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    pub fn new() -> Self {
        Self
    }

    /// The generic demo tracks followed by the Indian-catalog ones
    pub fn global(&self, limit: usize) -> Vec<Track> {
        let mut tracks = Family::Generic.tracks();
        tracks.extend(Family::Indian.tracks());
        tracks.truncate(limit);
        tracks
    }

    /// Fallback content standing in for one source
    ///
    /// `query` is `None` for trending requests.
    pub fn for_source(&self, source: SourceId, query: Option<&str>, limit: usize) -> Vec<Track> {
        let family = match source {
            SourceId::Musiq => Family::Indian,
            SourceId::Youtube => Family::Video,
            SourceId::Deezer => Family::Chart,
            SourceId::Openverse => Family::Commons,
            _ => {
                let mut tracks = Family::Generic.tracks();
                tracks.truncate(limit);
                return tracks;
            }
        };
        let mut tracks = filter_or_all(family.tracks(), query);
        tracks.truncate(limit);
        tracks
    }
}
