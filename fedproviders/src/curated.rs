//! Curated royalty-free catalogs
//!
//! Incompetech and Bensound publish no API. Both adapters serve a small
//! built-in list: search filters it by name or genre and falls back to the
//! whole list, trending returns it as is.

use fedsource::{AdapterCapabilities, Result, SourceAdapter, SourceId, Track, TrackBuilder};

#[derive(Debug, Clone, Copy)]
struct CatalogEntry {
    native_id: u32,
    name: &'static str,
    artist: &'static str,
    album: &'static str,
    duration_ms: u64,
    url: &'static str,
    genre: &'static str,
    license: &'static str,
}

const INCOMPETECH: &[CatalogEntry] = &[
    CatalogEntry {
        native_id: 1,
        name: "Acoustic Breeze",
        artist: "Kevin MacLeod",
        album: "Incompetech",
        duration_ms: 160_000,
        url: "https://incompetech.com/music/royalty-free/mp3-royaltyfree/Acoustic%20Breeze.mp3",
        genre: "Acoustic",
        license: "CC-BY",
    },
    CatalogEntry {
        native_id: 2,
        name: "Jazz Comedy",
        artist: "Kevin MacLeod",
        album: "Incompetech",
        duration_ms: 120_000,
        url: "https://incompetech.com/music/royalty-free/mp3-royaltyfree/Jazz%20Comedy.mp3",
        genre: "Jazz",
        license: "CC-BY",
    },
];

const BENSOUND: &[CatalogEntry] = &[
    CatalogEntry {
        native_id: 1,
        name: "Creative Minds",
        artist: "Bensound",
        album: "Bensound Collection",
        duration_ms: 140_000,
        url: "https://www.bensound.com/bensound-music/bensound-creativeminds.mp3",
        genre: "Corporate",
        license: "Royalty-Free",
    },
    CatalogEntry {
        native_id: 2,
        name: "Summer",
        artist: "Bensound",
        album: "Bensound Collection",
        duration_ms: 180_000,
        url: "https://www.bensound.com/bensound-music/bensound-summer.mp3",
        genre: "Pop",
        license: "Royalty-Free",
    },
];

impl CatalogEntry {
    fn to_track(self, source: SourceId) -> Track {
        TrackBuilder::new(source, self.native_id)
            .name(Some(self.name))
            .artist(Some(self.artist))
            .album(Some(self.album))
            .duration_ms(self.duration_ms)
            .preview_url(Some(self.url))
            .download_url(Some(self.url))
            .genre(Some(self.genre))
            .license(Some(self.license))
            .build()
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.genre.to_lowercase().contains(needle)
    }
}

/// Adapter over a fixed catalog
#[derive(Debug, Clone, Copy)]
pub struct CuratedAdapter {
    source: SourceId,
    name: &'static str,
    catalog: &'static [CatalogEntry],
}

impl CuratedAdapter {
    /// Kevin MacLeod's royalty-free catalog
    pub fn incompetech() -> Self {
        Self {
            source: SourceId::Incompetech,
            name: "Incompetech",
            catalog: INCOMPETECH,
        }
    }

    pub fn bensound() -> Self {
        Self {
            source: SourceId::Bensound,
            name: "Bensound",
            catalog: BENSOUND,
        }
    }

    fn tracks<'a>(&self, entries: impl Iterator<Item = &'a CatalogEntry>, limit: u32) -> Vec<Track> {
        entries
            .take(limit as usize)
            .map(|e| e.to_track(self.source))
            .collect()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CuratedAdapter {
    fn id(&self) -> SourceId {
        self.source
    }

    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::full()
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<Vec<Track>> {
        if page > 1 {
            return Ok(Vec::new());
        }
        let needle = query.trim().to_lowercase();
        let matching: Vec<&CatalogEntry> = self.catalog.iter().filter(|e| e.matches(&needle)).collect();
        if matching.is_empty() {
            Ok(self.tracks(self.catalog.iter(), page_size))
        } else {
            Ok(self.tracks(matching.into_iter(), page_size))
        }
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        Ok(self.tracks(self.catalog.iter(), limit))
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }
}
