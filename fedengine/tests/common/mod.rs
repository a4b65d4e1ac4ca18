//! Stub adapters shared by the engine integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use fedengine::{Aggregator, EngineSettings, ManualClock, MemoryStore, Presentation};
use fedsource::{AdapterCapabilities, Result, SourceAdapter, SourceError, SourceId, Track, TrackBuilder};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const START_MS: u64 = 1_700_000_000_000;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Fixed tracks, truncated to the requested size
    Tracks(Vec<Track>),
    /// `page_size` tracks whose ids are derived from the query
    Echo,
    Empty,
    Fail,
    /// Sleeps far longer than any test timeout
    Hang,
}

#[derive(Debug)]
pub struct StubAdapter {
    id: SourceId,
    behavior: Mutex<Behavior>,
    capabilities: AdapterCapabilities,
    probe_ok: bool,
    searches: AtomicU32,
    trendings: AtomicU32,
    queries: Mutex<Vec<String>>,
}

impl StubAdapter {
    pub fn new(id: SourceId, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Mutex::new(behavior),
            capabilities: AdapterCapabilities::search_and_trending(),
            probe_ok: true,
            searches: AtomicU32::new(0),
            trendings: AtomicU32::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn with_probe(id: SourceId, behavior: Behavior, probe_ok: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Mutex::new(behavior),
            capabilities: AdapterCapabilities::search_and_trending(),
            probe_ok,
            searches: AtomicU32::new(0),
            trendings: AtomicU32::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn searches(&self) -> u32 {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn trendings(&self) -> u32 {
        self.trendings.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> u32 {
        self.searches() + self.trendings()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    async fn answer(&self, query: &str, size: u32) -> Result<Vec<Track>> {
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Tracks(mut tracks) => {
                tracks.truncate(size as usize);
                Ok(tracks)
            }
            Behavior::Echo => Ok((0..size)
                .map(|i| {
                    TrackBuilder::new(self.id, format!("{}-{i}", query.replace(' ', "-")))
                        .name(Some(query))
                        .preview_url(Some("https://cdn.example.org/echo.mp3"))
                        .build()
                })
                .collect()),
            Behavior::Empty => Ok(Vec::new()),
            Behavior::Fail => Err(SourceError::Unavailable(format!("{} is down", self.id))),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn id(&self) -> SourceId {
        self.id
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    async fn search(&self, query: &str, _page: u32, page_size: u32) -> Result<Vec<Track>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        self.answer(query, page_size).await
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Track>> {
        self.trendings.fetch_add(1, Ordering::SeqCst);
        self.answer("trending", limit).await
    }

    async fn probe(&self) -> Result<()> {
        if self.probe_ok {
            Ok(())
        } else {
            Err(SourceError::Unavailable("probe failed".to_string()))
        }
    }
}

/// Playable track of `source` named `name`
pub fn track(source: SourceId, native_id: &str, name: &str) -> Track {
    TrackBuilder::new(source, native_id)
        .name(Some(name))
        .preview_url(Some(format!("https://cdn.example.org/{native_id}.mp3")))
        .build()
}

pub fn unplayable(source: SourceId, native_id: &str) -> Track {
    TrackBuilder::new(source, native_id).build()
}

pub fn tracks(source: SourceId, count: usize) -> Vec<Track> {
    (1..=count)
        .map(|i| track(source, &i.to_string(), &format!("{source} {i}")))
        .collect()
}

/// Short timeouts and deterministic presentation
pub fn test_settings() -> EngineSettings {
    EngineSettings {
        source_timeout_ms: 100,
        presentation: Presentation::Ordered,
        ..EngineSettings::default()
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub engine: Aggregator,
}

pub fn harness(adapters: Vec<Arc<StubAdapter>>) -> Harness {
    harness_with(adapters, test_settings(), Arc::new(MemoryStore::new()))
}

pub fn harness_with(
    adapters: Vec<Arc<StubAdapter>>,
    settings: EngineSettings,
    store: Arc<MemoryStore>,
) -> Harness {
    let clock = Arc::new(ManualClock::new(START_MS));
    let engine = Aggregator::builder()
        .adapters(adapters.into_iter().map(|a| a as Arc<dyn SourceAdapter>))
        .settings(settings)
        .clock(clock.clone())
        .store(store.clone())
        .build();
    Harness {
        clock,
        store,
        engine,
    }
}
