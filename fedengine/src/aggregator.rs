//! The federated aggregator
//!
//! Fans one logical request out to the registered adapters, isolates their
//! failures, merges what came back and falls back to static content when
//! nothing usable is left.

use crate::cache::{CacheKey, CacheStats};
use crate::circuit::CircuitStatus;
use crate::clock::{Clock, SystemClock};
use crate::error::{EngineError, Result};
use crate::filter::{ANY_LANGUAGE, LanguageAffinity, dedup_by_id, prefer_playable};
use crate::health::{HealthStatus, SourceHealth};
use crate::plan::{Region, Slot, SlotMode, source_slot};
use crate::settings::{EngineSettings, Presentation};
use crate::state::AggregatorState;
use crate::store::{MemoryStore, StateStore};
use fedsource::{AdapterCapabilities, FallbackProvider, SourceAdapter, SourceId, Track};
use futures::future::join_all;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Which sources a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(SourceId),
}

impl SourceFilter {
    /// `all`, blank and unknown names select every source
    pub fn parse(name: &str) -> Self {
        name.parse::<SourceId>()
            .map(SourceFilter::Only)
            .unwrap_or(SourceFilter::All)
    }
}

impl From<SourceId> for SourceFilter {
    fn from(source: SourceId) -> Self {
        SourceFilter::Only(source)
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFilter::All => f.write_str("all"),
            SourceFilter::Only(source) => f.write_str(source.as_str()),
        }
    }
}

/// Parameters of a paged search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub language: String,
    pub source: SourceFilter,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            language: ANY_LANGUAGE.to_string(),
            source: SourceFilter::All,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn source(mut self, source: impl Into<SourceFilter>) -> Self {
        self.source = source.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(EngineError::InvalidRequest("page starts at 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(EngineError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered source as reported by [`Aggregator::status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub id: SourceId,
    pub name: String,
    pub capabilities: AdapterCapabilities,
    pub circuit_open: bool,
    pub health: HealthStatus,
}

/// Informational snapshot of the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub sources: Vec<SourceSummary>,
    pub cache: CacheStats,
    pub circuits: Vec<CircuitStatus>,
    pub health: Vec<SourceHealth>,
}

#[derive(Debug, Clone, Copy)]
enum Call<'a> {
    Search {
        query: &'a str,
        page: u32,
        page_size: u32,
    },
    Trending {
        limit: u32,
    },
}

/// Builder for [`Aggregator`]
///
/// Defaults to the wall clock and an in-memory state store.
#[derive(Debug, Default)]
pub struct AggregatorBuilder {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    settings: EngineSettings,
    clock: Option<Arc<dyn Clock>>,
    store: Option<Arc<dyn StateStore>>,
}

impl AggregatorBuilder {
    pub fn adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn adapters(mut self, adapters: impl IntoIterator<Item = Arc<dyn SourceAdapter>>) -> Self {
        self.adapters.extend(adapters);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Aggregator {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let state = AggregatorState::new(&self.settings, clock, store);
        info!(
            sources = self.adapters.len(),
            presentation = ?self.settings.presentation,
            "Aggregator ready"
        );
        Aggregator {
            affinity: LanguageAffinity::new(self.settings.language_affinity.clone()),
            adapters: self.adapters,
            settings: self.settings,
            state,
            fallback: FallbackProvider::new(),
        }
    }
}

/// Federated search and trending over a set of adapters
#[derive(Debug)]
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    settings: EngineSettings,
    affinity: LanguageAffinity,
    state: AggregatorState,
    fallback: FallbackProvider,
}

impl Aggregator {
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, settings: EngineSettings) -> Self {
        Self::builder().adapters(adapters).settings(settings).build()
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn state(&self) -> &AggregatorState {
        &self.state
    }

    fn adapter(&self, source: SourceId) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.id() == source)
    }

    /// Enabled and not in a circuit cooldown
    fn is_callable(&self, source: SourceId) -> bool {
        !self.settings.is_disabled(source) && !self.state.circuit.is_open(source)
    }

    /// Callable and not known to be unhealthy
    fn is_schedulable(&self, source: SourceId) -> bool {
        self.is_callable(source) && self.state.health.is_schedulable(source)
    }

    /// One provider call under the fan-out timeout
    ///
    /// `None` means the call failed or timed out. Either way the circuit
    /// breaker is told.
    async fn call(&self, adapter: &Arc<dyn SourceAdapter>, call: Call<'_>) -> Option<Vec<Track>> {
        let source = adapter.id();
        let started = Instant::now();
        let request = match call {
            Call::Search {
                query,
                page,
                page_size,
            } => adapter.search(query, page, page_size),
            Call::Trending { limit } => adapter.trending(limit),
        };

        let error = match timeout(self.settings.source_timeout(), request).await {
            Ok(Ok(tracks)) => {
                debug!(
                    source = %source,
                    count = tracks.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Provider answered"
                );
                self.state.circuit.record_success(source);
                return Some(tracks);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {} ms", self.settings.source_timeout_ms),
        };

        warn!(source = %source, call = ?call, error = %error, "Provider call failed");
        if self.state.circuit.record_failure(source) {
            adapter.invalidate();
        }
        None
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Paged search over one source or all of them
    ///
    /// Page 1 is never empty: fallback content stands in when no provider
    /// yields anything. Later pages may be empty.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Track>> {
        request.validate()?;
        let tracks = match request.source {
            SourceFilter::Only(source) => self.search_source(source, request).await,
            SourceFilter::All => self.search_all(request).await,
        };
        if tracks.is_empty() && request.page == 1 {
            return Err(EngineError::NoContent);
        }
        Ok(tracks)
    }

    async fn search_source(&self, source: SourceId, request: &SearchRequest) -> Vec<Track> {
        let page_size = request.page_size as usize;
        let live = match self.adapter(source) {
            None => {
                debug!(source = %source, "Source not registered");
                None
            }
            Some(_) if !self.is_callable(source) => {
                info!(source = %source, "Source short-circuited");
                None
            }
            Some(adapter) => {
                let call = Call::Search {
                    query: &request.query,
                    page: request.page,
                    page_size: request.page_size,
                };
                self.call(adapter, call).await
            }
        };

        let mut tracks = dedup_by_id(live.unwrap_or_default());
        if tracks.is_empty() && request.page == 1 {
            info!(source = %source, query = %request.query, "Serving source fallback");
            tracks = self
                .fallback
                .for_source(source, Some(&request.query), page_size);
        }
        tracks.truncate(page_size);
        tracks
    }

    async fn search_all(&self, request: &SearchRequest) -> Vec<Track> {
        let page_size = request.page_size as usize;
        let eligible: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|a| a.capabilities().supports_search && self.is_schedulable(a.id()))
            .collect();

        let calls = eligible.iter().map(|adapter| {
            let call = Call::Search {
                query: &request.query,
                page: request.page,
                page_size: request.page_size,
            };
            self.call(adapter, call)
        });
        let outcomes = join_all(calls).await;
        let answered = outcomes.iter().filter(|o| o.is_some()).count();
        let merged: Vec<Track> = outcomes.into_iter().flatten().flatten().collect();

        info!(
            query = %request.query,
            page = request.page,
            sources = eligible.len(),
            answered,
            merged = merged.len(),
            "Search fan-out complete"
        );

        let filtered = self.affinity.filter(merged, &request.language);
        let mut tracks = prefer_playable(dedup_by_id(filtered));
        if tracks.is_empty() && request.page == 1 {
            info!(query = %request.query, "Nothing usable, serving global fallback");
            tracks = self.fallback.global(page_size);
        }
        tracks.truncate(page_size);
        tracks
    }

    // ========================================================================
    // Trending
    // ========================================================================

    /// Trending tracks for `region`, cached per limit and region
    pub async fn trending(&self, limit: u32, region: Region) -> Result<Vec<Track>> {
        validate_limit(limit)?;
        let key = CacheKey::new(
            "trending",
            [("limit", limit.to_string()), ("region", region.to_string())],
        );
        if let Some(tracks) = self.state.cache.get(&key) {
            info!(key = %key, count = tracks.len(), "Trending served from cache");
            return Ok(tracks);
        }

        let slots: Vec<Slot> = region
            .plan()
            .into_iter()
            .filter(|slot| self.slot_is_runnable(slot))
            .collect();
        let outcomes = join_all(slots.iter().map(|slot| self.run_slot(slot, limit))).await;
        let merged: Vec<Track> = outcomes.into_iter().flatten().collect();

        info!(
            region = %region,
            slots = slots.len(),
            merged = merged.len(),
            "Trending fan-out complete"
        );

        let mut tracks = prefer_playable(dedup_by_id(merged));
        self.present(&mut tracks);
        tracks.truncate(limit as usize);

        if tracks.is_empty() {
            info!(region = %region, "Nothing usable, serving global fallback");
            return non_empty(self.fallback.global(limit as usize));
        }
        self.state.cache.set(key, tracks.clone());
        Ok(tracks)
    }

    /// Trending from one source, or global trending for [`SourceFilter::All`]
    pub async fn trending_by_source(&self, source: SourceFilter, limit: u32) -> Result<Vec<Track>> {
        let source = match source {
            SourceFilter::All => return self.trending(limit, Region::Global).await,
            SourceFilter::Only(source) => source,
        };
        validate_limit(limit)?;

        let mut tracks = match self.adapter(source) {
            Some(_) if self.is_callable(source) => self.run_slot(&source_slot(source), limit).await,
            Some(_) => {
                info!(source = %source, "Source short-circuited");
                Vec::new()
            }
            None => Vec::new(),
        };
        tracks.truncate(limit as usize);

        if tracks.is_empty() {
            info!(source = %source, "Serving source fallback");
            return non_empty(self.fallback.for_source(source, None, limit as usize));
        }
        Ok(tracks)
    }

    fn slot_is_runnable(&self, slot: &Slot) -> bool {
        let Some(adapter) = self.adapter(slot.source) else {
            return false;
        };
        let capabilities = adapter.capabilities();
        let supported = match slot.mode {
            SlotMode::Native => capabilities.supports_trending,
            SlotMode::Seeded { .. } => capabilities.supports_search,
        };
        supported && self.is_schedulable(slot.source)
    }

    /// Runs one slot, returns at most its share
    async fn run_slot(&self, slot: &Slot, limit: u32) -> Vec<Track> {
        let Some(adapter) = self.adapter(slot.source) else {
            return Vec::new();
        };
        let share = slot.share(limit);

        let mut tracks = match slot.mode {
            SlotMode::Native => self
                .call(adapter, Call::Trending { limit: share })
                .await
                .unwrap_or_default(),
            SlotMode::Seeded { seeds, picks } => {
                let chosen = pick_seeds(seeds, picks);
                let per_seed = share.div_ceil(chosen.len().max(1) as u32);
                debug!(source = %slot.source, seeds = ?chosen, per_seed, "Seeded slot");
                let calls = chosen.iter().map(|&query| {
                    let call = Call::Search {
                        query,
                        page: 1,
                        page_size: per_seed,
                    };
                    self.call(adapter, call)
                });
                dedup_by_id(join_all(calls).await.into_iter().flatten().flatten().collect())
            }
        };
        tracks.truncate(share as usize);
        tracks
    }

    fn present(&self, tracks: &mut [Track]) {
        if self.settings.presentation == Presentation::Shuffled {
            tracks.shuffle(&mut rand::rng());
        }
    }

    // ========================================================================
    // Health, download, status
    // ========================================================================

    /// Probes every registered adapter
    pub async fn check_health(&self) -> BTreeMap<SourceId, HealthStatus> {
        let map = self.state.health.check_all(&self.adapters).await;
        let healthy = map
            .values()
            .filter(|s| **s == HealthStatus::Healthy)
            .count();
        info!(healthy, total = map.len(), "Health check complete");
        map
    }

    /// Download URL of `track`
    pub fn download<'t>(&self, track: &'t Track) -> Result<&'t str> {
        track
            .download_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| EngineError::NotDownloadable(track.id.clone()))
    }

    pub fn status(&self) -> EngineStatus {
        let sources = self
            .adapters
            .iter()
            .map(|adapter| {
                let id = adapter.id();
                SourceSummary {
                    id,
                    name: adapter.name().to_string(),
                    capabilities: adapter.capabilities(),
                    circuit_open: self.state.circuit.is_open(id),
                    health: self.state.health.status(id),
                }
            })
            .collect();
        EngineStatus {
            sources,
            cache: self.state.cache.stats(),
            circuits: self.state.circuit.statuses(),
            health: self.state.health.snapshot(),
        }
    }

    /// Starts the periodic cache sweep on the current tokio runtime
    pub fn spawn_cache_sweeper(&self) -> JoinHandle<()> {
        self.state
            .cache
            .spawn_sweeper(self.settings.cache.sweep_interval())
    }
}

fn validate_limit(limit: u32) -> Result<()> {
    if limit == 0 {
        return Err(EngineError::InvalidRequest(
            "limit must be positive".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(tracks: Vec<Track>) -> Result<Vec<Track>> {
    if tracks.is_empty() {
        Err(EngineError::NoContent)
    } else {
        Ok(tracks)
    }
}

fn pick_seeds(seeds: &'static [&'static str], picks: usize) -> Vec<&'static str> {
    let mut rng = rand::rng();
    seeds.choose_multiple(&mut rng, picks).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_filter_parsing() {
        assert_eq!(SourceFilter::parse("all"), SourceFilter::All);
        assert_eq!(SourceFilter::parse(""), SourceFilter::All);
        assert_eq!(SourceFilter::parse("bandcamp"), SourceFilter::All);
        assert_eq!(
            SourceFilter::parse("Internet_Archive"),
            SourceFilter::Only(SourceId::InternetArchive)
        );
        assert_eq!(SourceFilter::Only(SourceId::Fma).to_string(), "fma");
    }

    #[test]
    fn test_request_validation() {
        let aggregator = Aggregator::new(Vec::new(), EngineSettings::default());
        let rejected = tokio_test::block_on(aggregator.search(&SearchRequest::new("x").page(0)));
        assert!(matches!(rejected, Err(EngineError::InvalidRequest(_))));

        assert!(SearchRequest::new("x").validate().is_ok());
        assert!(matches!(
            SearchRequest::new("x").page(0).validate(),
            Err(EngineError::InvalidRequest(_))
        ));
        assert!(matches!(
            SearchRequest::new("x").page_size(0).validate(),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_pick_seeds_draws_distinct_seeds() {
        let picked = pick_seeds(crate::plan::HINDI_SEEDS, 2);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
        assert!(picked.iter().all(|s| crate::plan::HINDI_SEEDS.contains(s)));
        assert_eq!(pick_seeds(&["only"], 3), vec!["only"]);
    }

    #[test]
    fn test_download_requires_url() {
        let aggregator = Aggregator::new(Vec::new(), EngineSettings::default());
        let mut track = fedsource::TrackBuilder::new(SourceId::Jamendo, 1).build();
        assert!(matches!(
            aggregator.download(&track),
            Err(EngineError::NotDownloadable(id)) if id == "jamendo_1"
        ));
        track.download_url = Some("https://cdn.example.org/1.mp3".to_string());
        assert_eq!(aggregator.download(&track).unwrap(), "https://cdn.example.org/1.mp3");
    }
}
