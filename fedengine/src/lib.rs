//! # FedEngine
//!
//! Federated aggregation over the FedMusic sources.
//!
//! The [`Aggregator`] fans a search or a trending request out to every
//! registered [`fedsource::SourceAdapter`], races each call against its own
//! timeout, merges what came back, and degrades to static fallback content
//! when nothing usable is left.
//!
//! ## Components
//!
//! - [`ResultCache`]: TTL and capacity bounded, insertion-order eviction
//! - [`HealthMonitor`]: concurrent probes, advisory status
//! - [`CircuitBreaker`]: cooldown for volatile sources, persisted through a
//!   [`StateStore`]
//! - [`LanguageAffinity`]: language filter with per-source affinity
//! - [`Region`] plans: how trending splits its limit across sources
//!
//! All mutable state lives in [`AggregatorState`], owned by the aggregator.
//!
//! ## Usage
//!
//! ```no_run
//! use fedengine::{Aggregator, EngineSettings, Region, SearchRequest};
//! use fedproviders::{ProvidersSettings, default_adapters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapters = default_adapters(&ProvidersSettings::default())?;
//!     let engine = Aggregator::new(adapters, EngineSettings::default());
//!
//!     let tracks = engine.search(&SearchRequest::new("lofi").page_size(10)).await?;
//!     println!("{} tracks", tracks.len());
//!
//!     let trending = engine.trending(20, Region::Global).await?;
//!     println!("{} trending", trending.len());
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cache;
pub mod circuit;
pub mod clock;
pub mod error;
pub mod filter;
pub mod health;
pub mod plan;
pub mod settings;
pub mod state;
pub mod store;

#[cfg(feature = "fedconfig")]
pub mod config_ext;

pub use aggregator::{
    Aggregator, AggregatorBuilder, DEFAULT_PAGE_SIZE, EngineStatus, SearchRequest, SourceFilter,
    SourceSummary,
};
pub use cache::{CacheKey, CacheStats, ResultCache};
pub use circuit::{CircuitBreaker, CircuitStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EngineError, Result};
pub use filter::{AffinityRule, LanguageAffinity, dedup_by_id, prefer_playable};
pub use health::{HealthMonitor, HealthStatus, SourceHealth};
pub use plan::{Region, Slot, SlotMode, UnknownRegion};
pub use settings::{CacheSettings, CircuitSettings, EngineSettings, HealthSettings, Presentation};
pub use state::AggregatorState;
pub use store::{MemoryStore, StateStore, circuit_key};

#[cfg(feature = "fedconfig")]
pub use config_ext::EngineConfigExt;

#[cfg(feature = "fedconfig")]
pub use store::ConfigStore;
