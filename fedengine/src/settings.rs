//! Engine tuning knobs
//!
//! Mirrors the `engine` section of the configuration. Every field has a
//! default so a partial section deserializes.

use crate::filter::AffinityRule;
use fedsource::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: usize = 100;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 2;
pub const DEFAULT_COOLDOWN_SECS: u64 = 600;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_STALE_AFTER_SECS: u64 = 300;

/// Final ordering step applied to trending results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// Random order, for variety between refreshes
    #[default]
    Shuffled,
    /// Plan order, deterministic
    Ordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub capacity: usize,
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            capacity: DEFAULT_CACHE_CAPACITY,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitSettings {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
    /// Sources guarded by the breaker, the others are never short-circuited
    pub volatile_sources: Vec<SourceId>,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            volatile_sources: vec![SourceId::Musiq],
        }
    }
}

impl CircuitSettings {
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_secs.saturating_mul(1000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub probe_timeout_ms: u64,
    /// Age after which an `unhealthy` verdict no longer blocks scheduling
    pub stale_after_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
        }
    }
}

impl HealthSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Settings of the whole engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Budget of each provider call in a fan-out
    pub source_timeout_ms: u64,
    pub presentation: Presentation,
    pub cache: CacheSettings,
    pub circuit: CircuitSettings,
    pub health: HealthSettings,
    /// Sources never called and reported as `disabled`
    pub disabled_sources: Vec<SourceId>,
    /// Language token to the sources whose tracks are assumed to match it
    pub language_affinity: BTreeMap<String, AffinityRule>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            presentation: Presentation::default(),
            cache: CacheSettings::default(),
            circuit: CircuitSettings::default(),
            health: HealthSettings::default(),
            disabled_sources: Vec::new(),
            language_affinity: AffinityRule::defaults(),
        }
    }
}

impl EngineSettings {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn is_disabled(&self, source: SourceId) -> bool {
        self.disabled_sources.contains(&source)
    }
}
