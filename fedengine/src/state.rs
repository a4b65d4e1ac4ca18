//! Process-wide mutable state of one aggregator

use crate::cache::ResultCache;
use crate::circuit::CircuitBreaker;
use crate::clock::Clock;
use crate::health::HealthMonitor;
use crate::settings::EngineSettings;
use crate::store::StateStore;
use std::sync::Arc;

/// Cache, health and circuit state shared by every request
///
/// Each part guards itself with a short-lived lock; nothing here is held
/// across an await point.
#[derive(Debug)]
pub struct AggregatorState {
    pub cache: Arc<ResultCache>,
    pub health: HealthMonitor,
    pub circuit: CircuitBreaker,
}

impl AggregatorState {
    pub fn new(settings: &EngineSettings, clock: Arc<dyn Clock>, store: Arc<dyn StateStore>) -> Self {
        Self {
            cache: Arc::new(ResultCache::new(
                settings.cache.ttl(),
                settings.cache.capacity,
                clock.clone(),
            )),
            health: HealthMonitor::new(
                settings.health.clone(),
                settings.disabled_sources.iter().copied(),
                clock.clone(),
            ),
            circuit: CircuitBreaker::new(settings.circuit.clone(), clock, store),
        }
    }
}
