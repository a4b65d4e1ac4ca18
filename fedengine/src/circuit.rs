//! Circuit breaker for volatile sources
//!
//! A guarded source that fails `failure_threshold` times in a row is
//! skipped for `cooldown_secs`. The first call after the cooldown is live;
//! since the failure count stays at the threshold while open, one more
//! failure re-opens the circuit at once, and any success closes it.
//!
//! Cooldown deadlines are persisted through a [`StateStore`] when the
//! circuit opens and read back lazily on first use of each source.

use crate::clock::Clock;
use crate::settings::CircuitSettings;
use crate::store::{StateStore, circuit_key};
use fedsource::SourceId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CircuitState {
    failure_count: u32,
    disabled_until_ms: u64,
}

/// Informational view of one guarded source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitStatus {
    pub source: SourceId,
    pub failure_count: u32,
    pub disabled_until_ms: u64,
    pub open: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    settings: CircuitSettings,
    clock: Arc<dyn Clock>,
    store: Arc<dyn StateStore>,
    states: Mutex<HashMap<SourceId, CircuitState>>,
}

impl CircuitBreaker {
    pub fn new(settings: CircuitSettings, clock: Arc<dyn Clock>, store: Arc<dyn StateStore>) -> Self {
        Self {
            settings,
            clock,
            store,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// True when `source` is subject to the breaker
    pub fn is_guarded(&self, source: SourceId) -> bool {
        self.settings.volatile_sources.contains(&source)
    }

    /// True while `source` is in its cooldown
    pub fn is_open(&self, source: SourceId) -> bool {
        if !self.is_guarded(source) {
            return false;
        }
        let now = self.clock.now_ms();
        self.with_state(source, |state| now < state.disabled_until_ms)
    }

    pub fn record_success(&self, source: SourceId) {
        if !self.is_guarded(source) {
            return;
        }
        self.with_state(source, |state| {
            if state.failure_count > 0 {
                debug!(source = %source, "Circuit closed after success");
            }
            state.failure_count = 0;
        });
    }

    /// Counts a failure, returns true when this failure opened the circuit
    pub fn record_failure(&self, source: SourceId) -> bool {
        if !self.is_guarded(source) {
            return false;
        }
        let now = self.clock.now_ms();
        let threshold = self.settings.failure_threshold.max(1);
        let cooldown = self.settings.cooldown_ms();

        let opened_until = self.with_state(source, |state| {
            state.failure_count = state.failure_count.saturating_add(1).min(threshold);
            if state.failure_count < threshold {
                return None;
            }
            state.disabled_until_ms = state.disabled_until_ms.max(now.saturating_add(cooldown));
            Some(state.disabled_until_ms)
        });

        match opened_until {
            Some(until) => {
                warn!(
                    source = %source,
                    cooldown_secs = self.settings.cooldown_secs,
                    "Circuit opened"
                );
                if let Err(e) = self.store.store_u64(&circuit_key(source), until) {
                    warn!(source = %source, error = %e, "Failed to persist circuit state");
                }
                true
            }
            None => false,
        }
    }

    /// State of every guarded source
    pub fn statuses(&self) -> Vec<CircuitStatus> {
        let now = self.clock.now_ms();
        self.settings
            .volatile_sources
            .iter()
            .map(|&source| {
                let state = self.with_state(source, |state| *state);
                CircuitStatus {
                    source,
                    failure_count: state.failure_count,
                    disabled_until_ms: state.disabled_until_ms,
                    open: now < state.disabled_until_ms,
                }
            })
            .collect()
    }

    fn with_state<R>(&self, source: SourceId, f: impl FnOnce(&mut CircuitState) -> R) -> R {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states
            .entry(source)
            .or_insert_with(|| self.load_state(source));
        f(state)
    }

    fn load_state(&self, source: SourceId) -> CircuitState {
        let disabled_until_ms = match self.store.load_u64(&circuit_key(source)) {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                warn!(source = %source, error = %e, "Failed to load circuit state");
                0
            }
        };
        // A persisted deadline means the circuit was open at shutdown
        let failure_count = if disabled_until_ms > 0 {
            self.settings.failure_threshold.max(1)
        } else {
            0
        };
        CircuitState {
            failure_count,
            disabled_until_ms,
        }
    }
}
