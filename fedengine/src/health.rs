//! Source health monitoring
//!
//! Health is advisory. The fan-out skips sources that are `unhealthy` or
//! `disabled`, but a single-source request still calls them.

use crate::clock::Clock;
use crate::settings::HealthSettings;
use chrono::{DateTime, Utc};
use fedsource::{SourceAdapter, SourceId};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub source_id: SourceId,
    pub status: HealthStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
struct Record {
    status: HealthStatus,
    checked_at_ms: u64,
}

#[derive(Debug)]
pub struct HealthMonitor {
    settings: HealthSettings,
    disabled: HashSet<SourceId>,
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<SourceId, Record>>,
}

impl HealthMonitor {
    pub fn new(
        settings: HealthSettings,
        disabled: impl IntoIterator<Item = SourceId>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            disabled: disabled.into_iter().collect(),
            clock,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_disabled(&self, source: SourceId) -> bool {
        self.disabled.contains(&source)
    }

    /// Probes one adapter and records the verdict
    pub async fn check(&self, adapter: &dyn SourceAdapter) -> HealthStatus {
        let source = adapter.id();
        let status = if self.is_disabled(source) {
            HealthStatus::Disabled
        } else {
            match tokio::time::timeout(self.settings.probe_timeout(), adapter.probe()).await {
                Ok(Ok(())) => HealthStatus::Healthy,
                Ok(Err(e)) => {
                    warn!(source = %source, error = %e, "Health probe failed");
                    HealthStatus::Unhealthy
                }
                Err(_) => {
                    warn!(source = %source, timeout_ms = self.settings.probe_timeout_ms, "Health probe timed out");
                    HealthStatus::Unhealthy
                }
            }
        };
        debug!(source = %source, status = ?status, "Health checked");
        self.record(source, status);
        status
    }

    /// Probes every adapter concurrently
    pub async fn check_all(&self, adapters: &[Arc<dyn SourceAdapter>]) -> BTreeMap<SourceId, HealthStatus> {
        let checks = adapters.iter().map(|adapter| async move {
            (adapter.id(), self.check(adapter.as_ref()).await)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Current status for scheduling purposes
    ///
    /// Never-checked sources and stale `unhealthy` verdicts are `unknown`.
    pub fn status(&self, source: SourceId) -> HealthStatus {
        if self.is_disabled(source) {
            return HealthStatus::Disabled;
        }
        let Some(record) = self.record_of(source) else {
            return HealthStatus::Unknown;
        };
        let age_ms = self.clock.now_ms().saturating_sub(record.checked_at_ms);
        if record.status == HealthStatus::Unhealthy
            && age_ms >= self.settings.stale_after_secs.saturating_mul(1000)
        {
            return HealthStatus::Unknown;
        }
        record.status
    }

    /// True when the fan-out may call `source`
    pub fn is_schedulable(&self, source: SourceId) -> bool {
        !matches!(
            self.status(source),
            HealthStatus::Unhealthy | HealthStatus::Disabled
        )
    }

    pub fn source_health(&self, source: SourceId) -> SourceHealth {
        SourceHealth {
            source_id: source,
            status: self.status(source),
            last_checked: self
                .record_of(source)
                .and_then(|r| i64::try_from(r.checked_at_ms).ok())
                .and_then(DateTime::from_timestamp_millis),
        }
    }

    /// Health of every source checked so far
    pub fn snapshot(&self) -> Vec<SourceHealth> {
        let mut sources: Vec<SourceId> = {
            let records = self.records.read().unwrap_or_else(|e| e.into_inner());
            records.keys().copied().collect()
        };
        sources.sort();
        sources.into_iter().map(|s| self.source_health(s)).collect()
    }

    fn record(&self, source: SourceId, status: HealthStatus) {
        let record = Record {
            status,
            checked_at_ms: self.clock.now_ms(),
        };
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(source, record);
    }

    fn record_of(&self, source: SourceId) -> Option<Record> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(&source).copied()
    }
}
