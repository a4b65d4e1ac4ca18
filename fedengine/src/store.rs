//! Key-value persistence for engine state
//!
//! The circuit breaker writes its cooldown deadlines here so that a restart
//! does not re-enable a source in the middle of its cooldown. Keys are
//! dotted paths such as `circuit.musiq.disabled_until_ms`.

use anyhow::Result;
use fedsource::SourceId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;

/// Minimal persistence interface used by the engine
pub trait StateStore: Debug + Send + Sync {
    fn load_u64(&self, key: &str) -> Result<Option<u64>>;
    fn store_u64(&self, key: &str, value: u64) -> Result<()>;
}

/// Store key holding the cooldown deadline of `source`
pub fn circuit_key(source: SourceId) -> String {
    format!("circuit.{}.disabled_until_ms", source.as_str())
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load_u64(&self, key: &str) -> Result<Option<u64>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).copied())
    }

    fn store_u64(&self, key: &str, value: u64) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(feature = "fedconfig")]
pub use config_store::ConfigStore;

#[cfg(feature = "fedconfig")]
mod config_store {
    use super::StateStore;
    use anyhow::Result;
    use fedconfig::Config;
    use serde_yaml::{Number, Value};
    use std::sync::Arc;
    use tokio::runtime::Handle;
    use tracing::warn;

    const STATE: &str = "state";

    /// Store persisting under the `state` section of the configuration file
    #[derive(Debug, Clone)]
    pub struct ConfigStore {
        config: Arc<Config>,
    }

    impl ConfigStore {
        pub fn new(config: Arc<Config>) -> Self {
            Self { config }
        }

        fn path(key: &str) -> Vec<&str> {
            std::iter::once(STATE).chain(key.split('.')).collect()
        }

        fn write(config: &Config, key: &str, value: u64) -> Result<()> {
            config.set_value(&Self::path(key), Value::Number(Number::from(value)))
        }
    }

    impl StateStore for ConfigStore {
        fn load_u64(&self, key: &str) -> Result<Option<u64>> {
            self.config.get_as(&Self::path(key))
        }

        /// Inside a runtime the file write goes to the blocking pool and
        /// failures are only logged
        fn store_u64(&self, key: &str, value: u64) -> Result<()> {
            let Ok(handle) = Handle::try_current() else {
                return Self::write(&self.config, key, value);
            };
            let config = self.config.clone();
            let key = key.to_string();
            handle.spawn_blocking(move || {
                if let Err(e) = Self::write(&config, &key, value) {
                    warn!(key = %key, error = %e, "Failed to persist engine state");
                }
            });
            Ok(())
        }
    }
}
