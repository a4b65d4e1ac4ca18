//! Memoized host discovery for load-distributed providers

use crate::error::{Result, SourceError};
use rand::seq::IndexedRandom;
use std::future::Future;
use std::sync::Mutex;
use tracing::{debug, info};

/// Resolves a backing host once and keeps it until [`HostResolver::invalidate`]
///
/// The discovery call itself is supplied by the adapter, which knows the
/// provider's discovery endpoint. One host is picked at random from the
/// returned list to spread load across the network.
#[derive(Debug)]
pub struct HostResolver {
    name: String,
    host: Mutex<Option<String>>,
}

impl HostResolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: Mutex::new(None),
        }
    }

    /// Resolver pinned to a known host (discovery is never called)
    pub fn pinned(name: impl Into<String>, host: impl Into<String>) -> Self {
        let resolver = Self::new(name);
        *resolver.host.lock().unwrap_or_else(|e| e.into_inner()) = Some(host.into());
        resolver
    }

    /// Currently memoized host
    pub fn current(&self) -> Option<String> {
        self.host.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the memoized host, running `discover` on first use
    pub async fn resolve<F, Fut>(&self, discover: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        if let Some(host) = self.current() {
            return Ok(host);
        }

        let hosts = discover().await?;
        let host = hosts
            .iter()
            .map(|h| h.trim().trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .collect::<Vec<_>>()
            .choose(&mut rand::rng())
            .map(|h| h.to_string())
            .ok_or_else(|| SourceError::Discovery(format!("{}: empty host list", self.name)))?;

        info!(source = %self.name, host = %host, "Resolved provider host");
        *self.host.lock().unwrap_or_else(|e| e.into_inner()) = Some(host.clone());
        Ok(host)
    }

    /// Forgets the memoized host
    pub fn invalidate(&self) {
        debug!(source = %self.name, "Invalidating resolved host");
        *self.host.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
