//! Provider endpoints and credentials
//!
//! Mirrors the `providers` section of the configuration file. Every field
//! has a default so a partial section deserializes fine.

use crate::http::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::{archive, audius, ccmixter, deezer, fma, freesound, internet_archive, jamendo};
use crate::{musiq, openverse, radio, youtube};
use fedsource::DEFAULT_MIRROR_BUDGET;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A provider reached through a single base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub base_url: String,
}

impl EndpointSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// A provider reached through a list of interchangeable mirrors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSettings {
    pub mirrors: Vec<String>,
}

impl MirrorSettings {
    pub fn new<I, S>(mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mirrors: mirrors.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudiusSettings {
    /// Endpoint returning `{"data": [host, ...]}`
    pub discovery_url: String,
    pub app_name: String,
}

impl Default for AudiusSettings {
    fn default() -> Self {
        Self {
            discovery_url: audius::DEFAULT_DISCOVERY_URL.to_string(),
            app_name: audius::DEFAULT_APP_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JamendoSettings {
    pub base_url: String,
    pub client_id: String,
}

impl Default for JamendoSettings {
    fn default() -> Self {
        Self {
            base_url: jamendo::DEFAULT_BASE_URL.to_string(),
            client_id: jamendo::DEFAULT_CLIENT_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusiqSettings {
    pub mirrors: Vec<String>,
    /// Language given to tracks that carry none
    pub default_language: String,
}

impl Default for MusiqSettings {
    fn default() -> Self {
        Self {
            mirrors: musiq::DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            default_language: musiq::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// The whole `providers` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Shuffle mirror lists once per process
    pub shuffle_mirrors: bool,
    /// Fixed shuffle seed, random when absent
    pub mirror_seed: Option<u64>,
    /// Time allowed to walk a mirror list; keep it under the engine's
    /// per-source timeout
    pub mirror_budget_ms: u64,
    pub audius: AudiusSettings,
    pub jamendo: JamendoSettings,
    pub radio: EndpointSettings,
    pub archive: EndpointSettings,
    pub musiq: MusiqSettings,
    pub youtube: MirrorSettings,
    pub deezer: MirrorSettings,
    pub openverse: EndpointSettings,
    /// Optional self-hosted proxy, disabled when the base URL is empty
    pub gateway: EndpointSettings,
    pub fma: EndpointSettings,
    pub ccmixter: EndpointSettings,
    pub freesound: EndpointSettings,
    pub internet_archive: EndpointSettings,
}

impl Default for ProvidersSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            shuffle_mirrors: true,
            mirror_seed: None,
            mirror_budget_ms: DEFAULT_MIRROR_BUDGET.as_millis() as u64,
            audius: AudiusSettings::default(),
            jamendo: JamendoSettings::default(),
            radio: EndpointSettings::new(radio::DEFAULT_BASE_URL),
            archive: EndpointSettings::new(archive::DEFAULT_BASE_URL),
            musiq: MusiqSettings::default(),
            youtube: MirrorSettings::new(youtube::DEFAULT_MIRRORS.iter().copied()),
            deezer: MirrorSettings::new(deezer::DEFAULT_MIRRORS.iter().copied()),
            openverse: EndpointSettings::new(openverse::DEFAULT_BASE_URL),
            gateway: EndpointSettings::new(""),
            fma: EndpointSettings::new(fma::DEFAULT_BASE_URL),
            ccmixter: EndpointSettings::new(ccmixter::DEFAULT_BASE_URL),
            freesound: EndpointSettings::new(freesound::DEFAULT_BASE_URL),
            internet_archive: EndpointSettings::new(internet_archive::DEFAULT_BASE_URL),
        }
    }
}

impl ProvidersSettings {
    /// Whether the optional gateway is configured
    pub fn gateway_enabled(&self) -> bool {
        !self.gateway.base_url.trim().is_empty()
    }

    pub fn mirror_budget(&self) -> Duration {
        Duration::from_millis(self.mirror_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let settings: ProvidersSettings = serde_json::from_value(serde_json::json!({
            "jamendo": { "client_id": "abc" },
            "gateway": { "base_url": "http://localhost:9000" },
            "shuffle_mirrors": false
        }))
        .unwrap();

        assert_eq!(settings.jamendo.client_id, "abc");
        assert_eq!(settings.jamendo.base_url, jamendo::DEFAULT_BASE_URL);
        assert!(settings.gateway_enabled());
        assert!(!settings.shuffle_mirrors);
        assert_eq!(settings.musiq.mirrors.len(), musiq::DEFAULT_MIRRORS.len());
        assert_eq!(settings.musiq.default_language, "hindi");
        assert_eq!(settings.mirror_budget(), DEFAULT_MIRROR_BUDGET);
    }

    #[test]
    fn test_gateway_disabled_by_default() {
        assert!(!ProvidersSettings::default().gateway_enabled());
    }
}
