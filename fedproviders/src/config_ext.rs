//! Provider settings stored in fedconfig
//!
//! The `providers` section of the configuration is read as a whole into
//! [`ProvidersSettings`]; missing keys take their built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use fedconfig::get_config;
//! use fedproviders::{ProvidersConfigExt, default_adapters};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let settings = config.get_providers_settings()?;
//! let adapters = default_adapters(&settings)?;
//! println!("{} adapters registered", adapters.len());
//! # Ok(())
//! # }
//! ```

use crate::settings::ProvidersSettings;
use anyhow::Result;
use fedconfig::Config;
use serde_yaml::Value;

const PROVIDERS: &str = "providers";

/// Extension trait giving [`Config`] access to provider settings
pub trait ProvidersConfigExt {
    /// Reads the whole `providers` section
    fn get_providers_settings(&self) -> Result<ProvidersSettings>;

    /// Replaces the whole `providers` section
    fn set_providers_settings(&self, settings: &ProvidersSettings) -> Result<()>;

    /// Enables the gateway (or disables it with an empty URL)
    fn set_gateway_base_url(&self, base_url: &str) -> Result<()>;

    /// Overrides the Jamendo client id
    fn set_jamendo_client_id(&self, client_id: &str) -> Result<()>;

    /// Replaces the mirror list of `provider` (`musiq`, `youtube` or `deezer`)
    fn set_provider_mirrors(&self, provider: &str, mirrors: &[String]) -> Result<()>;
}

impl ProvidersConfigExt for Config {
    fn get_providers_settings(&self) -> Result<ProvidersSettings> {
        Ok(self.get_as(&[PROVIDERS])?.unwrap_or_default())
    }

    fn set_providers_settings(&self, settings: &ProvidersSettings) -> Result<()> {
        self.set_as(&[PROVIDERS], settings)
    }

    fn set_gateway_base_url(&self, base_url: &str) -> Result<()> {
        self.set_value(
            &[PROVIDERS, "gateway", "base_url"],
            Value::String(base_url.trim().to_string()),
        )
    }

    fn set_jamendo_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &[PROVIDERS, "jamendo", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn set_provider_mirrors(&self, provider: &str, mirrors: &[String]) -> Result<()> {
        self.set_as(&[PROVIDERS, provider, "mirrors"], &mirrors)
    }
}
