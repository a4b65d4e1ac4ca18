//! Engine settings stored in fedconfig
//!
//! # Example
//!
//! ```no_run
//! use fedconfig::get_config;
//! use fedengine::EngineConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let settings = config.get_engine_settings()?;
//! println!("fan-out timeout: {:?}", settings.source_timeout());
//! # Ok(())
//! # }
//! ```

use crate::settings::{EngineSettings, Presentation};
use anyhow::Result;
use fedconfig::Config;
use fedsource::SourceId;
use serde_yaml::{Number, Value};

const ENGINE: &str = "engine";

/// Extension trait giving [`Config`] access to engine settings
pub trait EngineConfigExt {
    /// Reads the whole `engine` section
    fn get_engine_settings(&self) -> Result<EngineSettings>;

    /// Replaces the whole `engine` section
    fn set_engine_settings(&self, settings: &EngineSettings) -> Result<()>;

    fn get_source_timeout_ms(&self) -> Result<u64>;

    fn set_source_timeout_ms(&self, timeout_ms: u64) -> Result<()>;

    fn set_presentation(&self, presentation: Presentation) -> Result<()>;

    /// Adds `source` to, or removes it from, the disabled list
    fn set_source_disabled(&self, source: SourceId, disabled: bool) -> Result<()>;
}

impl EngineConfigExt for Config {
    fn get_engine_settings(&self) -> Result<EngineSettings> {
        Ok(self.get_as(&[ENGINE])?.unwrap_or_default())
    }

    fn set_engine_settings(&self, settings: &EngineSettings) -> Result<()> {
        self.set_as(&[ENGINE], settings)
    }

    fn get_source_timeout_ms(&self) -> Result<u64> {
        Ok(self.get_engine_settings()?.source_timeout_ms)
    }

    fn set_source_timeout_ms(&self, timeout_ms: u64) -> Result<()> {
        self.set_value(
            &[ENGINE, "source_timeout_ms"],
            Value::Number(Number::from(timeout_ms)),
        )
    }

    fn set_presentation(&self, presentation: Presentation) -> Result<()> {
        self.set_as(&[ENGINE, "presentation"], &presentation)
    }

    fn set_source_disabled(&self, source: SourceId, disabled: bool) -> Result<()> {
        let mut sources = self.get_engine_settings()?.disabled_sources;
        sources.retain(|s| *s != source);
        if disabled {
            sources.push(source);
        }
        self.set_as(&[ENGINE, "disabled_sources"], &sources)
    }
}
