//! Engine configuration, loaded from TOML.

use crate::compositor::fit::Resample;
use crate::compositor::pipeline::RenderOptions;
use crate::core::error::ConfigError;
use crate::filters::registry::EffectRegistry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
///
/// Every section is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rendering defaults.
    pub render: RenderConfig,

    /// Catalog settings.
    pub registry: RegistryConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Rendering defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Paint pixels in parallel.
    pub parallel: bool,

    /// Output width when the caller doesn't pick one.
    pub default_width: u32,

    /// Output height when the caller doesn't pick one.
    pub default_height: u32,

    /// Resampling filter for cover fitting.
    pub resample: Resample,
}

/// Catalog settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Replaces the built-in preferred-first order when set.
    pub preferred_order: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "filterstack=debug,warn").
    pub level: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            default_width: 1080,
            default_height: 1080,
            resample: Resample::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RenderConfig {
    /// Render options carrying these defaults, without callback or token.
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_parallel(self.parallel)
            .with_resample(self.resample)
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        config.to_options()
    }
}

impl RegistryConfig {
    /// Apply to a registry in place.
    pub fn apply(&self, registry: &mut EffectRegistry) {
        if let Some(order) = &self.preferred_order {
            registry.set_preferred_order(order.iter().cloned());
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from a file if it exists, otherwise defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        })
    }

    /// Built-in catalog with this config's registry settings applied.
    pub fn build_registry(&self) -> EffectRegistry {
        let mut registry = EffectRegistry::with_builtins();
        self.registry.apply(&mut registry);
        registry
    }
}
