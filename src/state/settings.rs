//! Flat, serializable snapshot of a session's filter state.

use crate::core::error::StateError;
use crate::core::types::ParameterMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings blob: enabled flags, stack order and parameter overrides.
///
/// Every section is optional when reading, so partial blobs can be replayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub states: IndexMap<String, bool>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub options: IndexMap<String, ParameterMap>,
}

impl FilterSettings {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StateError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Write a settings file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .map_err(|e| StateError::Settings(format!("{}: {}", path.display(), e)))
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.order.is_empty() && self.options.is_empty()
    }
}

/// Outcome of replaying settings into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries that matched a live effect.
    pub applied: usize,
    /// Ids that are not in the catalog, each listed once.
    pub ignored: Vec<String>,
}
