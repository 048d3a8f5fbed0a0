//! Error types for Filterstack.
//!
//! Uses thiserror for structured errors with context. The taxonomy follows the
//! engine's failure classes:
//! - configuration errors made by effect authors are rejected at the call site
//! - missing external assets are not errors at all (the effect renders nothing)
//! - stale instance references are recovered locally and only logged
//! - rendering failures abort the whole render call with a single error

use thiserror::Error;

/// Top-level error type for Filterstack.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the effect registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Effect descriptor has an empty id")]
    EmptyId,

    #[error("Effect '{id}' is already registered")]
    AlreadyRegistered { id: String },

    #[error("Effect '{id}' is not registered")]
    NotFound { id: String },
}

/// Errors from the filter state store.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that abort a render call.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Source image is empty")]
    EmptySource,

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Render cancelled")]
    Cancelled,
}

/// Errors while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Io { path: String, error: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl RenderError {
    /// Whether the caller may simply retry with new input (e.g. after a state change).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::Cancelled | RenderError::InvalidDimensions { .. })
    }
}

impl From<image::ImageError> for RenderError {
    fn from(error: image::ImageError) -> Self {
        RenderError::Decode(error.to_string())
    }
}

/// Result type alias for Filterstack operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
