//! Core types and traits for the Filterstack composition engine.
//!
//! This module contains the foundational types shared by the registry, the
//! state store and the compositor:
//! - Parameter values and maps
//! - Color matrices and blend modes
//! - Layers, the unit an effect hands to the compositor
//! - The `Effect` trait and descriptors
//! - Error types

pub mod types;
pub mod error;
pub mod matrix;
pub mod blend;
pub mod layer;
pub mod params;
pub mod effect;
pub mod context;

// Re-export commonly used types
pub use types::{Color, ParameterMap, SessionId, Value};
pub use error::{EngineError, RegistryError, RenderError, StateError};
pub use matrix::ColorMatrix;
pub use blend::BlendMode;
pub use layer::{Layer, LayerSource};
pub use params::{BlendParams, EffectParams, ToneParams};
pub use effect::{Effect, EffectCategory, EffectDescriptor, FnEffect};
pub use context::{ExternalAssets, RenderContext};
