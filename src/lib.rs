//! # Filterstack - Photo Filter Composition
//!
//! Filterstack applies a user-selected, ordered stack of visual effects to a
//! photograph and composites the result into a single image.
//!
//! ## Features
//!
//! - **Effect Registry**: a runtime catalog of effects, injected wherever it is needed
//! - **Filter State**: per-session enabled flags, order and parameter overrides,
//!   kept consistent with the catalog as effects come and go
//! - **Compositor**: color-matrix layers blended with multiply, screen, overlay,
//!   color dodge, lighten or normal, painted in parallel
//! - **Effect Library**: built-in looks, each a pure recipe of matrices and blend modes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use filterstack::prelude::*;
//!
//! // One catalog per application, shared by every session
//! let registry = EffectRegistry::with_builtins().into_shared();
//!
//! // Session state
//! let mut state = FilterStateStore::new(registry.clone());
//! state.toggle("glow");
//! state.set_order(&["glow", "vivid"]);
//!
//! // Render
//! let source = load_source("photo.jpg")?;
//! let request = state.composite_request(source, 1080, 1080);
//! let compositor = Compositor::new(registry);
//! let output = compositor.render(&request, &ExternalAssets::new())?;
//! output.image.save("out.png")?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: values, color matrices, blend modes, layers, the `Effect` trait, errors
//! - [`filters`]: the effect registry and the built-in library
//! - [`state`]: the per-session filter state store and settings import/export
//! - [`compositor`]: the render pipeline
//! - [`config`]: TOML engine configuration
//!
//! ## Creating Custom Effects
//!
//! Implement the [`Effect`](core::Effect) trait:
//!
//! ```rust,ignore
//! use filterstack::prelude::*;
//!
//! struct Duotone;
//!
//! impl Effect for Duotone {
//!     fn descriptor(&self) -> EffectDescriptor {
//!         EffectDescriptor::builder("duotone", "Duotone")
//!             .description("Two-color print look")
//!             .category(EffectCategory::Artistic)
//!             .parameter("intensity", 1.0)
//!             .parameter("opacity", 1.0)
//!             .build()
//!     }
//!
//!     fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
//!         let tone = ctx.tone();
//!         let target = ColorMatrix::grayscale().then(&ColorMatrix::scale_offset(
//!             [0.9, 0.5, 0.7],
//!             [0.1, 0.05, 0.2],
//!         ));
//!         vec![Layer::adjustment(&target, BlendMode::Normal, tone.intensity, tone.opacity)]
//!     }
//! }
//!
//! registry.write().try_register(Duotone)?;
//! ```

#![warn(clippy::all)]

pub mod compositor;
pub mod config;
pub mod core;
pub mod filters;
pub mod state;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use filterstack::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Color, ParameterMap, SessionId, Value};
    pub use crate::core::matrix::ColorMatrix;
    pub use crate::core::blend::BlendMode;
    pub use crate::core::layer::{Layer, LayerSource};
    pub use crate::core::params::{BlendParams, EffectParams, ToneParams};

    // Effects
    pub use crate::core::effect::{Effect, EffectCategory, EffectDescriptor, FnEffect};
    pub use crate::core::context::{ExternalAssets, RenderContext};

    // Errors
    pub use crate::core::error::{
        ConfigError, EngineError, EngineResult, RegistryError, RenderError, StateError,
    };

    // Registry
    pub use crate::filters::registry::{EffectRegistry, RegistryBuilder, SharedRegistry};

    // State
    pub use crate::state::settings::{FilterSettings, ImportSummary};
    pub use crate::state::store::{EffectInstance, FilterStateStore, SharedFilterState};

    // Compositor
    pub use crate::compositor::{
        load_source, CancellationToken, CompositeRequest, Compositor, RenderOptions,
        RenderOutput, RenderProgress, RenderStats, Resample, SkipReason,
    };

    // Configuration
    pub use crate::config::EngineConfig;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
