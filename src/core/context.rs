//! Render context handed to an effect's render procedure, and the external
//! asset set a render call may reference.

use crate::core::params::{EffectParams, ToneParams};
use crate::core::effect::EffectCategory;
use crate::core::types::{ParameterMap, Value};
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::Arc;

/// Secondary images supplied by the caller, keyed by effect id (or by the
/// asset key an overlay effect names in its parameters).
#[derive(Debug, Clone, Default)]
pub struct ExternalAssets {
    images: HashMap<String, Arc<DynamicImage>>,
}

impl ExternalAssets {
    /// Create an empty asset set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, key: impl Into<String>, image: impl Into<Arc<DynamicImage>>) {
        self.images.insert(key.into(), image.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, image: impl Into<Arc<DynamicImage>>) -> Self {
        self.insert(key, image);
        self
    }

    /// Look up an asset.
    pub fn get(&self, key: &str) -> Option<&Arc<DynamicImage>> {
        self.images.get(key)
    }

    /// Whether an asset is present.
    pub fn contains(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Everything an effect may consult while declaring its layers.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Id of the effect being rendered.
    pub effect_id: &'a str,
    /// Category of the effect, selects the parameter schema.
    pub category: EffectCategory,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// True only for the first effect of the active stack.
    pub is_base_layer: bool,
    parameters: &'a ParameterMap,
    assets: &'a ExternalAssets,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context over resolved parameters.
    pub fn new(
        effect_id: &'a str,
        category: EffectCategory,
        width: u32,
        height: u32,
        is_base_layer: bool,
        parameters: &'a ParameterMap,
        assets: &'a ExternalAssets,
    ) -> Self {
        Self {
            effect_id,
            category,
            width,
            height,
            is_base_layer,
            parameters,
            assets,
        }
    }

    /// Get all resolved parameters.
    pub fn parameters(&self) -> &'a ParameterMap {
        self.parameters
    }

    /// Get a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&'a Value> {
        self.parameters.get(name)
    }

    /// Get a parameter as a float.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get_parameter(name).and_then(Value::as_float)
    }

    /// Get a parameter as a string.
    pub fn get_string(&self, name: &str) -> Option<&'a str> {
        self.get_parameter(name).and_then(Value::as_string)
    }

    /// Get a parameter as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_parameter(name).and_then(Value::as_bool)
    }

    /// Typed parameters according to the effect's category.
    pub fn params(&self) -> EffectParams {
        EffectParams::resolve(self.category, self.parameters)
    }

    /// Intensity and opacity for color-matrix effects.
    ///
    /// The blend family has no intensity, so it reads as full strength at the
    /// family's opacity.
    pub fn tone(&self) -> ToneParams {
        match self.params() {
            EffectParams::Adjustment(tone) => tone,
            EffectParams::Blend(blend) => ToneParams {
                opacity: blend.opacity,
                ..ToneParams::default()
            },
        }
    }

    /// Whether an external asset is available under `key`.
    pub fn has_asset(&self, key: &str) -> bool {
        self.assets.contains(key)
    }
}
