//! The `Effect` trait and effect descriptors.
//!
//! An effect is a pure recipe: given its resolved parameters it declares an
//! ordered list of [`Layer`]s. It never touches pixels itself; the compositor
//! does all sampling and blending.

use crate::core::context::RenderContext;
use crate::core::layer::Layer;
use crate::core::types::{Color, ParameterMap, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Category for organizing effects in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    /// Corrective adjustments (saturation, exposure, white balance)
    Enhancement,
    /// Stylised looks (sepia, noir, vintage)
    Artistic,
    /// Composites a second, externally supplied image
    Blend,
    /// Light effects (glow, bloom, fade)
    Effect,
}

impl EffectCategory {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            EffectCategory::Enhancement => "Enhancement",
            EffectCategory::Artistic => "Artistic",
            EffectCategory::Blend => "Blend",
            EffectCategory::Effect => "Effect",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [EffectCategory] {
        &[
            EffectCategory::Enhancement,
            EffectCategory::Artistic,
            EffectCategory::Effect,
            EffectCategory::Blend,
        ]
    }
}

impl Default for EffectCategory {
    fn default() -> Self {
        EffectCategory::Effect
    }
}

impl fmt::Display for EffectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Registry entry metadata describing an effect.
///
/// Immutable once registered; re-registering the same id replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Unique identifier (e.g., "sepia")
    pub id: String,
    /// Human-readable name (e.g., "Sepia")
    pub display_name: String,
    /// Detailed description
    pub description: String,
    /// Category for UI organization
    pub category: EffectCategory,
    /// Whether a fresh session starts with this effect enabled
    pub default_enabled: bool,
    /// Whether the effect needs a user-supplied secondary image
    pub requires_external_asset: bool,
    /// Parameter defaults, overridden per session
    pub default_parameters: ParameterMap,
    /// Optional color hint for UI
    pub color: Option<Color>,
    /// Searchable tags
    pub tags: Vec<String>,
}

impl EffectDescriptor {
    /// Create a new descriptor builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> EffectDescriptorBuilder {
        EffectDescriptorBuilder::new(id, name)
    }

    /// Get a default parameter by name.
    pub fn default_parameter(&self, name: &str) -> Option<&Value> {
        self.default_parameters.get(name)
    }
}

/// Builder for EffectDescriptor.
pub struct EffectDescriptorBuilder {
    descriptor: EffectDescriptor,
}

impl EffectDescriptorBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            descriptor: EffectDescriptor {
                id: id.into(),
                display_name: name.into(),
                description: String::new(),
                category: EffectCategory::default(),
                default_enabled: false,
                requires_external_asset: false,
                default_parameters: ParameterMap::new(),
                color: None,
                tags: Vec::new(),
            },
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    /// Set the category.
    pub fn category(mut self, category: EffectCategory) -> Self {
        self.descriptor.category = category;
        self
    }

    /// Enable in fresh sessions.
    pub fn enabled_by_default(mut self) -> Self {
        self.descriptor.default_enabled = true;
        self
    }

    /// Set the default-enabled flag explicitly.
    pub fn default_enabled(mut self, enabled: bool) -> Self {
        self.descriptor.default_enabled = enabled;
        self
    }

    /// Mark as needing an external image.
    pub fn requires_external_asset(mut self) -> Self {
        self.descriptor.requires_external_asset = true;
        self
    }

    /// Add a default parameter.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor
            .default_parameters
            .insert(name.into(), value.into());
        self
    }

    /// Replace all default parameters.
    pub fn parameters(mut self, parameters: ParameterMap) -> Self {
        self.descriptor.default_parameters = parameters;
        self
    }

    /// Set the color hint.
    pub fn color(mut self, color: Color) -> Self {
        self.descriptor.color = Some(color);
        self
    }

    /// Add multiple tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.descriptor.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> EffectDescriptor {
        self.descriptor
    }
}

/// Core trait for all effects.
pub trait Effect: Send + Sync {
    /// Get the effect's descriptor.
    fn descriptor(&self) -> EffectDescriptor;

    /// Declare the layers this effect paints, bottom to top.
    ///
    /// Must be pure: the same context always yields the same layers.
    fn render(&self, ctx: &RenderContext) -> Vec<Layer>;
}

/// Signature of a closure-backed render procedure.
pub type RenderFn = Arc<dyn Fn(&RenderContext) -> Vec<Layer> + Send + Sync>;

/// An effect assembled from a descriptor and a closure.
///
/// Handy for host-defined effects that don't warrant their own type.
#[derive(Clone)]
pub struct FnEffect {
    descriptor: EffectDescriptor,
    render: RenderFn,
}

impl FnEffect {
    /// Create from a descriptor and render procedure.
    pub fn new<F>(descriptor: EffectDescriptor, render: F) -> Self
    where
        F: Fn(&RenderContext) -> Vec<Layer> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            render: Arc::new(render),
        }
    }
}

impl fmt::Debug for FnEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEffect")
            .field("descriptor", &self.descriptor)
            .field("render", &"<fn>")
            .finish()
    }
}

impl Effect for FnEffect {
    fn descriptor(&self) -> EffectDescriptor {
        self.descriptor.clone()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        (self.render)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let descriptor = EffectDescriptor::builder("warm", "Warm")
            .description("Warmer white balance")
            .category(EffectCategory::Enhancement)
            .parameter("intensity", 0.6)
            .color(Color::rgb(255, 170, 80))
            .tags(["temperature"])
            .build();

        assert_eq!(descriptor.id, "warm");
        assert!(!descriptor.default_enabled);
        assert!(!descriptor.requires_external_asset);
        assert_eq!(descriptor.default_parameter("intensity"), Some(&Value::Float(0.6)));
        assert_eq!(descriptor.tags, vec!["temperature".to_string()]);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&EffectCategory::Enhancement).unwrap();
        assert_eq!(json, "\"enhancement\"");
    }
}
