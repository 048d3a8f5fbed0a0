//! Overlay blend: composites a caller-supplied image over the photograph.

use crate::core::blend::BlendMode;
use crate::core::context::RenderContext;
use crate::core::effect::{Effect, EffectCategory, EffectDescriptor};
use crate::core::layer::Layer;
use crate::core::params::{EffectParams, ASSET, BLEND_MODE, OPACITY};
use crate::core::types::{Color, Value};
use log::debug;
use std::sync::Arc;

/// Blend effects, in registration order.
pub fn effects() -> Vec<Arc<dyn Effect>> {
    vec![Arc::new(OverlayBlend)]
}

/// Blends an external image (texture, light leak, frame) over the photo.
///
/// Ignores intensity; only `asset`, `blend_mode` and `opacity` apply. With no
/// asset supplied it paints nothing.
#[derive(Debug, Clone)]
pub struct OverlayBlend;

impl Effect for OverlayBlend {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("overlay_blend", "Overlay Blend")
            .description("Blend a second image over the photo")
            .category(EffectCategory::Blend)
            .requires_external_asset()
            .parameter(ASSET, "")
            .parameter(BLEND_MODE, Value::from(BlendMode::Overlay.as_str()))
            .parameter(OPACITY, 0.5)
            .color(Color::rgb(120, 90, 200))
            .tags(["texture", "double exposure"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let EffectParams::Blend(params) = ctx.params() else {
            return Vec::new();
        };
        let key = params.asset_key(ctx.effect_id);
        if !ctx.has_asset(key) {
            debug!("No asset '{}' for {}; painting nothing", key, ctx.effect_id);
            return Vec::new();
        }
        vec![Layer::external(key, params.blend_mode, params.opacity)]
    }
}
