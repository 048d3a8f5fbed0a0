//! Built-in effect library.
//!
//! Every effect here is a pure recipe of color matrices, blend modes and
//! opacities. They share two conventions:
//! - matrices are built with [`ColorMatrix::toward`](crate::core::matrix::ColorMatrix::toward),
//!   so `intensity = 0` is exactly the identity transform
//! - `opacity` multiplies every layer's fixed sub-opacity

mod enhancement;
mod artistic;
mod stylize;
mod blend;

use crate::core::effect::Effect;
use crate::filters::registry::EffectRegistry;
use log::warn;
use std::sync::Arc;

/// Preferred-first order for a fresh session: corrections, then looks,
/// then light effects, then overlays.
pub const PREFERRED_ORDER: &[&str] = &[
    "vivid",
    "contrast",
    "brighten",
    "warm",
    "cool",
    "sepia",
    "noir",
    "vintage",
    "cross_process",
    "dreamy",
    "fade",
    "glow",
    "bloom",
    "overlay_blend",
];

/// Every built-in effect, in registration order.
pub fn builtin_effects() -> Vec<Arc<dyn Effect>> {
    let mut effects = enhancement::effects();
    effects.extend(artistic::effects());
    effects.extend(stylize::effects());
    effects.extend(blend::effects());
    effects
}

/// Register all built-in effects.
pub fn register_all(registry: &mut EffectRegistry) {
    for effect in builtin_effects() {
        if let Err(e) = registry.register_arc(effect) {
            warn!("Skipping built-in effect: {}", e);
        }
    }
}

// Re-export for direct access
pub use enhancement::{Brighten, Contrast, Cool, Vivid, Warm};
pub use artistic::{CrossProcess, Dreamy, Noir, Sepia, Vintage};
pub use stylize::{Bloom, Fade, Glow};
pub use blend::OverlayBlend;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{ExternalAssets, RenderContext};
    use crate::core::layer::{Layer, LayerSource};
    use crate::core::params::{INTENSITY, OPACITY};
    use crate::core::types::{ParameterMap, Value};
    use std::collections::HashSet;

    const SAMPLES: &[[f32; 4]] = &[
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
        [0.2, 0.5, 0.8, 1.0],
        [0.9, 0.1, 0.4, 1.0],
        [0.5, 0.5, 0.5, 0.6],
        [0.1, 0.7, 0.3, 0.25],
    ];

    fn layers_for(effect: &dyn Effect, intensity: f64) -> Vec<Layer> {
        let descriptor = effect.descriptor();
        let mut params: ParameterMap = descriptor.default_parameters.clone();
        params.insert(INTENSITY.into(), Value::Float(intensity));
        params.insert(OPACITY.into(), Value::Float(1.0));
        let assets = ExternalAssets::new();
        let ctx = RenderContext::new(
            &descriptor.id,
            descriptor.category,
            8,
            8,
            true,
            &params,
            &assets,
        );
        effect.render(&ctx)
    }

    /// Composite primary-image layers over a single source pixel.
    fn composite_pixel(layers: &[Layer], px: [f32; 4]) -> [f32; 4] {
        layers.iter().fold(px, |accum, layer| {
            assert_eq!(layer.source, LayerSource::Primary);
            let t = layer.matrix.apply(px);
            layer.blend_mode.composite(accum, t, layer.opacity * t[3])
        })
    }

    #[test]
    fn test_ids_unique_and_preferred() {
        let effects = builtin_effects();
        let ids: HashSet<_> = effects.iter().map(|e| e.descriptor().id).collect();
        assert_eq!(ids.len(), effects.len());
        for id in &ids {
            assert!(PREFERRED_ORDER.contains(&id.as_str()), "{} not in order", id);
        }
        assert_eq!(PREFERRED_ORDER.len(), ids.len());
    }

    #[test]
    fn test_identity_at_zero_intensity() {
        for effect in builtin_effects() {
            let id = effect.descriptor().id;
            let layers = layers_for(effect.as_ref(), 0.0);
            for &px in SAMPLES {
                let out = composite_pixel(&layers, px);
                for c in 0..4 {
                    assert!(
                        (out[c] - px[c]).abs() < 1e-5,
                        "{}: channel {} changed {:?} -> {:?}",
                        id,
                        c,
                        px,
                        out
                    );
                }
            }
        }
    }

    #[test]
    fn test_full_intensity_changes_image() {
        for effect in builtin_effects() {
            let descriptor = effect.descriptor();
            if descriptor.requires_external_asset {
                continue;
            }
            let layers = layers_for(effect.as_ref(), 1.0);
            let px = [0.2, 0.5, 0.8, 1.0];
            let out = composite_pixel(&layers, px);
            let delta: f32 = (0..3).map(|c| (out[c] - px[c]).abs()).sum();
            assert!(delta > 0.01, "{} left the pixel unchanged", descriptor.id);
        }
    }

    #[test]
    fn test_catalog_flags() {
        let mut registry = EffectRegistry::new();
        register_all(&mut registry);

        let enabled: Vec<_> = registry
            .all()
            .filter(|d| d.default_enabled)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(enabled, vec!["vivid"]);

        let external: Vec<_> = registry
            .all()
            .filter(|d| d.requires_external_asset)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(external, vec!["overlay_blend"]);
    }
}
