//! Enhancement effects: Vivid, Brighten, Contrast, Warm, Cool

use crate::core::blend::BlendMode;
use crate::core::context::RenderContext;
use crate::core::effect::{Effect, EffectCategory, EffectDescriptor};
use crate::core::layer::Layer;
use crate::core::matrix::ColorMatrix;
use crate::core::params::tone_defaults;
use crate::core::types::Color;
use std::sync::Arc;

/// Enhancement effects, in registration order.
pub fn effects() -> Vec<Arc<dyn Effect>> {
    vec![
        Arc::new(Vivid),
        Arc::new(Brighten),
        Arc::new(Contrast),
        Arc::new(Warm),
        Arc::new(Cool),
    ]
}

/// Single normal-mode adjustment layer, the shape every enhancement shares.
fn adjustment_layer(ctx: &RenderContext, target: &ColorMatrix) -> Vec<Layer> {
    let tone = ctx.tone();
    vec![Layer::adjustment(target, BlendMode::Normal, tone.intensity, tone.opacity)]
}

/// Richer colors with a slight contrast lift.
#[derive(Debug, Clone)]
pub struct Vivid;

impl Effect for Vivid {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("vivid", "Vivid")
            .description("Boost saturation with a gentle contrast lift")
            .category(EffectCategory::Enhancement)
            .enabled_by_default()
            .parameters(tone_defaults(0.7, 1.0))
            .color(Color::rgb(255, 94, 58))
            .tags(["saturation", "color"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let target = ColorMatrix::saturation(1.6).then(&ColorMatrix::contrast(1.1));
        adjustment_layer(ctx, &target)
    }
}

/// Lifts exposure.
#[derive(Debug, Clone)]
pub struct Brighten;

impl Effect for Brighten {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("brighten", "Brighten")
            .description("Raise exposure and lift the shadows")
            .category(EffectCategory::Enhancement)
            .parameters(tone_defaults(0.5, 1.0))
            .color(Color::rgb(255, 221, 87))
            .tags(["exposure", "light"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        adjustment_layer(ctx, &ColorMatrix::scale_offset([1.1; 3], [0.06; 3]))
    }
}

/// Expands tonal range around mid-gray.
#[derive(Debug, Clone)]
pub struct Contrast;

impl Effect for Contrast {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("contrast", "Contrast")
            .description("Deepen shadows and brighten highlights")
            .category(EffectCategory::Enhancement)
            .parameters(tone_defaults(0.5, 1.0))
            .color(Color::rgb(40, 40, 40))
            .tags(["punch", "tone"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        adjustment_layer(ctx, &ColorMatrix::contrast(1.35))
    }
}

/// Warmer white balance.
#[derive(Debug, Clone)]
pub struct Warm;

impl Effect for Warm {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("warm", "Warm")
            .description("Shift white balance toward amber")
            .category(EffectCategory::Enhancement)
            .parameters(tone_defaults(0.6, 1.0))
            .color(Color::rgb(255, 170, 80))
            .tags(["temperature", "white balance"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        adjustment_layer(
            ctx,
            &ColorMatrix::scale_offset([1.08, 1.0, 0.86], [0.03, 0.01, 0.0]),
        )
    }
}

/// Cooler white balance.
#[derive(Debug, Clone)]
pub struct Cool;

impl Effect for Cool {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("cool", "Cool")
            .description("Shift white balance toward blue")
            .category(EffectCategory::Enhancement)
            .parameters(tone_defaults(0.6, 1.0))
            .color(Color::rgb(90, 160, 255))
            .tags(["temperature", "white balance"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        adjustment_layer(
            ctx,
            &ColorMatrix::scale_offset([0.9, 0.98, 1.1], [0.0, 0.01, 0.04]),
        )
    }
}
