//! Light effects: Glow, Bloom, Fade

use crate::core::blend::BlendMode;
use crate::core::context::RenderContext;
use crate::core::effect::{Effect, EffectCategory, EffectDescriptor};
use crate::core::layer::Layer;
use crate::core::matrix::ColorMatrix;
use crate::core::params::tone_defaults;
use crate::core::types::Color;
use std::sync::Arc;

/// Light effects, in registration order.
pub fn effects() -> Vec<Arc<dyn Effect>> {
    vec![Arc::new(Glow), Arc::new(Bloom), Arc::new(Fade)]
}

/// Screens a brightened copy over the image.
#[derive(Debug, Clone)]
pub struct Glow;

impl Effect for Glow {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("glow", "Glow")
            .description("Luminous screen-blended highlights")
            .category(EffectCategory::Effect)
            .parameters(tone_defaults(0.6, 1.0))
            .color(Color::rgb(255, 244, 200))
            .tags(["light", "soft"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let lifted = ColorMatrix::brightness(0.15).then(&ColorMatrix::saturation(1.1));
        vec![Layer::adjustment(
            &lifted,
            BlendMode::Screen,
            tone.intensity,
            tone.opacity * 0.5,
        )]
    }
}

/// Color-dodges a darkened copy so only highlights bloom.
#[derive(Debug, Clone)]
pub struct Bloom;

impl Effect for Bloom {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("bloom", "Bloom")
            .description("Highlights that bleed into their surroundings")
            .category(EffectCategory::Effect)
            .parameters(tone_defaults(0.5, 1.0))
            .color(Color::rgb(255, 210, 150))
            .tags(["light", "highlights"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let dim = ColorMatrix::scale_offset([0.35; 3], [0.0; 3]);
        vec![Layer::adjustment(
            &dim,
            BlendMode::ColorDodge,
            tone.intensity,
            tone.opacity * 0.45,
        )]
    }
}

/// Washed-out matte finish.
#[derive(Debug, Clone)]
pub struct Fade;

impl Effect for Fade {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("fade", "Fade")
            .description("Matte finish with lifted blacks and muted color")
            .category(EffectCategory::Effect)
            .parameters(tone_defaults(0.5, 1.0))
            .color(Color::rgb(180, 180, 170))
            .tags(["matte", "film"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let matte = ColorMatrix::saturation(0.75)
            .then(&ColorMatrix::scale_offset([0.82; 3], [0.12; 3]));
        let floor = ColorMatrix::flat([0.22; 3]);
        vec![
            Layer::adjustment(&matte, BlendMode::Normal, tone.intensity, tone.opacity),
            Layer::adjustment(&floor, BlendMode::Lighten, tone.intensity, tone.opacity * 0.5),
        ]
    }
}
