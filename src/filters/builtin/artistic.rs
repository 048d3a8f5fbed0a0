//! Artistic looks: Sepia, Noir, Vintage, Cross Process, Dreamy

use crate::core::blend::BlendMode;
use crate::core::context::RenderContext;
use crate::core::effect::{Effect, EffectCategory, EffectDescriptor};
use crate::core::layer::Layer;
use crate::core::matrix::ColorMatrix;
use crate::core::params::{tone_defaults, unit_param};
use crate::core::types::{Color, Value};
use std::sync::Arc;

/// Artistic effects, in registration order.
pub fn effects() -> Vec<Arc<dyn Effect>> {
    vec![
        Arc::new(Sepia),
        Arc::new(Noir),
        Arc::new(Vintage),
        Arc::new(CrossProcess),
        Arc::new(Dreamy),
    ]
}

/// Warm brown monochrome.
#[derive(Debug, Clone)]
pub struct Sepia;

impl Effect for Sepia {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("sepia", "Sepia")
            .description("Warm brown monochrome, like an aged print")
            .category(EffectCategory::Artistic)
            .parameters(tone_defaults(0.8, 1.0))
            .color(Color::rgb(112, 66, 20))
            .tags(["vintage", "monochrome"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        vec![Layer::adjustment(
            &ColorMatrix::sepia(),
            BlendMode::Normal,
            tone.intensity,
            tone.opacity,
        )]
    }
}

/// High-contrast black and white.
///
/// Reads `contrast` (default 1.4) for the strength of the tone curve.
#[derive(Debug, Clone)]
pub struct Noir;

impl Effect for Noir {
    fn descriptor(&self) -> EffectDescriptor {
        let mut params = tone_defaults(1.0, 1.0);
        params.insert("contrast".into(), Value::Float(1.4));

        EffectDescriptor::builder("noir", "Noir")
            .description("Dramatic black and white with crushed shadows")
            .category(EffectCategory::Artistic)
            .parameters(params)
            .color(Color::rgb(20, 20, 20))
            .tags(["monochrome", "black and white"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let contrast = ctx.get_float("contrast").unwrap_or(1.4).clamp(0.5, 3.0) as f32;
        let mono = ColorMatrix::grayscale();
        vec![
            Layer::adjustment(
                &mono.then(&ColorMatrix::contrast(contrast)),
                BlendMode::Normal,
                tone.intensity,
                tone.opacity,
            ),
            Layer::adjustment(&mono, BlendMode::Multiply, tone.intensity, tone.opacity * 0.25),
        ]
    }
}

/// Faded, warm film look.
#[derive(Debug, Clone)]
pub struct Vintage;

impl Effect for Vintage {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("vintage", "Vintage")
            .description("Faded warm film with lifted blacks")
            .category(EffectCategory::Artistic)
            .parameters(tone_defaults(0.7, 1.0))
            .color(Color::rgb(214, 176, 124))
            .tags(["film", "retro"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let base = ColorMatrix::sepia()
            .then(&ColorMatrix::saturation(0.7))
            .then(&ColorMatrix::scale_offset([0.9; 3], [0.06; 3]));
        let tint = ColorMatrix::flat([1.0, 0.92, 0.78]);
        vec![
            Layer::adjustment(&base, BlendMode::Normal, tone.intensity, tone.opacity * 0.8),
            Layer::adjustment(&tint, BlendMode::Multiply, tone.intensity, tone.opacity * 0.3),
        ]
    }
}

/// Slide film developed in negative chemistry.
#[derive(Debug, Clone)]
pub struct CrossProcess;

impl Effect for CrossProcess {
    fn descriptor(&self) -> EffectDescriptor {
        EffectDescriptor::builder("cross_process", "Cross Process")
            .description("Yellow highlights, blue shadows and punchy contrast")
            .category(EffectCategory::Artistic)
            .parameters(tone_defaults(0.6, 1.0))
            .color(Color::rgb(198, 222, 60))
            .tags(["film", "color shift"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let shift = ColorMatrix::scale_offset([1.12, 1.05, 0.82], [-0.02, 0.0, 0.1])
            .then(&ColorMatrix::contrast(1.15));
        vec![
            Layer::adjustment(&shift, BlendMode::Normal, tone.intensity, tone.opacity),
            Layer::adjustment(
                &ColorMatrix::IDENTITY,
                BlendMode::Overlay,
                tone.intensity,
                tone.opacity * 0.25,
            ),
        ]
    }
}

/// Soft pastel haze with a glow.
///
/// Reads `glow` (default 0.35) as the glow layer's share of the opacity.
#[derive(Debug, Clone)]
pub struct Dreamy;

impl Effect for Dreamy {
    fn descriptor(&self) -> EffectDescriptor {
        let mut params = tone_defaults(0.7, 1.0);
        params.insert("glow".into(), Value::Float(0.35));

        EffectDescriptor::builder("dreamy", "Dreamy")
            .description("Soft pastel haze with a light glow")
            .category(EffectCategory::Artistic)
            .parameters(params)
            .color(Color::rgb(240, 190, 230))
            .tags(["soft", "glow"])
            .build()
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Layer> {
        let tone = ctx.tone();
        let glow = unit_param(ctx.parameters(), "glow", 0.35);
        let soft = ColorMatrix::saturation(0.85).then(&ColorMatrix::scale_offset([0.92; 3], [0.08; 3]));
        let bright = ColorMatrix::brightness(0.12).then(&ColorMatrix::saturation(1.1));
        vec![
            Layer::adjustment(&soft, BlendMode::Normal, tone.intensity, tone.opacity * 0.6),
            Layer::adjustment(&bright, BlendMode::Screen, tone.intensity, tone.opacity * glow),
        ]
    }
}
