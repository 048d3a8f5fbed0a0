//! Layers: the declarative paint operations an effect hands to the compositor.

use crate::core::blend::BlendMode;
use crate::core::matrix::ColorMatrix;

/// Which image a layer samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerSource {
    /// The photograph being edited.
    Primary,
    /// A secondary image supplied by the caller, looked up by key.
    External(String),
}

/// One paint operation: sample an image, transform its colors, blend it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub source: LayerSource,
    pub matrix: ColorMatrix,
    pub blend_mode: BlendMode,
    /// Coverage in `[0, 1]`, already multiplied by the effect's opacity.
    pub opacity: f32,
}

impl Layer {
    /// A layer over the primary image.
    pub fn primary(matrix: ColorMatrix, blend_mode: BlendMode, opacity: f32) -> Self {
        Self {
            source: LayerSource::Primary,
            matrix,
            blend_mode,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// An untransformed layer over an external asset.
    pub fn external(key: impl Into<String>, blend_mode: BlendMode, opacity: f32) -> Self {
        Self {
            source: LayerSource::External(key.into()),
            matrix: ColorMatrix::IDENTITY,
            blend_mode,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// A primary-image layer whose matrix and (where needed) opacity fade with
    /// `intensity`, so that zero intensity leaves the image untouched.
    ///
    /// `target` is the full-strength transform; `opacity` is the effect
    /// opacity times the layer's sub-opacity.
    pub fn adjustment(
        target: &ColorMatrix,
        blend_mode: BlendMode,
        intensity: f32,
        opacity: f32,
    ) -> Self {
        let intensity = intensity.clamp(0.0, 1.0);
        let coverage = if blend_mode.is_idempotent() {
            opacity
        } else {
            opacity * intensity
        };
        Self::primary(ColorMatrix::toward(target, intensity), blend_mode, coverage)
    }

    /// Whether painting this layer can have any visible effect.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_at_zero_intensity() {
        let layer = Layer::adjustment(&ColorMatrix::sepia(), BlendMode::Normal, 0.0, 0.8);
        assert_eq!(layer.matrix, ColorMatrix::IDENTITY);
        assert_eq!(layer.opacity, 0.8);

        let layer = Layer::adjustment(&ColorMatrix::sepia(), BlendMode::Screen, 0.0, 0.8);
        assert_eq!(layer.matrix, ColorMatrix::IDENTITY);
        assert!(!layer.is_visible());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let layer = Layer::primary(ColorMatrix::IDENTITY, BlendMode::Normal, 1.7);
        assert_eq!(layer.opacity, 1.0);
        let layer = Layer::external("overlay_blend", BlendMode::Multiply, -0.2);
        assert_eq!(layer.opacity, 0.0);
        assert_eq!(layer.source, LayerSource::External("overlay_blend".into()));
    }
}
