//! Blend modes and the per-pixel compositing formula.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a layer's transformed pixel combines with the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Straight replace.
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    #[serde(alias = "colorDodge")]
    ColorDodge,
    Lighten,
}

impl BlendMode {
    /// All modes, in UI order.
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::ColorDodge,
            BlendMode::Lighten,
        ]
    }

    /// Stable name used in parameter maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::ColorDodge => "color_dodge",
            BlendMode::Lighten => "lighten",
        }
    }

    /// Whether `blend(x, x) == x` for every `x`.
    ///
    /// Layers in non-idempotent modes must fade their opacity with intensity,
    /// since an identity-matrix layer in those modes still changes the image.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, BlendMode::Normal | BlendMode::Lighten)
    }

    /// Blend one channel. `base` is the accumulator, `layer` the transformed pixel.
    #[inline]
    pub fn channel(&self, base: f32, layer: f32) -> f32 {
        match self {
            BlendMode::Normal => layer,
            BlendMode::Multiply => base * layer,
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - layer),
            BlendMode::Overlay => {
                if base <= 0.5 {
                    2.0 * base * layer
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - layer)
                }
            }
            BlendMode::ColorDodge => {
                if base <= 0.0 {
                    0.0
                } else if layer >= 1.0 {
                    1.0
                } else {
                    (base / (1.0 - layer)).min(1.0)
                }
            }
            BlendMode::Lighten => base.max(layer),
        }
    }

    /// Composite `layer` onto `accum` at coverage `alpha`.
    ///
    /// `accum = accum·(1-α) + blend(accum, layer)·α` for color channels and
    /// `accum·(1-α) + layer·α` for alpha, so an identity layer over its own
    /// source reproduces the source alpha.
    #[inline]
    pub fn composite(&self, accum: [f32; 4], layer: [f32; 4], alpha: f32) -> [f32; 4] {
        let inv = 1.0 - alpha;
        let mut out = [0.0f32; 4];
        for c in 0..3 {
            let blended = self.channel(accum[c], layer[c]);
            out[c] = (accum[c] * inv + blended * alpha).clamp(0.0, 1.0);
        }
        out[3] = (accum[3] * inv + layer[3] * alpha).clamp(0.0, 1.0);
        out
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "normal" | "" => Ok(BlendMode::Normal),
            "multiply" => Ok(BlendMode::Multiply),
            "screen" => Ok(BlendMode::Screen),
            "overlay" => Ok(BlendMode::Overlay),
            "color_dodge" | "colordodge" => Ok(BlendMode::ColorDodge),
            "lighten" => Ok(BlendMode::Lighten),
            other => Err(format!("Unknown blend mode: {}", other)),
        }
    }
}
