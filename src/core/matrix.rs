//! 4×5 affine color transform.
//!
//! Row-major, one row per output channel: `R' = m0·R + m1·G + m2·B + m3·A + m4`
//! and so on for G', B' and A'. Channels are in `[0, 1]`, so the offset column
//! is in the same unit (not 0..255).

use serde::{Deserialize, Serialize};

/// Rec. 709 luma weights, used by saturation and grayscale.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// A 4×5 color matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    /// The identity transform.
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
    ]);

    /// Build from a raw row-major array.
    pub const fn new(m: [f32; 20]) -> Self {
        Self(m)
    }

    /// Per-channel scale and offset, alpha untouched.
    pub fn scale_offset(scale: [f32; 3], offset: [f32; 3]) -> Self {
        Self([
            scale[0], 0.0, 0.0, 0.0, offset[0], //
            0.0, scale[1], 0.0, 0.0, offset[1], //
            0.0, 0.0, scale[2], 0.0, offset[2], //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Uniform brightness offset.
    pub fn brightness(amount: f32) -> Self {
        Self::scale_offset([1.0; 3], [amount; 3])
    }

    /// Contrast around mid-gray. `1.0` is identity.
    pub fn contrast(amount: f32) -> Self {
        let offset = 0.5 * (1.0 - amount);
        Self::scale_offset([amount; 3], [offset; 3])
    }

    /// Saturation. `1.0` is identity, `0.0` is grayscale.
    pub fn saturation(amount: f32) -> Self {
        let inv = 1.0 - amount;
        let r = LUMA[0] * inv;
        let g = LUMA[1] * inv;
        let b = LUMA[2] * inv;
        Self([
            r + amount, g, b, 0.0, 0.0, //
            r, g + amount, b, 0.0, 0.0, //
            r, g, b + amount, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Luma grayscale.
    pub fn grayscale() -> Self {
        Self::saturation(0.0)
    }

    /// Classic sepia tone.
    pub fn sepia() -> Self {
        Self([
            0.393, 0.769, 0.189, 0.0, 0.0, //
            0.349, 0.686, 0.168, 0.0, 0.0, //
            0.272, 0.534, 0.131, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    /// Replace every pixel's color with a constant, keeping alpha.
    pub fn flat(color: [f32; 3]) -> Self {
        Self::scale_offset([0.0; 3], color)
    }

    /// Linear interpolation between `self` and `target`, element-wise.
    ///
    /// At `t = 0` this returns `self` exactly.
    pub fn lerp(&self, target: &ColorMatrix, t: f32) -> ColorMatrix {
        let mut out = self.0;
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(target.0.iter())) {
            *o = a + (b - a) * t;
        }
        ColorMatrix(out)
    }

    /// Blend from identity toward `target` by `intensity`.
    ///
    /// Every built-in effect builds its matrices through this so that zero
    /// intensity is exactly the identity transform.
    pub fn toward(target: &ColorMatrix, intensity: f32) -> ColorMatrix {
        Self::IDENTITY.lerp(target, intensity)
    }

    /// Compose two transforms: the result applies `first`, then `self`.
    pub fn then_after(&self, first: &ColorMatrix) -> ColorMatrix {
        let a = &self.0;
        let b = &first.0;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[row * 5 + k] * b[k * 5 + col];
                }
                if col == 4 {
                    sum += a[row * 5 + 4];
                }
                out[row * 5 + col] = sum;
            }
        }
        ColorMatrix(out)
    }

    /// Chain `next` after `self` (builder-style composition).
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        next.then_after(self)
    }

    /// Whether this is the identity within `epsilon`.
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.0
            .iter()
            .zip(Self::IDENTITY.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Apply to one straight-alpha pixel, clamping every channel to `[0, 1]`.
    #[inline]
    pub fn apply(&self, px: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let [r, g, b, a] = px;
        [
            (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0),
            (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0),
            (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0),
            (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0),
        ]
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_identity_apply() {
        let px = [0.1, 0.5, 0.9, 0.7];
        assert_eq!(ColorMatrix::IDENTITY.apply(px), px);
    }

    #[test]
    fn test_toward_zero_is_identity() {
        let m = ColorMatrix::toward(&ColorMatrix::sepia(), 0.0);
        assert_eq!(m, ColorMatrix::IDENTITY);
        let m = ColorMatrix::toward(&ColorMatrix::sepia(), 1.0);
        let sepia = ColorMatrix::sepia();
        assert!(m.0.iter().zip(sepia.0.iter()).all(|(a, b)| (a - b).abs() < 1e-6));
    }

    #[test]
    fn test_neutral_parameters_are_identity() {
        assert!(ColorMatrix::saturation(1.0).is_identity(1e-6));
        assert!(ColorMatrix::contrast(1.0).is_identity(1e-6));
        assert!(ColorMatrix::brightness(0.0).is_identity(1e-6));
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let out = ColorMatrix::grayscale().apply([1.0, 0.0, 0.0, 1.0]);
        assert!((out[0] - out[1]).abs() < 1e-6);
        assert!((out[1] - out[2]).abs() < 1e-6);
        assert!((out[0] - 0.2126).abs() < 1e-5);
    }

    #[test]
    fn test_apply_clamps() {
        let out = ColorMatrix::brightness(0.5).apply([0.8, 0.2, 0.0, 1.0]);
        assert!(approx(out, [1.0, 0.7, 0.5, 1.0]));
        let out = ColorMatrix::brightness(-0.5).apply([0.2, 0.6, 1.0, 1.0]);
        assert!(approx(out, [0.0, 0.1, 0.5, 1.0]));
    }

    #[test]
    fn test_composition_order() {
        let brighten = ColorMatrix::brightness(0.1);
        let double = ColorMatrix::scale_offset([2.0; 3], [0.0; 3]);
        let px = [0.2, 0.2, 0.2, 1.0];

        // brighten first, then double: (0.2 + 0.1) * 2 = 0.6
        let m = brighten.then(&double);
        assert!(approx(m.apply(px), [0.6, 0.6, 0.6, 1.0]));

        // double first, then brighten: 0.2 * 2 + 0.1 = 0.5
        let m = double.then(&brighten);
        assert!(approx(m.apply(px), [0.5, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn test_flat_keeps_alpha() {
        let out = ColorMatrix::flat([0.25, 0.5, 0.75]).apply([0.9, 0.9, 0.9, 0.4]);
        assert!(approx(out, [0.25, 0.5, 0.75, 0.4]));
    }
}
