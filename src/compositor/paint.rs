//! Float pixel buffer and the per-layer paint kernel.

use crate::core::layer::Layer;
use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

/// Straight-alpha RGBA pixels in `[0, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    /// Convert an image that is already at the target size.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.pixels().map(|p| p.0).collect(),
        }
    }

    /// Solid-fill buffer.
    pub fn filled(width: u32, height: u32, px: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![px; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Quantize to 8-bit RGBA.
    pub fn to_image(&self) -> DynamicImage {
        let width = self.width as usize;
        let img = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[y as usize * width + x as usize];
            Rgba(px.map(quantize))
        });
        DynamicImage::ImageRgba8(img)
    }

    /// Paint one layer onto this accumulator.
    ///
    /// `sample` is the layer's source, already cover-fit to this buffer's size.
    /// Each sampled pixel is color-transformed, then blended in at
    /// `opacity × transformed alpha`.
    pub fn paint(&mut self, sample: &PixelBuffer, layer: &Layer, parallel: bool) {
        debug_assert_eq!(self.pixels.len(), sample.pixels.len());
        let kernel = |(accum, src): (&mut [f32; 4], &[f32; 4])| {
            let t = layer.matrix.apply(*src);
            *accum = layer.blend_mode.composite(*accum, t, layer.opacity * t[3]);
        };

        if parallel {
            self.pixels
                .par_iter_mut()
                .zip(sample.pixels.par_iter())
                .for_each(kernel);
        } else {
            self.pixels.iter_mut().zip(sample.pixels.iter()).for_each(kernel);
        }
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blend::BlendMode;
    use crate::core::matrix::ColorMatrix;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_roundtrip_8bit() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(4, 3, |x, y| {
            Rgba([x as u8 * 60, y as u8 * 100, 33, 200])
        }));
        let buffer = PixelBuffer::from_image(&img);
        assert_eq!(buffer.to_image().as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_normal_full_opacity_replaces() {
        let mut accum = PixelBuffer::filled(2, 2, [0.1, 0.2, 0.3, 1.0]);
        let sample = PixelBuffer::filled(2, 2, [0.5, 0.5, 0.5, 1.0]);
        let layer = Layer::primary(ColorMatrix::flat([0.9, 0.4, 0.0]), BlendMode::Normal, 1.0);

        accum.paint(&sample, &layer, false);
        assert!(approx(accum.get(1, 1).unwrap(), [0.9, 0.4, 0.0, 1.0]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sample = PixelBuffer::from_image(&DynamicImage::ImageRgba8(RgbaImage::from_fn(
            16,
            9,
            |x, y| Rgba([(x * 15) as u8, (y * 28) as u8, 128, 255]),
        )));
        let layer = Layer::primary(ColorMatrix::sepia(), BlendMode::Overlay, 0.7);

        let mut seq = PixelBuffer::filled(16, 9, [0.4, 0.6, 0.2, 1.0]);
        let mut par = seq.clone();
        seq.paint(&sample, &layer, false);
        par.paint(&sample, &layer, true);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_transparent_sample_leaves_accum() {
        let mut accum = PixelBuffer::filled(1, 1, [0.3, 0.3, 0.3, 1.0]);
        let sample = PixelBuffer::filled(1, 1, [1.0, 0.0, 0.0, 0.0]);
        let layer = Layer::primary(ColorMatrix::IDENTITY, BlendMode::Normal, 1.0);

        accum.paint(&sample, &layer, true);
        assert!(approx(accum.get(0, 0).unwrap(), [0.3, 0.3, 0.3, 1.0]));
    }
}
