//! "Cover" fitting: scale to fill the target, preserve aspect, crop overflow.

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resampling filter used when fitting images to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Resample {
    pub fn filter_type(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Gaussian => FilterType::Gaussian,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resample::Nearest => "nearest",
            Resample::Triangle => "triangle",
            Resample::CatmullRom => "catmull_rom",
            Resample::Gaussian => "gaussian",
            Resample::Lanczos3 => "lanczos3",
        }
    }
}

impl fmt::Display for Resample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resample {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nearest" => Ok(Resample::Nearest),
            "triangle" | "bilinear" => Ok(Resample::Triangle),
            "catmull_rom" | "catmullrom" | "bicubic" => Ok(Resample::CatmullRom),
            "gaussian" => Ok(Resample::Gaussian),
            "lanczos3" | "lanczos" => Ok(Resample::Lanczos3),
            other => Err(format!("unknown resample filter '{}'", other)),
        }
    }
}

/// Fit `image` into `width`×`height` with cover semantics.
///
/// Images already at the target size are returned untouched.
pub fn cover_fit(image: &DynamicImage, width: u32, height: u32, resample: Resample) -> DynamicImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    image.resize_to_fill(width, height, resample.filter_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn test_same_size_is_untouched() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(3, 2, |x, y| {
            Rgba([x as u8 * 40, y as u8 * 90, 7, 255])
        }));
        let fitted = cover_fit(&img, 3, 2, Resample::Lanczos3);
        assert_eq!(fitted.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_crops_overflow() {
        // Wide image: left half red, right half blue.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(40, 10, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }));
        let fitted = cover_fit(&img, 10, 10, Resample::Nearest);
        assert_eq!(fitted.dimensions(), (10, 10));
        // No letterboxing: every pixel is opaque.
        assert!(fitted.pixels().all(|(_, _, p)| p[3] == 255));
        assert_eq!(fitted.get_pixel(0, 5)[0], 255);
        assert_eq!(fitted.get_pixel(9, 5)[2], 255);
    }

    #[test]
    fn test_parse_resample() {
        assert_eq!("Catmull-Rom".parse::<Resample>().unwrap(), Resample::CatmullRom);
        assert_eq!("lanczos".parse::<Resample>().unwrap(), Resample::Lanczos3);
        assert!("sinc".parse::<Resample>().is_err());
    }
}
