use image::{imageops, DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PreprocessConfig;
use crate::error::{RaqimError, Result};

/// A named preprocessing recipe applied to the raw image before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Minimal processing: grayscale + contrast normalization only.
    Original,
    /// Mild blur followed by restorative sharpening, for speckled scans.
    Denoised,
    /// 2x resample + gamma + brightness + contrast + sharpen, for small or
    /// low-DPI source text.
    EnhancedUpscaled,
    /// Gamma + normalization + brightness + linear contrast stretch.
    HighContrast,
    /// Conservative Arabic preset: gentle upscale toward a readable
    /// resolution, light contrast and sharpening.
    ArabicConservative,
    /// Aggressive Arabic preset: larger upscale, gamma, heavy sharpening
    /// and binarization.
    ArabicAggressive,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Denoised => "denoised",
            Self::EnhancedUpscaled => "enhanced_upscaled",
            Self::HighContrast => "high_contrast",
            Self::ArabicConservative => "arabic_conservative",
            Self::ArabicAggressive => "arabic_aggressive",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produce the derived image bytes for one variant.
///
/// This step never propagates a hard failure: if any transform errors the
/// original bytes are returned unchanged and the attempt proceeds on them.
pub fn generate(bytes: &[u8], variant: Variant, config: &PreprocessConfig) -> Vec<u8> {
    match try_generate(bytes, variant, config) {
        Ok(processed) => processed,
        Err(e) => {
            warn!(variant = %variant, error = %e, "Preprocessing failed, falling back to original bytes");
            bytes.to_vec()
        }
    }
}

fn try_generate(bytes: &[u8], variant: Variant, config: &PreprocessConfig) -> Result<Vec<u8>> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes)).with_guessed_format()?;
    let img = reader.decode().map_err(RaqimError::Image)?;

    // Undersized input must be upscaled before any other transform runs.
    let img = ensure_min_dimension(img, config.min_dimension);
    let img = resize_if_needed(img, config.max_dimension);

    // Grayscale conversion also drops any alpha channel.
    let gray = img.to_luma8();

    let gray = match variant {
        Variant::Original => stretch_contrast(gray),
        Variant::Denoised => {
            let gray = imageops::blur(&gray, 0.7);
            let gray = imageops::unsharpen(&gray, 1.0, 2);
            stretch_contrast(gray)
        }
        Variant::EnhancedUpscaled => {
            let (w, h) = gray.dimensions();
            let gray = imageops::resize(&gray, w * 2, h * 2, imageops::FilterType::Lanczos3);
            let gray = apply_gamma(gray, 0.9);
            let gray = imageops::colorops::brighten(&gray, 10);
            let gray = imageops::colorops::contrast(&gray, 15.0);
            imageops::unsharpen(&gray, 1.2, 2)
        }
        Variant::HighContrast => {
            let gray = apply_gamma(gray, 1.2);
            let gray = stretch_contrast(gray);
            let gray = imageops::colorops::brighten(&gray, 5);
            imageops::colorops::contrast(&gray, 20.0)
        }
        Variant::ArabicConservative => {
            let gray = upscale_toward(gray, 1000, 2.0);
            let gray = imageops::colorops::contrast(&gray, 8.0);
            let gray = imageops::unsharpen(&gray, 0.8, 2);
            stretch_contrast(gray)
        }
        Variant::ArabicAggressive => {
            let (w, h) = gray.dimensions();
            let gray = imageops::resize(&gray, w * 2, h * 2, imageops::FilterType::Lanczos3);
            let gray = apply_gamma(gray, 1.1);
            let gray = imageops::unsharpen(&gray, 1.5, 3);
            let threshold = config
                .binarize_threshold
                .unwrap_or_else(|| auto_threshold(&gray));
            binarize(gray, threshold)
        }
    };

    debug!(variant = %variant, width = gray.width(), height = gray.height(), "Variant generated");

    // Lossless single-channel output; compression artifacts on thin glyph
    // strokes would undo the work above.
    let mut output = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| RaqimError::Preprocessing(format!("Failed to encode image: {e}")))?;
    Ok(output)
}

/// Upscale so both dimensions meet `min_dim`, preserving aspect ratio.
/// The recognition engine produces garbage on undersized input.
fn ensure_min_dimension(img: DynamicImage, min_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width >= min_dim && height >= min_dim {
        return img;
    }

    let ratio_w = min_dim as f32 / width as f32;
    let ratio_h = min_dim as f32 / height as f32;
    let ratio = ratio_w.max(ratio_h);

    let new_width = (width as f32 * ratio).ceil() as u32;
    let new_height = (height as f32 * ratio).ceil() as u32;
    img.resize(new_width, new_height, imageops::FilterType::Lanczos3)
}

/// Downscale if either dimension exceeds `max_dim`, preserving aspect ratio.
fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = (width as f32 * ratio) as u32;
    let new_height = (height as f32 * ratio) as u32;
    img.resize(new_width, new_height, imageops::FilterType::Lanczos3)
}

/// Upscale until the smaller dimension reaches `target`, capped at
/// `max_factor`. No-op when the image is already large enough.
fn upscale_toward(gray: GrayImage, target: u32, max_factor: f32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let smaller = w.min(h);
    if smaller >= target {
        return gray;
    }
    let factor = (target as f32 / smaller as f32).min(max_factor);
    let new_w = (w as f32 * factor) as u32;
    let new_h = (h as f32 * factor) as u32;
    imageops::resize(&gray, new_w, new_h, imageops::FilterType::Lanczos3)
}

/// Gamma correction via a lookup table. Values outside [0.1, 3.0] are
/// silently clamped, never rejected.
fn apply_gamma(gray: GrayImage, gamma: f32) -> GrayImage {
    let gamma = gamma.clamp(0.1, 3.0);
    let inv = 1.0 / gamma;
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let normalized = i as f32 / 255.0;
        *entry = (normalized.powf(inv) * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        image::Luma([lut[gray.get_pixel(x, y)[0] as usize]])
    })
}

/// Automatic binarization threshold from image statistics:
/// `clamp(mean_brightness * 0.9, 100, 200)`. Deterministic for identical
/// input.
fn auto_threshold(gray: &GrayImage) -> u8 {
    let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let mean = total as f64 / count as f64;
    (mean * 0.9).clamp(100.0, 200.0) as u8
}

fn binarize(gray: GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] >= threshold {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    })
}

/// Linear contrast stretch: darkest pixel maps to 0, lightest to 255, the
/// rest scale linearly. Flat images are returned unchanged.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let mut min_val = 255u8;
    let mut max_val = 0u8;
    for pixel in gray.pixels() {
        let val = pixel[0];
        min_val = min_val.min(val);
        max_val = max_val.max(val);
    }

    if max_val <= min_val {
        return gray;
    }

    let range = (max_val - min_val) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y);
        let normalized = (pixel[0] - min_val) as f32 / range;
        image::Luma([(normalized * 255.0) as u8])
    })
}
