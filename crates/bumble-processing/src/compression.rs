//! Upload preparation: fit an image into a byte budget.
//!
//! The pipeline decodes the input, downsizes it once so its larger side is at
//! most `max_dimension`, then JPEG-encodes at decreasing quality until the
//! output fits. When even the lowest quality does not fit, the original bytes
//! are returned untouched. Whether an image needs preparing at all is decided
//! by the caller.

use bumble_core::CompressionConfig;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Image task failed: {0}")]
    Task(String),
}

/// Pipeline parameters, with qualities in integer percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    pub max_size_bytes: usize,
    pub max_dimension: u32,
    pub initial_quality: u8,
    pub quality_step: u8,
    pub min_quality: u8,
}

fn to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl From<&CompressionConfig> for CompressionSettings {
    fn from(config: &CompressionConfig) -> Self {
        CompressionSettings {
            max_size_bytes: config.max_size_bytes,
            max_dimension: config.max_dimension,
            initial_quality: to_percent(config.initial_quality),
            quality_step: to_percent(config.quality_step),
            min_quality: to_percent(config.min_quality),
        }
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        CompressionSettings::from(&CompressionConfig::default())
    }
}

/// Result of [`prepare_for_upload`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub data: Bytes,
    /// `false` when `data` is the caller's original input.
    pub reencoded: bool,
    /// Set when re-encoded.
    pub mime_type: Option<&'static str>,
    pub quality: Option<u8>,
    pub dimensions: Option<(u32, u32)>,
}

impl PreparedImage {
    pub fn passthrough(data: Bytes) -> Self {
        PreparedImage {
            data,
            reencoded: false,
            mime_type: None,
            quality: None,
            dimensions: None,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Dimensions after bounding the larger side by `max_dimension`.
///
/// Images already within bounds keep their size. The shorter side is rounded
/// and never drops below one pixel.
pub fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return (width, height);
    }
    let scale = |side: u32| -> u32 {
        let scaled = (side as f64 * max_dimension as f64 / longest as f64).round() as u32;
        scaled.clamp(1, max_dimension)
    };
    if width >= height {
        (max_dimension, scale(height))
    } else {
        (scale(width), max_dimension)
    }
}

pub fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Decode(image::ImageError::IoError(e)))?;
    reader.decode().map_err(ProcessingError::Decode)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(ProcessingError::Encode)?;
    Ok(buffer)
}

/// Fit `data` into `settings.max_size_bytes`.
///
/// Output is either a JPEG no larger than the budget or the original bytes.
pub fn prepare_for_upload(
    data: Bytes,
    settings: &CompressionSettings,
) -> Result<PreparedImage, ProcessingError> {
    let start = std::time::Instant::now();
    let img = decode(&data)?;
    let (width, height) = img.dimensions();

    let (target_w, target_h) = bounded_dimensions(width, height, settings.max_dimension);
    let img = if (target_w, target_h) != (width, height) {
        img.resize_exact(target_w, target_h, FilterType::Triangle)
    } else {
        img
    };

    let min_quality = settings.min_quality.max(1);
    let mut quality = settings.initial_quality.clamp(min_quality, 100);
    loop {
        let encoded = encode_jpeg(&img, quality)?;
        tracing::debug!(
            quality = quality,
            size_bytes = encoded.len(),
            budget_bytes = settings.max_size_bytes,
            "Encoded upload candidate"
        );
        if encoded.len() <= settings.max_size_bytes {
            tracing::info!(
                original_bytes = data.len(),
                size_bytes = encoded.len(),
                quality = quality,
                width = target_w,
                height = target_h,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Image prepared for upload"
            );
            return Ok(PreparedImage {
                data: Bytes::from(encoded),
                reencoded: true,
                mime_type: Some("image/jpeg"),
                quality: Some(quality),
                dimensions: Some((target_w, target_h)),
            });
        }
        if quality <= min_quality || settings.quality_step == 0 {
            break;
        }
        quality = quality.saturating_sub(settings.quality_step).max(min_quality);
    }

    tracing::warn!(
        original_bytes = data.len(),
        budget_bytes = settings.max_size_bytes,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "No quality step fits the budget, keeping original image"
    );
    Ok(PreparedImage::passthrough(data))
}

/// [`prepare_for_upload`] on the blocking pool, so the calling task is only
/// suspended while pixels are crunched.
pub async fn prepare_in_background(
    data: Bytes,
    settings: CompressionSettings,
) -> Result<PreparedImage, ProcessingError> {
    tokio::task::spawn_blocking(move || prepare_for_upload(data, &settings))
        .await
        .map_err(|e| ProcessingError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Deterministic high-entropy image that compresses poorly as PNG.
    fn noisy_png(width: u32, height: u32) -> Bytes {
        let mut state: u32 = 0x9E37_79B9;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };
        let img = RgbImage::from_fn(width, height, |_, _| {
            let v = next();
            Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer)
    }

    fn settings(max_size_bytes: usize, max_dimension: u32) -> CompressionSettings {
        CompressionSettings {
            max_size_bytes,
            max_dimension,
            initial_quality: 80,
            quality_step: 10,
            min_quality: 10,
        }
    }

    #[test]
    fn bounded_dimensions_keeps_small_images() {
        assert_eq!(bounded_dimensions(800, 600, 1920), (800, 600));
        assert_eq!(bounded_dimensions(1920, 1080, 1920), (1920, 1080));
    }

    #[test]
    fn bounded_dimensions_scales_larger_side() {
        assert_eq!(bounded_dimensions(4000, 3000, 1920), (1920, 1440));
        assert_eq!(bounded_dimensions(3000, 4000, 1920), (1440, 1920));
        assert_eq!(bounded_dimensions(10_000, 1, 100), (100, 1));
    }

    #[test]
    fn bounded_dimensions_never_grow_and_keep_aspect() {
        for (w, h) in [(4032, 3024), (1081, 7), (2500, 2500), (333, 4999), (1921, 1080)] {
            let (nw, nh) = bounded_dimensions(w, h, 1920);
            assert!(nw <= w && nh <= h, "{w}x{h} -> {nw}x{nh}");
            assert!(nw.max(nh) <= 1920);
            let before = w as f64 / h as f64;
            let after = nw as f64 / nh as f64;
            // One pixel of rounding on the short side.
            let tolerance = before / nw.min(nh) as f64 + 1e-9;
            assert!((before - after).abs() <= tolerance.max(before * 0.01));
        }
    }

    #[test]
    fn settings_from_config_use_percent() {
        let settings = CompressionSettings::default();
        assert_eq!(settings.initial_quality, 80);
        assert_eq!(settings.quality_step, 10);
        assert_eq!(settings.min_quality, 10);
    }

    #[test]
    fn decode_failure_is_an_error() {
        let result = prepare_for_upload(Bytes::from_static(b"definitely not an image"), &settings(10, 100));
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn oversized_image_is_downscaled_and_fits_budget() {
        let original = noisy_png(600, 300);
        let budget = original.len() / 4;
        let prepared = prepare_for_upload(original.clone(), &settings(budget, 400)).unwrap();

        assert!(prepared.reencoded);
        assert!(prepared.len() <= budget);
        assert_eq!(prepared.dimensions, Some((400, 200)));
        assert_eq!(prepared.mime_type, Some("image/jpeg"));
        let decoded = decode(&prepared.data).unwrap();
        assert_eq!(decoded.dimensions(), (400, 200));
    }

    #[test]
    fn unreachable_budget_returns_original_bytes() {
        let original = noisy_png(300, 200);
        let prepared = prepare_for_upload(original.clone(), &settings(100, 1920)).unwrap();

        assert!(!prepared.reencoded);
        assert_eq!(prepared.data, original);
        assert_eq!(prepared.quality, None);
    }

    #[test]
    fn output_is_within_budget_or_exactly_original() {
        let original = noisy_png(320, 240);
        for budget in [50, 2_000, 10_000, 40_000, original.len() - 1] {
            let prepared = prepare_for_upload(original.clone(), &settings(budget, 1920)).unwrap();
            assert!(
                prepared.len() <= budget || prepared.data == original,
                "budget {budget}: got {} bytes",
                prepared.len()
            );
        }
    }

    #[test]
    fn first_fitting_quality_wins() {
        let original = noisy_png(200, 200);
        let prepared = prepare_for_upload(original, &settings(usize::MAX, 1920)).unwrap();
        assert_eq!(prepared.quality, Some(80));
    }

    #[tokio::test]
    async fn background_preparation_matches_inline() {
        let original = noisy_png(300, 150);
        let settings = settings(original.len() / 4, 200);
        let inline = prepare_for_upload(original.clone(), &settings).unwrap();
        let background = prepare_in_background(original, settings).await.unwrap();
        assert_eq!(inline, background);
    }
}
