//! JPEG encoding for crop output.
//!
//! JPEG has no alpha channel, so transparent pixels (outside a circular mask,
//! or uncovered corners of a rotated crop) are composited over black before
//! encoding. That matches what a browser canvas produces for `image/jpeg`.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;

use super::{check_rgba, EncodeError};

/// Map a `[0, 1]` quality to the encoder's 1-100 scale.
///
/// Non-finite input falls back to 0.92, the browser default.
pub fn jpeg_quality(quality: f64) -> u8 {
    let quality = if quality.is_finite() { quality } else { 0.92 };
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let rgb = flatten_over_black(pixels);
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
