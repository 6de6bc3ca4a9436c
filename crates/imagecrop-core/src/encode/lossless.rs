//! PNG and WebP encoding. Both keep the alpha channel intact.

use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;

use super::{check_rgba, EncodeError};

pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Lossless WebP. The pure-Rust encoder has no lossy mode, so quality does
/// not apply here.
pub fn encode_webp(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "WebP",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = (x + y) % 2 == 0;
                pixels.extend_from_slice(if on { &[255, 0, 0, 255] } else { &[0, 0, 255, 0] });
            }
        }
        pixels
    }

    #[test]
    fn test_png_preserves_pixels() {
        let pixels = checker(5, 3);
        let png = encode_png(&pixels, 5, 3).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_webp_preserves_pixels() {
        let pixels = checker(6, 4);
        let webp = encode_webp(&pixels, 6, 4).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (6, 4));
        // Lossless encoders may rewrite the colour of fully transparent pixels
        for (a, b) in decoded.into_raw().chunks_exact(4).zip(pixels.chunks_exact(4)) {
            assert_eq!(a[3], b[3]);
            if b[3] == 255 {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_lossless_rejects_bad_buffer() {
        assert!(encode_png(&[0u8; 7], 1, 2).is_err());
        assert!(encode_webp(&[], 0, 0).is_err());
    }
}
