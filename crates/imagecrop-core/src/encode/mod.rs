//! Image encoding for crop output.
//!
//! Rendered surfaces are RGBA. This module turns them into the byte
//! representations the result carries:
//! - JPEG, flattened over black since the format has no alpha channel
//! - PNG and WebP, both lossless and alpha preserving
//! - `data:` URLs wrapping any of the above, plus parsing them back
//!
//! Quality follows the browser convention of a number in `[0, 1]`. Lossless
//! formats ignore it.

mod data_url;
mod jpeg;
mod lossless;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use data_url::{parse_data_url, to_data_url, DataUrl, DataUrlError};
pub use jpeg::{encode_jpeg, jpeg_quality};
pub use lossless::{encode_png, encode_webp};

/// Errors that can occur while encoding a surface.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Encoded output image type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum OutputType {
    #[serde(rename = "image/png")]
    Png,
    #[default]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl OutputType {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputType::Png => "image/png",
            OutputType::Jpeg => "image/jpeg",
            OutputType::Webp => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Png => "png",
            OutputType::Jpeg => "jpg",
            OutputType::Webp => "webp",
        }
    }
}

/// Encode RGBA pixels as `output_type`.
///
/// # Errors
///
/// Returns an error if the dimensions are zero, the buffer length does not
/// match, or the encoder fails.
pub fn encode_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    output_type: OutputType,
    quality: f64,
) -> Result<Vec<u8>, EncodeError> {
    check_rgba(pixels, width, height)?;

    match output_type {
        OutputType::Jpeg => encode_jpeg(pixels, width, height, jpeg_quality(quality)),
        OutputType::Png => encode_png(pixels, width, height),
        OutputType::Webp => encode_webp(pixels, width, height),
    }
}

pub(crate) fn check_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
