//! Crop rendering: compositing the selected region into encoded outputs.
//!
//! This module provides:
//! - The drawing capability the pipeline is written against ([`Surface`],
//!   [`RenderBackend`]) and a CPU implementation ([`RasterBackend`])
//! - The output model ([`OutputSpec`], [`CropResult`])
//! - [`render_crop`], the asynchronous pipeline itself
//!
//! # Pipeline
//!
//! 1. Fit the crop rectangle into the optional max output bounds
//! 2. Draw the crop region onto a fresh surface, rotated about its center
//! 3. For circular output, composite that onto a square surface clipped to
//!    its inscribed circle
//! 4. Encode the representations the [`OutputFormat`] asks for

mod output;
mod pipeline;
mod raster;
mod surface;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::error::CropUploadError;

pub use output::{Blob, CropResult, NamedFile, OutputFormat, OutputSpec, OutputType};
pub use pipeline::{render_crop, RenderRequest};
pub use raster::{RasterBackend, RasterSurface, MAX_SURFACE_AREA};
pub use surface::{DrawRect, RenderBackend, Surface};

/// Errors raised by a backend or the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The source image could not be decoded.
    #[error("Failed to load image: {0}")]
    Decode(String),

    /// Drawing onto a surface failed.
    #[error("{0}")]
    Draw(String),

    /// A surface could not be acquired.
    #[error("Failed to get canvas context: {0}")]
    Surface(String),

    /// The surface could not be encoded.
    #[error("{0}")]
    Encode(String),
}

impl RenderError {
    /// Convert into the user-facing error.
    ///
    /// Decode and draw failures become `CropError` prefixed by the kind of
    /// crop; surface and encode failures become `CanvasError`.
    pub fn into_upload_error(self, circular: bool) -> CropUploadError {
        match self {
            RenderError::Decode(_) | RenderError::Draw(_) => {
                let prefix = if circular {
                    "Failed to create circular crop"
                } else {
                    "Failed to crop image"
                };
                CropUploadError::crop(format!("{prefix}: {self}"))
            }
            RenderError::Surface(_) | RenderError::Encode(_) => {
                CropUploadError::canvas(self.to_string())
            }
        }
    }
}

impl From<DecodeError> for RenderError {
    fn from(err: DecodeError) -> Self {
        RenderError::Decode(err.to_string())
    }
}

impl From<EncodeError> for RenderError {
    fn from(err: EncodeError) -> Self {
        RenderError::Encode(err.to_string())
    }
}
