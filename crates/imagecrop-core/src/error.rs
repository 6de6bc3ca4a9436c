//! User-facing error taxonomy.
//!
//! Every failure the engine reports to the presentation layer ends up as a
//! [`CropUploadError`]. Module-internal errors (decode, encode, render) are
//! converted at the boundary where the lifecycle receives them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Errors surfaced through `on_error` and stored in the upload session.
///
/// Serialized as a tagged object so JavaScript callers receive
/// `{ "type": "FILE_TOO_LARGE", "maxSize": 1048576 }` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum CropUploadError {
    /// The selected file exceeds the configured size limit.
    #[error("File size exceeds {}MB limit", mib_rounded(.max_size))]
    FileTooLarge { max_size: u64 },

    /// The selected file's MIME type is not in the allowed list.
    #[error("Only {} files are supported", .allowed_types.join(", "))]
    InvalidFileType { allowed_types: Vec<String> },

    /// The file could not be read as an image.
    #[error("{message}")]
    FileReadError { message: String },

    /// Decoding the source or drawing the crop failed.
    #[error("{message}")]
    CropError { message: String },

    /// A rendering surface could not be acquired or encoded.
    #[error("{message}")]
    CanvasError { message: String },
}

impl CropUploadError {
    pub fn file_read(message: impl Into<String>) -> Self {
        Self::FileReadError {
            message: message.into(),
        }
    }

    pub fn crop(message: impl Into<String>) -> Self {
        Self::CropError {
            message: message.into(),
        }
    }

    pub fn canvas(message: impl Into<String>) -> Self {
        Self::CanvasError {
            message: message.into(),
        }
    }

    /// Stable machine-readable code, matching the serialized `type` tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            Self::FileReadError { .. } => "FILE_READ_ERROR",
            Self::CropError { .. } => "CROP_ERROR",
            Self::CanvasError { .. } => "CANVAS_ERROR",
        }
    }
}

/// Size in whole mebibytes, rounded to nearest.
pub(crate) fn mib_rounded(bytes: &u64) -> u64 {
    (*bytes as f64 / BYTES_PER_MIB).round() as u64
}
