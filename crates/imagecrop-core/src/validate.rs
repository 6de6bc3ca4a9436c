//! File size and type validation for selected files.
//!
//! Size is always checked before type, so a file that violates both limits
//! reports [`CropUploadError::FileTooLarge`].

use std::sync::Arc;

use crate::error::{mib_rounded, CropUploadError};

/// A file handed over by the selection/drop surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Original file name, used for the output file.
    pub name: String,
    /// MIME type reported by the browser.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Raw file contents.
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes: bytes.into(),
        }
    }
}

/// Returns `FileTooLarge` when the file is strictly larger than `max_size`.
pub fn validate_file_size(file: &SelectedFile, max_size: u64) -> Option<CropUploadError> {
    if file.size > max_size {
        return Some(CropUploadError::FileTooLarge { max_size });
    }
    None
}

/// Returns `InvalidFileType` unless the MIME type is exactly one of `allowed_types`.
pub fn validate_file_type(file: &SelectedFile, allowed_types: &[String]) -> Option<CropUploadError> {
    if !allowed_types.iter().any(|t| *t == file.mime_type) {
        return Some(CropUploadError::InvalidFileType {
            allowed_types: allowed_types.to_vec(),
        });
    }
    None
}

/// Validate size, then type. `None` means the file is acceptable.
pub fn validate_file(
    file: &SelectedFile,
    max_size: u64,
    allowed_types: &[String],
) -> Option<CropUploadError> {
    validate_file_size(file, max_size).or_else(|| validate_file_type(file, allowed_types))
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let k = 1024f64;
    let b = bytes as f64;
    let i = ((b.ln() / k.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = (b / k.powi(i as i32) * 100.0).round() / 100.0;

    format!("{} {}", value, UNITS[i])
}

/// Extension including the dot, or an empty string.
pub fn file_extension(file_name: &str) -> &str {
    file_name.rfind('.').map_or("", |i| &file_name[i..])
}

/// True for `image/*` MIME types.
pub fn is_image_file(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Rejection reasons reported by the selection/drop surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionCode {
    /// `file-too-large`
    FileTooLarge,
    /// `file-invalid-type`
    FileInvalidType,
    /// Any other code, with the surface's message.
    Other(String),
}

impl RejectionCode {
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            "file-too-large" => RejectionCode::FileTooLarge,
            "file-invalid-type" => RejectionCode::FileInvalidType,
            _ => RejectionCode::Other(message.to_string()),
        }
    }

    /// Convert into the error stored in the session.
    pub fn into_error(self, max_size: u64) -> CropUploadError {
        let message = match self {
            RejectionCode::FileTooLarge => {
                format!("File size exceeds {}MB limit", mib_rounded(&max_size))
            }
            RejectionCode::FileInvalidType => "File type not supported".to_string(),
            RejectionCode::Other(message) if message.is_empty() => {
                "File selection failed".to_string()
            }
            RejectionCode::Other(message) => message,
        };
        CropUploadError::file_read(message)
    }
}
