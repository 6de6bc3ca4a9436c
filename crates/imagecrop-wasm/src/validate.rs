//! File validation bindings.
//!
//! These let the selection surface reject a file before its contents are
//! read into WASM memory.

use imagecrop_core::validate::{self, SelectedFile};
use imagecrop_core::CropUploadError;
use wasm_bindgen::prelude::*;

/// Check a file's size and MIME type.
///
/// # Arguments
///
/// * `mime_type` - The type reported by the browser (`file.type`)
/// * `size` - File size in bytes
/// * `max_size` - Largest accepted size in bytes
/// * `allowed_types` - Array of accepted MIME types
///
/// # Returns
///
/// `null` when the file is acceptable, otherwise an error object such as
/// `{ type: "FILE_TOO_LARGE", maxSize: 10485760 }`.
///
/// # Example
///
/// ```typescript
/// const error = validate_file(file.type, file.size, 10 * 1024 * 1024, ['image/png']);
/// if (error) showError(error);
/// ```
#[wasm_bindgen]
pub fn validate_file(
    mime_type: &str,
    size: f64,
    max_size: f64,
    allowed_types: JsValue,
) -> Result<JsValue, JsValue> {
    let allowed_types: Vec<String> = serde_wasm_bindgen::from_value(allowed_types)
        .map_err(|e| JsValue::from_str(&format!("Invalid allowed types: {}", e)))?;

    match check_file(mime_type, to_bytes(size), to_bytes(max_size), &allowed_types) {
        Some(err) => serde_wasm_bindgen::to_value(&err).map_err(JsValue::from),
        None => Ok(JsValue::NULL),
    }
}

/// Format a byte count for display, e.g. `1.5 KB`.
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    validate::format_file_size(to_bytes(bytes))
}

fn check_file(
    mime_type: &str,
    size: u64,
    max_size: u64,
    allowed_types: &[String],
) -> Option<CropUploadError> {
    let file = SelectedFile {
        name: String::new(),
        mime_type: mime_type.to_string(),
        size,
        bytes: Vec::<u8>::new().into(),
    };
    validate::validate_file(&file, max_size, allowed_types)
}

/// JS numbers to byte counts; negative and NaN become 0.
fn to_bytes(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["image/png".to_string(), "image/jpeg".to_string()]
    }

    #[test]
    fn test_check_file_accepts() {
        assert_eq!(check_file("image/png", 1000, 2000, &allowed()), None);
    }

    #[test]
    fn test_check_file_size_before_type() {
        let err = check_file("text/plain", 3000, 2000, &allowed()).unwrap();
        assert_eq!(err, CropUploadError::FileTooLarge { max_size: 2000 });
    }

    #[test]
    fn test_check_file_type() {
        let err = check_file("image/gif", 10, 2000, &allowed()).unwrap();
        assert_eq!(err.code(), "INVALID_FILE_TYPE");
        assert_eq!(err.to_string(), "Only image/png, image/jpeg files are supported");
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(to_bytes(1536.7), 1536);
        assert_eq!(to_bytes(-5.0), 0);
        assert_eq!(to_bytes(f64::NAN), 0);
        assert_eq!(to_bytes(f64::INFINITY), u64::MAX);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0.0), "0 Bytes");
        assert_eq!(format_file_size(1536.0), "1.5 KB");
    }
}
