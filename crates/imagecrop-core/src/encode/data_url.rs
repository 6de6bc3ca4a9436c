//! `data:` URL construction and parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("Invalid data URL: missing data: prefix or payload")]
    Malformed,

    #[error("Invalid data URL: missing MIME type")]
    MissingMimeType,

    #[error("Invalid data URL: not an image ({0})")]
    NotAnImage(String),

    #[error("Invalid data URL: {0}")]
    InvalidBase64(String),
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Build `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Parse a base64 image data URL back into bytes.
///
/// Only `image/*` payloads are accepted.
pub fn parse_data_url(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::Malformed)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::Malformed)?;

    let mime_type = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty() && header.contains(';'))
        .ok_or(DataUrlError::MissingMimeType)?;

    if !mime_type.starts_with("image/") {
        return Err(DataUrlError::NotAnImage(mime_type.to_string()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))?;

    Ok(DataUrl {
        mime_type: mime_type.to_string(),
        bytes,
    })
}
