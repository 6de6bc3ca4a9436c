//! Output specification and the representations a render produces.

use serde::{Deserialize, Serialize};

use crate::encode::{parse_data_url, DataUrlError};

pub use crate::encode::OutputType;

/// Which representations a render should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Base64,
    Blob,
    File,
    /// Every representation.
    All,
}

impl OutputFormat {
    pub fn includes_base64(self) -> bool {
        matches!(self, OutputFormat::Base64 | OutputFormat::All)
    }

    pub fn includes_blob(self) -> bool {
        matches!(self, OutputFormat::Blob | OutputFormat::All)
    }

    pub fn includes_file(self) -> bool {
        matches!(self, OutputFormat::File | OutputFormat::All)
    }
}

/// Immutable per-render output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub format: OutputFormat,
    /// Encoder quality in `[0, 1]`.
    pub quality: f64,
    #[serde(rename = "type")]
    pub output_type: OutputType,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub file_name: String,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            format: OutputFormat::Base64,
            quality: 0.95,
            output_type: OutputType::Jpeg,
            max_width: None,
            max_height: None,
            file_name: "cropped-image.jpg".to_string(),
        }
    }
}

/// Encoded bytes tagged with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Rebuild a blob from an image data URL.
    pub fn from_data_url(url: &str) -> Result<Self, DataUrlError> {
        let parsed = parse_data_url(url)?;
        Ok(Self::new(parsed.bytes, parsed.mime_type))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A blob with a file name attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub blob: Blob,
}

impl NamedFile {
    pub fn new(name: impl Into<String>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }
}

/// Output of a successful render. Fields not requested by the
/// [`OutputFormat`] stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CropResult {
    pub base64: Option<String>,
    pub blob: Option<Blob>,
    pub file: Option<NamedFile>,
    pub width: u32,
    pub height: u32,
}

impl CropResult {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}
