//! Configuration surface for the crop engine.
//!
//! `CropConfig` mirrors the options a host page passes to the cropper. It is
//! deserialized from a plain object (camelCase keys, every key optional) and
//! composes the per-render [`OutputSpec`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{
    sanitize_aspect_ratio, validate_quality, AspectRatio, CropRect, ObjectFit,
    ASPECT_RATIO_TOLERANCE,
};
use crate::render::{OutputFormat, OutputSpec, OutputType};

/// Default size limit for selected files (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default MIME types accepted by the validator.
pub const DEFAULT_ALLOWED_FORMATS: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Errors from [`CropConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Zoom bounds must be finite and positive.
    #[error("Invalid zoom bounds: min ({min}) and max ({max}) must be finite and positive")]
    InvalidZoomBounds { min: f64, max: f64 },

    /// `minZoom` must not exceed `maxZoom`.
    #[error("minZoom ({min}) is greater than maxZoom ({max})")]
    ZoomBoundsInverted { min: f64, max: f64 },

    /// Rotation step must be a finite number of degrees.
    #[error("Invalid rotation step: {0}")]
    InvalidRotationStep(f64),
}

/// A named aspect ratio shortcut offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioPreset {
    pub label: String,
    pub value: AspectRatio,
}

impl AspectRatioPreset {
    pub fn new(label: impl Into<String>, value: AspectRatio) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// True when `current` selects this preset. The free preset is never
    /// highlighted.
    pub fn is_active(&self, current: AspectRatio) -> bool {
        match (self.value, current) {
            (AspectRatio::Fixed(preset), AspectRatio::Fixed(current)) => {
                (current - preset).abs() < ASPECT_RATIO_TOLERANCE
            }
            _ => false,
        }
    }
}

/// Free, 1:1, 4:3, 16:9.
pub fn default_aspect_ratio_presets() -> Vec<AspectRatioPreset> {
    vec![
        AspectRatioPreset::new("Free", AspectRatio::Free),
        AspectRatioPreset::new("1:1", AspectRatio::Fixed(1.0)),
        AspectRatioPreset::new("4:3", AspectRatio::Fixed(4.0 / 3.0)),
        AspectRatioPreset::new("16:9", AspectRatio::Fixed(16.0 / 9.0)),
    ]
}

/// Options recognized by the crop engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    /// Initial aspect ratio of the crop window.
    pub aspect_ratio: f64,
    pub aspect_ratio_presets: Vec<AspectRatioPreset>,
    /// Mask the output to its inscribed circle.
    pub circular_crop: bool,
    /// Cosmetic; passed through to the presentation layer.
    pub show_grid: bool,

    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// Accepted MIME types.
    pub allowed_formats: Vec<String>,

    pub min_zoom: f64,
    pub max_zoom: f64,
    pub initial_zoom: f64,

    /// Enables the manual rotate left/right controls.
    pub enable_rotation: bool,
    /// Degrees per manual rotate step.
    pub rotation_step: f64,

    pub enable_pinch_zoom: bool,
    pub enable_touch_rotation: bool,
    /// Multiplier applied to the two-finger rotation delta.
    pub rotation_sensitivity: f64,

    pub output_format: OutputFormat,
    /// Encoder quality in `[0, 1]`.
    pub output_quality: f64,
    pub output_type: OutputType,
    pub output_max_width: Option<f64>,
    pub output_max_height: Option<f64>,

    /// Keep the crop window on the image while panning.
    pub restrict_position: bool,
    pub object_fit: ObjectFit,
    /// Crop rectangle to start from once the image loads.
    pub initial_crop_rect: Option<CropRect>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            aspect_ratio_presets: default_aspect_ratio_presets(),
            circular_crop: false,
            show_grid: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_formats: DEFAULT_ALLOWED_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_zoom: 1.0,
            max_zoom: 3.0,
            initial_zoom: 1.0,
            enable_rotation: true,
            rotation_step: 90.0,
            enable_pinch_zoom: true,
            enable_touch_rotation: true,
            rotation_sensitivity: 1.0,
            output_format: OutputFormat::Base64,
            output_quality: 0.95,
            output_type: OutputType::Jpeg,
            output_max_width: None,
            output_max_height: None,
            restrict_position: true,
            object_fit: ObjectFit::Contain,
            initial_crop_rect: None,
        }
    }
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0) {
            return Err(ConfigError::InvalidZoomBounds { min, max });
        }
        if min > max {
            return Err(ConfigError::ZoomBoundsInverted { min, max });
        }
        if !self.rotation_step.is_finite() {
            return Err(ConfigError::InvalidRotationStep(self.rotation_step));
        }
        Ok(())
    }

    /// Compose the render output specification.
    ///
    /// Falls back to `cropped-image.<ext>` when no file name is known.
    pub fn output_spec(&self, file_name: Option<&str>) -> OutputSpec {
        let file_name = match file_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("cropped-image.{}", self.output_type.extension()),
        };
        OutputSpec {
            format: self.output_format,
            quality: validate_quality(self.output_quality),
            output_type: self.output_type,
            max_width: self.output_max_width,
            max_height: self.output_max_height,
            file_name,
        }
    }
}
