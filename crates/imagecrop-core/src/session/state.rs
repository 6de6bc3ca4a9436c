//! Upload lifecycle state machine.
//!
//! [`reduce`] is a pure function from a session snapshot and an [`Action`]
//! to the next snapshot. Transitions not listed below leave the session
//! untouched.
//!
//! ```text
//! Idle|Error  + FileSelected        -> Uploading
//! Idle|Error  + SelectionRejected   -> Error
//! Uploading   + ValidationFailed    -> Error
//! Uploading   + ImageLoaded         -> Cropping
//! Cropping    + CropChanged | ZoomChanged | RotationChanged
//!             | AspectRatioChanged | CropAreaComputed -> Cropping
//! Cropping    + ProcessingStart     -> Processing   (needs source and rect)
//! Processing  + ProcessingComplete  -> Complete
//! Uploading|Cropping|Processing + ErrorOccurred -> Error
//! any         + Reset               -> Idle         (keeps the aspect ratio and initial zoom)
//! ```

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::decode::ImageSource;
use crate::error::CropUploadError;
use crate::geometry::{clamp_zoom, sanitize_aspect_ratio, AspectRatio, CropRect, Point};
use crate::render::CropResult;
use crate::validate::SelectedFile;

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    /// No file selected.
    #[default]
    Idle,
    /// File being validated and read.
    Uploading,
    /// User is positioning the crop.
    Cropping,
    /// Generating output.
    Processing,
    /// Crop complete.
    Complete,
    /// An error occurred.
    Error,
}

impl UploadState {
    /// States from which a new file may be selected.
    pub fn accepts_file(self) -> bool {
        matches!(self, UploadState::Idle | UploadState::Error)
    }
}

/// Everything the lifecycle knows about the current upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub state: UploadState,
    pub selected_file: Option<SelectedFile>,
    pub image_source: Option<ImageSource>,
    /// Pan offset of the image under the crop window.
    pub crop_offset: Point,
    pub zoom: f64,
    /// Zoom a `Reset` returns to: the clamped configured initial zoom.
    pub initial_zoom: f64,
    /// Degrees, stored as received.
    pub rotation: f64,
    /// Last numeric aspect ratio.
    pub aspect_ratio: f64,
    /// When set, `aspect_ratio` is kept but not enforced.
    pub free_aspect: bool,
    pub crop_rect: Option<CropRect>,
    pub error: Option<CropUploadError>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            selected_file: None,
            image_source: None,
            crop_offset: Point::default(),
            zoom: 1.0,
            initial_zoom: 1.0,
            rotation: 0.0,
            aspect_ratio: 1.0,
            free_aspect: false,
            crop_rect: None,
            error: None,
        }
    }
}

impl UploadSession {
    /// A fresh session seeded from the configured initial zoom and ratio.
    pub fn new(config: &CropConfig) -> Self {
        let zoom = clamp_zoom(config.initial_zoom, config.min_zoom, config.max_zoom);
        Self {
            zoom,
            initial_zoom: zoom,
            aspect_ratio: sanitize_aspect_ratio(config.aspect_ratio),
            ..Self::default()
        }
    }

    /// The aspect ratio constraint currently in force.
    pub fn active_aspect(&self) -> AspectRatio {
        if self.free_aspect {
            AspectRatio::Free
        } else {
            AspectRatio::Fixed(self.aspect_ratio)
        }
    }

    /// True when a render may start from this snapshot.
    pub fn can_process(&self) -> bool {
        self.state == UploadState::Cropping
            && self.image_source.is_some()
            && self.crop_rect.is_some()
    }
}

/// Events driving the lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FileSelected(SelectedFile),
    ValidationFailed(CropUploadError),
    /// The selection surface rejected the file before it reached us.
    SelectionRejected(CropUploadError),
    ImageLoaded(ImageSource),
    CropChanged(Point),
    ZoomChanged(f64),
    RotationChanged(f64),
    AspectRatioChanged(AspectRatio),
    CropAreaComputed(CropRect),
    ProcessingStart,
    ProcessingComplete(CropResult),
    ErrorOccurred(CropUploadError),
    Reset,
}

impl Action {
    /// Action name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::FileSelected(_) => "FileSelected",
            Action::ValidationFailed(_) => "ValidationFailed",
            Action::SelectionRejected(_) => "SelectionRejected",
            Action::ImageLoaded(_) => "ImageLoaded",
            Action::CropChanged(_) => "CropChanged",
            Action::ZoomChanged(_) => "ZoomChanged",
            Action::RotationChanged(_) => "RotationChanged",
            Action::AspectRatioChanged(_) => "AspectRatioChanged",
            Action::CropAreaComputed(_) => "CropAreaComputed",
            Action::ProcessingStart => "ProcessingStart",
            Action::ProcessingComplete(_) => "ProcessingComplete",
            Action::ErrorOccurred(_) => "ErrorOccurred",
            Action::Reset => "Reset",
        }
    }
}

/// Apply `action` to `session`, returning the next snapshot.
pub fn reduce(session: &UploadSession, action: Action) -> UploadSession {
    use UploadState::*;

    let mut next = session.clone();

    match (session.state, action) {
        (Idle | Error, Action::FileSelected(file)) => {
            next.state = Uploading;
            next.selected_file = Some(file);
            next.image_source = None;
            next.crop_rect = None;
            next.error = None;
        }
        (Idle | Error, Action::SelectionRejected(err)) => {
            next.state = Error;
            next.error = Some(err);
        }
        (Uploading, Action::ValidationFailed(err)) => {
            next.state = Error;
            next.error = Some(err);
        }
        (Uploading, Action::ImageLoaded(source)) => {
            next.state = Cropping;
            next.image_source = Some(source);
            next.error = None;
        }
        (Cropping, Action::CropChanged(offset)) => next.crop_offset = offset,
        (Cropping, Action::ZoomChanged(zoom)) => next.zoom = zoom,
        (Cropping, Action::RotationChanged(rotation)) => next.rotation = rotation,
        (Cropping, Action::AspectRatioChanged(AspectRatio::Fixed(ratio))) => {
            next.aspect_ratio = sanitize_aspect_ratio(ratio);
            next.free_aspect = false;
        }
        (Cropping, Action::AspectRatioChanged(AspectRatio::Free)) => next.free_aspect = true,
        (Cropping, Action::CropAreaComputed(rect)) => next.crop_rect = Some(rect),
        (Cropping, Action::ProcessingStart) if session.can_process() => next.state = Processing,
        (Processing, Action::ProcessingComplete(_)) => next.state = Complete,
        (Uploading | Cropping | Processing, Action::ErrorOccurred(err)) => {
            next.state = Error;
            next.error = Some(err);
        }
        (_, Action::Reset) => {
            next = UploadSession {
                zoom: session.initial_zoom,
                initial_zoom: session.initial_zoom,
                aspect_ratio: session.aspect_ratio,
                free_aspect: session.free_aspect,
                ..UploadSession::default()
            };
        }
        (state, action) => {
            log::debug!("Ignoring {} in {:?}", action.name(), state);
        }
    }

    next
}


// ============================================================================
// Property-Based Tests
// ============================================================================
