//! Imagecrop Core - Image crop engine
//!
//! This crate provides the core of the imagecrop uploader: file validation,
//! the upload lifecycle, crop geometry, two-finger gesture interpretation and
//! the render pipeline that produces the cropped output.
//!
//! The presentation layer talks to a [`CropController`]. Everything below it
//! is usable on its own:
//!
//! - [`validate`]: size and type checks for selected files
//! - [`geometry`]: zoom clamping, rotation, fit dimensions and crop rectangles
//! - [`gesture`]: pinch-zoom and twist-rotate from touch frames
//! - [`decode`], [`encode`]: reading sources and writing outputs
//! - [`render`]: compositing a crop onto injected drawing surfaces
//! - [`session`]: the lifecycle reducer and controller

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod render;
pub mod session;
pub mod validate;

pub use config::{AspectRatioPreset, ConfigError, CropConfig};
pub use error::CropUploadError;
pub use geometry::{AspectRatio, CropRect, ObjectFit, Point, Size};
pub use gesture::{GestureInterpreter, GestureSettings, GestureUpdate, TouchPoint};
pub use render::{
    render_crop, Blob, CropResult, NamedFile, OutputFormat, OutputSpec, OutputType,
    RasterBackend, RenderBackend, RenderRequest, Surface,
};
pub use session::{
    reduce, Action, CropController, CropObserver, NoopObserver, RenderJob, UploadSession,
    UploadState,
};
pub use validate::{validate_file, RejectionCode, SelectedFile};
