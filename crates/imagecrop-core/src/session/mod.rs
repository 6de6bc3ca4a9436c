//! Upload lifecycle: the pure reducer and the controller built on it.

mod controller;
mod state;

pub use controller::{CropController, CropObserver, NoopObserver, RenderJob};
pub use state::{reduce, Action, UploadSession, UploadState};
