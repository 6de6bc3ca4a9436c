//! The crop controller: the single entry point for the presentation layer.
//!
//! It owns the configuration, the current [`UploadSession`], the gesture
//! interpreter and an observer, and turns user events into reducer actions.
//!
//! Rendering is split in three so that no borrow of the controller is held
//! across an `.await`:
//!
//! ```text
//! let job = controller.begin_crop()?;          // Cropping -> Processing
//! let outcome = job.run(&backend).await;       // no controller borrow
//! controller.finish_crop(job.generation(), outcome);
//! ```
//!
//! A [`CropController::reset`] issued while a job is in flight wins: the
//! controller bumps its generation and the late completion is dropped.

use crate::config::{AspectRatioPreset, ConfigError, CropConfig};
use crate::decode::load_image_source;
use crate::error::CropUploadError;
use crate::geometry::{
    clamp_zoom, compute_crop_rect, normalize_rotation, AspectRatio, CropGeometry, CropRect, Point,
    Size,
};
use crate::gesture::{GestureInterpreter, GestureSettings, TouchPoint};
use crate::render::{render_crop, CropResult, RenderBackend, RenderRequest};
use crate::validate::{validate_file, RejectionCode, SelectedFile};

use super::{reduce, Action, UploadSession, UploadState};

/// Callbacks invoked by the controller. All default to no-ops.
pub trait CropObserver {
    /// Called after every lifecycle state transition.
    fn on_change(&mut self, _state: UploadState) {}
    /// Called after a successful render.
    fn on_crop_complete(&mut self, _result: &CropResult) {}
    /// Called for every failure.
    fn on_error(&mut self, _error: &CropUploadError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CropObserver for NoopObserver {}

/// A render snapshotted from the session, detached from the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    generation: u64,
    request: RenderRequest,
}

impl RenderJob {
    /// Generation of the controller when the job started.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    pub async fn run<B: RenderBackend>(&self, backend: &B) -> Result<CropResult, CropUploadError> {
        render_crop(backend, &self.request).await
    }
}

/// Drives the upload lifecycle.
#[derive(Debug)]
pub struct CropController<O: CropObserver> {
    config: CropConfig,
    session: UploadSession,
    gestures: GestureInterpreter,
    viewport: Option<Size>,
    observer: O,
    generation: u64,
}

impl<O: CropObserver> CropController<O> {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails [`CropConfig::validate`].
    pub fn new(config: CropConfig, observer: O) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            session: UploadSession::new(&config),
            gestures: GestureInterpreter::new(GestureSettings::from(&config)),
            config,
            viewport: None,
            observer,
            generation: 0,
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn state(&self) -> UploadState {
        self.session.state
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Bumped by every reset; stale render completions are ignored.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply an action and notify the observer if the state changed.
    pub fn dispatch(&mut self, action: Action) {
        let before = self.session.state;
        log::trace!("Dispatch {} in {:?}", action.name(), before);
        self.session = reduce(&self.session, action);

        let after = self.session.state;
        if after != before {
            log::debug!("Upload state {:?} -> {:?}", before, after);
            self.observer.on_change(after);
        }
    }

    fn fail(&mut self, action: Action, error: CropUploadError) {
        log::warn!("{}: {}", action.name(), error);
        self.dispatch(action);
        self.observer.on_error(&error);
    }

    // ------------------------------------------------------------------
    // File selection
    // ------------------------------------------------------------------

    /// Validate and load a selected file.
    ///
    /// Ignored unless the session is `Idle` or `Error`. Failures move the
    /// session to `Error` and are reported through `on_error`.
    pub fn select_file(&mut self, file: SelectedFile) {
        if !self.session.state.accepts_file() {
            log::debug!("Ignoring file {} in {:?}", file.name, self.session.state);
            return;
        }

        self.dispatch(Action::FileSelected(file.clone()));

        if let Some(err) = validate_file(&file, self.config.max_file_size, &self.config.allowed_formats)
        {
            self.fail(Action::ValidationFailed(err.clone()), err);
            return;
        }

        match load_image_source(&file) {
            Ok(source) => {
                self.dispatch(Action::ImageLoaded(source));
                self.seed_crop_area();
            }
            Err(err) => self.fail(Action::ErrorOccurred(err.clone()), err),
        }
    }

    /// Record a rejection reported by the selection surface.
    pub fn reject_selection(&mut self, code: RejectionCode) {
        if !self.session.state.accepts_file() {
            return;
        }
        let err = code.into_error(self.config.max_file_size);
        self.fail(Action::SelectionRejected(err.clone()), err);
    }

    // ------------------------------------------------------------------
    // Cropping
    // ------------------------------------------------------------------

    /// Pan the image. The offset is clamped when `restrictPosition` is on.
    pub fn set_crop_offset(&mut self, offset: Point) {
        if self.session.state != UploadState::Cropping {
            return;
        }
        let offset = match self.geometry() {
            Some(mut geometry) => {
                geometry.offset = offset;
                geometry.effective_offset()
            }
            None => offset,
        };
        self.dispatch(Action::CropChanged(offset));
        self.recompute_crop_area();
    }

    /// Set the zoom, clamped into the configured bounds.
    pub fn set_zoom(&mut self, zoom: f64) {
        if self.session.state != UploadState::Cropping {
            return;
        }
        let zoom = clamp_zoom(zoom, self.config.min_zoom, self.config.max_zoom);
        self.dispatch(Action::ZoomChanged(zoom));
        self.recompute_crop_area();
    }

    /// Set the rotation in degrees. Stored as given.
    pub fn set_rotation(&mut self, degrees: f64) {
        if self.session.state != UploadState::Cropping {
            return;
        }
        let degrees = if degrees.is_finite() { degrees } else { 0.0 };
        self.dispatch(Action::RotationChanged(degrees));
    }

    /// Rotate counter-clockwise by `rotationStep`.
    pub fn rotate_left(&mut self) {
        self.rotate_by(-self.config.rotation_step);
    }

    /// Rotate clockwise by `rotationStep`.
    pub fn rotate_right(&mut self) {
        self.rotate_by(self.config.rotation_step);
    }

    pub fn reset_rotation(&mut self) {
        if self.config.enable_rotation {
            self.set_rotation(0.0);
        }
    }

    fn rotate_by(&mut self, step: f64) {
        if !self.config.enable_rotation {
            return;
        }
        self.set_rotation(normalize_rotation(self.session.rotation + step));
    }

    pub fn set_aspect_ratio(&mut self, aspect: AspectRatio) {
        if self.session.state != UploadState::Cropping {
            return;
        }
        self.dispatch(Action::AspectRatioChanged(aspect));
        self.recompute_crop_area();
    }

    /// Apply the preset at `index`; out of range is ignored.
    pub fn select_preset(&mut self, index: usize) {
        if let Some(preset) = self.config.aspect_ratio_presets.get(index) {
            let value = preset.value;
            self.set_aspect_ratio(value);
        }
    }

    pub fn is_preset_active(&self, preset: &AspectRatioPreset) -> bool {
        preset.is_active(self.session.active_aspect())
    }

    /// Size of the area the image is displayed in. Until set, the image is
    /// assumed to be shown at its natural size.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let size = Size::new(width, height);
        self.viewport = if size.is_empty() { None } else { Some(size) };
        self.recompute_crop_area();
    }

    /// Feed one touch frame to the gesture interpreter.
    pub fn touch_frame(&mut self, touches: &[TouchPoint]) {
        if self.session.state != UploadState::Cropping {
            self.gestures.cancel();
            return;
        }

        let update = self
            .gestures
            .on_frame(touches, self.session.zoom, self.session.rotation);
        if update.is_empty() {
            return;
        }

        if let Some(zoom) = update.zoom {
            self.dispatch(Action::ZoomChanged(zoom));
        }
        if let Some(rotation) = update.rotation {
            self.dispatch(Action::RotationChanged(rotation));
        }
        if update.zoom.is_some() {
            self.recompute_crop_area();
        }
    }

    fn geometry(&self) -> Option<CropGeometry> {
        let source = self.session.image_source.as_ref()?;
        let natural = Size::new(source.width as f64, source.height as f64);
        Some(CropGeometry {
            natural_width: source.width,
            natural_height: source.height,
            container: self.viewport.unwrap_or(natural),
            offset: self.session.crop_offset,
            zoom: self.session.zoom,
            aspect: self.session.active_aspect(),
            object_fit: self.config.object_fit,
            restrict_position: self.config.restrict_position,
        })
    }

    fn recompute_crop_area(&mut self) {
        if self.session.state != UploadState::Cropping {
            return;
        }
        if let Some(rect) = self.geometry().as_ref().and_then(compute_crop_rect) {
            if self.session.crop_rect != Some(rect) {
                self.dispatch(Action::CropAreaComputed(rect));
            }
        }
    }

    /// First crop area after a load: the configured initial rectangle when
    /// it fits the image, otherwise the computed one.
    fn seed_crop_area(&mut self) {
        let initial = self.config.initial_crop_rect.filter(|rect| {
            self.session
                .image_source
                .as_ref()
                .is_some_and(|s| rect.fits_within(s.width, s.height))
        });
        match initial {
            Some(rect) => self.dispatch(Action::CropAreaComputed(rect)),
            None => self.recompute_crop_area(),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Enter `Processing` and snapshot a render job.
    ///
    /// Returns `None` (and changes nothing) unless the session is `Cropping`
    /// with a source and a crop rectangle.
    pub fn begin_crop(&mut self) -> Option<RenderJob> {
        if !self.session.can_process() {
            log::debug!("Crop requested in {:?}, ignoring", self.session.state);
            return None;
        }
        let source = self.session.image_source.clone()?;
        let crop_rect: CropRect = self.session.crop_rect?;

        let file_name = self.session.selected_file.as_ref().map(|f| f.name.as_str());
        let request = RenderRequest {
            source,
            crop_rect,
            rotation: self.session.rotation,
            output: self.config.output_spec(file_name),
            circular: self.config.circular_crop,
        };

        self.dispatch(Action::ProcessingStart);
        self.gestures.cancel();
        Some(RenderJob {
            generation: self.generation,
            request,
        })
    }

    /// Apply the outcome of a job started by [`CropController::begin_crop`].
    ///
    /// Returns `false` when the outcome was dropped because the controller
    /// was reset since the job began.
    pub fn finish_crop(
        &mut self,
        generation: u64,
        outcome: Result<CropResult, CropUploadError>,
    ) -> bool {
        if generation != self.generation || self.session.state != UploadState::Processing {
            log::debug!(
                "Dropping stale render result (job {}, controller {}, {:?})",
                generation,
                self.generation,
                self.session.state
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                self.dispatch(Action::ProcessingComplete(result.clone()));
                self.observer.on_crop_complete(&result);
            }
            Err(err) => self.fail(Action::ErrorOccurred(err.clone()), err),
        }
        true
    }

    /// Render the current crop with `backend` and apply the outcome.
    ///
    /// Returns the result on success; failures are reported through the
    /// observer as well.
    pub async fn crop<B: RenderBackend>(&mut self, backend: &B) -> Option<CropResult> {
        let job = self.begin_crop()?;
        let outcome = job.run(backend).await;
        let result = outcome.as_ref().ok().cloned();
        self.finish_crop(job.generation(), outcome);
        result
    }

    /// Return to `Idle`, keeping the aspect ratio and restoring the
    /// configured initial zoom.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.gestures.cancel();
        self.dispatch(Action::Reset);
    }
}
