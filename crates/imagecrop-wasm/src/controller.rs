//! Crop controller bindings.
//!
//! The core controller reports through a [`CropObserver`]. Here the
//! observer only queues events; they are delivered to the JavaScript
//! callbacks after the controller borrow is released, so a callback may
//! call straight back into the controller.

use std::cell::RefCell;
use std::rc::Rc;

use imagecrop_core::{
    AspectRatio, CropConfig, CropController, CropObserver, CropResult, CropUploadError, Point,
    RasterBackend, UploadState,
};
use imagecrop_core::validate::{RejectionCode, SelectedFile};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::geometry::JsCropRect;
use crate::gesture::touches_from_flat;
use crate::output::{crop_result_to_js, error_to_js};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CropEvent {
    Change(UploadState),
    Complete(CropResult),
    Error(CropUploadError),
}

/// Observer that records events for later delivery.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: Vec<CropEvent>,
}

impl EventQueue {
    pub(crate) fn drain(&mut self) -> Vec<CropEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CropObserver for EventQueue {
    fn on_change(&mut self, state: UploadState) {
        self.events.push(CropEvent::Change(state));
    }

    fn on_crop_complete(&mut self, result: &CropResult) {
        self.events.push(CropEvent::Complete(result.clone()));
    }

    fn on_error(&mut self, error: &CropUploadError) {
        self.events.push(CropEvent::Error(error.clone()));
    }
}

#[derive(Default)]
struct Callbacks {
    on_change: Option<Function>,
    on_crop_complete: Option<Function>,
    on_error: Option<Function>,
}

struct Shared {
    controller: RefCell<CropController<EventQueue>>,
    callbacks: RefCell<Callbacks>,
}

impl Shared {
    /// Run `f` against the controller, then deliver whatever it queued.
    fn update<R>(&self, f: impl FnOnce(&mut CropController<EventQueue>) -> R) -> R {
        let out = f(&mut self.controller.borrow_mut());
        self.flush();
        out
    }

    fn read<R>(&self, f: impl FnOnce(&CropController<EventQueue>) -> R) -> R {
        f(&self.controller.borrow())
    }

    fn flush(&self) {
        let events = self.controller.borrow_mut().observer_mut().drain();
        for event in events {
            let (callback, arg) = {
                let callbacks = self.callbacks.borrow();
                match &event {
                    CropEvent::Change(state) => (callbacks.on_change.clone(), state_to_js(*state)),
                    CropEvent::Complete(result) => (
                        callbacks.on_crop_complete.clone(),
                        match crop_result_to_js(result) {
                            Ok(value) => value,
                            Err(e) => {
                                log::error!("Failed to convert crop result: {:?}", e);
                                continue;
                            }
                        },
                    ),
                    CropEvent::Error(err) => (callbacks.on_error.clone(), error_to_js(err)),
                }
            };
            if let Some(callback) = callback {
                if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                    log::warn!("Crop callback threw: {:?}", e);
                }
            }
        }
    }
}

fn state_to_js(state: UploadState) -> JsValue {
    serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
}

/// The crop engine for one uploader instance.
///
/// Accepts the configuration object documented on `CropConfig`
/// (`{ aspectRatio, circularCrop, maxFileSize, outputFormat, ... }`);
/// missing fields take their defaults.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const controller = new JsCropController({ aspectRatio: 1, circularCrop: true });
/// controller.on_change((state) => render(state));
/// controller.on_error((err) => toast(err.message));
///
/// controller.select_file(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
/// controller.set_zoom(1.5);
/// const result = await controller.crop();
/// ```
#[wasm_bindgen]
pub struct JsCropController {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl JsCropController {
    /// Create a controller. `config` may be `undefined` for all defaults.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be read or is invalid
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropController, JsValue> {
        let config: CropConfig = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid crop config: {}", e)))?
        };
        let controller = CropController::new(config, EventQueue::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(JsCropController {
            shared: Rc::new(Shared {
                controller: RefCell::new(controller),
                callbacks: RefCell::new(Callbacks::default()),
            }),
        })
    }

    /// Called with the new state name on every transition.
    pub fn on_change(&self, callback: Option<Function>) {
        self.shared.callbacks.borrow_mut().on_change = callback;
    }

    /// Called with the result object after a successful crop.
    pub fn on_crop_complete(&self, callback: Option<Function>) {
        self.shared.callbacks.borrow_mut().on_crop_complete = callback;
    }

    /// Called with an error object for every failure.
    pub fn on_error(&self, callback: Option<Function>) {
        self.shared.callbacks.borrow_mut().on_error = callback;
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    /// Current state: `"idle"`, `"uploading"`, `"cropping"`, `"processing"`,
    /// `"complete"` or `"error"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> JsValue {
        state_to_js(self.shared.read(|c| c.state()))
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.shared.read(|c| c.session().zoom)
    }

    /// Rotation in degrees as last set; not wrapped.
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.shared.read(|c| c.session().rotation)
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> f64 {
        self.shared.read(|c| c.session().crop_offset.x)
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> f64 {
        self.shared.read(|c| c.session().crop_offset.y)
    }

    /// Enforced aspect ratio, or `undefined` when the window is free.
    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.shared.read(|c| c.session().active_aspect().value())
    }

    #[wasm_bindgen(getter)]
    pub fn crop_rect(&self) -> Option<JsCropRect> {
        self.shared.read(|c| c.session().crop_rect.map(JsCropRect::from))
    }

    /// The last error object, or `null`.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> JsValue {
        self.shared
            .read(|c| c.session().error.as_ref().map(error_to_js))
            .unwrap_or(JsValue::NULL)
    }

    /// The loaded image as a data URL, for display.
    #[wasm_bindgen(getter)]
    pub fn image_url(&self) -> Option<String> {
        self.shared
            .read(|c| c.session().image_source.as_ref().map(|s| s.to_data_url()))
    }

    #[wasm_bindgen(getter)]
    pub fn image_width(&self) -> Option<u32> {
        self.shared
            .read(|c| c.session().image_source.as_ref().map(|s| s.width))
    }

    #[wasm_bindgen(getter)]
    pub fn image_height(&self) -> Option<u32> {
        self.shared
            .read(|c| c.session().image_source.as_ref().map(|s| s.height))
    }

    /// Configured presets as `[{ label, value }]`.
    pub fn aspect_ratio_presets(&self) -> Result<JsValue, JsValue> {
        self.shared.read(|c| {
            serde_wasm_bindgen::to_value(&c.config().aspect_ratio_presets).map_err(JsValue::from)
        })
    }

    pub fn is_preset_active(&self, index: usize) -> bool {
        self.shared.read(|c| {
            c.config()
                .aspect_ratio_presets
                .get(index)
                .is_some_and(|preset| c.is_preset_active(preset))
        })
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Validate and load a file the user picked or dropped.
    pub fn select_file(&self, name: String, mime_type: String, bytes: Vec<u8>) {
        let file = SelectedFile::new(name, mime_type, bytes);
        self.shared.update(|c| c.select_file(file));
    }

    /// Report a file the selection surface refused, e.g. with
    /// `code = "file-too-large"`.
    pub fn reject_selection(&self, code: &str, message: &str) {
        let code = RejectionCode::from_code(code, message);
        self.shared.update(|c| c.reject_selection(code));
    }

    pub fn set_crop_offset(&self, x: f64, y: f64) {
        self.shared.update(|c| c.set_crop_offset(Point::new(x, y)));
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.shared.update(|c| c.set_zoom(zoom));
    }

    pub fn set_rotation(&self, degrees: f64) {
        self.shared.update(|c| c.set_rotation(degrees));
    }

    pub fn rotate_left(&self) {
        self.shared.update(|c| c.rotate_left());
    }

    pub fn rotate_right(&self) {
        self.shared.update(|c| c.rotate_right());
    }

    pub fn reset_rotation(&self) {
        self.shared.update(|c| c.reset_rotation());
    }

    /// Fix the window's aspect ratio; `undefined` frees it.
    pub fn set_aspect_ratio(&self, ratio: Option<f64>) {
        let aspect = ratio.map_or(AspectRatio::Free, AspectRatio::Fixed);
        self.shared.update(|c| c.set_aspect_ratio(aspect));
    }

    pub fn select_preset(&self, index: usize) {
        self.shared.update(|c| c.select_preset(index));
    }

    /// Size of the element the image is displayed in.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.shared.update(|c| c.set_viewport(width, height));
    }

    /// Feed the active touches as `[x0, y0, x1, y1, ...]`.
    pub fn touch_frame(&self, coords: &[f64]) {
        let touches = touches_from_flat(coords);
        self.shared.update(|c| c.touch_frame(&touches));
    }

    /// Render the current crop.
    ///
    /// Resolves to the result object, or `null` when no crop could start,
    /// the render failed (reported through `on_error`) or the controller
    /// was reset in the meantime.
    pub fn crop(&self) -> Promise {
        let job = self.shared.update(|c| c.begin_crop());
        let shared = Rc::clone(&self.shared);

        future_to_promise(async move {
            let Some(job) = job else {
                return Ok(JsValue::NULL);
            };
            let outcome = job.run(&RasterBackend).await;
            let result = outcome.as_ref().ok().cloned();
            let accepted = shared.update(|c| c.finish_crop(job.generation(), outcome));

            match result {
                Some(result) if accepted => crop_result_to_js(&result),
                _ => Ok(JsValue::NULL),
            }
        })
    }

    /// Discard the current upload and return to `"idle"`.
    pub fn reset(&self) {
        self.shared.update(|c| c.reset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use imagecrop_core::encode::encode_png;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 4) as usize];
        encode_png(&pixels, width, height).unwrap()
    }

    fn controller(config: CropConfig) -> CropController<EventQueue> {
        CropController::new(config, EventQueue::default()).unwrap()
    }

    #[test]
    fn test_queue_records_lifecycle() {
        let mut c = controller(CropConfig::default());
        c.select_file(SelectedFile::new("photo.png", "image/png", png(40, 20)));

        let events = c.observer_mut().drain();
        assert_eq!(
            events,
            vec![
                CropEvent::Change(UploadState::Uploading),
                CropEvent::Change(UploadState::Cropping),
            ]
        );
        assert!(c.observer_mut().drain().is_empty());
    }

    #[test]
    fn test_queue_records_crop_result() {
        let mut c = controller(CropConfig::default());
        c.select_file(SelectedFile::new("photo.png", "image/png", png(40, 20)));
        c.observer_mut().drain();

        let result = block_on(c.crop(&RasterBackend)).unwrap();
        assert_eq!((result.width, result.height), (20, 20));

        let events = c.observer_mut().drain();
        assert_eq!(
            events,
            vec![
                CropEvent::Change(UploadState::Processing),
                CropEvent::Change(UploadState::Complete),
                CropEvent::Complete(result),
            ]
        );
    }

    #[test]
    fn test_queue_records_errors() {
        let mut config = CropConfig::default();
        config.max_file_size = 10;
        let mut c = controller(config);
        c.select_file(SelectedFile::new("photo.png", "image/png", png(4, 4)));

        let events = c.observer_mut().drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], CropEvent::Change(UploadState::Error));
        assert!(matches!(
            &events[2],
            CropEvent::Error(CropUploadError::FileTooLarge { max_size: 10 })
        ));
    }
}
