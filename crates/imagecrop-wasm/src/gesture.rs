//! Two-finger gesture bindings.
//!
//! Touch frames cross the boundary as a flat `Float64Array` of
//! `[x0, y0, x1, y1, ...]` so no per-point objects are allocated.

use imagecrop_core::gesture::{GestureInterpreter, GestureSettings, GestureUpdate, TouchPoint};
use wasm_bindgen::prelude::*;

/// Convert `[x0, y0, x1, y1, ...]` into touch points. A trailing odd
/// coordinate is ignored.
pub(crate) fn touches_from_flat(coords: &[f64]) -> Vec<TouchPoint> {
    coords
        .chunks_exact(2)
        .map(|pair| TouchPoint::new(pair[0], pair[1]))
        .collect()
}

fn settings(
    min_zoom: f64,
    max_zoom: f64,
    enable_pinch_zoom: bool,
    enable_touch_rotation: bool,
    rotation_sensitivity: f64,
) -> GestureSettings {
    GestureSettings {
        enabled: enable_pinch_zoom || enable_touch_rotation,
        enable_pinch_zoom,
        enable_touch_rotation,
        min_zoom,
        max_zoom,
        rotation_sensitivity,
    }
}

/// Zoom and rotation emitted for one frame.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JsGestureUpdate {
    inner: GestureUpdate,
}

#[wasm_bindgen]
impl JsGestureUpdate {
    /// New zoom, or `undefined` when this frame does not change it.
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> Option<f64> {
        self.inner.zoom
    }

    /// New rotation in degrees, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> Option<f64> {
        self.inner.rotation
    }

    #[wasm_bindgen(getter)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Pinch-zoom and twist-rotate interpreter for use without a controller.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const gestures = new JsGestureInterpreter(1, 3, true, true, 1);
/// el.addEventListener('touchmove', (e) => {
///   const coords = new Float64Array([...e.touches].flatMap((t) => [t.clientX, t.clientY]));
///   const update = gestures.on_frame(coords, zoom, rotation);
///   if (update.zoom !== undefined) zoom = update.zoom;
///   if (update.rotation !== undefined) rotation = update.rotation;
/// });
/// ```
#[wasm_bindgen]
pub struct JsGestureInterpreter {
    inner: GestureInterpreter,
}

#[wasm_bindgen]
impl JsGestureInterpreter {
    #[wasm_bindgen(constructor)]
    pub fn new(
        min_zoom: f64,
        max_zoom: f64,
        enable_pinch_zoom: bool,
        enable_touch_rotation: bool,
        rotation_sensitivity: f64,
    ) -> JsGestureInterpreter {
        JsGestureInterpreter {
            inner: GestureInterpreter::new(settings(
                min_zoom,
                max_zoom,
                enable_pinch_zoom,
                enable_touch_rotation,
                rotation_sensitivity,
            )),
        }
    }

    /// Change bounds and toggles, e.g. when the page disables rotation.
    /// A gesture already in progress keeps its baselines.
    pub fn configure(
        &mut self,
        min_zoom: f64,
        max_zoom: f64,
        enable_pinch_zoom: bool,
        enable_touch_rotation: bool,
        rotation_sensitivity: f64,
    ) {
        self.inner.set_settings(settings(
            min_zoom,
            max_zoom,
            enable_pinch_zoom,
            enable_touch_rotation,
            rotation_sensitivity,
        ));
    }

    /// Feed the current touches. `zoom` and `rotation` seed the baselines
    /// when a gesture starts.
    pub fn on_frame(&mut self, coords: &[f64], zoom: f64, rotation: f64) -> JsGestureUpdate {
        let touches = touches_from_flat(coords);
        JsGestureUpdate {
            inner: self.inner.on_frame(&touches, zoom, rotation),
        }
    }

    /// True while a two-finger gesture is in progress.
    #[wasm_bindgen(getter)]
    pub fn is_active(&self) -> bool {
        self.inner.session().is_some()
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches_from_flat() {
        let touches = touches_from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(touches, vec![TouchPoint::new(1.0, 2.0), TouchPoint::new(3.0, 4.0)]);
        assert!(touches_from_flat(&[]).is_empty());
    }

    #[test]
    fn test_pinch_out_doubles_zoom() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, true, false, 1.0);

        let start = gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 0.0);
        assert!(start.is_empty());
        assert!(gestures.is_active());

        let update = gestures.on_frame(&[0.0, 0.0, 200.0, 0.0], 1.0, 0.0);
        assert_eq!(update.zoom(), Some(2.0));
        assert_eq!(update.rotation(), None);
    }

    #[test]
    fn test_twist_rotates() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, false, true, 1.0);
        gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 10.0);

        let update = gestures.on_frame(&[0.0, 0.0, 0.0, 100.0], 1.0, 10.0);
        assert_eq!(update.zoom(), None);
        assert!((update.rotation().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_lifting_a_finger_ends_gesture() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, true, true, 1.0);
        gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 0.0);
        assert!(gestures.is_active());

        let update = gestures.on_frame(&[0.0, 0.0], 1.0, 0.0);
        assert!(update.is_empty());
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_configure_disables_pinch() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, true, true, 1.0);
        gestures.configure(1.0, 3.0, false, true, 1.0);

        gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 0.0);
        let update = gestures.on_frame(&[0.0, 0.0, 200.0, 0.0], 1.0, 0.0);
        assert_eq!(update.zoom(), None);
    }

    #[test]
    fn test_configure_tightens_zoom_bounds() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, true, false, 1.0);
        gestures.configure(1.0, 1.5, true, false, 1.0);

        gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 0.0);
        let update = gestures.on_frame(&[0.0, 0.0, 200.0, 0.0], 1.0, 0.0);
        assert_eq!(update.zoom(), Some(1.5));
    }

    #[test]
    fn test_cancel() {
        let mut gestures = JsGestureInterpreter::new(1.0, 3.0, true, true, 1.0);
        gestures.on_frame(&[0.0, 0.0, 100.0, 0.0], 1.0, 0.0);
        gestures.cancel();
        assert!(!gestures.is_active());
    }
}
