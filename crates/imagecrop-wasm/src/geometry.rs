//! WASM bindings for the crop geometry helpers.
//!
//! These are the same pure functions the controller uses, exposed so the
//! presentation layer can preview crop windows and output sizes without
//! going through a controller.

use imagecrop_core::geometry::{self, AspectRatio, CropGeometry, CropRect, ObjectFit, Point, Size};
use wasm_bindgen::prelude::*;

/// A width/height pair.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsSize {
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl JsSize {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl From<Size> for JsSize {
    fn from(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// A crop rectangle in source-image pixels.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsCropRect {
    inner: CropRect,
}

#[wasm_bindgen]
impl JsCropRect {
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u32 {
        self.inner.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u32 {
        self.inner.y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }
}

impl From<CropRect> for JsCropRect {
    fn from(inner: CropRect) -> Self {
        Self { inner }
    }
}

/// Clamp a zoom factor into `[min, max]`.
#[wasm_bindgen]
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    geometry::clamp_zoom(zoom, min, max)
}

/// Wrap an angle in degrees into `[0, 360)`.
#[wasm_bindgen]
pub fn normalize_rotation(degrees: f64) -> f64 {
    geometry::normalize_rotation(degrees)
}

/// Shrink output dimensions proportionally to fit optional max bounds.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const size = compute_fit_dimensions(4000, 2000, 1920, undefined);
/// // size.width === 1920, size.height === 960
/// ```
#[wasm_bindgen]
pub fn compute_fit_dimensions(
    width: f64,
    height: f64,
    max_width: Option<f64>,
    max_height: Option<f64>,
) -> JsSize {
    geometry::compute_fit_dimensions(width, height, max_width, max_height).into()
}

/// Crop rectangle, in source pixels, for an image shown in a container.
///
/// # Arguments
///
/// * `aspect_ratio` - Window aspect ratio; `undefined` for a free window
/// * `object_fit` - `"contain"`, `"cover"`, `"horizontal-cover"` or
///   `"vertical-cover"`; anything else is treated as `"contain"`
///
/// Returns `undefined` when the image or container has no area.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn compute_crop_rect(
    natural_width: u32,
    natural_height: u32,
    container_width: f64,
    container_height: f64,
    offset_x: f64,
    offset_y: f64,
    zoom: f64,
    aspect_ratio: Option<f64>,
    object_fit: &str,
    restrict_position: bool,
) -> Option<JsCropRect> {
    let geometry = CropGeometry {
        natural_width,
        natural_height,
        container: Size::new(container_width, container_height),
        offset: Point::new(offset_x, offset_y),
        zoom,
        aspect: aspect_ratio.map_or(AspectRatio::Free, AspectRatio::Fixed),
        object_fit: parse_object_fit(object_fit),
        restrict_position,
    };
    geometry::compute_crop_rect(&geometry).map(JsCropRect::from)
}

fn parse_object_fit(value: &str) -> ObjectFit {
    match value {
        "cover" => ObjectFit::Cover,
        "horizontal-cover" => ObjectFit::HorizontalCover,
        "vertical-cover" => ObjectFit::VerticalCover,
        _ => ObjectFit::Contain,
    }
}
