//! Drawing capability injected into the render pipeline.
//!
//! The pipeline only ever talks to these two traits, so it can be driven by
//! the in-crate raster backend, a browser canvas, or a recording mock.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the surface, y grows downward
//! - `rotate` takes radians; positive angles turn clockwise on screen
//! - Transforms compose like a 2D canvas context: each call is applied to
//!   user coordinates before the transforms already on the stack

use async_trait::async_trait;

use super::{Blob, OutputType, RenderError};
use crate::decode::ImageSource;
use crate::geometry::CropRect;

/// Destination rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A drawable, encodable surface.
#[async_trait(?Send)]
pub trait Surface {
    /// Decoded image type this surface can draw from.
    type Image;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Push the transform and clip state.
    fn save(&mut self);
    /// Pop the state pushed by the matching [`Surface::save`].
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    /// Intersect the clip region with a circle.
    fn clip_circle(&mut self, cx: f64, cy: f64, radius: f64);

    /// Draw `src` of `image` scaled into `dest`.
    fn draw_image(
        &mut self,
        image: &Self::Image,
        src: CropRect,
        dest: DrawRect,
    ) -> Result<(), RenderError>;

    /// Draw the whole of `other` with its top-left corner at `(dx, dy)`.
    fn draw_surface(&mut self, other: &Self, dx: f64, dy: f64) -> Result<(), RenderError>;

    async fn to_data_url(&self, output_type: OutputType, quality: f64)
        -> Result<String, RenderError>;

    /// Binary encoding of the surface. `Ok(None)` means the backend cannot
    /// produce one directly and the caller should fall back to the data URL.
    async fn to_blob(
        &self,
        output_type: OutputType,
        quality: f64,
    ) -> Result<Option<Blob>, RenderError>;
}

/// Factory for decoded images and fresh surfaces.
///
/// Every render allocates its own surfaces, so two renders never share a
/// live one.
#[async_trait(?Send)]
pub trait RenderBackend {
    type Image;
    type Surface: Surface<Image = Self::Image>;

    async fn decode(&self, source: &ImageSource) -> Result<Self::Image, RenderError>;

    fn create_surface(&self, width: u32, height: u32) -> Result<Self::Surface, RenderError>;
}
