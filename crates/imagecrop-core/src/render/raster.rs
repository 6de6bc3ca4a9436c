//! CPU raster backend built on tiny-skia.
//!
//! Each surface owns one premultiplied [`Pixmap`]. The canvas state stack
//! carries the current [`Transform`] and an optional anti-aliased [`Mask`];
//! `translate` and `rotate` pre-concatenate onto the transform so the newest
//! operation applies to user coordinates first.
//!
//! Images are drawn with `draw_pixmap` under bilinear filtering. The source
//! rectangle is cut out of the decoded pixmap first, so sampling at the crop
//! edges pads from the crop itself instead of bleeding in neighbours.

use std::fmt;

use async_trait::async_trait;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntRect, IntSize, Mask, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};

use super::{Blob, DrawRect, OutputType, RenderBackend, RenderError, Surface};
use crate::decode::{decode_image, DecodedImage, ImageSource};
use crate::encode::{encode_rgba, to_data_url};
use crate::geometry::CropRect;

/// Largest surface area accepted, in pixels (16384 x 16384).
pub const MAX_SURFACE_AREA: u64 = 16_384 * 16_384;

/// Default backend: decodes with the `image` crate and renders on the CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl RenderBackend for RasterBackend {
    type Image = Pixmap;
    type Surface = RasterSurface;

    async fn decode(&self, source: &ImageSource) -> Result<Pixmap, RenderError> {
        let image = decode_image(&source.bytes)?;
        log::debug!(
            "Decoded {} source to {}x{} RGBA",
            source.mime_type,
            image.width,
            image.height
        );
        pixmap_from_image(&image)
    }

    fn create_surface(&self, width: u32, height: u32) -> Result<RasterSurface, RenderError> {
        RasterSurface::new(width, height)
    }
}

/// Premultiply straight RGBA into a pixmap.
pub(crate) fn pixmap_from_image(image: &DecodedImage) -> Result<Pixmap, RenderError> {
    let mut data = Vec::with_capacity(image.pixels.len());
    for px in image.pixels.chunks_exact(4) {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    IntSize::from_wh(image.width, image.height)
        .and_then(|size| Pixmap::from_vec(data, size))
        .ok_or_else(|| {
            RenderError::Draw(format!(
                "cannot build a pixmap from a {}x{} image",
                image.width, image.height
            ))
        })
}

#[derive(Clone)]
struct State {
    transform: Transform,
    mask: Option<Mask>,
}

/// Pixmap surface with a canvas-like state stack.
#[derive(Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    state: State,
    stack: Vec<State>,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("transform", &self.state.transform)
            .field("clipped", &self.state.mask.is_some())
            .field("saved", &self.stack.len())
            .finish()
    }
}

impl RasterSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Surface` for a zero-sized surface or one larger
    /// than [`MAX_SURFACE_AREA`].
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let area = width as u64 * height as u64;
        let pixmap = if area == 0 || area > MAX_SURFACE_AREA {
            None
        } else {
            Pixmap::new(width, height)
        };
        let pixmap = pixmap.ok_or_else(|| {
            RenderError::Surface(format!("cannot allocate a {width}x{height} surface"))
        })?;

        Ok(Self {
            pixmap,
            state: State {
                transform: Transform::identity(),
                mask: None,
            },
            stack: Vec::new(),
        })
    }

    /// Straight-alpha copy of the current contents.
    pub fn to_image(&self) -> DecodedImage {
        let mut pixels = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        DecodedImage::new(self.pixmap.width(), self.pixmap.height(), pixels)
    }

    /// Draw `pixmap` with the current state, after `local` maps its pixel
    /// grid into user space.
    fn draw_transformed(&mut self, pixmap: &Pixmap, local: Transform) -> Result<(), RenderError> {
        let transform = self.state.transform.pre_concat(local);
        if transform.invert().is_none() {
            return Err(RenderError::Draw(
                "current transform is not invertible".to_string(),
            ));
        }

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &paint,
            transform,
            self.state.mask.as_ref(),
        );
        Ok(())
    }

    fn encode(&self, output_type: OutputType, quality: f64) -> Result<Vec<u8>, RenderError> {
        let image = self.to_image();
        Ok(encode_rgba(
            &image.pixels,
            image.width,
            image.height,
            output_type,
            quality,
        )?)
    }
}

#[async_trait(?Send)]
impl Surface for RasterSurface {
    type Image = Pixmap;

    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform = self.state.transform.pre_translate(x as f32, y as f32);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform.pre_rotate(radians.to_degrees() as f32);
    }

    fn clip_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        let transform = self.state.transform;
        let path = PathBuilder::from_circle(cx as f32, cy as f32, radius as f32);

        let mask = match (self.state.mask.take(), path) {
            (Some(mut mask), Some(path)) => {
                mask.intersect_path(&path, FillRule::Winding, true, transform);
                Some(mask)
            }
            (None, Some(path)) => Mask::new(self.pixmap.width(), self.pixmap.height()).map(
                |mut mask| {
                    mask.fill_path(&path, FillRule::Winding, true, transform);
                    mask
                },
            ),
            // A degenerate circle clips everything away
            (_, None) => Mask::new(self.pixmap.width(), self.pixmap.height()),
        };
        self.state.mask = mask;
    }

    fn draw_image(
        &mut self,
        image: &Pixmap,
        src: CropRect,
        dest: DrawRect,
    ) -> Result<(), RenderError> {
        let region = if src.width == 0
            || src.height == 0
            || !src.fits_within(image.width(), image.height())
        {
            None
        } else {
            IntRect::from_xywh(src.x as i32, src.y as i32, src.width, src.height)
                .and_then(|rect| image.clone_rect(rect))
        };
        let region = region.ok_or_else(|| {
            RenderError::Draw(format!(
                "source rectangle {}x{} at ({}, {}) is outside the {}x{} image",
                src.width,
                src.height,
                src.x,
                src.y,
                image.width(),
                image.height()
            ))
        })?;
        if !(dest.width > 0.0 && dest.height > 0.0) {
            return Ok(());
        }

        let local = Transform::from_translate(dest.x as f32, dest.y as f32).pre_scale(
            (dest.width / src.width as f64) as f32,
            (dest.height / src.height as f64) as f32,
        );
        self.draw_transformed(&region, local)
    }

    fn draw_surface(&mut self, other: &Self, dx: f64, dy: f64) -> Result<(), RenderError> {
        self.draw_transformed(&other.pixmap, Transform::from_translate(dx as f32, dy as f32))
    }

    async fn to_data_url(
        &self,
        output_type: OutputType,
        quality: f64,
    ) -> Result<String, RenderError> {
        let bytes = self.encode(output_type, quality)?;
        Ok(to_data_url(output_type.mime_type(), &bytes))
    }

    async fn to_blob(
        &self,
        output_type: OutputType,
        quality: f64,
    ) -> Result<Option<Blob>, RenderError> {
        let bytes = self.encode(output_type, quality)?;
        Ok(Some(Blob::new(bytes, output_type.mime_type())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    /// Image with a distinct opaque color per pixel.
    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 40) as u8, (y * 80) as u8, 7, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn solid(width: u32, height: u32, value: u8) -> Pixmap {
        pixmap_from_image(&DecodedImage::new(
            width,
            height,
            vec![value; (width * height * 4) as usize],
        ))
        .unwrap()
    }

    fn assert_pixel_near(actual: [u8; 4], expected: [u8; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                (*a as i16 - *e as i16).abs() <= 2,
                "pixel {actual:?} differs from {expected:?}"
            );
        }
    }

    #[test]
    fn test_surface_limits() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(RenderError::Surface(_))
        ));
        assert!(matches!(
            RasterSurface::new(16_385, 16_384),
            Err(RenderError::Surface(_))
        ));
        let surface = RasterSurface::new(3, 2).unwrap();
        assert_eq!((surface.width(), surface.height()), (3, 2));
        assert_eq!(surface.to_image().pixel(2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_pixmap_round_trip_keeps_straight_alpha() {
        let image = DecodedImage::new(2, 1, vec![200, 100, 50, 255, 0, 0, 0, 0]);
        let pixmap = pixmap_from_image(&image).unwrap();
        let mut surface = RasterSurface::new(2, 1).unwrap();
        surface
            .draw_image(&pixmap, CropRect::full(2, 1), DrawRect::new(0.0, 0.0, 2.0, 1.0))
            .unwrap();

        let out = surface.to_image();
        assert_pixel_near(out.pixel(0, 0), [200, 100, 50, 255]);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_identity_draw_copies_pixels() {
        let image = gradient(4, 2);
        let mut surface = RasterSurface::new(4, 2).unwrap();
        surface
            .draw_image(
                &pixmap_from_image(&image).unwrap(),
                CropRect::full(4, 2),
                DrawRect::new(0.0, 0.0, 4.0, 2.0),
            )
            .unwrap();

        let out = surface.to_image();
        for y in 0..2 {
            for x in 0..4 {
                assert_pixel_near(out.pixel(x, y), image.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_draw_sub_rect() {
        let image = gradient(4, 2);
        let mut surface = RasterSurface::new(2, 1).unwrap();
        surface
            .draw_image(
                &pixmap_from_image(&image).unwrap(),
                CropRect::new(2, 1, 2, 1),
                DrawRect::new(0.0, 0.0, 2.0, 1.0),
            )
            .unwrap();
        let out = surface.to_image();
        assert_pixel_near(out.pixel(0, 0), image.pixel(2, 1));
        assert_pixel_near(out.pixel(1, 0), image.pixel(3, 1));
    }

    #[test]
    fn test_draw_rejects_out_of_bounds_source() {
        let image = solid(4, 2, 255);
        let mut surface = RasterSurface::new(2, 2).unwrap();
        let err = surface
            .draw_image(&image, CropRect::new(3, 0, 2, 2), DrawRect::new(0.0, 0.0, 2.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, RenderError::Draw(_)));

        let err = surface
            .draw_image(&image, CropRect::new(0, 0, 0, 2), DrawRect::new(0.0, 0.0, 2.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, RenderError::Draw(_)));
    }

    #[test]
    fn test_empty_destination_draws_nothing() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        surface
            .draw_image(&solid(2, 2, 255), CropRect::full(2, 2), DrawRect::new(0.0, 0.0, 0.0, 2.0))
            .unwrap();
        assert!(surface.to_image().pixels.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_rotate_180_about_center() {
        let image = gradient(4, 2);
        let mut surface = RasterSurface::new(4, 2).unwrap();
        surface.save();
        surface.translate(2.0, 1.0);
        surface.rotate(std::f64::consts::PI);
        surface.translate(-2.0, -1.0);
        surface
            .draw_image(
                &pixmap_from_image(&image).unwrap(),
                CropRect::full(4, 2),
                DrawRect::new(0.0, 0.0, 4.0, 2.0),
            )
            .unwrap();
        surface.restore();

        let out = surface.to_image();
        assert_pixel_near(out.pixel(0, 0), image.pixel(3, 1));
        assert_pixel_near(out.pixel(3, 1), image.pixel(0, 0));
        assert!(surface.state.transform.is_identity());
        assert!(surface.stack.is_empty());
    }

    #[test]
    fn test_rotate_90_leaves_uncovered_corners_transparent() {
        let mut surface = RasterSurface::new(4, 2).unwrap();
        surface.translate(2.0, 1.0);
        surface.rotate(std::f64::consts::FRAC_PI_2);
        surface.translate(-2.0, -1.0);
        surface
            .draw_image(&solid(4, 2, 255), CropRect::full(4, 2), DrawRect::new(0.0, 0.0, 4.0, 2.0))
            .unwrap();

        // The rotated 2x4 footprint covers only the middle two columns
        let out = surface.to_image();
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(3, 1)[3], 0);
        assert_pixel_near(out.pixel(1, 0), [255, 255, 255, 255]);
        assert_pixel_near(out.pixel(2, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_circular_clip_masks_corners() {
        let mut source = RasterSurface::new(20, 20).unwrap();
        source
            .draw_image(
                &solid(20, 20, 255),
                CropRect::full(20, 20),
                DrawRect::new(0.0, 0.0, 20.0, 20.0),
            )
            .unwrap();

        let mut circle = RasterSurface::new(20, 20).unwrap();
        circle.clip_circle(10.0, 10.0, 10.0);
        circle.draw_surface(&source, 0.0, 0.0).unwrap();

        let out = circle.to_image();
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(19, 19)[3], 0);
        assert_pixel_near(out.pixel(10, 10), [255, 255, 255, 255]);
        assert!(out.pixel(2, 10)[3] >= 250);

        // Anti-aliased rim
        let rim = out.pixel(3, 2)[3];
        assert!(rim > 0 && rim < 255, "rim alpha {rim}");
    }

    #[test]
    fn test_restore_drops_clip() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.save();
        surface.clip_circle(5.0, 5.0, 1.0);
        surface.restore();
        surface
            .draw_image(&solid(10, 10, 255), CropRect::full(10, 10), DrawRect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();

        assert_pixel_near(surface.to_image().pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_degenerate_clip_hides_everything() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        surface.clip_circle(2.0, 2.0, 0.0);
        surface
            .draw_image(&solid(4, 4, 255), CropRect::full(4, 4), DrawRect::new(0.0, 0.0, 4.0, 4.0))
            .unwrap();
        assert!(surface.to_image().pixels.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_backend_decode_and_encode() {
        let backend = RasterBackend::new();
        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(3, 3, image::Rgba([1, 2, 3, 255]))
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let source = ImageSource {
            mime_type: "image/png".to_string(),
            bytes: png.into_inner().into(),
            width: 3,
            height: 3,
        };

        let decoded = block_on(backend.decode(&source)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 3));

        let surface = backend.create_surface(3, 3).unwrap();
        let url = block_on(surface.to_data_url(OutputType::Png, 1.0)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let blob = block_on(surface.to_blob(OutputType::Jpeg, 0.8)).unwrap().unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
    }

    #[test]
    fn test_backend_decode_failure() {
        let source = ImageSource {
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; 16].into(),
            width: 1,
            height: 1,
        };
        let err = block_on(RasterBackend.decode(&source)).unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
