//! Crop rectangle computation from pan offset, zoom and aspect ratio.
//!
//! The interactive cropper shows the image inside a container. The crop
//! window is a fixed box centered in the container; the user pans the image
//! underneath it (`offset`) and zooms it. This module maps that display
//! state back into a rectangle in source-image pixels.
//!
//! # Algorithm
//!
//! 1. Size the image inside the container according to [`ObjectFit`]
//! 2. Size the crop window: the largest box of the requested aspect ratio
//!    that fits both the displayed image and the container
//! 3. Optionally clamp the pan offset so the window never leaves the image
//! 4. Express the window as percentages of the displayed image, then scale
//!    those into natural pixels, re-proportioning to the aspect ratio and
//!    shifting the result into the image bounds
//!
//! Rotation is not considered here; it is applied around the output center
//! at render time.

use super::{sanitize_aspect_ratio, AspectRatio, CropRect, ObjectFit, Point, Size};

/// Display state needed to derive a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    /// Source image width in pixels.
    pub natural_width: u32,
    /// Source image height in pixels.
    pub natural_height: u32,
    /// Size of the area the image is displayed in.
    pub container: Size,
    /// Pan offset of the image relative to the centered crop window.
    pub offset: Point,
    /// Current zoom factor (1.0 = fitted).
    pub zoom: f64,
    /// Aspect ratio constraint for the crop window.
    pub aspect: AspectRatio,
    /// Scaling policy of the image inside the container.
    pub object_fit: ObjectFit,
    /// Clamp the pan offset so the crop window stays on the image.
    pub restrict_position: bool,
}

impl CropGeometry {
    /// Geometry for an image displayed at its natural size with no pan.
    pub fn natural(width: u32, height: u32) -> Self {
        Self {
            natural_width: width,
            natural_height: height,
            container: Size::new(width as f64, height as f64),
            offset: Point::default(),
            zoom: 1.0,
            aspect: AspectRatio::Free,
            object_fit: ObjectFit::Contain,
            restrict_position: true,
        }
    }

    fn natural_size(&self) -> Size {
        Size::new(self.natural_width as f64, self.natural_height as f64)
    }

    /// The pan offset after applying `restrict_position`, if enabled.
    pub fn effective_offset(&self) -> Point {
        let natural = self.natural_size();
        if !self.restrict_position || natural.is_empty() || self.container.is_empty() {
            return self.offset;
        }
        let zoom = effective_zoom(self.zoom);
        let media = media_display_size(natural, self.container, self.object_fit);
        let crop = crop_window_size(media, self.container, self.window_aspect());
        restrict_position(self.offset, media, crop, zoom)
    }

    fn window_aspect(&self) -> f64 {
        match self.aspect {
            AspectRatio::Fixed(r) => sanitize_aspect_ratio(r),
            AspectRatio::Free => self.natural_size().aspect_ratio(),
        }
    }
}

fn effective_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    }
}

/// Size of the image as displayed inside `container` at zoom 1.
pub fn media_display_size(natural: Size, container: Size, fit: ObjectFit) -> Size {
    let media_aspect = natural.aspect_ratio();
    let container_aspect = container.aspect_ratio();

    let horizontal = Size::new(container.width, container.width / media_aspect);
    let vertical = Size::new(container.height * media_aspect, container.height);

    match fit {
        ObjectFit::Contain => {
            if media_aspect > container_aspect {
                horizontal
            } else {
                vertical
            }
        }
        ObjectFit::HorizontalCover => horizontal,
        ObjectFit::VerticalCover => vertical,
        ObjectFit::Cover => {
            if media_aspect < container_aspect {
                horizontal
            } else {
                vertical
            }
        }
    }
}

/// Largest box with the given aspect ratio fitting both the displayed
/// media and the container.
pub fn crop_window_size(media: Size, container: Size, aspect: f64) -> Size {
    let fitting_width = media.width.min(container.width);
    let fitting_height = media.height.min(container.height);

    if fitting_width > fitting_height * aspect {
        Size::new(fitting_height * aspect, fitting_height)
    } else {
        Size::new(fitting_width, fitting_width / aspect)
    }
}

/// Clamp a pan offset so the crop window cannot leave the zoomed media.
pub fn restrict_position(offset: Point, media: Size, crop: Size, zoom: f64) -> Point {
    Point::new(
        restrict_coord(offset.x, media.width, crop.width, zoom),
        restrict_coord(offset.y, media.height, crop.height, zoom),
    )
}

fn restrict_coord(position: f64, media: f64, crop: f64, zoom: f64) -> f64 {
    let max_position = ((media * zoom) / 2.0 - crop / 2.0).max(0.0);
    position.max(-max_position).min(max_position)
}

/// Clamp into `[0, max]`; NaN becomes 0.
#[inline]
fn limit(max: f64, value: f64) -> f64 {
    value.max(0.0).min(max)
}

/// Derive the pixel-space crop rectangle for the current display state.
///
/// Returns `None` when the image or container has no area. Otherwise the
/// result lies within the image bounds, is at least 1x1, and (for a fixed
/// aspect ratio and crops of reasonable size) has a width/height ratio
/// within [`ASPECT_RATIO_TOLERANCE`](super::ASPECT_RATIO_TOLERANCE) of the
/// sanitized ratio.
///
/// # Example
///
/// ```
/// use imagecrop_core::geometry::{compute_crop_rect, AspectRatio, CropGeometry};
///
/// let mut geometry = CropGeometry::natural(400, 200);
/// geometry.aspect = AspectRatio::Fixed(1.0);
///
/// let rect = compute_crop_rect(&geometry).unwrap();
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (100, 0, 200, 200));
/// ```
pub fn compute_crop_rect(geometry: &CropGeometry) -> Option<CropRect> {
    let natural = geometry.natural_size();
    let container = geometry.container;
    if natural.is_empty() || container.is_empty() {
        return None;
    }

    let zoom = effective_zoom(geometry.zoom);
    let media = media_display_size(natural, container, geometry.object_fit);
    let aspect = geometry.window_aspect();
    let crop = crop_window_size(media, container, aspect);
    let offset = geometry.effective_offset();

    // Window position and size as percentages of the displayed media
    let pct_x = limit(
        100.0,
        ((media.width - crop.width / zoom) / 2.0 - offset.x / zoom) / media.width * 100.0,
    );
    let pct_y = limit(
        100.0,
        ((media.height - crop.height / zoom) / 2.0 - offset.y / zoom) / media.height * 100.0,
    );
    let pct_width = limit(100.0, crop.width / media.width * 100.0 / zoom);
    let pct_height = limit(100.0, crop.height / media.height * 100.0 / zoom);

    let nat_w = natural.width;
    let nat_h = natural.height;
    let width_px = limit(nat_w, pct_width * nat_w / 100.0).round();
    let height_px = limit(nat_h, pct_height * nat_h / 100.0).round();

    let (width, height) = match geometry.aspect {
        AspectRatio::Free => (width_px, height_px),
        AspectRatio::Fixed(_) => {
            if nat_w >= nat_h * aspect {
                ((height_px * aspect).round(), height_px)
            } else {
                (width_px, (width_px / aspect).round())
            }
        }
    };
    let width = width.clamp(1.0, nat_w);
    let height = height.clamp(1.0, nat_h);

    let x = limit(nat_w - width, pct_x * nat_w / 100.0).round();
    let y = limit(nat_h - height, pct_y * nat_h / 100.0).round();

    Some(CropRect::new(
        x as u32,
        y as u32,
        width as u32,
        height as u32,
    ))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn fit_strategy() -> impl Strategy<Value = ObjectFit> {
        prop_oneof![
            Just(ObjectFit::Contain),
            Just(ObjectFit::Cover),
            Just(ObjectFit::HorizontalCover),
            Just(ObjectFit::VerticalCover),
        ]
    }

    proptest! {
        #[test]
        fn crop_rect_stays_in_bounds(
            w in 1u32..=4000,
            h in 1u32..=4000,
            cw in 1.0f64..2000.0,
            ch in 1.0f64..2000.0,
            ox in -5000.0f64..5000.0,
            oy in -5000.0f64..5000.0,
            zoom in 0.5f64..5.0,
            ratio in proptest::option::of(0.2f64..5.0),
            fit in fit_strategy(),
            restrict in any::<bool>(),
        ) {
            let geometry = CropGeometry {
                natural_width: w,
                natural_height: h,
                container: Size::new(cw, ch),
                offset: Point::new(ox, oy),
                zoom,
                aspect: ratio.map(AspectRatio::Fixed).unwrap_or(AspectRatio::Free),
                object_fit: fit,
                restrict_position: restrict,
            };
            let rect = compute_crop_rect(&geometry).unwrap();
            prop_assert!(rect.fits_within(w, h), "{:?} outside {}x{}", rect, w, h);
        }

        #[test]
        fn crop_rect_matches_aspect(
            w in 1000u32..=4000,
            h in 1000u32..=4000,
            ox in -2000.0f64..2000.0,
            oy in -2000.0f64..2000.0,
            zoom in 1.0f64..3.0,
            ratio in 0.5f64..2.0,
        ) {
            let geometry = CropGeometry {
                offset: Point::new(ox, oy),
                zoom,
                aspect: AspectRatio::Fixed(ratio),
                ..CropGeometry::natural(w, h)
            };
            let rect = compute_crop_rect(&geometry).unwrap();
            prop_assert!(
                rect.matches_aspect(AspectRatio::Fixed(ratio)),
                "{:?} ratio {} vs {}", rect, rect.aspect_ratio(), ratio
            );
        }
    }
}
