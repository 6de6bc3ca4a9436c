//! Pure numeric functions reconciling zoom, rotation and aspect ratio.
//!
//! Everything in this module is total: every input, including NaN and
//! infinities, produces a defined output. Nothing here allocates or holds
//! state, so the gesture interpreter, the lifecycle and the render pipeline
//! can all call into it freely.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Crop rectangles are in source-image pixels, origin top-left
//! - Pan offsets and container sizes are in display units

mod crop_rect;
mod fit;
mod types;

pub use crop_rect::{
    compute_crop_rect, crop_window_size, media_display_size, restrict_position, CropGeometry,
};
pub use fit::compute_fit_dimensions;
pub use types::{AspectRatio, CropRect, ObjectFit, Point, Size, ASPECT_RATIO_TOLERANCE};

/// Clamp a zoom factor into `[min, max]`.
///
/// NaN collapses to `max`, matching `max(min, min(max, z))` with IEEE
/// `fmin`/`fmax` semantics.
#[inline]
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(zoom))
}

/// Wrap an angle in degrees into `[0, 360)`.
///
/// Non-finite input maps to `0`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    // rem_euclid can round tiny negatives up to exactly 360.0
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Replace unusable aspect ratios (zero, negative, NaN, infinite) with `1`.
#[inline]
pub fn sanitize_aspect_ratio(ratio: f64) -> f64 {
    if ratio <= 0.0 || !ratio.is_finite() {
        1.0
    } else {
        ratio
    }
}

/// Clamp an encoder quality into `[0, 1]`.
#[inline]
pub fn validate_quality(quality: f64) -> f64 {
    0.0f64.max(1.0f64.min(quality))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
