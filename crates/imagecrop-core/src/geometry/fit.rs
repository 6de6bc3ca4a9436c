//! Proportional fit of output dimensions into optional max bounds.

use super::Size;

/// Shrink `(width, height)` so neither side exceeds the supplied bounds.
///
/// The width bound is applied first, then the height bound is checked
/// against the already-scaled height. Dimensions are never enlarged, and a
/// bound that is absent, zero, negative or NaN is ignored.
///
/// # Example
///
/// ```
/// use imagecrop_core::geometry::compute_fit_dimensions;
///
/// let size = compute_fit_dimensions(4000.0, 2000.0, Some(1920.0), None);
/// assert_eq!(size.width, 1920.0);
/// assert_eq!(size.height, 960.0);
/// ```
pub fn compute_fit_dimensions(
    width: f64,
    height: f64,
    max_width: Option<f64>,
    max_height: Option<f64>,
) -> Size {
    let mut new_width = width;
    let mut new_height = height;

    if let Some(max_w) = max_width.filter(|m| *m > 0.0) {
        if new_width > max_w {
            new_height = new_height * max_w / new_width;
            new_width = max_w;
        }
    }

    if let Some(max_h) = max_height.filter(|m| *m > 0.0) {
        if new_height > max_h {
            new_width = new_width * max_h / new_height;
            new_height = max_h;
        }
    }

    Size::new(new_width, new_height)
}
