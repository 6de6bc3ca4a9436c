//! Core geometric types shared by the crop, gesture and render modules.

use serde::{Deserialize, Serialize};

/// Maximum difference between a crop rectangle's width/height ratio and the
/// requested aspect ratio for the two to be considered equal.
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.01;

/// A point or offset in display space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair that may be fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Integer surface dimensions, truncated like a canvas would and never
    /// smaller than 1x1.
    pub fn to_surface_dimensions(self) -> (u32, u32) {
        let w = self.width.trunc().max(1.0);
        let h = self.height.trunc().max(1.0);
        (w as u32, h as u32)
    }
}

/// Pixel-space sub-region of the source image selected for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle covering the whole image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// True when the rectangle is non-empty and lies inside
    /// `[0, image_width] x [0, image_height]`.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= image_width as u64
            && self.bottom() <= image_height as u64
    }

    /// Check the ratio against an aspect ratio constraint. `Free` always matches.
    pub fn matches_aspect(&self, aspect: AspectRatio) -> bool {
        match aspect {
            AspectRatio::Free => true,
            AspectRatio::Fixed(ratio) => {
                (self.aspect_ratio() - ratio).abs() <= ASPECT_RATIO_TOLERANCE
            }
        }
    }
}

/// Aspect ratio constraint for the crop window.
///
/// Serialized as a bare number, or the string `"free"` for no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AspectRatioRepr", into = "AspectRatioRepr")]
pub enum AspectRatio {
    /// Width divided by height.
    Fixed(f64),
    /// No enforced ratio.
    Free,
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Fixed(1.0)
    }
}

impl AspectRatio {
    /// The numeric ratio, if one is enforced.
    pub fn value(self) -> Option<f64> {
        match self {
            AspectRatio::Fixed(r) => Some(r),
            AspectRatio::Free => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AspectRatioRepr {
    Ratio(f64),
    Keyword(AspectKeyword),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AspectKeyword {
    Free,
}

impl From<AspectRatioRepr> for AspectRatio {
    fn from(repr: AspectRatioRepr) -> Self {
        match repr {
            AspectRatioRepr::Ratio(r) => AspectRatio::Fixed(r),
            AspectRatioRepr::Keyword(AspectKeyword::Free) => AspectRatio::Free,
        }
    }
}

impl From<AspectRatio> for AspectRatioRepr {
    fn from(ratio: AspectRatio) -> Self {
        match ratio {
            AspectRatio::Fixed(r) => AspectRatioRepr::Ratio(r),
            AspectRatio::Free => AspectRatioRepr::Keyword(AspectKeyword::Free),
        }
    }
}

/// Policy for scaling the source image within its display area before the
/// crop rectangle is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    /// Whole image visible, letterboxed.
    #[default]
    Contain,
    /// Image fills the container on its shorter side.
    Cover,
    /// Image width matches the container width.
    HorizontalCover,
    /// Image height matches the container height.
    VerticalCover,
}
