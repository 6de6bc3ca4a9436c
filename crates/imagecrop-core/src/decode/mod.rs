//! Image loading and decoding.
//!
//! This module provides functionality for:
//! - Reading a selected file into an [`ImageSource`] (format sniffing,
//!   natural dimensions, EXIF orientation)
//! - Decoding an image source to RGBA pixels for rendering
//!
//! Loading only parses headers so it stays fast enough to run inside the
//! synchronous lifecycle; the full decode happens in the render pipeline.

mod load;
mod types;

pub use load::{decode_image, load_image_source, ALLOWED_IMAGE_MIME_TYPES};
pub use types::{DecodeError, DecodedImage, ImageSource, Orientation};
