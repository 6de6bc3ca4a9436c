//! Reading selected files into image sources, and decoding sources to pixels.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, ImageSource, Orientation};
use crate::error::CropUploadError;
use crate::validate::SelectedFile;

/// Image MIME types the loader accepts after sniffing the file contents.
pub const ALLOWED_IMAGE_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Read a selected file into an [`ImageSource`].
///
/// The reported MIME type is not trusted: the format is sniffed from the
/// bytes, must be one of [`ALLOWED_IMAGE_MIME_TYPES`], and its header must
/// yield dimensions. EXIF orientation is honored so the natural size matches
/// what the user sees.
///
/// # Errors
///
/// Every failure is a [`CropUploadError::FileReadError`].
pub fn load_image_source(file: &SelectedFile) -> Result<ImageSource, CropUploadError> {
    if file.bytes.is_empty() {
        return Err(CropUploadError::file_read("Failed to read file: file is empty"));
    }

    let format = image::guess_format(&file.bytes).map_err(|_| {
        CropUploadError::file_read("Invalid image data: File content is not a valid image")
    })?;

    let mime_type = format.to_mime_type();
    if !ALLOWED_IMAGE_MIME_TYPES.contains(&mime_type) {
        return Err(CropUploadError::file_read(format!(
            "Unsupported image type: {mime_type}"
        )));
    }

    let (width, height) = ImageReader::with_format(Cursor::new(&file.bytes[..]), format)
        .into_dimensions()
        .map_err(|e| CropUploadError::file_read(format!("Failed to read image: {e}")))?;

    if width == 0 || height == 0 {
        return Err(CropUploadError::file_read(
            "Invalid image data: image has no pixels",
        ));
    }

    let orientation = extract_orientation(&file.bytes, format);
    let (width, height) = if orientation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    };

    log::debug!(
        "Loaded {} ({}, {}x{}, {} bytes)",
        file.name,
        mime_type,
        width,
        height,
        file.size
    );

    Ok(ImageSource {
        mime_type: mime_type.to_string(),
        bytes: file.bytes.clone(),
        width,
        height,
    })
}

/// Decode an image source to RGBA pixels, applying EXIF orientation.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized
/// and `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::InvalidFormat)?;

    let img = ImageReader::with_format(Cursor::new(bytes), format)
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, extract_orientation(bytes, format));
    Ok(DecodedImage::from_rgba_image(oriented.into_rgba8()))
}

/// EXIF orientation, `Normal` when absent or unreadable.
fn extract_orientation(bytes: &[u8], format: ImageFormat) -> Orientation {
    // GIF and BMP carry no EXIF container
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
    ) {
        return Orientation::Normal;
    }

    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
