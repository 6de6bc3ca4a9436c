//! The asynchronous crop render pipeline.

use super::{
    Blob, CropResult, DrawRect, NamedFile, OutputFormat, OutputSpec, RenderBackend, RenderError,
    Surface,
};
use crate::decode::ImageSource;
use crate::error::CropUploadError;
use crate::geometry::{compute_fit_dimensions, normalize_rotation, CropRect};

/// Everything a single render needs, snapshotted from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub source: ImageSource,
    pub crop_rect: CropRect,
    /// Degrees, any real value; normalized before drawing.
    pub rotation: f64,
    pub output: OutputSpec,
    pub circular: bool,
}

/// Render `request` with `backend`.
///
/// # Errors
///
/// Decode and draw failures are reported as `CropError`, surface and encode
/// failures as `CanvasError`. Nothing is retried.
pub async fn render_crop<B: RenderBackend>(
    backend: &B,
    request: &RenderRequest,
) -> Result<CropResult, CropUploadError> {
    match render(backend, request).await {
        Ok(result) => {
            log::debug!(
                "Rendered {}x{} {:?} crop ({:?})",
                result.width,
                result.height,
                request.output.output_type,
                request.output.format
            );
            Ok(result)
        }
        Err(err) => {
            log::warn!("Crop render failed: {err}");
            Err(err.into_upload_error(request.circular))
        }
    }
}

async fn render<B: RenderBackend>(
    backend: &B,
    request: &RenderRequest,
) -> Result<CropResult, RenderError> {
    let image = backend.decode(&request.source).await?;

    let crop = request.crop_rect;
    let fit = compute_fit_dimensions(
        crop.width as f64,
        crop.height as f64,
        request.output.max_width,
        request.output.max_height,
    );
    let (width, height) = fit.to_surface_dimensions();

    let mut surface = backend.create_surface(width, height)?;
    compose(&mut surface, &image, crop, request.rotation)?;

    let surface = if request.circular {
        apply_circular_mask(backend, &surface)?
    } else {
        surface
    };

    encode_outputs(&surface, &request.output).await
}

/// Draw `crop` of `image` filling `surface`, rotated about the surface center.
fn compose<S: Surface>(
    surface: &mut S,
    image: &S::Image,
    crop: CropRect,
    rotation: f64,
) -> Result<(), RenderError> {
    let width = surface.width() as f64;
    let height = surface.height() as f64;
    let radians = normalize_rotation(rotation).to_radians();

    surface.save();
    surface.translate(width / 2.0, height / 2.0);
    surface.rotate(radians);
    surface.translate(-width / 2.0, -height / 2.0);
    let drawn = surface.draw_image(image, crop, DrawRect::new(0.0, 0.0, width, height));
    surface.restore();
    drawn
}

/// Second pass: center `surface` on a square clipped to its inscribed circle.
fn apply_circular_mask<B: RenderBackend>(
    backend: &B,
    surface: &B::Surface,
) -> Result<B::Surface, RenderError> {
    let size = surface.width().min(surface.height());
    let mut circular = backend.create_surface(size, size)?;

    let radius = size as f64 / 2.0;
    circular.clip_circle(radius, radius, radius);

    let dx = (size as f64 - surface.width() as f64) / 2.0;
    let dy = (size as f64 - surface.height() as f64) / 2.0;
    circular.draw_surface(surface, dx, dy)?;

    Ok(circular)
}

async fn encode_outputs<S: Surface>(
    surface: &S,
    spec: &OutputSpec,
) -> Result<CropResult, RenderError> {
    let format = spec.format;
    let mut result = CropResult::new(surface.width(), surface.height());

    if format.includes_base64() {
        result.base64 = Some(surface.to_data_url(spec.output_type, spec.quality).await?);
    }

    if !(format.includes_blob() || format.includes_file()) {
        return Ok(result);
    }

    let blob = match surface.to_blob(spec.output_type, spec.quality).await? {
        Some(blob) => blob,
        None => match (format, result.base64.as_deref()) {
            (OutputFormat::All, Some(base64)) => {
                log::debug!("Backend produced no blob, decoding it from the data URL");
                Blob::from_data_url(base64).map_err(|e| RenderError::Encode(e.to_string()))?
            }
            _ => {
                return Err(RenderError::Encode(
                    "Failed to convert canvas to blob".to_string(),
                ))
            }
        },
    };

    if format.includes_file() {
        result.file = Some(NamedFile::new(spec.file_name.clone(), blob.clone()));
    }
    if format.includes_blob() {
        result.blob = Some(blob);
    }

    Ok(result)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
