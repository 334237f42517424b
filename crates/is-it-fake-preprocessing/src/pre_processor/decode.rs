use std::path::Path;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// File extensions accepted for upload, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Failure to turn raw bytes into an RGB image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("image data is empty")]
    Empty,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed image data: {0}")]
    Malformed(String),
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::UnsupportedFormat(e.to_string()),
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Returns true if the path ends in one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
#[must_use]
pub fn has_supported_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map_or_else(|| format!("{format:?}"), |ext| (*ext).to_string())
}

/// Decode JPEG, PNG or WebP bytes into an 8-bit RGB image.
///
/// The container format is sniffed from the magic bytes, not taken from the
/// filename, so a renamed GIF is still rejected.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = image::guess_format(bytes)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
        return Err(DecodeError::UnsupportedFormat(format_name(format)));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)?;
    tracing::trace!(
        format = ?format,
        width = decoded.width(),
        height = decoded.height(),
        "decoded image"
    );
    Ok(DynamicImage::ImageRgb8(decoded.into_rgb8()))
}
