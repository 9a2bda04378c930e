//! QR code rendering for attendee badges.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::QrCode;
use qrcode::render::svg;
use thiserror::Error;

/// Minimum rendered edge length in pixels.
const MIN_DIMENSION: u32 = 256;

/// Image formats the QR endpoint can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrFormat {
    /// Raster badge, what the printable badge sheet embeds.
    #[default]
    Png,
    Svg,
}

impl QrFormat {
    /// MIME type of the rendered image.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl std::str::FromStr for QrFormat {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(QrError::UnsupportedFormat(other.to_owned())),
        }
    }
}

/// Errors that can occur while rendering a QR code.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("unsupported QR format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Render `payload` in the requested format.
///
/// # Errors
///
/// Returns `QrError::Encode` if the payload does not fit in a QR code, or
/// `QrError::Image` if PNG encoding fails.
pub fn render(payload: &str, format: QrFormat) -> Result<Vec<u8>, QrError> {
    match format {
        QrFormat::Png => render_png(payload),
        QrFormat::Svg => render_svg(payload).map(String::into_bytes),
    }
}

/// Render `payload` as a grayscale PNG with a quiet zone.
///
/// # Errors
///
/// See [`render`].
pub fn render_png(payload: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .quiet_zone(true)
        .build();

    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Render `payload` as an SVG QR code with a quiet zone.
///
/// # Errors
///
/// Returns `QrError::Encode` if the payload does not fit in a QR code.
pub fn render_svg(payload: &str) -> Result<String, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .quiet_zone(true)
        .build())
}
