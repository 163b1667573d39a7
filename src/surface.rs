//! Offscreen drawing surface used to decode and re-encode tiles.
//!
//! The transformer never touches image codecs directly. It reads pixels
//! through a [`DrawingSurface`] and hands the rewritten buffer back to the
//! same surface for serialization. A transformer built without a surface
//! runs in passthrough mode.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbaImage, imageops};
use thiserror::Error;

use crate::tile::{PixelBuffer, Tile};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Error type for drawing surface operations.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface was asked for a zero-sized area.
    #[error("drawing surface has no area")]
    EmptySurface,

    #[error("failed to decode tile image: {0}")]
    Decode(#[source] ImageError),

    #[error("failed to encode tile image: {0}")]
    Encode(#[source] ImageError),

    /// The string is not a base64 data URL.
    #[error("not a base64 data URL: {0}")]
    DataUrl(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A 2D drawing surface the host provides for pixel access.
///
/// Implementations must be shareable between threads: independent tiles may
/// be transformed concurrently through the same surface.
pub trait DrawingSurface: Send + Sync {
    /// Draws the tile's image at the origin of a transparent `size x size`
    /// surface and reads the whole surface back.
    ///
    /// Images larger than the surface are cropped, smaller ones are padded
    /// with transparent pixels.
    fn read_pixels(&self, tile: &Tile, size: u32) -> Result<PixelBuffer, SurfaceError>;

    /// Serializes pixels into a self-contained image source.
    fn encode(&self, pixels: &PixelBuffer) -> Result<String, SurfaceError>;
}

// ============================================================================
// RasterSurface
// ============================================================================

/// Software surface backed by the `image` crate.
///
/// Decodes any format `image` recognizes and re-encodes as a PNG data URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterSurface;

impl RasterSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DrawingSurface for RasterSurface {
    fn read_pixels(&self, tile: &Tile, size: u32) -> Result<PixelBuffer, SurfaceError> {
        if size == 0 {
            return Err(SurfaceError::EmptySurface);
        }

        let decoded = image::load_from_memory(tile.data())
            .map_err(SurfaceError::Decode)?
            .to_rgba8();

        if decoded.dimensions() == (size, size) {
            return Ok(decoded);
        }

        let mut canvas = RgbaImage::new(size, size);
        imageops::replace(&mut canvas, &decoded, 0, 0);
        Ok(canvas)
    }

    fn encode(&self, pixels: &PixelBuffer) -> Result<String, SurfaceError> {
        let png = encode_png(pixels)?;
        Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
    }
}

/// Encodes pixels as PNG bytes.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, SurfaceError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(SurfaceError::Encode)?;
    Ok(png)
}

/// Extracts the payload bytes of a base64 data URL.
///
/// Accepts any media type, e.g. `data:image/png;base64,...`.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, SurfaceError> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .filter(|(meta, _)| meta.ends_with(";base64"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| SurfaceError::DataUrl(truncate(url)))?;

    Ok(STANDARD.decode(payload)?)
}

fn truncate(s: &str) -> String {
    s.chars().take(32).collect()
}
