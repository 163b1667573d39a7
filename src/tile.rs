//! Tile types shared between the host and the transformer.
//!
//! A [`Tile`] is the host's image resource for one grid cell. A [`TileJob`]
//! is the short-lived decoded form the transformer rewrites.

use image::RgbaImage;
use thiserror::Error;

use crate::surface::SurfaceError;

/// Linear RGBA pixel data, row-major, four bytes per pixel.
pub type PixelBuffer = RgbaImage;

/// Error type for tile processing.
#[derive(Debug, Error)]
pub enum TileError {
    /// Raw pixel data does not hold exactly `width * height * 4` bytes.
    #[error("pixel buffer of {len} bytes does not fit a {width}x{height} tile")]
    BufferSize { width: u32, height: u32, len: usize },

    /// No drawing surface is available, or it has been disabled.
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

// ============================================================================
// TileJob
// ============================================================================

/// One tile's decoded pixels, consumed by a single transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TileJob {
    pixels: PixelBuffer,
}

impl TileJob {
    /// Wraps an already decoded buffer.
    pub fn new(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }

    /// Builds a job from raw RGBA bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TileError> {
        let len = data.len();
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(len) {
            return Err(TileError::BufferSize { width, height, len });
        }

        PixelBuffer::from_raw(width, height, data)
            .map(Self::new)
            .ok_or(TileError::BufferSize { width, height, len })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Releases the buffer.
    pub fn into_pixels(self) -> PixelBuffer {
        self.pixels
    }
}

// ============================================================================
// Tile
// ============================================================================

/// Processing state of a [`Tile`].
///
/// ```text
/// Decodable -> Decoding -> Rewriting -> Reencoded -> Done
///     └───────────────── passthrough ───────────────┘
/// ```
///
/// Only a `Decodable` tile is processed. Notifications arriving in any other
/// state are suppressed, so publishing the re-encoded source never feeds the
/// tile back into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// The image is loaded and ready to be read.
    Decodable,
    /// Pixels are being extracted through the drawing surface.
    Decoding,
    /// The pixel buffer is being rewritten.
    Rewriting,
    /// The rewritten buffer has been serialized.
    Reencoded,
    /// Terminal. The tile's source is final.
    Done,
}

/// The host's image resource for a single tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// The image source the host displays (a URL, or a data URL once recolored).
    source: String,

    /// The fetched, still encoded image bytes.
    data: Vec<u8>,

    state: TileState,
}

impl Tile {
    /// Creates a tile whose image has been fetched and is ready to decode.
    pub fn new(source: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            data,
            state: TileState::Decodable,
        }
    }

    /// Returns the current image source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the encoded image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    /// Returns true once the tile has reached [`TileState::Done`].
    pub fn is_done(&self) -> bool {
        self.state == TileState::Done
    }

    pub(crate) fn advance(&mut self, state: TileState) {
        self.state = state;
    }

    /// Publishes a new source and marks the tile done.
    pub(crate) fn publish(&mut self, source: String) {
        self.source = source;
        self.state = TileState::Done;
    }
}
