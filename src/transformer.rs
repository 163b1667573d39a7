//! Tile pixel transformer: the recoloring engine the host calls into.

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::color::Rgb;
use crate::rule::{ColorRule, RuleEvaluation, match_pixel_with};
use crate::settings::TransposeSettings;
use crate::surface::{DrawingSurface, RasterSurface};
use crate::tile::{PixelBuffer, Tile, TileError, TileJob, TileState};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from [`TransposeSettings`].
pub trait Configurable {
    /// Replaces the current settings.
    fn apply_settings(&mut self, settings: &TransposeSettings);

    /// Exports the current settings.
    fn export_settings(&self) -> TransposeSettings;
}

// ============================================================================
// TileOutcome
// ============================================================================

/// What [`TileTransformer::on_tile_decodable`] did with a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// The tile's source now points at the recolored image.
    Recolored,

    /// The tile keeps its original source.
    Passthrough,

    /// The tile had already been handled; the notification was ignored.
    Suppressed,
}

// ============================================================================
// TileTransformer
// ============================================================================

/// Recolors map tiles according to an ordered list of [`ColorRule`]s.
///
/// The transformer holds only read-only configuration, so one instance can
/// serve any number of tiles, including from several threads at once.
///
/// # Example
///
/// ```
/// use tile_transpose::{RuleSettings, TileTransformer, TransposeSettings};
///
/// let settings = TransposeSettings::new()
///     .with_tile_size(256)
///     .with_rule(RuleSettings::new("#000000", "#0000ff", 5).with_alpha(100));
///
/// let transformer = TileTransformer::new(settings);
/// assert_eq!(transformer.rules().len(), 1);
/// assert!(transformer.is_active());
/// ```
pub struct TileTransformer<S: DrawingSurface = RasterSurface> {
    settings: TransposeSettings,

    /// Rules compiled from `settings`, malformed ones already dropped.
    rules: Vec<ColorRule>,

    /// `None` when the host has no drawing surface capability.
    surface: Option<S>,
}

impl TileTransformer<RasterSurface> {
    /// Creates a transformer backed by the software [`RasterSurface`].
    pub fn new(settings: TransposeSettings) -> Self {
        Self::with_surface(settings, Some(RasterSurface::new()))
    }
}

impl<S: DrawingSurface> TileTransformer<S> {
    /// Creates a transformer using the host's drawing surface, if any.
    pub fn with_surface(settings: TransposeSettings, surface: Option<S>) -> Self {
        if surface.is_none() {
            debug!("no drawing surface available; tiles will pass through");
        }

        let rules = settings.compile_rules();
        Self {
            settings,
            rules,
            surface,
        }
    }

    /// Returns the compiled rules in evaluation order.
    pub fn rules(&self) -> &[ColorRule] {
        &self.rules
    }

    pub fn tile_size(&self) -> u32 {
        self.settings.tile_size
    }

    pub fn rule_evaluation(&self) -> RuleEvaluation {
        self.settings.rule_evaluation
    }

    /// Returns true if tiles will actually be decoded and rewritten.
    pub fn is_active(&self) -> bool {
        self.active_surface().is_some()
    }

    fn active_surface(&self) -> Option<&S> {
        if !self.settings.enable_canvas || self.settings.tile_size == 0 {
            return None;
        }
        self.surface.as_ref()
    }

    /// Rewrites every matching pixel and returns the buffer.
    pub fn rewrite(&self, mut pixels: PixelBuffer) -> PixelBuffer {
        self.rewrite_in_place(&mut pixels);
        pixels
    }

    /// Rewrites every matching pixel in place.
    ///
    /// Returns the number of pixels that matched at least one rule.
    pub fn rewrite_in_place(&self, pixels: &mut PixelBuffer) -> usize {
        if self.rules.is_empty() {
            return 0;
        }

        let mode = self.settings.rule_evaluation;
        let mut rewritten = 0;

        for pixel in pixels.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            if let Some(replacement) = match_pixel_with(Rgb::new(r, g, b), &self.rules, mode) {
                replacement.apply(pixel);
                rewritten += 1;
            }
        }

        rewritten
    }

    /// Rewrites a decoded tile and serializes it through the surface.
    pub fn transform(&self, job: TileJob) -> Result<String, TileError> {
        let surface = self.active_surface().ok_or(TileError::SurfaceUnavailable)?;
        let pixels = self.rewrite(job.into_pixels());
        Ok(surface.encode(&pixels)?)
    }

    /// Host callback for a tile whose image has become decodable.
    ///
    /// Runs the whole decode, rewrite, re-encode cycle before returning and
    /// publishes the result on the tile. Never fails: any problem leaves the
    /// tile on its original source.
    pub fn on_tile_decodable(&self, tile: &mut Tile) -> TileOutcome {
        if tile.state() != TileState::Decodable {
            trace!(source = tile.source(), state = ?tile.state(), "ignoring repeated notification");
            return TileOutcome::Suppressed;
        }

        let Some(surface) = self.active_surface() else {
            tile.advance(TileState::Done);
            return TileOutcome::Passthrough;
        };

        // nothing can change; skip the decode/encode round trip
        if self.rules.is_empty() {
            tile.advance(TileState::Done);
            return TileOutcome::Passthrough;
        }

        match self.recolor(surface, tile) {
            Ok(source) => {
                tile.publish(source);
                TileOutcome::Recolored
            }
            Err(error) => {
                warn!(
                    source = tile.source(),
                    %error,
                    "tile recolor failed; keeping original image"
                );
                tile.advance(TileState::Done);
                TileOutcome::Passthrough
            }
        }
    }

    fn recolor(&self, surface: &S, tile: &mut Tile) -> Result<String, TileError> {
        tile.advance(TileState::Decoding);
        let mut pixels = surface.read_pixels(tile, self.settings.tile_size)?;

        tile.advance(TileState::Rewriting);
        let rewritten = self.rewrite_in_place(&mut pixels);
        trace!(source = tile.source(), rewritten, "rewrote tile pixels");

        let source = surface.encode(&pixels)?;
        tile.advance(TileState::Reencoded);
        Ok(source)
    }

    /// Handles a batch of independent tiles in parallel.
    ///
    /// Outcomes are returned in the same order as `tiles`.
    pub fn on_tiles_decodable(&self, tiles: &mut [Tile]) -> Vec<TileOutcome> {
        tiles
            .par_iter_mut()
            .map(|tile| self.on_tile_decodable(tile))
            .collect()
    }
}

impl<S: DrawingSurface> Configurable for TileTransformer<S> {
    /// Replaces settings and recompiles the rule list.
    ///
    /// The drawing surface is kept; `enableCanvas` alone decides whether it
    /// is used.
    fn apply_settings(&mut self, settings: &TransposeSettings) {
        self.rules = settings.compile_rules();
        self.settings = settings.clone();
    }

    fn export_settings(&self) -> TransposeSettings {
        self.settings.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
