//! tile-transpose: on-the-fly color transposition for raster map tiles
//!
//! This crate rewrites the pixels of map tiles according to an ordered list
//! of color rules, e.g. to give a basemap's ocean a custom color. Each rule
//! matches pixels within a per-channel tolerance window around a color and
//! replaces their RGB (and optionally alpha).
//!
//! The crate owns no tile grid, fetching or scheduling. A host tiling
//! framework hands over each tile once its image is decodable and gets back
//! a self-contained image source to display.
//!
//! # Example
//!
//! ```
//! use tile_transpose::{RuleSettings, Tile, TileOutcome, TileTransformer, TransposeSettings};
//! # use image::{Rgba, RgbaImage};
//! # let png = tile_transpose::surface::encode_png(
//! #     &RgbaImage::from_pixel(256, 256, Rgba([2, 3, 1, 255])),
//! # ).unwrap();
//!
//! let settings = TransposeSettings::new()
//!     .with_rule(RuleSettings::new("#000000", "#0000ff", 5).with_alpha(100));
//! let transformer = TileTransformer::new(settings);
//!
//! // Called by the host once the tile's bytes are loaded
//! let mut tile = Tile::new("https://tiles.example/3/4/2.png", png);
//! assert_eq!(transformer.on_tile_decodable(&mut tile), TileOutcome::Recolored);
//! assert!(tile.source().starts_with("data:image/png;base64,"));
//! ```
//!
//! # Serializable Settings
//!
//! Hosts usually carry the configuration as JSON:
//!
//! ```
//! use tile_transpose::{Configurable, TileTransformer, TransposeSettings};
//!
//! let settings = TransposeSettings::from_json(r##"{
//!     "tileSize": 256,
//!     "transposeColors": [{ "from": "#aad3df", "to": "#1e3a5f", "rgbWindow": 3 }]
//! }"##).unwrap();
//!
//! let transformer = TileTransformer::new(settings);
//! let json = transformer.export_settings().to_json().unwrap();
//! ```

pub mod color;
mod rule;
mod settings;
pub mod surface;
mod tile;
mod transformer;

pub use color::{ColorError, Rgb, hex_to_rgb, parse_hex, to_hex};
pub use rule::{ColorRule, Replacement, RuleEvaluation, match_pixel, match_pixel_with};
pub use settings::{DEFAULT_TILE_SIZE, RuleSettings, TransposeSettings};
pub use surface::{DrawingSurface, RasterSurface, SurfaceError};
pub use tile::{PixelBuffer, Tile, TileError, TileJob, TileState};
pub use transformer::{Configurable, TileOutcome, TileTransformer};
