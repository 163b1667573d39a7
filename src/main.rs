//! Command-line host for recoloring tile images.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use tile_transpose::surface::decode_data_url;
use tile_transpose::{Tile, TileOutcome, TileTransformer, TransposeSettings};

#[derive(Parser)]
#[command(name = "tile-transpose", version, about = "Transpose colors in raster map tiles")]
struct Cli {
    /// Tile image to recolor
    input: PathBuf,

    /// JSON settings file (tileSize, enableCanvas, transposeColors)
    #[arg(short, long)]
    settings: PathBuf,

    /// Output PNG path
    #[arg(short, long, conflicts_with = "data_url")]
    output: Option<PathBuf>,

    /// Override the configured tile size
    #[arg(long)]
    tile_size: Option<u32>,

    /// Print the resulting image source instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let json = fs::read_to_string(&cli.settings)
        .with_context(|| format!("Failed to read settings {}", cli.settings.display()))?;
    let mut settings = TransposeSettings::from_json(&json).context("Failed to parse settings")?;
    if let Some(size) = cli.tile_size {
        settings.tile_size = size;
    }

    let data = fs::read(&cli.input)
        .with_context(|| format!("Failed to read tile {}", cli.input.display()))?;
    let mut tile = Tile::new(cli.input.display().to_string(), data);

    let transformer = TileTransformer::new(settings);
    info!("{} rule(s) active", transformer.rules().len());

    let outcome = transformer.on_tile_decodable(&mut tile);
    info!("{}: {:?}", cli.input.display(), outcome);

    if cli.data_url {
        println!("{}", tile.source());
        return Ok(());
    }

    let output = cli.output.unwrap_or_else(|| cli.input.with_extension("transposed.png"));
    let bytes = match outcome {
        TileOutcome::Recolored => decode_data_url(tile.source())?,
        TileOutcome::Passthrough | TileOutcome::Suppressed => tile.data().to_vec(),
    };
    fs::write(&output, bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());

    Ok(())
}
