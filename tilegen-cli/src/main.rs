//! tilegen CLI - Command-line interface
//!
//! Builds the tile pyramid and uploads imagery and mesh assets for it.

mod error;
mod generate;
mod runner;
mod summary;

use clap::{Parser, ValueEnum};
use error::CliError;
use runner::CliRunner;
use std::path::PathBuf;
use tilegen::traversal::AssetCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetSelection {
    /// Imagery, then meshes
    All,
    /// Satellite imagery only
    Img,
    /// Terrain meshes only
    Mesh,
}

impl AssetSelection {
    pub fn categories(&self) -> &'static [AssetCategory] {
        match self {
            AssetSelection::All => &AssetCategory::ALL,
            AssetSelection::Img => &[AssetCategory::Imagery],
            AssetSelection::Mesh => &[AssetCategory::Mesh],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tilegen")]
#[command(version = tilegen::VERSION)]
#[command(about = "Generate tiles for tilemaps with optional existing database checking")]
#[command(after_help = "Examples:
  tilegen --asset all
  tilegen --asset img --existing-db previous_run/tiles.db
  tilegen --asset mesh --process-all-nodes --disable-lod")]
pub struct Args {
    /// Asset type to process
    #[arg(short, long, value_enum, default_value = "all")]
    pub asset: AssetSelection,

    /// Database of an earlier run; tiles it already finished are skipped
    #[arg(long, value_name = "PATH")]
    pub existing_db: Option<PathBuf>,

    /// Process every node of the quadtree, not just the leaves
    #[arg(long)]
    pub process_all_nodes: bool,

    /// Subdivide every tile down to the maximum LOD, ignoring points of interest
    #[arg(long)]
    pub disable_lod: bool,

    /// Write a JSON map of all asset ids {x_y_z: {img, mesh, mesh_vert}}
    #[arg(long, value_name = "PATH")]
    pub output_json: Option<PathBuf>,

    /// Configuration file (default: ~/.tilegen/config.ini)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        e.exit();
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref())?;
    runner.log_startup();
    generate::run(&runner, args)
}
