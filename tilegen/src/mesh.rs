//! Terrain mesh upload strategy.
//!
//! A terrain-DEM tile is downloaded as a heightmap and handed to an external
//! mesh generator, which writes an FBX file and reports the placement offset
//! of the mesh origin. The offset goes to the `mesh_vert_offsets` table and
//! the FBX is uploaded as a mesh asset.

use crate::assets::{asset_display_name, CollaboratorError, TileUploader};
use crate::coord::TileCoord;
use crate::opencloud::{AssetCreator, AssetType, ContentType};
use crate::provider::{HttpClient, MapboxClient, TERRAIN_DEM_TILESET};
use crate::store::{JobStore, TableKind};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Mesh generation errors.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh generator command is empty")]
    EmptyCommand,

    #[error("unterminated {quote} quote in mesh generator command")]
    UnterminatedQuote { quote: char },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} printed no placement offset")]
    MissingOffset { program: String },
}

/// Turns a heightmap into a mesh file.
pub trait MeshGenerator {
    /// Writes the mesh for `tile` to `output` and returns its placement
    /// offset as `x_y_z`.
    fn generate(&self, heightmap: &Path, output: &Path, tile: TileCoord)
        -> Result<String, MeshError>;
}

/// Runs an external program as the mesh generator.
///
/// The program is called with the configured arguments followed by
/// `<heightmap> <output> <x> <y> <z>`. The last non-empty line it prints on
/// stdout is the placement offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeshGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandMeshGenerator {
    /// Splits a command line into program and arguments.
    ///
    /// Words are separated by whitespace. Single quotes keep their content
    /// literally; double quotes do too, except that `\"` and `\\` inside
    /// them stand for `"` and `\`.
    pub fn parse(command: &str) -> Result<Self, MeshError> {
        let mut words = split_command(command)?.into_iter();
        let program = words.next().ok_or(MeshError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

fn split_command(command: &str) -> Result<Vec<String>, MeshError> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => words.extend(word.take()),
            '\'' | '"' => {
                let current = word.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some('\\') if c == '"' => match chars.next() {
                            Some(e @ ('"' | '\\')) => current.push(e),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(MeshError::UnterminatedQuote { quote: c }),
                        },
                        Some(other) => current.push(other),
                        None => return Err(MeshError::UnterminatedQuote { quote: c }),
                    }
                }
            }
            c => word.get_or_insert_with(String::new).push(c),
        }
    }
    words.extend(word);
    Ok(words)
}

impl MeshGenerator for CommandMeshGenerator {
    fn generate(
        &self,
        heightmap: &Path,
        output: &Path,
        tile: TileCoord,
    ) -> Result<String, MeshError> {
        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(heightmap)
            .arg(output)
            .arg(tile.x.to_string())
            .arg(tile.y.to_string())
            .arg(tile.zoom.to_string())
            .output()
            .map_err(|source| MeshError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(MeshError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        String::from_utf8_lossy(&result.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| MeshError::MissingOffset {
                program: self.program.clone(),
            })
    }
}

/// Uploads a generated terrain mesh for one tile.
pub struct MeshUploader<C: HttpClient, A: AssetCreator, S: JobStore, G: MeshGenerator> {
    mapbox: MapboxClient<C>,
    assets: Arc<A>,
    store: S,
    generator: G,
    heightmap: PathBuf,
    mesh: PathBuf,
}

impl<C, A, S, G> MeshUploader<C, A, S, G>
where
    C: HttpClient,
    A: AssetCreator,
    S: JobStore,
    G: MeshGenerator,
{
    /// `heightmap` and `mesh` are scratch paths overwritten for every tile.
    pub fn new(
        mapbox: MapboxClient<C>,
        assets: Arc<A>,
        store: S,
        generator: G,
        heightmap: impl Into<PathBuf>,
        mesh: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mapbox,
            assets,
            store,
            generator,
            heightmap: heightmap.into(),
            mesh: mesh.into(),
        }
    }
}

impl<C, A, S, G> TileUploader for MeshUploader<C, A, S, G>
where
    C: HttpClient,
    A: AssetCreator,
    S: JobStore,
    G: MeshGenerator,
{
    fn upload(&self, tile: TileCoord) -> Result<String, CollaboratorError> {
        self.mapbox
            .fetch_tile(TERRAIN_DEM_TILESET, tile, ".pngraw", &self.heightmap)?;

        let offset = self.generator.generate(&self.heightmap, &self.mesh, tile)?;
        self.store
            .upsert(TableKind::MeshVertOffsets, tile, &offset)?;
        debug!(offset = %offset, "Generated mesh for tile {}", tile);

        let operation_id = self.assets.create_asset(
            &self.mesh,
            AssetType::Mesh,
            ContentType::Fbx,
            &asset_display_name(tile),
        )?;
        Ok(operation_id)
    }
}
