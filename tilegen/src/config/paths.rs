//! Per-run output layout.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp format of run directory names.
pub const RUN_ID_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Files of one run, all under `<output>/<run id>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub dir: PathBuf,
    /// Job store
    pub database: PathBuf,
    pub log_file: PathBuf,
    /// Scratch imagery download
    pub image: PathBuf,
    /// Scratch terrain heightmap
    pub heightmap: PathBuf,
    /// Scratch generated mesh
    pub mesh: PathBuf,
}

impl RunPaths {
    /// Layout for a run started at `started`. Nothing is created.
    pub fn new(output_dir: &Path, started: DateTime<Local>) -> Self {
        let dir = output_dir.join(started.format(RUN_ID_FORMAT).to_string());
        Self {
            database: dir.join("tiles.db"),
            log_file: dir.join("logs.txt"),
            image: dir.join("img.jpg"),
            heightmap: dir.join("img.png"),
            mesh: dir.join("mesh.fbx"),
            dir,
        }
    }

    /// Creates the run directory.
    pub fn create(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Log file name relative to [`RunPaths::dir`].
    pub fn log_file_name(&self) -> &str {
        self.log_file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("logs.txt")
    }
}
