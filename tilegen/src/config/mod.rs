//! Configuration for tilegen runs.
//!
//! Settings come from an INI file (default `~/.tilegen/config.ini`) with
//! credentials optionally overridden by environment variables.
//!
//! # Example
//!
//! ```
//! use tilegen::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let tree_config = config.quadtree.tree_config(false);
//! assert_eq!(tree_config.max_lod, 2);
//! ```

mod defaults;
mod file;
mod parser;
mod paths;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use paths::{RunPaths, RUN_ID_FORMAT};
pub use settings::{
    ConfigFile, ImagerySettings, MapboxSettings, MeshSettings, OutputSettings, QuadtreeSettings,
    RobloxSettings,
};
