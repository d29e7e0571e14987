//! CLI runner for common setup.
//!
//! Loads configuration, lays out the run directory and initializes logging
//! into it.

use crate::error::CliError;
use chrono::Local;
use std::path::Path;
use tilegen::config::{ConfigFile, RunPaths};
use tilegen::logging::{init_logging, LoggingGuard};
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Where this run writes its store, log and scratch files
    paths: RunPaths,
}

impl CliRunner {
    /// Create a runner, loading `config_path` (or the default config file).
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let paths = RunPaths::new(&config.output.directory, Local::now());
        paths.create().map_err(|error| CliError::RunDirectory {
            path: paths.dir.display().to_string(),
            error,
        })?;

        let logging_guard = init_logging(&paths.dir, paths.log_file_name())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            paths,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("tilegen v{}", tilegen::VERSION);
        info!("Run directory: {}", self.paths.dir.display());
    }
}
