//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilegen::config::ConfigFileError;
use tilegen::export::ExportError;
use tilegen::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to load the configuration file
    Config(ConfigFileError),
    /// Failed to create the run directory
    RunDirectory { path: String, error: std::io::Error },
    /// Failed to initialize logging
    LoggingInit(String),
    /// A required credential is not configured
    MissingCredential { key: &'static str, env: &'static str },
    /// A client or strategy could not be constructed
    Setup(String),
    /// The job store could not be opened
    Store(StoreError),
    /// Failed to write the asset map
    Export(ExportError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::MissingCredential { .. } = self {
            eprintln!();
            eprintln!("Credentials can be set in ~/.tilegen/config.ini:");
            eprintln!("  [roblox]  api_key, user_id");
            eprintln!("  [mapbox]  access_token");
            eprintln!("or through ROBLOX_API_KEY, ROBLOX_USER_ID and MAPBOX_API_KEY.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::RunDirectory { path, error } => {
                write!(f, "Failed to create run directory '{}': {}", path, error)
            }
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::MissingCredential { key, env } => {
                write!(f, "Missing credential {} (or environment variable {})", key, env)
            }
            CliError::Setup(msg) => write!(f, "Setup failed: {}", msg),
            CliError::Store(e) => write!(f, "Job store error: {}", e),
            CliError::Export(e) => write!(f, "Failed to export assets: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::RunDirectory { error, .. } => Some(error),
            CliError::Store(e) => Some(e),
            CliError::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}
