//! tilegen - Tile pyramid generation and asset upload
//!
//! This library builds a quad-subdivided pyramid of Web-Mercator tiles that is
//! dense around points of interest, then produces one imagery asset and one
//! terrain mesh asset per tile on a remote asset service.
//!
//! Uploads are asynchronous on the remote side: each tile is *submitted*
//! (yielding an operation handle) and later *resolved* (yielding the asset
//! reference). Every outcome is recorded in a SQLite job store so an
//! interrupted run can be resumed and failed tiles retried.
//!
//! ```ignore
//! use tilegen::assets::{AssetHandler, AssetTables};
//! use tilegen::traversal::{AssetCategory, TraversalDriver};
//!
//! let handler = AssetHandler::new(store, AssetTables::IMAGERY, uploader, poller);
//! let driver = TraversalDriver::new(prior_store, false);
//! let report = driver.process_category(tree.root(), AssetCategory::Imagery, &handler)?;
//! ```

pub mod assets;
pub mod config;
pub mod coord;
pub mod export;
pub mod imagery;
pub mod logging;
pub mod mesh;
pub mod opencloud;
pub mod provider;
pub mod quadtree;
pub mod store;
pub mod traversal;

/// Version of the tilegen library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
