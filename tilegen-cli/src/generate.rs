//! The tile generation run.
//!
//! Builds the quadtree, wires the upload strategies to the job store, then
//! processes each selected asset category in turn.

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::summary::summary_lines;
use crate::{AssetSelection, Args};
use std::sync::Arc;
use tilegen::assets::{AssetHandler, OperationPoller, TileUploader};
use tilegen::config::{
    ConfigFile, RunPaths, ENV_MAPBOX_API_KEY, ENV_ROBLOX_API_KEY, ENV_ROBLOX_USER_ID,
};
use tilegen::export::export_assets_json;
use tilegen::imagery::ImageryUploader;
use tilegen::mesh::{CommandMeshGenerator, MeshUploader};
use tilegen::opencloud::{OpenCloudClient, ReqwestTransport};
use tilegen::provider::{MapboxClient, ReqwestClient};
use tilegen::quadtree::QuadTree;
use tilegen::store::SqliteJobStore;
use tilegen::traversal::{AssetCategory, TraversalDriver};
use tracing::{error, info, warn};

type AssetService = OpenCloudClient<ReqwestTransport>;

/// Credentials every run needs.
struct Credentials {
    roblox_api_key: String,
    roblox_user_id: String,
    mapbox_token: String,
}

impl Credentials {
    fn from_config(config: &ConfigFile) -> Result<Self, CliError> {
        Ok(Self {
            roblox_api_key: require(&config.roblox.api_key, "roblox.api_key", ENV_ROBLOX_API_KEY)?,
            roblox_user_id: require(&config.roblox.user_id, "roblox.user_id", ENV_ROBLOX_USER_ID)?,
            mapbox_token: require(
                &config.mapbox.access_token,
                "mapbox.access_token",
                ENV_MAPBOX_API_KEY,
            )?,
        })
    }
}

fn require(
    value: &Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, CliError> {
    value
        .clone()
        .ok_or(CliError::MissingCredential { key, env })
}

/// Builds the subdivided tree from the configured root and points.
pub fn build_tree(config: &ConfigFile, disable_lod: bool) -> QuadTree {
    let settings = &config.quadtree;
    let mut tree = QuadTree::new(settings.root, &settings.tree_config(disable_lod));
    for point in &settings.points {
        tree.add_point(point.latitude, point.longitude);
    }
    tree.build_tree();
    info!(
        root = %settings.root,
        points = tree.points().len(),
        tiles = tree.root().iter().count(),
        "Built quadtree"
    );
    tree
}

/// Opens the earlier run's store, if one was given and it exists.
fn open_prior(args: &Args) -> Option<SqliteJobStore> {
    let path = args.existing_db.as_ref()?;
    match SqliteJobStore::open_existing(path) {
        Some(store) => {
            info!("Using existing database {}", path.display());
            Some(store)
        }
        None => {
            warn!(
                "Existing database {} not found, processing every tile",
                path.display()
            );
            None
        }
    }
}

fn mapbox(config: &ConfigFile, credentials: &Credentials) -> Result<MapboxClient<ReqwestClient>, CliError> {
    let http = ReqwestClient::new().map_err(|e| CliError::Setup(e.to_string()))?;
    Ok(MapboxClient::new(
        http,
        credentials.mapbox_token.clone(),
        config.mapbox.max_retries,
    ))
}

/// Builds the upload strategy for `category`.
fn uploader(
    category: AssetCategory,
    config: &ConfigFile,
    paths: &RunPaths,
    credentials: &Credentials,
    service: &Arc<AssetService>,
    store: &SqliteJobStore,
) -> Result<Box<dyn TileUploader>, CliError> {
    let mapbox = mapbox(config, credentials)?;
    match category {
        AssetCategory::Imagery => Ok(Box::new(ImageryUploader::new(
            mapbox,
            Arc::clone(service),
            &paths.image,
            config.imagery.padding,
        ))),
        AssetCategory::Mesh => {
            let command = config.mesh.generator.as_deref().ok_or_else(|| {
                CliError::Setup("no [mesh] generator configured".to_string())
            })?;
            let generator =
                CommandMeshGenerator::parse(command).map_err(|e| CliError::Setup(e.to_string()))?;
            info!("Using mesh generator {}", generator.program());
            Ok(Box::new(MeshUploader::new(
                mapbox,
                Arc::clone(service),
                store.clone(),
                generator,
                &paths.heightmap,
                &paths.mesh,
            )))
        }
    }
}

/// Runs the selected categories and prints the summary.
pub fn run(runner: &CliRunner, args: &Args) -> Result<(), CliError> {
    let config = runner.config();
    let paths = runner.paths();
    let credentials = Credentials::from_config(config)?;

    let tree = build_tree(config, args.disable_lod);

    let store = SqliteJobStore::new(&paths.database);
    store.initialize()?;
    info!("Job store at {}", store.path().display());

    let transport = ReqwestTransport::new().map_err(|e| CliError::Setup(e.to_string()))?;
    let service = Arc::new(OpenCloudClient::new(
        transport,
        credentials.roblox_api_key.clone(),
        credentials.roblox_user_id.clone(),
        config.roblox.max_retries,
    ));
    let poller: Arc<dyn OperationPoller> = service.clone();

    let driver = TraversalDriver::new(open_prior(args), args.process_all_nodes);

    let mut reports = Vec::new();
    for &category in args.asset.categories() {
        let uploader = match uploader(category, config, paths, &credentials, &service, &store) {
            Ok(uploader) => uploader,
            Err(e) => {
                error!(label = category.label(), "Skipping {} tiles: {}", category, e);
                continue;
            }
        };
        let handler = AssetHandler::new(
            store.clone(),
            category.tables(),
            uploader,
            Arc::clone(&poller),
        );

        match driver.process_category(tree.root(), category, &handler) {
            Ok(report) => reports.push(report),
            Err(e) => error!(label = category.label(), "Processing {} tiles failed: {}", category, e),
        }
    }

    info!("=== Run summary ===");
    for line in summary_lines(&reports, args.asset == AssetSelection::All) {
        info!("{}", line);
    }

    if let Some(output) = &args.output_json {
        match export_assets_json(&paths.database, output)? {
            Some(tiles) => info!("Wrote asset ids for {} tile(s) to {}", tiles, output.display()),
            None => warn!("Nothing exported to {}", output.display()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen::coord::TileCoord;
    use tilegen::quadtree::GeoPoint;

    #[test]
    fn test_missing_credentials_rejected() {
        let config = ConfigFile::default();
        match Credentials::from_config(&config) {
            Err(CliError::MissingCredential { key, .. }) => assert_eq!(key, "roblox.api_key"),
            other => panic!("expected missing credential, got {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_credentials_from_config() {
        let mut config = ConfigFile::default();
        config.roblox.api_key = Some("key".to_string());
        config.roblox.user_id = Some("42".to_string());
        config.mapbox.access_token = Some("pk.token".to_string());

        let credentials = Credentials::from_config(&config).unwrap();
        assert_eq!(credentials.roblox_user_id, "42");
        assert_eq!(credentials.mapbox_token, "pk.token");
    }

    #[test]
    fn test_build_tree_from_defaults() {
        let config = ConfigFile::default();
        let tree = build_tree(&config, false);

        assert_eq!(tree.root().coord(), TileCoord::new(0, 0, 0));
        assert_eq!(tree.points().len(), config.quadtree.points.len());
        assert!(!tree.root().is_leaf());
    }

    #[test]
    fn test_build_tree_disable_lod_is_full() {
        let mut config = ConfigFile::default();
        config.quadtree.points.clear();

        let tree = build_tree(&config, true);
        let leaves = tree.root().leaves().count();
        assert_eq!(leaves, 4usize.pow(config.quadtree.max_lod as u32));
    }

    #[test]
    fn test_build_tree_keeps_points_outside_mercator_range() {
        let mut config = ConfigFile::default();
        config.quadtree.points = vec![GeoPoint::new(89.0, 0.0)];

        let tree = build_tree(&config, false);
        assert_eq!(tree.points(), &[GeoPoint::new(89.0, 0.0)]);
        assert!(!tree.root().is_leaf());
    }
}
