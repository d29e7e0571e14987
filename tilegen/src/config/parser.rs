//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{TileCoord, MAX_ZOOM};
use crate::quadtree::GeoPoint;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [roblox] section
    if let Some(section) = ini.section(Some("roblox")) {
        if let Some(v) = non_empty(section, "api_key") {
            config.roblox.api_key = Some(v.to_string());
        }
        if let Some(v) = non_empty(section, "user_id") {
            config.roblox.user_id = Some(v.to_string());
        }
        if let Some(v) = section.get("max_retries") {
            config.roblox.max_retries =
                parse_number(v, "roblox", "max_retries", "must be a positive integer")?;
        }
    }

    // [mapbox] section
    if let Some(section) = ini.section(Some("mapbox")) {
        if let Some(v) = non_empty(section, "access_token") {
            config.mapbox.access_token = Some(v.to_string());
        }
        if let Some(v) = section.get("max_retries") {
            config.mapbox.max_retries =
                parse_number(v, "mapbox", "max_retries", "must be a positive integer")?;
        }
    }

    // [quadtree] section
    if let Some(section) = ini.section(Some("quadtree")) {
        if let Some(v) = section.get("root") {
            config.quadtree.root =
                TileCoord::from_key(v.trim()).map_err(|_| ConfigFileError::InvalidValue {
                    section: "quadtree".to_string(),
                    key: "root".to_string(),
                    value: v.to_string(),
                    reason: "expected a tile key like '0_0_0'".to_string(),
                })?;
        }
        if let Some(v) = section.get("max_lod") {
            config.quadtree.max_lod = parse_zoom(v, "max_lod")?;
        }
        if let Some(v) = section.get("lod_threshold") {
            config.quadtree.lod_threshold = parse_zoom(v, "lod_threshold")?;
        }
        if let Some(v) = section.get("points") {
            config.quadtree.points = parse_points(v)?;
        }
    }

    // [imagery] section
    if let Some(section) = ini.section(Some("imagery")) {
        if let Some(v) = section.get("padding") {
            config.imagery.padding =
                parse_number(v, "imagery", "padding", "must be a non-negative integer (pixels)")?;
        }
    }

    // [mesh] section
    if let Some(section) = ini.section(Some("mesh")) {
        if let Some(v) = non_empty(section, "generator") {
            config.mesh.generator = Some(v.to_string());
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = non_empty(section, "directory") {
            config.output.directory = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

fn parse_zoom(value: &str, key: &str) -> Result<u8, ConfigFileError> {
    let reason = format!("must be a zoom level between 0 and {}", MAX_ZOOM);
    let zoom: u8 = parse_number(value, "quadtree", key, &reason)?;
    if zoom > MAX_ZOOM {
        return Err(ConfigFileError::InvalidValue {
            section: "quadtree".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason,
        });
    }
    Ok(zoom)
}

/// Parses `lat,lon; lat,lon; ...`. An empty value means no points.
pub(super) fn parse_points(value: &str) -> Result<Vec<GeoPoint>, ConfigFileError> {
    let invalid = |reason: String| ConfigFileError::InvalidValue {
        section: "quadtree".to_string(),
        key: "points".to_string(),
        value: value.to_string(),
        reason,
    };

    value
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (lat, lon) = pair
                .split_once(',')
                .ok_or_else(|| invalid(format!("'{}' is not a 'lat,lon' pair", pair)))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad latitude in '{}'", pair)))?;
            let lon: f64 = lon
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad longitude in '{}'", pair)))?;
            if !(lat.is_finite() && lon.is_finite()) {
                return Err(invalid(format!("'{}' is not a finite coordinate", pair)));
            }
            Ok(GeoPoint::new(lat, lon))
        })
        .collect()
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from_file(&config_path)
    }

    #[test]
    fn test_full_config() {
        let config = load(
            r#"
[roblox]
api_key = rbx-key
user_id = 1234
max_retries = 3

[mapbox]
access_token = pk.abc
max_retries = 7

[quadtree]
root = 1_2_2
max_lod = 9
lod_threshold = 6
points = 47.449,-122.3093 ; -33.8688,151.2093

[imagery]
padding = 8

[mesh]
generator = blender -b tile.blend --python gen.py

[output]
directory = /data/tiles
"#,
        )
        .unwrap();

        assert_eq!(config.roblox.api_key.as_deref(), Some("rbx-key"));
        assert_eq!(config.roblox.user_id.as_deref(), Some("1234"));
        assert_eq!(config.roblox.max_retries, 3);
        assert_eq!(config.mapbox.access_token.as_deref(), Some("pk.abc"));
        assert_eq!(config.mapbox.max_retries, 7);
        assert_eq!(config.quadtree.root, TileCoord::new(1, 2, 2));
        assert_eq!(config.quadtree.max_lod, 9);
        assert_eq!(config.quadtree.lod_threshold, 6);
        assert_eq!(
            config.quadtree.points,
            vec![
                GeoPoint::new(47.449, -122.3093),
                GeoPoint::new(-33.8688, 151.2093)
            ]
        );
        assert_eq!(config.imagery.padding, 8);
        assert_eq!(
            config.mesh.generator.as_deref(),
            Some("blender -b tile.blend --python gen.py")
        );
        assert_eq!(config.output.directory, PathBuf::from("/data/tiles"));
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[quadtree]
max_lod = 5
"#,
        )
        .unwrap();

        assert_eq!(config.quadtree.max_lod, 5);
        assert_eq!(config.quadtree.lod_threshold, DEFAULT_LOD_THRESHOLD);
        assert_eq!(config.quadtree.points.len(), DEFAULT_AIRPORTS.len());
        assert_eq!(config.roblox.max_retries, DEFAULT_ROBLOX_MAX_RETRIES);
        assert!(config.mapbox.access_token.is_none());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = load(
            r#"
[roblox]
api_key =
[mesh]
generator =
[quadtree]
points =
"#,
        )
        .unwrap();

        assert!(config.roblox.api_key.is_none());
        assert!(config.mesh.generator.is_none());
        assert!(config.quadtree.points.is_empty());
    }

    #[test]
    fn test_invalid_max_retries() {
        let err = load("[mapbox]\nmax_retries = lots\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref section, ref key, .. }
                if section == "mapbox" && key == "max_retries"
        ));
    }

    #[test]
    fn test_zoom_out_of_range() {
        let err = load("[quadtree]\nmax_lod = 23\n").unwrap_err();
        assert!(err.to_string().contains("quadtree.max_lod"));
    }

    #[test]
    fn test_invalid_root() {
        assert!(load("[quadtree]\nroot = 0,0,0\n").is_err());
    }

    #[test]
    fn test_parse_points_errors() {
        assert!(parse_points("47.4").is_err());
        assert!(parse_points("north,-122").is_err());
        assert!(parse_points("NaN,0.0").is_err());
        assert!(parse_points("0.0,inf").is_err());
        assert_eq!(parse_points(" ; 1.0,2.0 ; ").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_points_keeps_polar_points() {
        let points = parse_points("89.0,0.0; -90.0,180.0").unwrap();
        assert_eq!(
            points,
            vec![GeoPoint::new(89.0, 0.0), GeoPoint::new(-90.0, 180.0)]
        );
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
