use super::*;

const SEATTLE: (f64, f64) = (47.449, -122.3093);

fn build(config: QuadTreeConfig, points: &[(f64, f64)]) -> QuadTree {
    let mut tree = QuadTree::new(TileCoord::new(0, 0, 0), &config);
    for (lat, lon) in points {
        tree.add_point(*lat, *lon);
    }
    tree.build_tree();
    tree
}

fn assert_canonical_children(tree: &QuadTree) {
    for tile in tree.root().iter().filter(|t| !t.is_leaf()) {
        let expected = tile.coord().children();
        let actual: Vec<TileCoord> = tile.children().iter().map(Tile::coord).collect();
        assert_eq!(actual, expected, "children of {}", tile.coord());
    }
}

#[test]
fn test_threshold_zero_without_points_gives_full_grid() {
    let tree = build(QuadTreeConfig::new(1, 0), &[]);

    let root = tree.root();
    assert!(!root.is_leaf());
    assert_eq!(root.children().len(), 4);
    assert!(root.children().iter().all(|c| c.is_leaf() && c.coord().zoom == 1));
    assert_eq!(root.iter().count(), 5);
}

#[test]
fn test_no_points_below_threshold_keeps_root_leaf() {
    let tree = build(QuadTreeConfig::new(4, 4), &[]);
    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().iter().count(), 1);
}

#[test]
fn test_point_near_every_zoom_one_tile_gives_full_zoom_two_grid() {
    let tree = build(QuadTreeConfig::new(2, 2), &[SEATTLE]);
    let leaves: Vec<_> = tree.root().leaves().collect();
    assert_eq!(leaves.len(), 16);
    assert!(leaves.iter().all(|t| t.coord().zoom == 2));
}

#[test]
fn test_threshold_forces_full_coverage() {
    let tree = build(QuadTreeConfig::new(2, 1), &[SEATTLE]);
    assert_eq!(tree.root().leaves().count(), 16);
    assert_canonical_children(&tree);
}

#[test]
fn test_lod_falls_off_away_from_point() {
    let tree = build(QuadTreeConfig::new(3, 3), &[SEATTLE]);

    assert_eq!(tree.root().iter().count(), 45);
    let leaves: Vec<TileCoord> = tree.root().leaves().map(Tile::coord).collect();
    assert_eq!(leaves.len(), 34);
    assert_eq!(leaves.iter().filter(|c| c.zoom == 2).count(), 10);
    assert_eq!(leaves.iter().filter(|c| c.zoom == 3).count(), 24);

    // Seattle is in tile (1, 2) at zoom 3
    assert!(leaves.contains(&TileCoord::new(1, 2, 3)));
    // Far east side of the map stays coarse
    assert!(leaves.contains(&TileCoord::new(3, 3, 2)));
    assert_canonical_children(&tree);
}

#[test]
fn test_disable_lod_subdivides_everything() {
    let config = QuadTreeConfig::new(3, 20).with_disable_lod(true);
    let tree = build(config, &[]);
    let leaves: Vec<_> = tree.root().leaves().collect();
    assert_eq!(leaves.len(), 64);
    assert!(leaves.iter().all(|t| t.coord().zoom == 3));
}

#[test]
fn test_no_tile_exceeds_max_lod() {
    let config = QuadTreeConfig::new(4, 10);
    let tree = build(config, &[SEATTLE, (-33.8688, 151.2093)]);
    assert!(tree.root().iter().all(|t| t.coord().zoom <= 4));
    assert_eq!(tree.root().leaves().count(), 97);
    assert_canonical_children(&tree);
}

#[test]
fn test_root_at_max_lod_is_untouched() {
    let config = QuadTreeConfig::new(5, 0);
    let mut tree = QuadTree::new(TileCoord::new(9, 12, 5), &config);
    tree.build_tree();
    assert!(tree.root().is_leaf());
}

#[test]
fn test_non_zero_root_subdivides_in_place() {
    let config = QuadTreeConfig::new(6, 5);
    let mut tree = QuadTree::new(TileCoord::new(9, 12, 5), &config);
    tree.build_tree();

    let children: Vec<TileCoord> = tree.root().children().iter().map(Tile::coord).collect();
    assert_eq!(children, TileCoord::new(9, 12, 5).children());
}

#[test]
fn test_build_twice_is_stable() {
    let mut tree = build(QuadTreeConfig::new(3, 3), &[SEATTLE]);
    let first = tree.root().clone();
    tree.build_tree();
    assert_eq!(tree.root(), &first);
}

#[test]
fn test_antimeridian_point_does_not_refine_far_column() {
    let tree = build(QuadTreeConfig::new(3, 3), &[(0.0, 180.0)]);
    let find = |coord: TileCoord| tree.root().iter().find(|t| t.coord() == coord).cloned();

    // Projects to column 4 at zoom 2, two columns east of (2, 1)
    let far = find(TileCoord::new(2, 1, 2)).unwrap();
    assert!(far.is_leaf());
    let near = find(TileCoord::new(3, 1, 2)).unwrap();
    assert!(!near.is_leaf());
}

#[test]
fn test_polar_point_is_kept_and_refines_top_row() {
    let tree = build(QuadTreeConfig::new(3, 3), &[(89.0, 0.0)]);
    assert_eq!(tree.points(), &[GeoPoint::new(89.0, 0.0)]);

    let leaves: Vec<TileCoord> = tree.root().leaves().map(Tile::coord).collect();
    // Projects to row -1 at zoom 2, so only the top row is refined
    assert!(leaves.contains(&TileCoord::new(2, 0, 3)));
    assert!(leaves.contains(&TileCoord::new(2, 1, 2)));
    assert!(!leaves.contains(&TileCoord::new(2, 0, 2)));
}

#[test]
fn test_point_order_does_not_change_outcome() {
    let other = (25.7932, -80.2906);
    let a = build(QuadTreeConfig::new(4, 4), &[SEATTLE, other]);
    let b = build(QuadTreeConfig::new(4, 4), &[other, SEATTLE]);
    assert_eq!(a.root(), b.root());
}
