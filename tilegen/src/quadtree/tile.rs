//! Tile pyramid node.

use crate::coord::TileCoord;

/// One node of the pyramid. Owns either no children or exactly four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    coord: TileCoord,
    children: Option<Box<[Tile; 4]>>,
}

impl Tile {
    pub fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            children: None,
        }
    }

    #[inline]
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in top-left, top-right, bottom-left, bottom-right order.
    pub fn children(&self) -> &[Tile] {
        match &self.children {
            Some(children) => children.as_slice(),
            None => &[],
        }
    }

    pub(super) fn children_mut(&mut self) -> &mut [Tile] {
        match &mut self.children {
            Some(children) => children.as_mut_slice(),
            None => Default::default(),
        }
    }

    /// Creates the four canonical children. No-op if already subdivided.
    pub(super) fn subdivide(&mut self) {
        if self.children.is_none() {
            self.children = Some(Box::new(self.coord.children().map(Tile::new)));
        }
    }

    /// Depth-first, pre-order iterator over this tile and all descendants.
    pub fn iter(&self) -> TileIter<'_> {
        TileIter { stack: vec![self] }
    }

    /// Leaf tiles of this subtree, depth-first.
    pub fn leaves(&self) -> impl Iterator<Item = &Tile> {
        self.iter().filter(|tile| tile.is_leaf())
    }
}

/// Pre-order iterator over a tile subtree.
pub struct TileIter<'a> {
    stack: Vec<&'a Tile>,
}

impl<'a> Iterator for TileIter<'a> {
    type Item = &'a Tile;

    fn next(&mut self) -> Option<Self::Item> {
        let tile = self.stack.pop()?;
        self.stack.extend(tile.children().iter().rev());
        Some(tile)
    }
}
