//! Table identifiers.

use std::fmt;

/// The tables of the job store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    ImgAssetIds,
    MeshAssetIds,
    ImgOperations,
    MeshOperations,
    MissedImg,
    MissedMesh,
    /// Placement offset produced alongside each generated mesh.
    MeshVertOffsets,
}

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::ImgAssetIds,
        TableKind::MeshAssetIds,
        TableKind::ImgOperations,
        TableKind::MeshOperations,
        TableKind::MissedImg,
        TableKind::MissedMesh,
        TableKind::MeshVertOffsets,
    ];

    /// On-disk table name.
    pub const fn table_name(self) -> &'static str {
        match self {
            TableKind::ImgAssetIds => "img_asset_ids",
            TableKind::MeshAssetIds => "mesh_asset_ids",
            TableKind::ImgOperations => "img_operations",
            TableKind::MeshOperations => "mesh_operations",
            TableKind::MissedImg => "missed_img",
            TableKind::MissedMesh => "missed_mesh",
            TableKind::MeshVertOffsets => "mesh_vert_offsets",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
