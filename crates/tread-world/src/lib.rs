//! World access, chunk addressing, change notification and worldgen parameters.
#![forbid(unsafe_code)]

pub mod voxel;
pub mod worldgen;

pub use voxel::{
    BlockSource, ChunkCoord, EditStore, EditStoreStats, GridWorld, WorldDims, WorldGenMode,
    WorldListener, parse_layers,
};
pub use worldgen::{WorldConfig, load_config_from_path};
