mod ascii;
mod chunk_coord;
mod edits;
mod source;
mod world;

pub use ascii::parse_layers;
pub use chunk_coord::{ChunkCoord, WorldDims};
pub use edits::{EditStore, EditStoreStats};
pub use source::{BlockSource, WorldListener};
pub use world::{GridWorld, WorldGenMode};
