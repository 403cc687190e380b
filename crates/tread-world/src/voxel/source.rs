use tread_blocks::{Block, BlockRegistry};
use tread_geom::BlockPos;

use super::chunk_coord::{ChunkCoord, WorldDims};

/// Read access to world blocks.
pub trait BlockSource: Send + Sync {
    fn dims(&self) -> WorldDims;

    fn registry(&self) -> &BlockRegistry;

    /// Block at `pos`; positions outside the world height read as air.
    fn block_at(&self, pos: BlockPos) -> Block;

    #[inline]
    fn is_penetrable(&self, block: Block) -> bool {
        self.registry().is_penetrable(block)
    }

    #[inline]
    fn is_solid(&self, block: Block) -> bool {
        self.registry().is_solid(block)
    }

    fn is_loaded(&self, _coord: ChunkCoord) -> bool {
        true
    }
}

/// Receives world change notifications. Called on the thread that made the change.
pub trait WorldListener: Send + Sync {
    fn on_block_changed(&self, pos: BlockPos, new: Block, old: Block);

    fn on_chunk_ready(&self, coord: ChunkCoord);

    fn on_chunk_unloaded(&self, _coord: ChunkCoord) {}
}
