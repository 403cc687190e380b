use std::collections::HashMap;

use tread_blocks::Block;
use tread_geom::BlockPos;

use super::chunk_coord::{ChunkCoord, WorldDims};

#[derive(Default, Debug, Clone, Copy)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
}

/// Per-chunk overlay of block edits on top of generated terrain.
pub struct EditStore {
    dims: WorldDims,
    inner: HashMap<ChunkCoord, HashMap<BlockPos, Block>>,
}

impl EditStore {
    pub fn new(dims: WorldDims) -> Self {
        Self {
            dims,
            inner: HashMap::new(),
        }
    }

    pub fn stats(&self) -> EditStoreStats {
        EditStoreStats {
            chunk_entries: self.inner.len(),
            block_edits: self.inner.values().map(|m| m.len()).sum(),
        }
    }

    pub fn get(&self, pos: BlockPos) -> Option<Block> {
        let k = self.dims.chunk_of(pos);
        self.inner.get(&k).and_then(|m| m.get(&pos).copied())
    }

    /// Records an edit; returns the previous edit at `pos`, if any.
    pub fn set(&mut self, pos: BlockPos, b: Block) -> Option<Block> {
        let k = self.dims.chunk_of(pos);
        self.inner.entry(k).or_default().insert(pos, b)
    }

    /// Snapshot of all edits inside one chunk.
    pub fn snapshot_for_chunk(&self, coord: ChunkCoord) -> Vec<(BlockPos, Block)> {
        if let Some(m) = self.inner.get(&coord) {
            return m.iter().map(|(k, v)| (*k, *v)).collect();
        }
        Vec::new()
    }

    pub fn clear_chunk(&mut self, coord: ChunkCoord) -> usize {
        self.inner.remove(&coord).map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_are_keyed_by_chunk() {
        let dims = WorldDims::new(4, 4, 8);
        let mut store = EditStore::new(dims);
        assert_eq!(store.set(BlockPos::new(-1, 2, 3), Block::new(5)), None);
        assert_eq!(
            store.set(BlockPos::new(-1, 2, 3), Block::new(6)),
            Some(Block::new(5))
        );
        store.set(BlockPos::new(5, 0, 0), Block::new(1));
        assert_eq!(store.get(BlockPos::new(-1, 2, 3)), Some(Block::new(6)));
        assert_eq!(store.snapshot_for_chunk(ChunkCoord::new(-1, 0)).len(), 1);
        assert_eq!(store.snapshot_for_chunk(ChunkCoord::new(1, 0)).len(), 1);
        let stats = store.stats();
        assert_eq!(stats.chunk_entries, 2);
        assert_eq!(stats.block_edits, 2);
        assert_eq!(store.clear_chunk(ChunkCoord::new(1, 0)), 1);
        assert_eq!(store.get(BlockPos::new(5, 0, 0)), None);
    }
}
