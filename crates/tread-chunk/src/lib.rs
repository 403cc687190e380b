//! Immutable block snapshots of single chunk columns.
#![forbid(unsafe_code)]

use tread_blocks::Block;
use tread_geom::BlockPos;
use tread_world::{BlockSource, ChunkCoord};

#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub blocks: Vec<Block>,
}

impl ChunkBuf {
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn base(&self) -> (i32, i32) {
        (
            self.coord.cx * self.sx as i32,
            self.coord.cz * self.sz as i32,
        )
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let (base_x, base_z) = self.base();
        if wy < 0 || wy >= self.sy as i32 {
            return false;
        }
        wx >= base_x && wx < base_x + self.sx as i32 && wz >= base_z && wz < base_z + self.sz as i32
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let (base_x, base_z) = self.base();
        let lx = (wx - base_x) as usize;
        let lz = (wz - base_z) as usize;
        Some(self.get_local(lx, wy as usize, lz))
    }

    pub fn from_blocks_local(
        coord: ChunkCoord,
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<Block>,
    ) -> Self {
        let mut b = blocks;
        let expect = sx * sy * sz;
        if b.len() != expect {
            b.resize(expect, Block::AIR);
        }
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            blocks: b,
        }
    }

    /// Copies the blocks of one chunk column out of `world`.
    pub fn snapshot(world: &dyn BlockSource, coord: ChunkCoord) -> Self {
        let dims = world.dims();
        let (sx, sy, sz) = (dims.chunk_size_x, dims.height, dims.chunk_size_z);
        let (base_x, base_z) = dims.origin(coord);
        let mut blocks = vec![Block::AIR; sx * sy * sz];
        for y in 0..sy {
            for z in 0..sz {
                for x in 0..sx {
                    let pos = BlockPos::new(base_x + x as i32, y as i32, base_z + z as i32);
                    blocks[(y * sz + z) * sx + x] = world.block_at(pos);
                }
            }
        }
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            blocks,
        }
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| *b != Block::AIR)
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }
}
