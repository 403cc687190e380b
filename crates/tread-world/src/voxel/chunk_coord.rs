use serde::{Deserialize, Serialize};
use tread_geom::BlockPos;

/// Coordinate of a chunk column. Columns span the full world height.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Chunk footprint and world height, shared by every chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldDims {
    pub chunk_size_x: usize,
    pub chunk_size_z: usize,
    pub height: usize,
}

impl WorldDims {
    pub const fn new(chunk_size_x: usize, chunk_size_z: usize, height: usize) -> Self {
        Self {
            chunk_size_x,
            chunk_size_z,
            height,
        }
    }

    #[inline]
    pub fn chunk_of(&self, pos: BlockPos) -> ChunkCoord {
        ChunkCoord::new(
            pos.x.div_euclid(self.chunk_size_x as i32),
            pos.z.div_euclid(self.chunk_size_z as i32),
        )
    }

    /// Position of `pos` inside its chunk as `(lx, lz)`.
    #[inline]
    pub fn local_xz(&self, pos: BlockPos) -> (usize, usize) {
        (
            pos.x.rem_euclid(self.chunk_size_x as i32) as usize,
            pos.z.rem_euclid(self.chunk_size_z as i32) as usize,
        )
    }

    /// World `(x, z)` of the chunk's local origin.
    #[inline]
    pub fn origin(&self, coord: ChunkCoord) -> (i32, i32) {
        (
            coord.cx * self.chunk_size_x as i32,
            coord.cz * self.chunk_size_z as i32,
        )
    }

    #[inline]
    pub fn contains_y(&self, y: i32) -> bool {
        y >= 0 && y < self.height as i32
    }
}

impl Default for WorldDims {
    fn default() -> Self {
        Self::new(16, 16, 64)
    }
}
