//! Read-only copies of walkable surfaces for threads that do not own the graph.

use std::sync::Arc;

use hashbrown::HashMap;
use tread_geom::{BlockPos, Vec3};
use tread_world::{ChunkCoord, WorldDims};

use crate::region::RegionMap;

/// Looks for a hit at `pos`, then up to `below` cells under it, then up to
/// `above` cells over it.
pub fn probe_column<T>(
    pos: BlockPos,
    below: i32,
    above: i32,
    mut lookup: impl FnMut(BlockPos) -> Option<T>,
) -> Option<T> {
    if let Some(hit) = lookup(pos) {
        return Some(hit);
    }
    // Saturate so far-off heights probe the world's edge instead of overflowing.
    (1..=below.max(0))
        .map(|dy| pos.with_y(pos.y.saturating_sub(dy)))
        .chain((1..=above.max(0)).map(|dy| pos.with_y(pos.y.saturating_add(dy))))
        .find_map(lookup)
}

/// Walkable heights of one region per local column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSurface {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sz: usize,
    pub origin: (i32, i32),
    pub columns: Vec<Vec<i32>>,
}

impl RegionSurface {
    pub fn of(region: &RegionMap) -> Self {
        let (sx, sz) = region.size();
        let mut columns = Vec::with_capacity(sx * sz);
        for lz in 0..sz {
            for lx in 0..sx {
                columns.push(
                    region
                        .column(lx, lz)
                        .iter()
                        .filter_map(|&i| region.block(i).map(|b| b.pos.y))
                        .collect(),
                );
            }
        }
        Self {
            coord: region.coord(),
            sx,
            sz,
            origin: region.origin(),
            columns,
        }
    }

    pub fn is_walkable(&self, pos: BlockPos) -> bool {
        let lx = pos.x - self.origin.0;
        let lz = pos.z - self.origin.1;
        if lx < 0 || lz < 0 || lx >= self.sx as i32 || lz >= self.sz as i32 {
            return false;
        }
        self.columns[lz as usize * self.sx + lx as usize].contains(&pos.y)
    }

    pub fn block_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

/// Immutable view of every built region. Replaced, never mutated, so a reader
/// holding one never sees a half-built region.
#[derive(Clone, Debug)]
pub struct NavSnapshot {
    dims: WorldDims,
    regions: HashMap<ChunkCoord, Arc<RegionSurface>>,
    version: u64,
}

impl NavSnapshot {
    pub fn new(dims: WorldDims) -> Self {
        Self {
            dims,
            regions: HashMap::new(),
            version: 0,
        }
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, coord: ChunkCoord) -> Option<&RegionSurface> {
        self.regions.get(&coord).map(|r| r.as_ref())
    }

    /// Copy with each listed region replaced (`Some`) or removed (`None`).
    pub fn updated(&self, changes: impl IntoIterator<Item = (ChunkCoord, Option<RegionSurface>)>) -> Self {
        let mut next = self.clone();
        for (coord, surface) in changes {
            match surface {
                Some(s) => {
                    next.regions.insert(coord, Arc::new(s));
                }
                None => {
                    next.regions.remove(&coord);
                }
            }
        }
        next.version += 1;
        next
    }

    pub fn with_region(&self, surface: RegionSurface) -> Self {
        self.updated([(surface.coord, Some(surface))])
    }

    pub fn without_region(&self, coord: ChunkCoord) -> Self {
        self.updated([(coord, None)])
    }

    pub fn is_walkable(&self, pos: BlockPos) -> bool {
        self.region(self.dims.chunk_of(pos))
            .is_some_and(|r| r.is_walkable(pos))
    }

    /// Walkable block at or near a world position, probing the column below
    /// first.
    pub fn resolve(&self, p: Vec3, below: i32, above: i32) -> Option<BlockPos> {
        probe_column(BlockPos::containing(p), below, above, |pos| {
            self.is_walkable(pos).then_some(pos)
        })
    }
}
