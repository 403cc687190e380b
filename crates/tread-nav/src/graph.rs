use hashbrown::HashMap;
use tread_geom::BlockPos;
use tread_world::{ChunkCoord, WorldDims};

use crate::arena::Arena;
use crate::config::NavConfig;
use crate::direction::Side;
use crate::floor::Floor;
use crate::region::{BlockRef, FloorRef, Neighbors, RegionId, RegionMap, WalkableBlock};

/// Every loaded region, addressable by chunk and by generational id.
#[derive(Debug)]
pub struct NavGraph {
    dims: WorldDims,
    regions: Arena<RegionMap>,
    by_chunk: HashMap<ChunkCoord, RegionId>,
}

impl NavGraph {
    pub fn new(dims: WorldDims) -> Self {
        Self {
            dims,
            regions: Arena::new(),
            by_chunk: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> WorldDims {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionMap> {
        self.regions.iter().map(|(_, r)| r)
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&RegionMap> {
        self.regions.get(id)
    }

    #[inline]
    pub fn region_id(&self, coord: ChunkCoord) -> Option<RegionId> {
        self.by_chunk.get(&coord).copied()
    }

    pub fn region_at(&self, coord: ChunkCoord) -> Option<&RegionMap> {
        self.region_id(coord).and_then(|id| self.region(id))
    }

    /// Resolves a block reference; `None` once its region was replaced.
    #[inline]
    pub fn block(&self, b: BlockRef) -> Option<&WalkableBlock> {
        self.region(b.region)?.block(b.index)
    }

    #[inline]
    pub fn floor(&self, f: FloorRef) -> Option<&Floor> {
        self.region(f.region)?.floor(f.index)
    }

    #[inline]
    pub fn floor_of(&self, b: BlockRef) -> Option<FloorRef> {
        self.block(b).map(|blk| blk.floor)
    }

    /// Walkable block whose surface cell is exactly `pos`.
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockRef> {
        let region = self.region_at(self.dims.chunk_of(pos))?;
        region.block_index_at(pos).map(|i| region.block_ref(i))
    }

    /// Id for a region that is about to be built off to the side.
    pub fn reserve(&mut self) -> RegionId {
        self.regions.reserve()
    }

    pub fn release(&mut self, id: RegionId) {
        self.regions.release(id);
    }

    /// Replaces the region of the built map's chunk and connects it to its
    /// loaded side neighbors. Returns `None` if `region` was not built under
    /// an id from [`NavGraph::reserve`].
    pub fn install(&mut self, region: RegionMap, cfg: &NavConfig) -> Option<RegionId> {
        let id = region.id();
        let coord = region.coord();
        self.remove(coord);
        if self.regions.fill(id, region).is_err() {
            log::error!(target: "nav", "region {:?} built under unreserved id {}", coord, id);
            return None;
        }
        self.by_chunk.insert(coord, id);
        self.connect(id, cfg);
        Some(id)
    }

    /// Disconnects and drops the region of `coord`.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<RegionId> {
        let id = self.by_chunk.remove(&coord)?;
        let ids = self.side_ids(coord);
        let [center, north, south, east, west] = self.regions.get_disjoint_mut([Some(id), ids[0], ids[1], ids[2], ids[3]]);
        if let Some(center) = center {
            center.disconnect_neighbor_regions(Neighbors {
                north,
                south,
                east,
                west,
            });
        }
        self.regions.remove(id);
        Some(id)
    }

    fn connect(&mut self, id: RegionId, cfg: &NavConfig) {
        let Some(coord) = self.region(id).map(|r| r.coord()) else {
            return;
        };
        let ids = self.side_ids(coord);
        let [center, north, south, east, west] = self.regions.get_disjoint_mut([Some(id), ids[0], ids[1], ids[2], ids[3]]);
        if let Some(center) = center {
            center.connect_neighbor_regions(
                Neighbors {
                    north,
                    south,
                    east,
                    west,
                },
                cfg,
            );
        }
    }

    /// Neighbor ids in north, south, east, west order.
    fn side_ids(&self, coord: ChunkCoord) -> [Option<RegionId>; 4] {
        [Side::North, Side::South, Side::East, Side::West].map(|side| {
            let (dx, dz) = side.chunk_offset();
            self.region_id(coord.offset(dx, dz))
        })
    }
}
