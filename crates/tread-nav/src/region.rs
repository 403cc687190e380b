//! Walkable blocks of one chunk column, their links and their floors.

use std::time::Instant;

use tread_blocks::BlockRegistry;
use tread_chunk::ChunkBuf;
use tread_geom::BlockPos;
use tread_world::ChunkCoord;

use crate::arena::Index;
use crate::config::NavConfig;
use crate::contour;
use crate::direction::{Direction, Side};
use crate::floor::{Entrance, Floor};
use crate::walkable::{MaskAt, PassMask, WalkableSurfaceFinder, best_candidate};

pub type RegionId = Index;

/// A walkable block addressed by its region generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef {
    pub region: RegionId,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorRef {
    pub region: RegionId,
    pub index: u32,
}

#[derive(Clone, Debug)]
pub struct WalkableBlock {
    pub pos: BlockPos,
    pub floor: FloorRef,
    /// Linked block per [`Direction`] index. Links across a chunk side point
    /// into the neighboring region.
    pub neighbors: [Option<BlockRef>; 8],
}

impl WalkableBlock {
    #[inline]
    pub fn has_neighbor(&self, other: BlockRef) -> bool {
        self.neighbors.contains(&Some(other))
    }

    /// Direction of the link to `other`, if there is one.
    pub fn direction_to(&self, other: BlockRef) -> Option<Direction> {
        self.neighbors
            .iter()
            .position(|n| *n == Some(other))
            .map(Direction::from_index)
    }

    pub fn linked(&self) -> impl Iterator<Item = (Direction, BlockRef)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.map(|b| (Direction::from_index(i), b)))
    }
}

/// The four side neighbors handed to [`RegionMap::connect_neighbor_regions`].
/// Any of them may be missing at the edge of the loaded world.
#[derive(Default)]
pub struct Neighbors<'a> {
    pub north: Option<&'a mut RegionMap>,
    pub south: Option<&'a mut RegionMap>,
    pub east: Option<&'a mut RegionMap>,
    pub west: Option<&'a mut RegionMap>,
}

impl<'a> Neighbors<'a> {
    fn into_sides(self) -> [(Side, Option<&'a mut RegionMap>); 4] {
        [
            (Side::North, self.north),
            (Side::East, self.east),
            (Side::South, self.south),
            (Side::West, self.west),
        ]
    }
}

/// Navigable surface of one chunk column.
///
/// Built in one go from a block snapshot and never patched afterwards except
/// for the links, floor neighbors and entrances along its four sides.
#[derive(Debug)]
pub struct RegionMap {
    id: RegionId,
    coord: ChunkCoord,
    sx: usize,
    sz: usize,
    height: usize,
    origin: (i32, i32),
    columns: Vec<Vec<u32>>,
    pub(crate) blocks: Vec<WalkableBlock>,
    pub(crate) floors: Vec<Floor>,
    mask: PassMask,
    connected: [Option<RegionId>; 4],
}

impl RegionMap {
    pub fn build(id: RegionId, buf: &ChunkBuf, reg: &BlockRegistry, cfg: &NavConfig) -> Self {
        let t0 = Instant::now();
        let mask = PassMask::from_chunk(buf, reg);
        let heights = WalkableSurfaceFinder::new(cfg).find(buf, reg, &mask);
        let origin = buf.base();
        let (sx, sz) = (buf.sx, buf.sz);

        let unset = FloorRef { region: id, index: u32::MAX };
        let mut columns = vec![Vec::new(); sx * sz];
        let mut blocks = Vec::new();
        for z in 0..sz {
            for x in 0..sx {
                for &y in &heights[z * sx + x] {
                    columns[z * sx + x].push(blocks.len() as u32);
                    blocks.push(WalkableBlock {
                        pos: BlockPos::new(origin.0 + x as i32, y, origin.1 + z as i32),
                        floor: unset,
                        neighbors: [None; 8],
                    });
                }
            }
        }

        let mut region = RegionMap {
            id,
            coord: buf.coord,
            sx,
            sz,
            height: buf.sy,
            origin,
            columns,
            blocks,
            floors: Vec::new(),
            mask,
            connected: [None; 4],
        };
        region.link_interior(cfg);
        region.label_floors();
        log::debug!(
            target: "nav",
            "region {:?} built: {} blocks, {} floors in {:.2}ms",
            region.coord,
            region.blocks.len(),
            region.floors.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        region
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.sx, self.sz)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    #[inline]
    pub fn blocks(&self) -> &[WalkableBlock] {
        &self.blocks
    }

    #[inline]
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    #[inline]
    pub fn block(&self, index: u32) -> Option<&WalkableBlock> {
        self.blocks.get(index as usize)
    }

    #[inline]
    pub fn floor(&self, index: u32) -> Option<&Floor> {
        self.floors.get(index as usize)
    }

    #[inline]
    pub fn block_ref(&self, index: u32) -> BlockRef {
        BlockRef { region: self.id, index }
    }

    /// Region connected across `side`, if any.
    #[inline]
    pub fn connected(&self, side: Side) -> Option<RegionId> {
        self.connected[side.index()]
    }

    pub(crate) fn mask(&self) -> &PassMask {
        &self.mask
    }

    /// Walkable block indices of a local column, lowest first.
    #[inline]
    pub fn column(&self, lx: usize, lz: usize) -> &[u32] {
        if lx >= self.sx || lz >= self.sz {
            return &[];
        }
        &self.columns[lz * self.sx + lx]
    }

    pub fn block_index(&self, lx: usize, y: i32, lz: usize) -> Option<u32> {
        self.column(lx, lz)
            .iter()
            .copied()
            .find(|&i| self.blocks[i as usize].pos.y == y)
    }

    pub fn get_block(&self, lx: usize, y: i32, lz: usize) -> Option<&WalkableBlock> {
        self.block_index(lx, y, lz).and_then(|i| self.block(i))
    }

    /// Local column of a world position, if it lies inside this region.
    #[inline]
    pub fn local_of(&self, pos: BlockPos) -> Option<(usize, usize)> {
        let lx = pos.x - self.origin.0;
        let lz = pos.z - self.origin.1;
        if lx < 0 || lz < 0 || lx >= self.sx as i32 || lz >= self.sz as i32 {
            return None;
        }
        Some((lx as usize, lz as usize))
    }

    pub fn block_index_at(&self, pos: BlockPos) -> Option<u32> {
        let (lx, lz) = self.local_of(pos)?;
        self.block_index(lx, pos.y, lz)
    }

    pub fn get_block_at(&self, pos: BlockPos) -> Option<&WalkableBlock> {
        self.block_index_at(pos).and_then(|i| self.block(i))
    }

    #[inline]
    fn mask_at(&self) -> MaskAt<'_> {
        MaskAt {
            mask: &self.mask,
            origin: self.origin,
        }
    }

    /// Best link candidate in a local column for a block at `from`.
    fn column_candidate(&self, masks: &[MaskAt<'_>], from: BlockPos, lx: usize, lz: usize, cfg: &NavConfig) -> Option<u32> {
        best_candidate(
            masks,
            from,
            self.column(lx, lz)
                .iter()
                .map(|&i| (i, self.blocks[i as usize].pos)),
            cfg,
        )
    }

    fn link_interior(&mut self, cfg: &NavConfig) {
        let masks = [self.mask_at()];
        let mut best: Vec<[Option<u32>; 8]> = vec![[None; 8]; self.blocks.len()];
        for (i, b) in self.blocks.iter().enumerate() {
            let (lx, lz) = (
                (b.pos.x - self.origin.0) as usize,
                (b.pos.z - self.origin.1) as usize,
            );
            for &dir in cfg.directions() {
                let (dx, dz) = dir.offset();
                let (tx, tz) = (lx as i32 + dx, lz as i32 + dz);
                if tx < 0 || tz < 0 || tx >= self.sx as i32 || tz >= self.sz as i32 {
                    continue;
                }
                best[i][dir.index()] =
                    self.column_candidate(&masks, b.pos, tx as usize, tz as usize, cfg);
            }
        }
        // Only mutual choices become links, which keeps them symmetric.
        for i in 0..self.blocks.len() {
            for &dir in cfg.directions() {
                let Some(j) = best[i][dir.index()] else {
                    continue;
                };
                if best[j as usize][dir.opposite().index()] == Some(i as u32) {
                    self.blocks[i].neighbors[dir.index()] = Some(BlockRef {
                        region: self.id,
                        index: j,
                    });
                }
            }
        }
    }

    fn label_floors(&mut self) {
        let unset = u32::MAX;
        let mut floors = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        for seed in 0..self.blocks.len() {
            if self.blocks[seed].floor.index != unset {
                continue;
            }
            let id = FloorRef {
                region: self.id,
                index: floors.len() as u32,
            };
            let mut members = Vec::new();
            self.blocks[seed].floor = id;
            queue.push_back(seed as u32);
            while let Some(i) = queue.pop_front() {
                members.push(i);
                for n in self.blocks[i as usize].neighbors.into_iter().flatten() {
                    let nb = &mut self.blocks[n.index as usize];
                    if nb.floor.index == unset {
                        nb.floor = id;
                        queue.push_back(n.index);
                    }
                }
            }
            members.sort_unstable();
            floors.push(Floor::new(id, members));
        }
        self.floors = floors;
    }

    /// Links this region to its loaded side neighbors and recomputes the
    /// entrances along every connected side on both regions.
    pub fn connect_neighbor_regions(&mut self, neighbors: Neighbors<'_>, cfg: &NavConfig) {
        for (side, other) in neighbors.into_sides() {
            if let Some(other) = other {
                self.connect_side(side, other, cfg);
            }
        }
    }

    /// Removes every link, floor neighbor and entrance across the given sides,
    /// on both regions.
    pub fn disconnect_neighbor_regions(&mut self, neighbors: Neighbors<'_>) {
        for (side, other) in neighbors.into_sides() {
            if let Some(other) = other {
                self.clear_side(side);
                other.clear_side(side.opposite());
            }
        }
    }

    pub fn connect_side(&mut self, side: Side, other: &mut RegionMap, cfg: &NavConfig) {
        self.clear_side(side);
        other.clear_side(side.opposite());

        let links = self.seam_links(side, other, cfg);
        for &(i, dir, j) in &links {
            self.blocks[i as usize].neighbors[dir.index()] = Some(other.block_ref(j));
            other.blocks[j as usize].neighbors[dir.opposite().index()] = Some(self.block_ref(i));

            let fa = self.blocks[i as usize].floor;
            let fb = other.blocks[j as usize].floor;
            self.floors[fa.index as usize].add_neighbor(side, fb);
            other.floors[fb.index as usize].add_neighbor(side.opposite(), fa);
        }
        self.connected[side.index()] = Some(other.id);
        other.connected[side.opposite().index()] = Some(self.id);

        contour::rebuild_side(self, side, other);
        contour::rebuild_side(other, side.opposite(), self);
        log::debug!(
            target: "nav",
            "connected {:?} {:?} -> {:?}: {} links",
            self.coord,
            side,
            other.coord,
            links.len()
        );
    }

    /// Mutually best block pairs across `side` as `(ours, direction, theirs)`.
    fn seam_links(&self, side: Side, other: &RegionMap, cfg: &NavConfig) -> Vec<(u32, Direction, u32)> {
        let masks = [self.mask_at(), other.mask_at()];
        let mut links = Vec::new();
        for (lx, lz) in side.border(self.sx, self.sz) {
            for &dir in cfg.directions() {
                if Side::crossed_by(lx, lz, dir, self.sx, self.sz) != Some(side) {
                    continue;
                }
                let (dx, dz) = dir.offset();
                let wx = self.origin.0 + lx as i32 + dx;
                let wz = self.origin.1 + lz as i32 + dz;
                let Some((ox, oz)) = other.local_of(BlockPos::new(wx, 0, wz)) else {
                    continue;
                };
                for &i in self.column(lx, lz) {
                    let from = self.blocks[i as usize].pos;
                    let Some(j) = other.column_candidate(&masks, from, ox, oz, cfg) else {
                        continue;
                    };
                    let back = self.column_candidate(&masks, other.blocks[j as usize].pos, lx, lz, cfg);
                    if back == Some(i) {
                        links.push((i, dir, j));
                    }
                }
            }
        }
        links
    }

    /// Drops the links, floor neighbors and entrances across `side`.
    pub fn clear_side(&mut self, side: Side) {
        for (lx, lz) in side.border(self.sx, self.sz) {
            for k in 0..self.columns[lz * self.sx + lx].len() {
                let i = self.columns[lz * self.sx + lx][k] as usize;
                for dir in Direction::ALL {
                    if Side::crossed_by(lx, lz, dir, self.sx, self.sz) == Some(side) {
                        self.blocks[i].neighbors[dir.index()] = None;
                    }
                }
            }
        }
        for floor in &mut self.floors {
            floor.clear_side(side);
        }
        self.connected[side.index()] = None;
    }

    pub(crate) fn set_entrances(&mut self, floor: u32, side: Side, entrances: Vec<Entrance>) {
        if let Some(f) = self.floors.get_mut(floor as usize) {
            f.set_entrances(side, entrances);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tread_world::{GridWorld, WorldDims};

    fn region(rows: &[&str], cfg: &NavConfig) -> RegionMap {
        let dims = WorldDims::new(4, 4, 8);
        let reg = Arc::new(BlockRegistry::with_defaults());
        let world = GridWorld::from_layers(dims, reg.clone(), BlockPos::new(0, 0, 0), rows);
        let buf = ChunkBuf::snapshot(&world, ChunkCoord::new(0, 0));
        let mut arena = crate::arena::Arena::<()>::new();
        RegionMap::build(arena.insert(()), &buf, &reg, cfg)
    }

    #[test]
    fn flat_ground_is_one_floor() {
        let r = region(&["XXXX", "XXXX", "XXXX", "XXXX"], &NavConfig::default());
        assert_eq!(r.blocks().len(), 16);
        assert_eq!(r.floors().len(), 1);
        let corner = r.get_block(0, 0, 0).map(|b| b.linked().count());
        let middle = r.get_block(1, 0, 1).map(|b| b.linked().count());
        assert_eq!(corner, Some(3));
        assert_eq!(middle, Some(8));
    }

    #[test]
    fn cardinal_only_config_skips_diagonals() {
        let cfg = NavConfig {
            diagonal: false,
            ..NavConfig::default()
        };
        let r = region(&["XXXX", "XXXX", "XXXX", "XXXX"], &cfg);
        let middle = r.get_block(1, 0, 1).map(|b| b.linked().count());
        assert_eq!(middle, Some(4));
    }

    #[test]
    fn diagonal_blocked_by_corner_wall() {
        // Wall blocks at y1 on (1, 0) and (0, 1) stand between (0, 0) and (1, 1).
        let r = region(&["XX| X", "XX|X "], &NavConfig::default());
        let a = r.block_index(0, 0, 0).expect("walkable corner");
        let b = r.block_index(1, 0, 1).expect("walkable corner");
        let wall = r.block_index(1, 1, 0).expect("walkable wall top");
        assert!(!r.blocks()[a as usize].has_neighbor(r.block_ref(b)));
        assert!(r.blocks()[a as usize].has_neighbor(r.block_ref(wall)));
        assert_eq!(r.floors().len(), 1);
    }

    #[test]
    fn lookup_by_world_position() {
        let r = region(&["X   ", "    ", "    ", "   X"], &NavConfig::default());
        assert!(r.get_block_at(BlockPos::new(0, 0, 0)).is_some());
        assert!(r.get_block_at(BlockPos::new(3, 0, 3)).is_some());
        assert!(r.get_block_at(BlockPos::new(3, 1, 3)).is_none());
        assert!(r.get_block_at(BlockPos::new(4, 0, 0)).is_none());
        assert_eq!(r.floors().len(), 2);
    }
}
