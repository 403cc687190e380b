use crate::direction::Side;
use crate::region::{BlockRef, FloorRef};

/// Connected walkable blocks of one region.
#[derive(Clone, Debug)]
pub struct Floor {
    id: FloorRef,
    blocks: Vec<u32>,
    neighbors: Vec<(Side, FloorRef)>,
    entrances: Vec<Entrance>,
}

impl Floor {
    pub(crate) fn new(id: FloorRef, blocks: Vec<u32>) -> Self {
        Self {
            id,
            blocks,
            neighbors: Vec::new(),
            entrances: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> FloorRef {
        self.id
    }

    /// Member block indices in ascending order.
    #[inline]
    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    pub fn contains(&self, block: BlockRef) -> bool {
        block.region == self.id.region && self.blocks.binary_search(&block.index).is_ok()
    }

    /// Floors of adjacent regions reachable across a side, with that side.
    #[inline]
    pub fn neighbors(&self) -> &[(Side, FloorRef)] {
        &self.neighbors
    }

    pub fn neighbor_floors(&self) -> impl Iterator<Item = FloorRef> + '_ {
        self.neighbors.iter().map(|(_, f)| *f)
    }

    #[inline]
    pub fn entrances(&self) -> &[Entrance] {
        &self.entrances
    }

    pub fn entrances_on(&self, side: Side) -> impl Iterator<Item = &Entrance> + '_ {
        self.entrances.iter().filter(move |e| e.side == side)
    }

    pub(crate) fn add_neighbor(&mut self, side: Side, floor: FloorRef) {
        if !self.neighbors.contains(&(side, floor)) {
            self.neighbors.push((side, floor));
        }
    }

    pub(crate) fn clear_side(&mut self, side: Side) {
        self.neighbors.retain(|(s, _)| *s != side);
        self.entrances.retain(|e| e.side != side);
    }

    pub(crate) fn set_entrances(&mut self, side: Side, entrances: Vec<Entrance>) {
        self.entrances.retain(|e| e.side != side);
        self.entrances.extend(entrances);
    }
}

/// A contiguous run of border blocks of one floor facing one neighbor floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entrance {
    pub side: Side,
    pub floor: FloorRef,
    pub neighbor: FloorRef,
    /// Border blocks in clockwise order along `side`. Never empty.
    pub run: Vec<BlockRef>,
    pub abstract_block: BlockRef,
}

impl Entrance {
    pub(crate) fn new(side: Side, floor: FloorRef, neighbor: FloorRef, run: Vec<BlockRef>) -> Option<Self> {
        let abstract_block = *run.get(run.len().checked_sub(1)? / 2)?;
        Some(Self {
            side,
            floor,
            neighbor,
            run,
            abstract_block,
        })
    }

    /// First and last block of the run; a single block for a run of one.
    pub fn ends(&self) -> (BlockRef, BlockRef) {
        match (self.run.first(), self.run.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => (self.abstract_block, self.abstract_block),
        }
    }

    /// Blocks where the run turns into closed border.
    pub fn contour_blocks(&self) -> Vec<BlockRef> {
        let (a, b) = self.ends();
        if a == b { vec![a] } else { vec![a, b] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.run.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }
}
