//! Standable-surface extraction and the movement rule between adjacent columns.

use tread_blocks::BlockRegistry;
use tread_chunk::ChunkBuf;
use tread_geom::BlockPos;

use crate::config::NavConfig;

/// Penetrability of every cell of one chunk column.
#[derive(Clone, Debug)]
pub struct PassMask {
    sx: usize,
    sy: usize,
    sz: usize,
    bits: Vec<bool>,
}

impl PassMask {
    pub fn from_chunk(buf: &ChunkBuf, reg: &BlockRegistry) -> Self {
        Self {
            sx: buf.sx,
            sy: buf.sy,
            sz: buf.sz,
            bits: buf.blocks.iter().map(|b| reg.is_penetrable(*b)).collect(),
        }
    }

    /// Cells below the world are solid; cells above it are open.
    #[inline]
    pub fn is_penetrable(&self, x: usize, y: i32, z: usize) -> bool {
        if y < 0 {
            return false;
        }
        if y >= self.sy as i32 {
            return true;
        }
        self.bits[(y as usize * self.sz + z) * self.sx + x]
    }

    /// Whether every cell `y0 ..= y1` of the column is penetrable.
    pub fn is_clear(&self, x: usize, z: usize, y0: i32, y1: i32) -> bool {
        (y0..=y1).all(|y| self.is_penetrable(x, y, z))
    }
}

/// A mask placed at its chunk's world origin.
#[derive(Clone, Copy)]
pub(crate) struct MaskAt<'a> {
    pub mask: &'a PassMask,
    pub origin: (i32, i32),
}

impl MaskAt<'_> {
    #[inline]
    fn column(&self, x: i32, z: i32) -> Option<(usize, usize)> {
        let lx = x - self.origin.0;
        let lz = z - self.origin.1;
        if lx < 0 || lz < 0 || lx >= self.mask.sx as i32 || lz >= self.mask.sz as i32 {
            return None;
        }
        Some((lx as usize, lz as usize))
    }
}

/// World column clearance over the given masks. Columns no mask covers are blocked.
fn column_clear(masks: &[MaskAt<'_>], x: i32, z: i32, y0: i32, y1: i32) -> bool {
    for m in masks {
        if let Some((lx, lz)) = m.column(x, z) {
            return m.mask.is_clear(lx, lz, y0, y1);
        }
    }
    false
}

/// Whether an agent standing on `a` can move to `b` in the adjacent column.
///
/// The lower column must be clear from above the lower block to agent height
/// above the higher one; diagonal moves need the same clearance in both
/// orthogonal columns they pass.
pub(crate) fn can_link(masks: &[MaskAt<'_>], a: BlockPos, b: BlockPos, cfg: &NavConfig) -> bool {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    if dx.abs() > 1 || dz.abs() > 1 || (dx == 0 && dz == 0) {
        return false;
    }
    if (a.y - b.y).abs() > cfg.max_step {
        return false;
    }
    let lo = a.y.min(b.y);
    let top = a.y.max(b.y) + cfg.agent_height;
    let lower = if a.y <= b.y { a } else { b };
    if !column_clear(masks, lower.x, lower.z, lo + 1, top) {
        return false;
    }
    if dx != 0 && dz != 0 {
        return column_clear(masks, a.x + dx, a.z, lo + 1, top)
            && column_clear(masks, a.x, a.z + dz, lo + 1, top);
    }
    true
}

/// Best link target for `from` among `candidates` (index, position): the
/// linkable one closest in height, lower first on ties.
pub(crate) fn best_candidate(
    masks: &[MaskAt<'_>],
    from: BlockPos,
    candidates: impl Iterator<Item = (u32, BlockPos)>,
    cfg: &NavConfig,
) -> Option<u32> {
    candidates
        .filter(|(_, p)| can_link(masks, from, *p, cfg))
        .min_by_key(|(_, p)| ((p.y - from.y).abs(), p.y))
        .map(|(i, _)| i)
}

/// Finds the blocks an agent can stand on in one chunk column.
#[derive(Clone, Copy, Debug)]
pub struct WalkableSurfaceFinder {
    agent_height: i32,
}

impl WalkableSurfaceFinder {
    pub fn new(cfg: &NavConfig) -> Self {
        Self {
            agent_height: cfg.agent_height.max(1),
        }
    }

    /// A solid block with `agent_height` penetrable cells above it.
    #[inline]
    pub fn is_walkable(
        &self,
        buf: &ChunkBuf,
        reg: &BlockRegistry,
        mask: &PassMask,
        x: usize,
        y: usize,
        z: usize,
    ) -> bool {
        reg.is_solid(buf.get_local(x, y, z))
            && mask.is_clear(x, z, y as i32 + 1, y as i32 + self.agent_height)
    }

    /// Walkable heights per column (`z * sx + x`), ascending.
    pub fn find(&self, buf: &ChunkBuf, reg: &BlockRegistry, mask: &PassMask) -> Vec<Vec<i32>> {
        let mut columns = vec![Vec::new(); buf.sx * buf.sz];
        for z in 0..buf.sz {
            for x in 0..buf.sx {
                let col = &mut columns[z * buf.sx + x];
                for y in 0..buf.sy {
                    if self.is_walkable(buf, reg, mask, x, y, z) {
                        col.push(y as i32);
                    }
                }
            }
        }
        columns
    }
}
