//! Entrance runs along the side shared by two connected regions.
//!
//! A border cell is open for a floor pair when the floor's lowest block in
//! that column links across the side into the other floor. Open cells are
//! walked clockwise and grouped into runs; cells one apart join when their
//! blocks are linked or share a neighbor, cells two apart (one closed cell
//! between them) join only when they share a neighbor. That keeps a hole in
//! the border or a staircase step from splitting a run that is connected
//! just behind the border.

use std::mem;

use crate::direction::Side;
use crate::floor::Entrance;
use crate::region::{FloorRef, RegionMap};

/// Recomputes the entrances of every floor of `region` across `side`.
pub(crate) fn rebuild_side(region: &mut RegionMap, side: Side, other: &RegionMap) {
    for (floor, entrances) in side_entrances(region, side, other) {
        region.set_entrances(floor, side, entrances);
    }
}

fn side_entrances(region: &RegionMap, side: Side, other: &RegionMap) -> Vec<(u32, Vec<Entrance>)> {
    let (sx, sz) = region.size();
    let border = side.border(sx, sz);
    let mut out = Vec::with_capacity(region.floors().len());
    for floor in region.floors() {
        let id = floor.id();
        let mut entrances = Vec::new();
        for &(s, neighbor) in floor.neighbors() {
            if s != side || neighbor.region != other.id() {
                continue;
            }
            let cells: Vec<Option<u32>> = border
                .iter()
                .map(|&(lx, lz)| open_block(region, other, side, (lx, lz), id, neighbor))
                .collect();
            for run in runs(region, &cells) {
                let run = run.into_iter().map(|i| region.block_ref(i)).collect();
                entrances.extend(Entrance::new(side, id, neighbor, run));
            }
        }
        out.push((id.index, entrances));
    }
    out
}

fn open_block(
    region: &RegionMap,
    other: &RegionMap,
    side: Side,
    (lx, lz): (usize, usize),
    floor: FloorRef,
    neighbor: FloorRef,
) -> Option<u32> {
    let (sx, sz) = region.size();
    region.column(lx, lz).iter().copied().find(|&i| {
        let Some(b) = region.block(i) else {
            return false;
        };
        b.floor == floor
            && b.linked().any(|(dir, n)| {
                Side::crossed_by(lx, lz, dir, sx, sz) == Some(side)
                    && n.region == other.id()
                    && other.block(n.index).map(|nb| nb.floor) == Some(neighbor)
            })
    })
}

fn runs(region: &RegionMap, cells: &[Option<u32>]) -> Vec<Vec<u32>> {
    let mut out = Vec::new();
    let mut current: Vec<u32> = Vec::new();
    let mut last = 0usize;
    for (k, cell) in cells.iter().enumerate() {
        let Some(b) = *cell else {
            continue;
        };
        if let Some(&prev) = current.last() {
            let joined = match k - last {
                1 => linked(region, prev, b) || share_neighbor(region, prev, b),
                2 => share_neighbor(region, prev, b),
                _ => false,
            };
            if !joined {
                out.push(mem::take(&mut current));
            }
        }
        current.push(b);
        last = k;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn linked(region: &RegionMap, a: u32, b: u32) -> bool {
    region
        .block(a)
        .is_some_and(|blk| blk.has_neighbor(region.block_ref(b)))
}

fn share_neighbor(region: &RegionMap, a: u32, b: u32) -> bool {
    let (Some(a), Some(b)) = (region.block(a), region.block(b)) else {
        return false;
    };
    a.linked()
        .filter(|(_, n)| n.region == region.id())
        .any(|(_, n)| b.has_neighbor(n))
}
