//! Two-level A* over walkable blocks.
//!
//! Nodes on the start or target floor expand to their linked blocks. Nodes on
//! any other floor jump straight to the abstract blocks of the entrances of
//! neighboring floors, paying the cost of the local path between the two
//! blocks. Local paths come from a non-hierarchical search limited to the two
//! floors involved and are memoized per region in [`PathCaches`].

use core::cmp::Ordering;
use core::fmt;
use std::collections::BinaryHeap;
use std::sync::Arc;

use hashbrown::HashMap;
use tread_geom::BlockPos;

use crate::config::NavConfig;
use crate::graph::NavGraph;
use crate::path::Path;
use crate::path_cache::PathCaches;
use crate::region::{BlockRef, FloorRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchOutcome {
    Found,
    /// The open set ran dry.
    Unreachable,
    /// The node cap was hit before the target was reached.
    NodeLimit,
    /// Start or target has no walkable block.
    Unresolved,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub searches: u64,
    pub cache_hits: u64,
    pub local_paths_used: u64,
    pub nodes_expanded: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// Two blocks joined by the entrance graph have no local path between them.
    MissingLocalPath { from: BlockPos, to: BlockPos },
    /// The block's region was replaced or unloaded.
    StaleBlock(BlockRef),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::MissingLocalPath { from, to } => {
                write!(f, "no local path from {} to {} across connected floors", from, to)
            }
            SearchError::StaleBlock(b) => {
                write!(f, "block {} of region {} is stale", b.index, b.region)
            }
        }
    }
}

impl std::error::Error for SearchError {}

/// Octile distance in the horizontal plane.
#[inline]
pub fn octile(a: BlockPos, b: BlockPos) -> f32 {
    let dx = (a.x - b.x).unsigned_abs() as f32;
    let dz = (a.z - b.z).unsigned_abs() as f32;
    dx.max(dz) + (core::f32::consts::SQRT_2 - 1.0) * dx.min(dz)
}

#[derive(Debug)]
struct Node {
    block: BlockRef,
    floor: FloorRef,
    g: f32,
    f: f32,
    parent: Option<usize>,
    /// Local path taken from the parent, target end first.
    local: Option<Arc<Path>>,
    closed: bool,
}

/// Min-heap entry: lowest f first, then earliest discovered.
#[derive(Debug)]
struct OpenEntry {
    f: f32,
    id: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f.total_cmp(&other.f) == Ordering::Equal && self.id == other.id
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Reusable search state. Buffers are kept between searches.
#[derive(Debug)]
pub struct HAStar {
    max_nodes: usize,
    hierarchical: bool,
    nodes: Vec<Node>,
    node_map: HashMap<BlockRef, usize>,
    open: BinaryHeap<OpenEntry>,
    scratch: Option<Box<HAStar>>,
    stats: SearchStats,
}

impl HAStar {
    pub fn new(cfg: &NavConfig) -> Self {
        Self::with_limits(cfg.max_nodes, cfg.hierarchical)
    }

    pub fn with_limits(max_nodes: usize, hierarchical: bool) -> Self {
        Self {
            max_nodes: max_nodes.max(1),
            hierarchical,
            nodes: Vec::new(),
            node_map: HashMap::new(),
            open: BinaryHeap::new(),
            scratch: None,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    #[inline]
    pub fn is_hierarchical(&self) -> bool {
        self.hierarchical
    }

    /// Searches from `start` to `target`. The path lists blocks target first.
    pub fn search(
        &mut self,
        graph: &NavGraph,
        caches: Option<&mut PathCaches>,
        start: BlockRef,
        target: BlockRef,
    ) -> Result<(SearchOutcome, Path), SearchError> {
        self.run(graph, caches, start, target, None)
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.node_map.clear();
        self.open.clear();
    }

    fn run(
        &mut self,
        graph: &NavGraph,
        mut caches: Option<&mut PathCaches>,
        start: BlockRef,
        target: BlockRef,
        scope: Option<[FloorRef; 2]>,
    ) -> Result<(SearchOutcome, Path), SearchError> {
        self.stats.searches += 1;
        self.reset();
        let s = graph.block(start).ok_or(SearchError::StaleBlock(start))?;
        let t = graph.block(target).ok_or(SearchError::StaleBlock(target))?;
        if start == target {
            return Ok((
                SearchOutcome::Found,
                Path::Found {
                    steps: vec![start],
                    cost: 0.0,
                },
            ));
        }
        let (start_floor, target_floor, goal) = (s.floor, t.floor, t.pos);
        self.relax(start, s.floor, s.pos, 0.0, goal, None, None);

        while let Some(OpenEntry { f, id }) = self.open.pop() {
            let node = &self.nodes[id];
            if node.closed || f > node.f {
                continue;
            }
            let (block, floor, g) = (node.block, node.floor, node.g);
            self.nodes[id].closed = true;
            self.stats.nodes_expanded += 1;
            if block == target {
                return Ok((SearchOutcome::Found, self.reconstruct(id)));
            }
            let Some(cur) = graph.block(block) else {
                continue;
            };

            if !self.hierarchical || floor == start_floor || floor == target_floor {
                for (dir, nb) in cur.linked() {
                    let Some(n) = graph.block(nb) else {
                        continue;
                    };
                    if scope.is_some_and(|s| !s.contains(&n.floor)) {
                        continue;
                    }
                    if !self.relax(nb, n.floor, n.pos, g + dir.step_cost(), goal, Some(id), None) {
                        return Ok((SearchOutcome::NodeLimit, Path::Invalid));
                    }
                }
                continue;
            }

            for cand in Self::entrance_candidates(graph, floor) {
                if cand == block || self.is_closed(cand) {
                    continue;
                }
                let Some(n) = graph.block(cand) else {
                    continue;
                };
                let (cost, local) = match cur.direction_to(cand) {
                    Some(dir) => (dir.step_cost(), None),
                    None => {
                        let local = self.local_path(graph, caches.as_deref_mut(), block, floor, cand, n.floor)?;
                        let Some(p) = local else {
                            return Ok((SearchOutcome::NodeLimit, Path::Invalid));
                        };
                        (p.cost().unwrap_or(0.0), Some(p))
                    }
                };
                if !self.relax(cand, n.floor, n.pos, g + cost, goal, Some(id), local) {
                    return Ok((SearchOutcome::NodeLimit, Path::Invalid));
                }
            }
        }
        Ok((SearchOutcome::Unreachable, Path::Invalid))
    }

    fn is_closed(&self, block: BlockRef) -> bool {
        self.node_map
            .get(&block)
            .is_some_and(|&i| self.nodes[i].closed)
    }

    /// Abstract blocks of every entrance of the floors next to `floor`.
    fn entrance_candidates(graph: &NavGraph, floor: FloorRef) -> Vec<BlockRef> {
        let Some(f) = graph.floor(floor) else {
            return Vec::new();
        };
        let mut out: Vec<BlockRef> = f
            .neighbor_floors()
            .filter_map(|g| graph.floor(g))
            .flat_map(|g| g.entrances().iter().map(|e| e.abstract_block))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Opens or improves the node for `block`. Returns `false` when a new
    /// node would exceed the cap.
    #[allow(clippy::too_many_arguments)]
    fn relax(
        &mut self,
        block: BlockRef,
        floor: FloorRef,
        pos: BlockPos,
        g: f32,
        goal: BlockPos,
        parent: Option<usize>,
        local: Option<Arc<Path>>,
    ) -> bool {
        let f = g + octile(pos, goal);
        if let Some(&i) = self.node_map.get(&block) {
            let n = &mut self.nodes[i];
            if n.closed || g >= n.g {
                return true;
            }
            n.g = g;
            n.f = f;
            n.parent = parent;
            n.local = local;
            self.open.push(OpenEntry { f, id: i });
            return true;
        }
        if self.nodes.len() >= self.max_nodes {
            return false;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            block,
            floor,
            g,
            f,
            parent,
            local,
            closed: false,
        });
        self.node_map.insert(block, id);
        self.open.push(OpenEntry { f, id });
        true
    }

    /// Local path between two blocks of neighboring floors. `None` when the
    /// scoped search hit the node cap; such results are never cached.
    fn local_path(
        &mut self,
        graph: &NavGraph,
        caches: Option<&mut PathCaches>,
        from: BlockRef,
        from_floor: FloorRef,
        to: BlockRef,
        to_floor: FloorRef,
    ) -> Result<Option<Arc<Path>>, SearchError> {
        let max_nodes = self.max_nodes;
        let scratch = self
            .scratch
            .get_or_insert_with(|| Box::new(HAStar::with_limits(max_nodes, false)));
        let before = scratch.stats.nodes_expanded;
        let mut compute = || match scratch.run(graph, None, from, to, Some([from_floor, to_floor])) {
            Ok((SearchOutcome::NodeLimit, _)) => None,
            Ok((_, p)) => Some(p),
            Err(e) => {
                log::warn!(target: "nav", "local search failed: {}", e);
                Some(Path::Invalid)
            }
        };
        let path = match caches {
            Some(c) => {
                let cache = c.for_region(from.region);
                if cache.has_path(from, to) {
                    self.stats.cache_hits += 1;
                }
                cache.try_find_path(from, to, compute)
            }
            None => compute().map(Arc::new),
        };
        self.stats.nodes_expanded += scratch.stats.nodes_expanded - before;
        let Some(path) = path else {
            log::debug!(target: "nav", "local search hit the node cap");
            return Ok(None);
        };
        self.stats.local_paths_used += 1;
        if !path.is_valid() {
            let pos = |b: BlockRef| graph.block(b).map(|blk| blk.pos).unwrap_or_default();
            return Err(SearchError::MissingLocalPath {
                from: pos(from),
                to: pos(to),
            });
        }
        Ok(Some(path))
    }

    fn reconstruct(&self, id: usize) -> Path {
        let cost = self.nodes[id].g;
        let mut steps = Vec::new();
        let mut cur = id;
        loop {
            let n = &self.nodes[cur];
            let Some(parent) = n.parent else {
                steps.push(n.block);
                break;
            };
            match &n.local {
                Some(local) => {
                    let s = local.steps();
                    steps.extend_from_slice(&s[..s.len().saturating_sub(1)]);
                }
                None => steps.push(n.block),
            }
            cur = parent;
        }
        Path::Found { steps, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_set_pops_lowest_f_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f: 3.0, id: 0 });
        heap.push(OpenEntry { f: 1.0, id: 2 });
        heap.push(OpenEntry { f: 1.0, id: 1 });
        heap.push(OpenEntry { f: 2.0, id: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.id)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn octile_matches_move_costs() {
        let o = BlockPos::new(0, 0, 0);
        assert_eq!(octile(o, BlockPos::new(3, 5, 0)), 3.0);
        let d = octile(o, BlockPos::new(2, 0, 2));
        assert!((d - 2.0 * core::f32::consts::SQRT_2).abs() < 1e-5);
    }
}
