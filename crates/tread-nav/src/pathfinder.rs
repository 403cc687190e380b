use std::time::Instant;

use rayon::prelude::*;
use tread_chunk::ChunkBuf;
use tread_geom::{BlockPos, Vec3};
use tread_world::{BlockSource, ChunkCoord, WorldDims};

use crate::config::NavConfig;
use crate::graph::NavGraph;
use crate::hastar::{HAStar, SearchError, SearchOutcome, SearchStats};
use crate::path::Path;
use crate::path_cache::{PathCacheStats, PathCaches};
use crate::region::{BlockRef, RegionId, RegionMap, WalkableBlock};
use crate::snapshot::{RegionSurface, probe_column};

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub path: Path,
}

impl SearchResult {
    pub fn unresolved() -> Self {
        Self {
            outcome: SearchOutcome::Unresolved,
            path: Path::Invalid,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }
}

/// Owns the region graph and the local path caches, and answers path queries.
///
/// Not shared between threads; the owning worker mutates it exclusively.
#[derive(Debug)]
pub struct Pathfinder {
    cfg: NavConfig,
    graph: NavGraph,
    caches: PathCaches,
    search: HAStar,
}

/// Region ids reserved for builds in flight. Released on drop unless kept,
/// so a panicking build does not leak arena slots.
struct Reserved<'a> {
    graph: &'a mut NavGraph,
    ids: Vec<RegionId>,
}

impl<'a> Reserved<'a> {
    fn new(graph: &'a mut NavGraph, n: usize) -> Self {
        let ids = (0..n).map(|_| graph.reserve()).collect();
        Self { graph, ids }
    }

    /// Hands the ids over to the built regions.
    fn keep(mut self) {
        self.ids.clear();
    }
}

impl Drop for Reserved<'_> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.graph.release(id);
        }
    }
}

impl Pathfinder {
    pub fn new(dims: WorldDims, cfg: NavConfig) -> Self {
        Self {
            search: HAStar::new(&cfg),
            graph: NavGraph::new(dims),
            caches: PathCaches::new(),
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.cfg
    }

    #[inline]
    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    #[inline]
    pub fn caches(&self) -> &PathCaches {
        &self.caches
    }

    /// Rebuilds the region of `coord` from the world's current blocks and
    /// reconnects it to its loaded neighbors.
    pub fn rebuild_region(&mut self, world: &dyn BlockSource, coord: ChunkCoord) -> Option<RegionId> {
        let buf = ChunkBuf::snapshot(world, coord);
        let reserved = Reserved::new(&mut self.graph, 1);
        let region = RegionMap::build(reserved.ids[0], &buf, world.registry(), &self.cfg);
        reserved.keep();
        self.install(region)
    }

    /// Builds several regions in parallel, then installs and connects them in order.
    pub fn rebuild_regions(&mut self, world: &dyn BlockSource, coords: &[ChunkCoord]) -> Vec<RegionId> {
        let t0 = Instant::now();
        let mut coords = coords.to_vec();
        coords.sort_unstable();
        coords.dedup();
        let reserved = Reserved::new(&mut self.graph, coords.len());
        let cfg = &self.cfg;
        let built: Vec<RegionMap> = coords
            .par_iter()
            .zip(reserved.ids.par_iter())
            .map(|(&coord, &id)| {
                let buf = ChunkBuf::snapshot(world, coord);
                RegionMap::build(id, &buf, world.registry(), cfg)
            })
            .collect();
        reserved.keep();
        let ids: Vec<RegionId> = built.into_iter().filter_map(|r| self.install(r)).collect();
        log::debug!(
            target: "nav",
            "rebuilt {} regions in {:.2}ms",
            ids.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        ids
    }

    fn install(&mut self, region: RegionMap) -> Option<RegionId> {
        if let Some(old) = self.graph.remove(region.coord()) {
            self.caches.drop_region(old);
        }
        let id = region.id();
        let installed = self.graph.install(region, &self.cfg);
        if installed.is_none() {
            self.graph.release(id);
        }
        installed
    }

    /// Disconnects and drops the region of `coord`. Returns whether one was loaded.
    pub fn unload_region(&mut self, coord: ChunkCoord) -> bool {
        match self.graph.remove(coord) {
            Some(old) => {
                self.caches.drop_region(old);
                log::debug!(target: "nav", "unloaded region {:?}", coord);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockRef> {
        self.graph.block_at(pos)
    }

    #[inline]
    pub fn block(&self, b: BlockRef) -> Option<&WalkableBlock> {
        self.graph.block(b)
    }

    /// Walkable block at a world position, or the nearest one below it, or
    /// one a little above it.
    pub fn resolve_block(&self, p: Vec3) -> Option<BlockRef> {
        probe_column(
            BlockPos::containing(p),
            self.cfg.resolve_below,
            self.cfg.resolve_above,
            |pos| self.graph.block_at(pos),
        )
    }

    /// Searches from `start` to `target`. A missing endpoint gives an
    /// unresolved result rather than an error.
    pub fn find_path(&mut self, target: Option<BlockRef>, start: Option<BlockRef>) -> Result<SearchResult, SearchError> {
        let (Some(target), Some(start)) = (target, start) else {
            return Ok(SearchResult::unresolved());
        };
        let (outcome, path) = self
            .search
            .search(&self.graph, Some(&mut self.caches), start, target)?;
        Ok(SearchResult { outcome, path })
    }

    /// World positions of a path's steps, target first.
    pub fn positions(&self, path: &Path) -> Vec<BlockPos> {
        path.steps()
            .iter()
            .filter_map(|b| self.graph.block(*b).map(|blk| blk.pos))
            .collect()
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.search.stats()
    }

    #[inline]
    pub fn cache_stats(&self) -> PathCacheStats {
        self.caches.stats()
    }

    pub fn region_surface(&self, coord: ChunkCoord) -> Option<RegionSurface> {
        self.graph.region_at(coord).map(RegionSurface::of)
    }
}
