//! Memoized local paths between entrance blocks.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::path::Path;
use crate::region::{BlockRef, RegionId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl std::ops::AddAssign for PathCacheStats {
    fn add_assign(&mut self, rhs: Self) {
        self.hits += rhs.hits;
        self.misses += rhs.misses;
        self.entries += rhs.entries;
    }
}

/// Paths keyed by the ordered `(from, to)` pair. A cached [`Path::Invalid`]
/// is a known absence and is returned without recomputing.
#[derive(Default, Debug)]
pub struct PathCache {
    paths: HashMap<(BlockRef, BlockRef), Arc<Path>>,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached path for the pair, computing it with `compute` on first use.
    pub fn find_path(&mut self, from: BlockRef, to: BlockRef, compute: impl FnOnce() -> Path) -> Arc<Path> {
        match self.try_find_path(from, to, || Some(compute())) {
            Some(p) => p,
            None => Arc::new(Path::Invalid),
        }
    }

    /// Like [`PathCache::find_path`], but a `None` from `compute` is passed
    /// through and nothing is stored for the pair.
    pub fn try_find_path(
        &mut self,
        from: BlockRef,
        to: BlockRef,
        compute: impl FnOnce() -> Option<Path>,
    ) -> Option<Arc<Path>> {
        if let Some(p) = self.paths.get(&(from, to)) {
            self.hits += 1;
            return Some(Arc::clone(p));
        }
        self.misses += 1;
        let p = Arc::new(compute()?);
        self.paths.insert((from, to), Arc::clone(&p));
        Some(p)
    }

    /// Whether a result for the pair is cached. Never computes.
    #[inline]
    pub fn has_path(&self, from: BlockRef, to: BlockRef) -> bool {
        self.paths.contains_key(&(from, to))
    }

    #[inline]
    pub fn get(&self, from: BlockRef, to: BlockRef) -> Option<&Arc<Path>> {
        self.paths.get(&(from, to))
    }

    /// Drops every entry whose endpoints or steps touch `region`.
    pub fn purge_region(&mut self, region: RegionId) -> usize {
        let before = self.paths.len();
        self.paths.retain(|(a, b), p| a.region != region && b.region != region && !p.touches_region(region));
        before - self.paths.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn stats(&self) -> PathCacheStats {
        PathCacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.paths.len(),
        }
    }
}

/// One [`PathCache`] per region, keyed by the region of the source block.
#[derive(Default, Debug)]
pub struct PathCaches {
    by_region: HashMap<RegionId, PathCache>,
}

impl PathCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_region(&mut self, region: RegionId) -> &mut PathCache {
        self.by_region.entry(region).or_default()
    }

    pub fn get(&self, region: RegionId) -> Option<&PathCache> {
        self.by_region.get(&region)
    }

    /// Forgets the region's own cache and purges paths through it elsewhere.
    pub fn drop_region(&mut self, region: RegionId) {
        let own = self.by_region.remove(&region).map(|c| c.len()).unwrap_or(0);
        let purged: usize = self
            .by_region
            .values_mut()
            .map(|c| c.purge_region(region))
            .sum();
        if own + purged > 0 {
            log::debug!(target: "nav", "dropped {} cached paths of region {}", own + purged, region);
        }
    }

    pub fn clear(&mut self) {
        self.by_region.clear();
    }

    pub fn stats(&self) -> PathCacheStats {
        let mut total = PathCacheStats::default();
        for c in self.by_region.values() {
            total += c.stats();
        }
        total
    }
}
