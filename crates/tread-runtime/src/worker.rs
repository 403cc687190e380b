use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, select};
use tread_nav::{BlockRef, NavSnapshot, Path, Pathfinder, SearchOutcome};
use tread_world::{BlockSource, ChunkCoord};

use crate::config::SystemConfig;
use crate::{InvalidationQueue, PathReady, PathRequest, PathStatus, StatCounters};

enum Wake {
    Shutdown,
    Invalidate(ChunkCoord),
    Request(PathRequest),
    Idle,
}

/// State owned by the pathfinder thread. Nothing here is shared except
/// through the channels, the pending set and the published snapshot.
pub(crate) struct Worker {
    pub(crate) pathfinder: Pathfinder,
    pub(crate) world: Arc<dyn BlockSource>,
    pub(crate) cfg: SystemConfig,
    pub(crate) inval_rx: Receiver<ChunkCoord>,
    pub(crate) req_rx: Receiver<PathRequest>,
    pub(crate) shutdown_rx: Receiver<()>,
    pub(crate) res_tx: Sender<PathReady>,
    pub(crate) invalidations: InvalidationQueue,
    pub(crate) snapshot: Arc<RwLock<Arc<NavSnapshot>>>,
    pub(crate) stats: Arc<StatCounters>,
    /// Request picked up while idle; served before the rest of the queue.
    pub(crate) stash: Option<PathRequest>,
}

impl Worker {
    pub(crate) fn run(mut self) {
        log::debug!(target: "pathfinder", "pathfinder worker started");
        let idle = Duration::from_millis(self.cfg.idle_poll_ms.max(1));
        loop {
            match self.shutdown_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            match self.inval_rx.try_recv() {
                Ok(coord) => {
                    self.rebuild(coord);
                    continue;
                }
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            if self.stash.is_some() || !self.req_rx.is_empty() {
                self.serve_batch();
                continue;
            }

            let wake = select! {
                recv(self.shutdown_rx) -> _ => Wake::Shutdown,
                recv(self.inval_rx) -> res => res.map_or(Wake::Shutdown, Wake::Invalidate),
                recv(self.req_rx) -> res => res.map_or(Wake::Shutdown, Wake::Request),
                default(idle) => Wake::Idle,
            };
            match wake {
                Wake::Shutdown => break,
                Wake::Invalidate(coord) => self.rebuild(coord),
                // Re-check invalidations before serving it.
                Wake::Request(req) => self.stash = Some(req),
                Wake::Idle => self.housekeeping(),
            }
        }
        self.refuse_pending();
        log::debug!(target: "pathfinder", "pathfinder worker stopped");
    }

    /// Answers every request still queued at shutdown with `Failed`.
    fn refuse_pending(&mut self) {
        let left: Vec<PathRequest> = self.stash.take().into_iter().chain(self.req_rx.try_iter()).collect();
        if left.is_empty() {
            return;
        }
        log::info!(target: "pathfinder", "stopping with {} queued requests, failing them", left.len());
        for req in &left {
            StatCounters::bump(&self.stats.failed, 1);
            StatCounters::bump(&self.stats.requests, 1);
            if self.res_tx.send(PathReady::without_path(req, PathStatus::Failed)).is_err() {
                break;
            }
        }
    }

    fn rebuild(&mut self, first: ChunkCoord) {
        let t0 = Instant::now();
        let mut coords = vec![first];
        coords.extend(self.inval_rx.try_iter().take(self.cfg.max_invalidation_batch));
        coords.sort_unstable();
        coords.dedup();
        for &c in &coords {
            self.invalidations.forget(c);
        }

        let world = Arc::clone(&self.world);
        let (load, unload): (Vec<ChunkCoord>, Vec<ChunkCoord>) =
            coords.iter().copied().partition(|&c| world.is_loaded(c));

        let batch = catch_unwind(AssertUnwindSafe(|| {
            self.pathfinder.rebuild_regions(world.as_ref(), &load).len()
        }));
        let rebuilt = match batch {
            Ok(n) => n,
            Err(_) => {
                log::error!(
                    target: "pathfinder",
                    "rebuild of {} chunks panicked, retrying one at a time",
                    load.len()
                );
                load.iter()
                    .filter(|&&c| self.rebuild_one(world.as_ref(), c))
                    .count()
            }
        };
        for &c in &unload {
            self.pathfinder.unload_region(c);
        }
        StatCounters::bump(&self.stats.rebuilds, rebuilt as u64);

        self.publish(&coords);
        log::debug!(
            target: "pathfinder",
            "rebuilt {} and unloaded {} chunks in {:.2}ms",
            rebuilt,
            unload.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
    }

    fn rebuild_one(&mut self, world: &dyn BlockSource, coord: ChunkCoord) -> bool {
        let res = catch_unwind(AssertUnwindSafe(|| {
            self.pathfinder.rebuild_region(world, coord)
        }));
        match res {
            Ok(id) => id.is_some(),
            Err(_) => {
                log::error!(
                    target: "pathfinder",
                    "rebuild of chunk {:?} panicked, leaving it unloaded",
                    coord
                );
                self.pathfinder.unload_region(coord);
                false
            }
        }
    }

    fn publish(&self, coords: &[ChunkCoord]) {
        let changes: Vec<_> = coords
            .iter()
            .map(|&c| (c, self.pathfinder.region_surface(c)))
            .collect();
        let mut guard = match self.snapshot.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = guard.updated(changes);
        *guard = Arc::new(next);
    }

    fn serve_batch(&mut self) {
        let t0 = Instant::now();
        let queued = self.req_rx.len();
        let mut batch: Vec<PathRequest> = self.stash.take().into_iter().collect();
        batch.extend(self.req_rx.try_iter().take(queued));

        let mut invalid = 0usize;
        let mut not_found = 0usize;
        for req in &batch {
            let reply = match catch_unwind(AssertUnwindSafe(|| self.serve(req))) {
                Ok(reply) => reply,
                Err(_) => {
                    log::error!(target: "pathfinder", "request {} panicked, skipping", req.id);
                    PathReady::without_path(req, PathStatus::Failed)
                }
            };
            let counter = match reply.status {
                PathStatus::Found => &self.stats.found,
                PathStatus::NotFound | PathStatus::SearchLimit => {
                    not_found += 1;
                    &self.stats.not_found
                }
                PathStatus::Unresolved => {
                    invalid += 1;
                    &self.stats.unresolved
                }
                PathStatus::Failed => &self.stats.failed,
            };
            StatCounters::bump(counter, 1);
            StatCounters::bump(&self.stats.requests, 1);
            if self.res_tx.send(reply).is_err() {
                log::debug!(target: "pathfinder", "result receiver gone, dropping reply {}", req.id);
            }
        }

        let secs = t0.elapsed().as_secs_f64();
        log::info!(
            target: "pathfinder",
            "count={} {:.2}ms pps={:.0} invalid={} not found={}",
            batch.len(),
            secs * 1000.0,
            batch.len() as f64 / secs.max(1e-9),
            invalid,
            not_found
        );
    }

    /// Searches every resolvable target and keeps the cheapest path found.
    fn serve(&mut self, req: &PathRequest) -> PathReady {
        let pf = &mut self.pathfinder;
        let Some(start) = pf.resolve_block(req.start) else {
            return PathReady::without_path(req, PathStatus::Unresolved);
        };
        let targets: Vec<BlockRef> = req
            .targets
            .iter()
            .filter_map(|&t| pf.resolve_block(t))
            .collect();
        if targets.is_empty() {
            return PathReady::without_path(req, PathStatus::Unresolved);
        }

        let mut best: Option<(BlockRef, Path)> = None;
        let mut limited = false;
        let mut failed = false;
        for &target in &targets {
            match pf.find_path(Some(target), Some(start)) {
                Ok(res) => match res.outcome {
                    SearchOutcome::Found => {
                        let cost = res.path.cost().unwrap_or(f32::INFINITY);
                        let better = best
                            .as_ref()
                            .is_none_or(|(_, p)| cost < p.cost().unwrap_or(f32::INFINITY));
                        if better {
                            best = Some((target, res.path));
                        }
                    }
                    SearchOutcome::NodeLimit => limited = true,
                    SearchOutcome::Unreachable | SearchOutcome::Unresolved => {}
                },
                Err(e) => {
                    log::error!(target: "pathfinder", "request {}: {}", req.id, e);
                    failed = true;
                }
            }
        }

        let pos_of = |b: BlockRef| pf.block(b).map(|blk| blk.pos);
        let start_pos = pos_of(start);
        match best {
            Some((target, path)) => PathReady {
                id: req.id,
                requester: req.requester,
                start: start_pos,
                target: pos_of(target),
                status: PathStatus::Found,
                cost: path.cost(),
                path: pf.positions(&path),
            },
            None => {
                let status = if failed {
                    PathStatus::Failed
                } else if limited {
                    PathStatus::SearchLimit
                } else {
                    PathStatus::NotFound
                };
                PathReady {
                    start: start_pos,
                    target: pos_of(targets[0]),
                    ..PathReady::without_path(req, status)
                }
            }
        }
    }

    fn housekeeping(&self) {
        let search = self.pathfinder.stats();
        let cache = self.pathfinder.caches().stats();
        log::trace!(
            target: "pathfinder",
            "idle: regions={} searches={} nodes={} cache hits={} misses={} entries={} rebuilds={}",
            self.pathfinder.graph().len(),
            search.searches,
            search.nodes_expanded,
            cache.hits,
            cache.misses,
            cache.entries,
            self.stats.rebuilds.load(Ordering::Relaxed)
        );
    }
}
