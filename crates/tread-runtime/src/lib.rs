//! Pathfinder worker thread: invalidation and request queues, results, and the published surface snapshot.
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
mod worker;

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use hashbrown::HashSet;
use tread_blocks::Block;
use tread_geom::{BlockPos, Vec3};
use tread_nav::{NavConfig, NavSnapshot, Pathfinder};
use tread_world::{BlockSource, ChunkCoord, WorldDims, WorldListener};

pub use agent::{PathFollower, PathState};
pub use config::SystemConfig;

use crate::worker::Worker;

pub type RequestId = u64;

/// Opaque handle of whoever asked for a path; only echoed back.
pub type Requester = u64;

#[derive(Clone, Debug, PartialEq)]
pub struct PathRequest {
    pub id: RequestId,
    pub requester: Requester,
    pub start: Vec3,
    pub targets: Vec<Vec3>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathStatus {
    Found,
    NotFound,
    /// The search hit its node cap.
    SearchLimit,
    /// Start or every target had no walkable block nearby.
    Unresolved,
    /// The job failed inside the worker and was skipped.
    Failed,
}

/// Reply to one accepted request.
#[derive(Clone, Debug, PartialEq)]
pub struct PathReady {
    pub id: RequestId,
    pub requester: Requester,
    pub start: Option<BlockPos>,
    pub target: Option<BlockPos>,
    pub status: PathStatus,
    /// Block positions from the target back to the start.
    pub path: Vec<BlockPos>,
    pub cost: Option<f32>,
}

impl PathReady {
    pub(crate) fn without_path(req: &PathRequest, status: PathStatus) -> Self {
        Self {
            id: req.id,
            requester: req.requester,
            start: None,
            target: None,
            status,
            path: Vec::new(),
            cost: None,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.status == PathStatus::Found
    }

    /// Path in walking order, start first.
    pub fn walk_order(&self) -> Vec<BlockPos> {
        self.path.iter().rev().copied().collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemStats {
    pub rebuilds: u64,
    pub requests: u64,
    pub found: u64,
    pub not_found: u64,
    pub unresolved: u64,
    pub failed: u64,
    pub dropped_requests: u64,
    pub dropped_invalidations: u64,
}

#[derive(Default, Debug)]
pub(crate) struct StatCounters {
    pub rebuilds: AtomicU64,
    pub requests: AtomicU64,
    pub found: AtomicU64,
    pub not_found: AtomicU64,
    pub unresolved: AtomicU64,
    pub failed: AtomicU64,
    pub dropped_requests: AtomicU64,
    pub dropped_invalidations: AtomicU64,
}

impl StatCounters {
    pub(crate) fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SystemStats {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        SystemStats {
            rebuilds: get(&self.rebuilds),
            requests: get(&self.requests),
            found: get(&self.found),
            not_found: get(&self.not_found),
            unresolved: get(&self.unresolved),
            failed: get(&self.failed),
            dropped_requests: get(&self.dropped_requests),
            dropped_invalidations: get(&self.dropped_invalidations),
        }
    }
}

/// Sending side of the invalidation queue plus the set of chunks already in it.
#[derive(Clone)]
pub(crate) struct InvalidationQueue {
    tx: Sender<ChunkCoord>,
    pending: Arc<Mutex<HashSet<ChunkCoord>>>,
    stats: Arc<StatCounters>,
}

impl InvalidationQueue {
    /// Queues `coord` unless it is already pending. Never blocks; a full
    /// queue drops the chunk so the next change can retry it.
    pub(crate) fn push(&self, coord: ChunkCoord) -> bool {
        let fresh = self
            .pending
            .lock()
            .map(|mut p| p.insert(coord))
            .unwrap_or(true);
        if !fresh {
            return true;
        }
        match self.tx.try_send(coord) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!(target: "pathfinder", "invalidation queue full, dropping chunk {:?}", coord);
                StatCounters::bump(&self.stats.dropped_invalidations, 1);
                self.forget(coord);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.forget(coord);
                false
            }
        }
    }

    /// Marks `coord` as no longer pending.
    pub(crate) fn forget(&self, coord: ChunkCoord) {
        if let Ok(mut p) = self.pending.lock() {
            p.remove(&coord);
        }
    }

    fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

/// World listener that turns block and chunk events into invalidations.
pub struct PathfinderListener {
    dims: WorldDims,
    queue: InvalidationQueue,
}

impl WorldListener for PathfinderListener {
    fn on_block_changed(&self, pos: BlockPos, _new: Block, _old: Block) {
        self.queue.push(self.dims.chunk_of(pos));
    }

    fn on_chunk_ready(&self, coord: ChunkCoord) {
        self.queue.push(coord);
    }

    fn on_chunk_unloaded(&self, coord: ChunkCoord) {
        self.queue.push(coord);
    }
}

/// Owns the worker thread that rebuilds regions and answers path requests.
///
/// Callers never block: requests and invalidations go through bounded queues
/// and replies arrive on [`PathfinderSystem::results`].
pub struct PathfinderSystem {
    nav: NavConfig,
    invalidations: InvalidationQueue,
    req_tx: Sender<PathRequest>,
    res_rx: Receiver<PathReady>,
    shutdown_tx: Sender<()>,
    next_id: AtomicU64,
    snapshot: Arc<RwLock<Arc<NavSnapshot>>>,
    stats: Arc<StatCounters>,
    dims: WorldDims,
    worker: Option<JoinHandle<()>>,
}

impl PathfinderSystem {
    pub fn new(world: Arc<dyn BlockSource>, nav: NavConfig, cfg: SystemConfig) -> io::Result<Self> {
        let dims = world.dims();
        let (inval_tx, inval_rx) = bounded::<ChunkCoord>(cfg.invalidation_queue.max(1));
        let (req_tx, req_rx) = bounded::<PathRequest>(cfg.request_queue.max(1));
        let (res_tx, res_rx) = unbounded::<PathReady>();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let stats = Arc::new(StatCounters::default());
        let snapshot = Arc::new(RwLock::new(Arc::new(NavSnapshot::new(dims))));
        let invalidations = InvalidationQueue {
            tx: inval_tx,
            pending: Arc::new(Mutex::new(HashSet::new())),
            stats: Arc::clone(&stats),
        };

        let worker = Worker {
            pathfinder: Pathfinder::new(dims, nav.clone()),
            world,
            cfg,
            inval_rx,
            req_rx,
            shutdown_rx,
            res_tx,
            invalidations: invalidations.clone(),
            snapshot: Arc::clone(&snapshot),
            stats: Arc::clone(&stats),
            stash: None,
        };
        let handle = thread::Builder::new()
            .name("tread-pathfinder".into())
            .spawn(move || worker.run())?;

        Ok(Self {
            nav,
            invalidations,
            req_tx,
            res_rx,
            shutdown_tx,
            next_id: AtomicU64::new(1),
            snapshot,
            stats,
            dims,
            worker: Some(handle),
        })
    }

    /// Listener to register with the world.
    pub fn listener(&self) -> Arc<PathfinderListener> {
        Arc::new(PathfinderListener {
            dims: self.dims,
            queue: self.invalidations.clone(),
        })
    }

    /// Queues a rebuild (or unload, if the world no longer has it) of `coord`.
    pub fn invalidate(&self, coord: ChunkCoord) -> bool {
        self.invalidations.push(coord)
    }

    /// Queues a search from `start` to the cheapest reachable of `targets`.
    /// Returns at once. If the request queue is full the request is dropped
    /// and no reply will ever carry the returned id.
    pub fn request_path(&self, requester: Requester, start: Vec3, targets: &[Vec3]) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = PathRequest {
            id,
            requester,
            start,
            targets: targets.to_vec(),
        };
        match self.req_tx.try_send(req) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!(target: "pathfinder", "request queue full, dropping request {}", id);
                StatCounters::bump(&self.stats.dropped_requests, 1);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!(target: "pathfinder", "pathfinder stopped, dropping request {}", id);
                StatCounters::bump(&self.stats.dropped_requests, 1);
            }
        }
        id
    }

    /// Replies in completion order.
    pub fn results(&self) -> &Receiver<PathReady> {
        &self.res_rx
    }

    pub fn drain_results(&self) -> Vec<PathReady> {
        self.res_rx.try_iter().collect()
    }

    /// Surface of the last fully rebuilt graph.
    pub fn snapshot(&self) -> Arc<NavSnapshot> {
        match self.snapshot.read() {
            Ok(s) => Arc::clone(&s),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Walkable block at or just below `pos`, read from the published snapshot.
    pub fn get_walkable_block(&self, pos: Vec3) -> Option<BlockPos> {
        self.snapshot()
            .resolve(pos, self.nav.resolve_below, self.nav.resolve_above)
    }

    pub fn pending_invalidations(&self) -> usize {
        self.invalidations.pending()
    }

    pub fn stats(&self) -> SystemStats {
        self.stats.snapshot()
    }

    /// Stops the worker after its current job and waits for it. Requests
    /// still queued are answered with [`PathStatus::Failed`]; clone
    /// [`PathfinderSystem::results`] first to receive them.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!(target: "pathfinder", "pathfinder worker panicked");
            }
        }
    }
}

impl Drop for PathfinderSystem {
    fn drop(&mut self) {
        self.stop();
    }
}
