//! Caller-side bookkeeping for one agent following a requested path.

use tread_geom::{BlockPos, Vec3};

use crate::{PathReady, PathStatus, PathfinderSystem, RequestId, Requester};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathState {
    #[default]
    Idle,
    NewTarget,
    PathRequested,
    PathReceived,
    MovingPath,
    FinishedMoving,
}

#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    requester: Requester,
    state: PathState,
    target: Option<Vec3>,
    pending: Option<RequestId>,
    /// Start first.
    path: Vec<BlockPos>,
    step: usize,
    last_status: Option<PathStatus>,
}

impl PathFollower {
    pub fn new(requester: Requester) -> Self {
        Self {
            requester,
            ..Self::default()
        }
    }

    #[inline]
    pub fn state(&self) -> PathState {
        self.state
    }

    #[inline]
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    #[inline]
    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    #[inline]
    pub fn path(&self) -> &[BlockPos] {
        &self.path
    }

    #[inline]
    pub fn last_status(&self) -> Option<PathStatus> {
        self.last_status
    }

    /// Forgets the current path and any pending request.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = Some(target);
        self.pending = None;
        self.path.clear();
        self.step = 0;
        self.state = PathState::NewTarget;
    }

    /// Asks for a path from `pos` to the current target. Does nothing unless a
    /// new target is waiting.
    pub fn request(&mut self, system: &PathfinderSystem, pos: Vec3) -> Option<RequestId> {
        if self.state != PathState::NewTarget {
            return None;
        }
        let target = self.target?;
        let id = system.request_path(self.requester, pos, &[target]);
        self.pending = Some(id);
        self.state = PathState::PathRequested;
        Some(id)
    }

    /// Takes a reply. Replies to anything but the pending request are ignored;
    /// returns whether this one was taken.
    pub fn on_path_ready(&mut self, ready: &PathReady) -> bool {
        if self.state != PathState::PathRequested || self.pending != Some(ready.id) {
            return false;
        }
        self.pending = None;
        self.last_status = Some(ready.status);
        self.step = 0;
        if ready.is_found() {
            self.path = ready.walk_order();
            self.state = PathState::PathReceived;
        } else {
            self.path.clear();
            self.state = PathState::Idle;
        }
        true
    }

    /// Block the agent should walk to next.
    pub fn next_waypoint(&mut self) -> Option<BlockPos> {
        match self.state {
            PathState::PathReceived => {
                self.state = PathState::MovingPath;
                self.path.get(self.step).copied()
            }
            PathState::MovingPath => self.path.get(self.step).copied(),
            _ => None,
        }
    }

    /// Marks the current waypoint reached.
    pub fn advance(&mut self) {
        if !matches!(self.state, PathState::PathReceived | PathState::MovingPath) {
            return;
        }
        self.state = PathState::MovingPath;
        self.step += 1;
        if self.step >= self.path.len() {
            self.state = PathState::FinishedMoving;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.requester);
    }
}
