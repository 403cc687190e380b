use serde::Deserialize;

/// Queue sizes and pacing of the pathfinder worker.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SystemConfig {
    #[serde(default = "default_invalidation_queue")]
    pub invalidation_queue: usize,
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
    /// How long an idle worker sleeps before housekeeping.
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,
    /// Extra pending invalidations taken along with the first one.
    #[serde(default = "default_max_invalidation_batch")]
    pub max_invalidation_batch: usize,
}

fn default_invalidation_queue() -> usize {
    100
}
fn default_request_queue() -> usize {
    100
}
fn default_idle_poll_ms() -> u64 {
    1000
}
fn default_max_invalidation_batch() -> usize {
    16
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            invalidation_queue: default_invalidation_queue(),
            request_queue: default_request_queue(),
            idle_poll_ms: default_idle_poll_ms(),
            max_invalidation_batch: default_max_invalidation_batch(),
        }
    }
}
