use super::TaskId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Makespan used when none is given.
pub const DEFAULT_MAKESPAN: u64 = 11;

/// Task whose start time is pinned when it is present and live.
pub const DEFAULT_ANCHOR_TASK: TaskId = 1;

/// Start time the anchor task is pinned to.
pub const DEFAULT_ANCHOR_START: u64 = 1;

/// Pins the start time of one task.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Anchor {
    pub task: TaskId,
    pub start: u64,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            task: DEFAULT_ANCHOR_TASK,
            start: DEFAULT_ANCHOR_START,
        }
    }
}

/// Parameters of the constraint model built for one solve attempt.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct ModelConfig {
    /// Every live task must finish at or before this time.
    pub makespan: u64,
    pub anchor: Option<Anchor>,
}

impl ModelConfig {
    /// Creates a config with the given makespan and the default anchor.
    #[must_use]
    pub fn new(makespan: u64) -> Self {
        Self {
            makespan,
            anchor: Some(Anchor::default()),
        }
    }

    /// Replaces the anchor.
    #[must_use]
    pub const fn with_anchor(mut self, anchor: Option<Anchor>) -> Self {
        self.anchor = anchor;
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAKESPAN)
    }
}

/// Parameters of the driver around the schedulers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SolveOptions {
    /// Retry with increasing makespan up to the instance horizon.
    pub extend_to_horizon: bool,
    /// Cancel the search once this much time passed.
    pub time_limit: Option<Duration>,
}
