use super::TaskId;
use crate::csp::Cancelled;
use serde::Serialize;
use thiserror::Error;

/// Violation of the instance's own invariants, detected before any model is built.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
pub enum MalformedInstance {
    #[error("precedence edge {from} -> {to} references a task that is not defined")]
    UnknownPrecedenceTask { from: TaskId, to: TaskId },
    #[error("task {task} demands resource `{resource}` that is not defined")]
    UnknownResource { task: TaskId, resource: String },
}

/// Outcome of a solve attempt that did not produce a schedule.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SolveError {
    /// A live task is longer than the makespan, the search is not attempted.
    #[error("task {task} with duration {duration} cannot fit into makespan {makespan}")]
    InfeasibleByConstruction {
        task: TaskId,
        duration: u64,
        makespan: u64,
    },
    /// The search explored every assignment and none was feasible.
    #[error("no feasible schedule for makespan {makespan}")]
    NoFeasibleSchedule { makespan: u64 },
    #[error("search was cancelled")]
    Cancelled,
    #[error("malformed instance: {0}")]
    Malformed(#[from] MalformedInstance),
}

impl SolveError {
    /// Returns whether a larger makespan could turn this outcome into a schedule.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::InfeasibleByConstruction { .. } | Self::NoFeasibleSchedule { .. }
        )
    }
}

impl From<Cancelled> for SolveError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}
