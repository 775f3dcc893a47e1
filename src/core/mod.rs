mod config;
mod error;
mod problem;
mod solution;

pub use config::*;
pub use error::*;
pub use problem::*;
pub use solution::*;

use crate::csp::CancelToken;

/// Schedules the live tasks of an instance within a fixed makespan.
pub trait Scheduler {
    /// Returns the best schedule of the given instance for the configured makespan.
    ///
    /// # Errors
    /// - If a live task is longer than the makespan.
    /// - If no assignment of start times is feasible.
    /// - If the search was cancelled.
    fn schedule(
        &mut self,
        instance: &Instance,
        config: &ModelConfig,
        cancel: &CancelToken,
    ) -> Result<Schedule, SolveError>;

    /// Returns the name of the scheduler.
    fn name(&self) -> &'static str;
}
