mod branch_bound;
mod exhaustive;
mod selector;

pub use branch_bound::BranchAndBound;
pub use exhaustive::Exhaustive;
pub use selector::select;

use crate::core::{Instance, ModelConfig, Schedule, Scheduler, SolveError, SolveOptions};
use crate::csp::CancelToken;
use log::info;

/// Every scheduler linked into the binary.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [fn() -> Box<dyn Scheduler>];

/// Returns the scheduler registered under the given name.
#[must_use]
pub fn find_scheduler(name: &str) -> Option<Box<dyn Scheduler>> {
    SCHEDULERS
        .iter()
        .map(|init| init())
        .find(|scheduler| scheduler.name().eq_ignore_ascii_case(name))
}

/// Validates the instance and runs the scheduler on it.
/// With `extend_to_horizon` the makespan is increased one unit at a time until a schedule is
/// found or the instance horizon is passed.
///
/// # Errors
/// - If the instance is malformed.
/// - If no schedule exists for the makespan, or for any makespan up to the horizon.
/// - If the time limit passed.
pub fn solve(
    scheduler: &mut dyn Scheduler,
    instance: &Instance,
    config: &ModelConfig,
    options: &SolveOptions,
) -> Result<Schedule, SolveError> {
    instance.validate()?;

    let cancel = options
        .time_limit
        .map_or_else(CancelToken::new, CancelToken::with_time_limit);
    let upper = instance.horizon.max(config.makespan);
    let mut config = config.clone();

    loop {
        info!("{}: trying makespan {}", scheduler.name(), config.makespan);

        match scheduler.schedule(instance, &config, &cancel) {
            Err(err)
                if err.is_infeasible() && options.extend_to_horizon && config.makespan < upper =>
            {
                info!("{err}");
                config.makespan += 1;
            }
            result => return result,
        }
    }
}
