use super::selector::select;
use crate::core::{Instance, ModelConfig, Schedule, Scheduler, SolveError};
use crate::csp::CancelToken;
use crate::model::{Evaluation, Model};
use log::debug;

/// Enumerates every feasible assignment and ranks them afterwards.
/// The resource constraint is only simulated once all start times are bound.
#[derive(Clone, Debug, Default)]
pub struct Exhaustive;

impl Scheduler for Exhaustive {
    fn schedule(
        &mut self,
        instance: &Instance,
        config: &ModelConfig,
        cancel: &CancelToken,
    ) -> Result<Schedule, SolveError> {
        let mut model = Model::build(instance, config, Evaluation::Deferred)?;
        let solutions = model
            .solutions(cancel)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "{} feasible assignments for makespan {}",
            solutions.len(),
            config.makespan
        );

        select(&model, solutions)
    }

    fn name(&self) -> &'static str {
        "Exhaustive"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(Exhaustive);
