use crate::core::{Schedule, SolveError};
use crate::csp::Assignment;
use crate::model::Model;

/// Selects the feasible assignment with the lexicographically smallest pair of
/// (sum of starts, sum of finishes) and converts it into a schedule.
/// Among equal pairs the assignment produced first wins.
///
/// # Errors
/// - If there are no assignments to select from.
pub fn select(
    model: &Model,
    assignments: impl IntoIterator<Item = Assignment>,
) -> Result<Schedule, SolveError> {
    assignments
        .into_iter()
        .min_by_key(|assignment| model.objective(assignment))
        .map(|assignment| model.to_schedule(&assignment))
        .ok_or(SolveError::NoFeasibleSchedule {
            makespan: model.makespan(),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Instance, ModelConfig, Resource, Task};
    use crate::model::Evaluation;

    fn model() -> anyhow::Result<Model> {
        let instance = Instance::new(
            10,
            10,
            vec![Resource::new("R1", 2)],
            vec![Task::new(2, 1, [("R1", 1)]), Task::new(3, 2, [("R1", 1)])],
            vec![],
        );
        Ok(Model::build(&instance, &ModelConfig::new(5), Evaluation::Deferred)?)
    }

    fn assignment(starts: [u64; 2]) -> Assignment {
        starts.into_iter().map(Some).collect()
    }

    #[test]
    fn selects_smallest_objective() -> anyhow::Result<()> {
        let model = model()?;
        let schedule = select(
            &model,
            [assignment([3, 1]), assignment([0, 2]), assignment([1, 0])],
        )?;
        assert_eq!(schedule.objective(), (1, 4));
        assert_eq!(schedule.get(2).map(|entry| entry.start), Some(1));
        Ok(())
    }

    #[test]
    fn ties_go_to_first_produced() -> anyhow::Result<()> {
        let model = model()?;
        let schedule = select(&model, [assignment([2, 0]), assignment([0, 2])])?;
        assert_eq!(schedule.get(2).map(|entry| entry.start), Some(2));
        Ok(())
    }

    #[test]
    fn empty_input_is_infeasible() -> anyhow::Result<()> {
        let model = model()?;
        assert_eq!(
            select(&model, []),
            Err(SolveError::NoFeasibleSchedule { makespan: 5 })
        );
        Ok(())
    }
}
