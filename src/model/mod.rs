//! Constraint model of a scheduling instance for a fixed makespan.
//!
//! One variable per live task holds its start time, with domain `[0, makespan - duration]`.
//! Constraints: the optional anchor, precedence between live tasks, completion within the
//! makespan and a single global resource constraint over every variable.

mod resource;

pub use resource::{Demand, Evaluation, ResourceFeasibility};

use crate::core::{Instance, ModelConfig, Schedule, ScheduleEntry, SolveError, TaskId};
use crate::csp::{binary, unary, Assignment, CancelToken, Constraint, Problem, Search, VarId};
use ahash::{HashMap, HashMapExt};
use log::debug;

/// A live task and the variable holding its start time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiveTask {
    pub id: TaskId,
    pub var: VarId,
    pub duration: u64,
}

/// Constraint problem built from an instance, ready to be searched.
#[derive(Debug)]
pub struct Model {
    problem: Problem,
    tasks: Vec<LiveTask>,
    makespan: u64,
}

impl Model {
    /// Builds the model of the instance for the configured makespan.
    ///
    /// # Errors
    /// - If a live task is longer than the makespan.
    pub fn build(
        instance: &Instance,
        config: &ModelConfig,
        evaluation: Evaluation,
    ) -> Result<Self, SolveError> {
        let makespan = config.makespan;
        let mut problem = Problem::new();
        let mut tasks = Vec::new();
        let mut vars = HashMap::new();

        for task in instance.live_tasks() {
            let Some(latest) = makespan.checked_sub(task.duration) else {
                return Err(SolveError::InfeasibleByConstruction {
                    task: task.id,
                    duration: task.duration,
                    makespan,
                });
            };

            let var = problem.add_variable(0..=latest);
            vars.insert(task.id, var);
            tasks.push(LiveTask {
                id: task.id,
                var,
                duration: task.duration,
            });
        }

        if let Some(anchor) = config.anchor {
            match vars.get(&anchor.task) {
                Some(&var) => {
                    let pinned = move |start: u64| start == anchor.start;
                    problem.add_constraint(unary("anchor", var, pinned));
                }
                None => debug!("Anchor task {} is not live, no anchor added", anchor.task),
            }
        }

        for edge in instance.precedence.edges() {
            if let (Some(&first), Some(&second)) =
                (vars.get(&edge.predecessor()), vars.get(&edge.successor()))
            {
                let duration = tasks[first].duration;
                problem.add_constraint(binary("precedence", first, second, move |p, s| {
                    p + duration <= s
                }));
            }
        }

        for task in &tasks {
            let duration = task.duration;
            problem.add_constraint(unary("completion", task.var, move |start| {
                start + duration <= makespan
            }));
        }

        let demands = instance
            .live_tasks()
            .map(|task| Demand {
                duration: task.duration,
                amounts: instance
                    .resources
                    .keys()
                    .enumerate()
                    .map(|(index, name)| (index, task.demand_of(name)))
                    .filter(|&(_, amount)| amount > 0)
                    .collect(),
            })
            .collect();
        let capacities = instance.resources.values().map(|r| r.capacity).collect();
        problem.add_constraint(ResourceFeasibility::new(
            demands, capacities, makespan, evaluation,
        ));

        debug!(
            "Model for makespan {makespan}: {} variables, {} constraints",
            problem.variables_len(),
            problem.constraints_len()
        );

        Ok(Self {
            problem,
            tasks,
            makespan,
        })
    }

    /// Returns the live tasks ordered by id, which is also variable order.
    #[must_use]
    pub fn tasks(&self) -> &[LiveTask] {
        &self.tasks
    }

    #[must_use]
    pub const fn makespan(&self) -> u64 {
        self.makespan
    }

    /// Returns the underlying constraint problem.
    #[must_use]
    pub const fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Adds a further constraint over the start variables.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) {
        self.problem.add_constraint(constraint);
    }

    /// Returns a lazy enumeration of every feasible assignment of start times.
    pub fn solutions(&mut self, cancel: &CancelToken) -> Search<'_> {
        self.problem.solutions(cancel)
    }

    /// Returns the sum of start times and the sum of finish times of a complete assignment.
    #[must_use]
    pub fn objective(&self, assignment: &Assignment) -> (u64, u64) {
        self.tasks.iter().fold((0, 0), |(starts, finishes), task| {
            let start = assignment.get(task.var).unwrap_or_default();
            (starts + start, finishes + start + task.duration)
        })
    }

    /// Converts a complete assignment into a schedule.
    #[must_use]
    pub fn to_schedule(&self, assignment: &Assignment) -> Schedule {
        let entries = self
            .tasks
            .iter()
            .filter_map(|task| {
                let start = assignment.get(task.var)?;
                Some(ScheduleEntry::new(task.id, start, task.duration))
            })
            .collect();
        Schedule::new(self.makespan, entries)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Anchor, Precedence, Resource, Task};

    fn instance() -> Instance {
        Instance::new(
            20,
            10,
            vec![Resource::new("R1", 5)],
            vec![
                Task::new(1, 2, [("R1", 3)]),
                Task::new(2, 3, [("R1", 2)]),
                Task::new(3, 0, Vec::<(String, u64)>::new()),
            ],
            vec![Precedence::new(1, 2), Precedence::new(2, 3)],
        )
    }

    #[test]
    fn dummy_tasks_have_no_variable() -> anyhow::Result<()> {
        let model = Model::build(&instance(), &ModelConfig::new(10), Evaluation::Deferred)?;
        let ids: Vec<_> = model.tasks().iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(model.problem().variables_len(), 2);
        assert_eq!(model.problem().domain(0).len(), 9);
        assert_eq!(model.problem().domain(1).len(), 8);
        Ok(())
    }

    #[test]
    fn constraints_are_counted() -> anyhow::Result<()> {
        let model = Model::build(&instance(), &ModelConfig::new(10), Evaluation::Deferred)?;
        // anchor + one live precedence + two completion bounds + resources
        assert_eq!(model.problem().constraints_len(), 5);

        let unanchored = ModelConfig::new(10).with_anchor(None);
        let model = Model::build(&instance(), &unanchored, Evaluation::Deferred)?;
        assert_eq!(model.problem().constraints_len(), 4);

        let elsewhere = ModelConfig::new(10).with_anchor(Some(Anchor { task: 3, start: 0 }));
        let model = Model::build(&instance(), &elsewhere, Evaluation::Deferred)?;
        assert_eq!(model.problem().constraints_len(), 4);
        Ok(())
    }

    #[test]
    fn task_longer_than_makespan_fails_fast() {
        let result = Model::build(&instance(), &ModelConfig::new(2), Evaluation::Incremental);
        assert_eq!(
            result.err(),
            Some(SolveError::InfeasibleByConstruction {
                task: 2,
                duration: 3,
                makespan: 2
            })
        );
    }

    #[test]
    fn objective_and_schedule_follow_assignment() -> anyhow::Result<()> {
        let mut model = Model::build(&instance(), &ModelConfig::new(10), Evaluation::Incremental)?;
        let first = model
            .solutions(&CancelToken::new())
            .next()
            .transpose()?
            .unwrap_or_default();

        assert_eq!(model.objective(&first), (4, 9));

        let schedule = model.to_schedule(&first);
        assert_eq!(
            schedule.entries(),
            &[ScheduleEntry::new(1, 1, 2), ScheduleEntry::new(2, 3, 3)]
        );
        assert!(schedule.verify(&instance()));
        Ok(())
    }
}
