use crate::core::{Instance, ModelConfig, Schedule, Scheduler, SolveError};
use crate::csp::{Assignment, CancelToken, Constraint, Value, VarId};
use crate::model::{Evaluation, Model};
use std::cell::Cell;
use std::rc::Rc;

/// Rejects partial assignments whose sum of start times cannot beat the best found so far.
///
/// The lower bound of a partial assignment is the sum of bound starts plus the smallest
/// remaining value of every unbound variable. Sum of finishes differs from sum of starts by
/// the constant sum of durations, so the start sum alone orders assignments.
#[derive(Debug)]
struct ObjectiveCutoff {
    scope: Vec<VarId>,
    minimums: Vec<Value>,
    lower: u64,
    excess: u64,
    best: Rc<Cell<Option<u64>>>,
}

impl ObjectiveCutoff {
    fn new(len: usize, best: Rc<Cell<Option<u64>>>) -> Self {
        Self {
            scope: (0..len).collect(),
            minimums: vec![0; len],
            lower: 0,
            excess: 0,
            best,
        }
    }

    fn below_best(&self, bound: u64) -> bool {
        self.best.get().is_none_or(|best| bound < best)
    }
}

impl Constraint for ObjectiveCutoff {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let starts = self.scope.iter().filter_map(|&var| assignment.get(var));
        self.below_best(starts.sum())
    }

    fn prepare(&mut self, domains: &[Vec<Value>]) {
        for (minimum, domain) in self.minimums.iter_mut().zip(domains) {
            *minimum = domain.iter().copied().min().unwrap_or_default();
        }
        self.lower = self.minimums.iter().sum();
        self.excess = 0;
    }

    fn on_bind(&mut self, var: VarId, assignment: &Assignment) -> bool {
        if let Some(start) = assignment.get(var) {
            self.excess += start - self.minimums[var];
        }
        self.below_best(self.lower + self.excess)
    }

    fn on_unbind(&mut self, var: VarId, assignment: &Assignment) {
        if let Some(start) = assignment.get(var) {
            self.excess -= start - self.minimums[var];
        }
    }
}

/// Depth-first branch and bound. Resource counters are updated on every binding and
/// branches that cannot improve the best schedule found so far are cut.
/// Selects the same schedule as [`super::Exhaustive`] since both enumerate in the same order
/// and only strictly better assignments replace the incumbent.
#[derive(Clone, Debug, Default)]
pub struct BranchAndBound;

impl Scheduler for BranchAndBound {
    fn schedule(
        &mut self,
        instance: &Instance,
        config: &ModelConfig,
        cancel: &CancelToken,
    ) -> Result<Schedule, SolveError> {
        let mut model = Model::build(instance, config, Evaluation::Incremental)?;
        let best = Rc::new(Cell::new(None));
        model.add_constraint(ObjectiveCutoff::new(model.tasks().len(), Rc::clone(&best)));

        let mut incumbent = None;
        for solution in model.solutions(cancel) {
            let solution = solution?;
            let starts = solution.bound().map(|(_, start)| start).sum();
            best.set(Some(starts));
            incumbent = Some(solution);
        }

        incumbent
            .map(|solution| model.to_schedule(&solution))
            .ok_or(SolveError::NoFeasibleSchedule {
                makespan: config.makespan,
            })
    }

    fn name(&self) -> &'static str {
        "BranchAndBound"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(BranchAndBound);

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::Exhaustive;
    use crate::data::{generate, samples, GeneratorConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_branch_and_bound() {
        assert!(samples(true, &mut BranchAndBound).is_ok());
    }

    #[test]
    fn agrees_with_exhaustive() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GeneratorConfig {
            tasks: 5,
            resources: 2,
            max_duration: 3,
            max_successors: 2,
            ..GeneratorConfig::default()
        };

        for _ in 0..12 {
            let instance = generate(&mut rng, &config);
            for makespan in [6, 9] {
                let config = ModelConfig::new(makespan);
                let cancel = CancelToken::new();
                let expected = Exhaustive.schedule(&instance, &config, &cancel);
                let actual = BranchAndBound.schedule(&instance, &config, &cancel);

                if let Ok(schedule) = &actual {
                    assert!(schedule.verify(&instance));
                }
                assert_eq!(expected, actual);
            }
        }
    }

    #[test]
    fn cutoff_accepts_everything_without_incumbent() {
        let mut cutoff = ObjectiveCutoff::new(1, Rc::new(Cell::new(None)));
        cutoff.prepare(&[vec![4, 9]]);

        let full: Assignment = [Some(9)].into_iter().collect();
        assert!(cutoff.on_bind(0, &full));
        assert!(cutoff.check(&full));
    }

    #[test]
    fn cutoff_prunes_on_lower_bound() {
        let best = Rc::new(Cell::new(Some(4)));
        let mut cutoff = ObjectiveCutoff::new(2, Rc::clone(&best));
        cutoff.prepare(&[vec![1, 2, 3], vec![2, 3]]);

        let partial: Assignment = [Some(2), None].into_iter().collect();
        assert!(!cutoff.on_bind(0, &partial));
        cutoff.on_unbind(0, &partial);

        best.set(Some(5));
        assert!(cutoff.on_bind(0, &partial));

        let full: Assignment = [Some(2), Some(3)].into_iter().collect();
        assert!(!cutoff.on_bind(1, &full));
        assert!(!cutoff.check(&full));
    }
}
