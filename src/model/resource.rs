use crate::cast_usize;
use crate::csp::{Assignment, Constraint, Value, VarId};
use serde::{Deserialize, Serialize};

/// When the resource constraint is evaluated during the search.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub enum Evaluation {
    /// Simulate the whole profile once every task start is bound.
    Deferred,
    /// Keep per-time-unit counters up to date on every binding.
    #[default]
    Incremental,
}

/// Resource demand of one live task, indexed like its variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Demand {
    pub duration: u64,
    /// Pairs of resource index and amount consumed at every time unit.
    pub amounts: Vec<(usize, u64)>,
}

/// Global constraint: at no time unit in `[0, makespan)` does the total demand of the
/// running tasks exceed the capacity of any resource.
#[derive(Clone, Debug)]
pub struct ResourceFeasibility {
    scope: Vec<VarId>,
    demands: Vec<Demand>,
    capacities: Vec<u64>,
    makespan: u64,
    evaluation: Evaluation,
    usage: Vec<Vec<u64>>,
}

impl ResourceFeasibility {
    /// Creates the constraint over variables `0..demands.len()`.
    #[must_use]
    pub fn new(
        demands: Vec<Demand>,
        capacities: Vec<u64>,
        makespan: u64,
        evaluation: Evaluation,
    ) -> Self {
        let usage = match evaluation {
            Evaluation::Deferred => Vec::new(),
            Evaluation::Incremental => vec![vec![0; cast_usize(makespan)]; capacities.len()],
        };

        Self {
            scope: (0..demands.len()).collect(),
            demands,
            capacities,
            makespan,
            evaluation,
            usage,
        }
    }

    /// Adds the demand of the task started at `start` to the counters.
    /// Returns `false` if the task overruns the makespan or any capacity is exceeded.
    fn occupy(
        usage: &mut [Vec<u64>],
        capacities: &[u64],
        demand: &Demand,
        start: Value,
        makespan: u64,
    ) -> bool {
        let end = start + demand.duration;
        let mut feasible = end <= makespan;

        for time in start..end.min(makespan) {
            for &(resource, amount) in &demand.amounts {
                let used = &mut usage[resource][cast_usize(time)];
                *used += amount;
                feasible &= *used <= capacities[resource];
            }
        }

        feasible
    }

    fn release(&mut self, var: VarId, start: Value) {
        let demand = &self.demands[var];
        let end = (start + demand.duration).min(self.makespan);

        for time in start..end {
            for &(resource, amount) in &demand.amounts {
                self.usage[resource][cast_usize(time)] -= amount;
            }
        }
    }
}

impl Constraint for ResourceFeasibility {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let mut usage = vec![vec![0; cast_usize(self.makespan)]; self.capacities.len()];

        self.scope.iter().all(|&var| {
            assignment.get(var).is_some_and(|start| {
                let demand = &self.demands[var];
                Self::occupy(&mut usage, &self.capacities, demand, start, self.makespan)
            })
        })
    }

    fn on_bind(&mut self, var: VarId, assignment: &Assignment) -> bool {
        match (self.evaluation, assignment.get(var)) {
            (Evaluation::Incremental, Some(start)) => Self::occupy(
                &mut self.usage,
                &self.capacities,
                &self.demands[var],
                start,
                self.makespan,
            ),
            (Evaluation::Incremental, None) => true,
            (Evaluation::Deferred, _) => {
                !assignment.all_bound(&self.scope) || self.check(assignment)
            }
        }
    }

    fn on_unbind(&mut self, var: VarId, assignment: &Assignment) {
        if let (Evaluation::Incremental, Some(start)) = (self.evaluation, assignment.get(var)) {
            self.release(var, start);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn demands() -> Vec<Demand> {
        vec![
            Demand {
                duration: 2,
                amounts: vec![(0, 3)],
            },
            Demand {
                duration: 3,
                amounts: vec![(0, 2), (1, 1)],
            },
            Demand {
                duration: 1,
                amounts: vec![(1, 1)],
            },
        ]
    }

    fn prefix(starts: &[Value], len: usize) -> Assignment {
        starts
            .iter()
            .enumerate()
            .map(|(var, &start)| (var < len).then_some(start))
            .collect()
    }

    #[test]
    fn check_accepts_profile_within_capacity() {
        let constraint = ResourceFeasibility::new(demands(), vec![5, 1], 6, Evaluation::Deferred);
        assert!(constraint.check(&prefix(&[0, 0, 3], 3)));
    }

    #[test]
    fn check_rejects_overflow() {
        let constraint = ResourceFeasibility::new(demands(), vec![4, 1], 6, Evaluation::Deferred);
        assert!(!constraint.check(&prefix(&[0, 1, 4], 3)));

        let constraint = ResourceFeasibility::new(demands(), vec![5, 1], 6, Evaluation::Deferred);
        assert!(!constraint.check(&prefix(&[0, 0, 2], 3)));
    }

    #[test]
    fn check_rejects_makespan_overrun() {
        let constraint = ResourceFeasibility::new(demands(), vec![5, 2], 6, Evaluation::Deferred);
        assert!(!constraint.check(&prefix(&[0, 4, 0], 3)));
    }

    #[test]
    fn deferred_waits_for_whole_scope() {
        let mut constraint =
            ResourceFeasibility::new(demands(), vec![4, 1], 6, Evaluation::Deferred);
        assert!(constraint.on_bind(1, &prefix(&[0, 1, 4], 2)));
        assert!(!constraint.on_bind(2, &prefix(&[0, 1, 4], 3)));
    }

    #[test]
    fn incremental_matches_check() {
        let capacities = vec![5, 1];
        let mut incremental =
            ResourceFeasibility::new(demands(), capacities.clone(), 6, Evaluation::Incremental);
        let deferred = ResourceFeasibility::new(demands(), capacities, 6, Evaluation::Deferred);

        for first in 0..5 {
            for second in 0..4 {
                for third in 0..6 {
                    let starts = [first, second, third];
                    let mut bound = 0;
                    let mut feasible = true;

                    for var in 0..starts.len() {
                        bound = var + 1;
                        if !incremental.on_bind(var, &prefix(&starts, bound)) {
                            feasible = false;
                            break;
                        }
                    }

                    assert_eq!(
                        feasible,
                        deferred.check(&prefix(&starts, starts.len())),
                        "{starts:?}"
                    );

                    for var in (0..bound).rev() {
                        incremental.on_unbind(var, &prefix(&starts, var + 1));
                    }
                }
            }
        }

        assert!(incremental.usage.iter().flatten().all(|&used| used == 0));
    }
}
