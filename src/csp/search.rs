use super::{Assignment, CancelToken, Cancelled, Problem, Value, VarId};
use log::debug;
use serde::Serialize;

/// Counters of a search.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SearchStats {
    /// Number of attempted bindings.
    pub nodes: u64,
    /// Number of times a variable ran out of values.
    pub backtracks: u64,
    /// Number of feasible assignments produced.
    pub solutions: u64,
}

/// Depth-first backtracking over the variables of a problem in index order.
///
/// Yields every feasible complete assignment in lexicographic order of domain positions.
/// Yields `Err(Cancelled)` once and stops if the token is cancelled. Dropping the search
/// unbinds everything, so the problem can be searched again.
#[derive(Debug)]
pub struct Search<'a> {
    problem: &'a mut Problem,
    cancel: CancelToken,
    assignment: Assignment,
    cursor: Vec<usize>,
    bound: Vec<bool>,
    depth: usize,
    finished: bool,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    pub(super) fn new(problem: &'a mut Problem, cancel: CancelToken) -> Self {
        let len = problem.variables_len();
        Self {
            problem,
            cancel,
            assignment: Assignment::new(len),
            cursor: vec![0; len],
            bound: vec![false; len],
            depth: 0,
            finished: false,
            stats: SearchStats::default(),
        }
    }

    /// Returns the counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Binds the variable and notifies its constraints. Undoes everything on rejection.
    fn bind(&mut self, var: VarId, value: Value) -> bool {
        self.stats.nodes += 1;
        self.assignment.bind(var, value);

        let Problem {
            constraints,
            watchers,
            ..
        } = &mut *self.problem;
        let watchers = &watchers[var];

        for (notified, &index) in watchers.iter().enumerate() {
            if !constraints[index].on_bind(var, &self.assignment) {
                for &index in watchers[..=notified].iter().rev() {
                    constraints[index].on_unbind(var, &self.assignment);
                }
                self.assignment.unbind(var);
                return false;
            }
        }

        true
    }

    fn unbind(&mut self, var: VarId) {
        let Problem {
            constraints,
            watchers,
            ..
        } = &mut *self.problem;

        for &index in watchers[var].iter().rev() {
            constraints[index].on_unbind(var, &self.assignment);
        }
        self.assignment.unbind(var);
    }

    fn finish(&mut self) {
        for var in (0..self.bound.len()).rev() {
            if self.bound[var] {
                self.unbind(var);
                self.bound[var] = false;
            }
        }

        if !self.finished {
            self.finished = true;
            debug!(
                "Search finished: {} nodes, {} backtracks, {} solutions",
                self.stats.nodes, self.stats.backtracks, self.stats.solutions
            );
        }
    }
}

impl Iterator for Search<'_> {
    type Item = Result<Assignment, Cancelled>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let len = self.bound.len();
        if len == 0 {
            self.stats.solutions += 1;
            self.finish();
            return Some(Ok(self.assignment.clone()));
        }

        loop {
            if self.cancel.is_cancelled() {
                self.finish();
                return Some(Err(Cancelled));
            }

            let var = self.depth;
            if self.bound[var] {
                self.unbind(var);
                self.bound[var] = false;
            }

            let Some(&value) = self.problem.domains[var].get(self.cursor[var]) else {
                self.cursor[var] = 0;
                if var == 0 {
                    self.finish();
                    return None;
                }
                self.stats.backtracks += 1;
                self.depth -= 1;
                continue;
            };
            self.cursor[var] += 1;

            if self.bind(var, value) {
                self.bound[var] = true;
                if var + 1 == len {
                    self.stats.solutions += 1;
                    return Some(Ok(self.assignment.clone()));
                }
                self.depth += 1;
            }
        }
    }
}

impl Drop for Search<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod test {
    use super::super::{binary, unary, Constraint};
    use super::*;

    fn values(assignment: &Assignment) -> Vec<Value> {
        assignment.bound().map(|(_, value)| value).collect()
    }

    fn collect(problem: &mut Problem) -> Vec<Vec<Value>> {
        problem
            .solutions(&CancelToken::new())
            .map(|solution| solution.map(|assignment| values(&assignment)))
            .collect::<Result<_, _>>()
            .unwrap_or_default()
    }

    #[test]
    fn enumerates_in_domain_order() {
        let mut problem = Problem::new();
        let x = problem.add_variable(0..3);
        let y = problem.add_variable(0..3);
        problem.add_constraint(binary("less", x, y, |a, b| a < b));

        assert_eq!(
            collect(&mut problem),
            vec![vec![0, 1], vec![0, 2], vec![1, 2]]
        );
    }

    #[test]
    fn empty_problem_has_one_solution() {
        let mut problem = Problem::new();
        assert_eq!(collect(&mut problem), vec![Vec::<Value>::new()]);
    }

    #[test]
    fn empty_domain_has_no_solution() {
        let mut problem = Problem::new();
        let x = problem.add_variable(0..3);
        problem.add_variable(0..0);
        problem.add_constraint(unary("any", x, |_| true));

        assert!(collect(&mut problem).is_empty());
    }

    #[test]
    fn search_is_restartable() {
        let mut problem = Problem::new();
        let x = problem.add_variable(0..4);
        let y = problem.add_variable(0..4);
        problem.add_constraint(binary("sum", x, y, |a, b| a + b == 3));

        let first = collect(&mut problem);
        {
            let mut partial = problem.solutions(&CancelToken::new());
            assert!(partial.next().is_some());
        }
        assert_eq!(collect(&mut problem), first);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn cancelled_search_stops() {
        let mut problem = Problem::new();
        problem.add_variable(0..10);

        let cancel = CancelToken::new();
        cancel.cancel();

        let mut search = problem.solutions(&cancel);
        assert_eq!(search.next(), Some(Err(Cancelled)));
        assert_eq!(search.next(), None);
    }

    /// Counts how many of its variables are bound, rejecting more than `limit` equal to 1.
    #[derive(Debug)]
    struct AtMostOnes {
        scope: Vec<VarId>,
        limit: usize,
        ones: usize,
    }

    impl Constraint for AtMostOnes {
        fn scope(&self) -> &[VarId] {
            &self.scope
        }

        fn check(&self, assignment: &Assignment) -> bool {
            self.scope
                .iter()
                .filter(|&&var| assignment.get(var) == Some(1))
                .count()
                <= self.limit
        }

        fn on_bind(&mut self, var: VarId, assignment: &Assignment) -> bool {
            if assignment.get(var) == Some(1) {
                self.ones += 1;
            }
            self.ones <= self.limit
        }

        fn on_unbind(&mut self, var: VarId, assignment: &Assignment) {
            if assignment.get(var) == Some(1) {
                self.ones -= 1;
            }
        }
    }

    #[test]
    fn incremental_constraint_state_is_restored() {
        let mut problem = Problem::new();
        let scope: Vec<_> = (0..4).map(|_| problem.add_variable(0..2)).collect();
        problem.add_constraint(AtMostOnes {
            scope,
            limit: 2,
            ones: 0,
        });

        let solutions = collect(&mut problem);
        assert_eq!(solutions.len(), 11);
        assert!(solutions
            .iter()
            .all(|values| values.iter().filter(|&&value| value == 1).count() <= 2));

        assert_eq!(collect(&mut problem), solutions);
    }

    #[test]
    fn stats_are_counted() {
        let mut problem = Problem::new();
        let x = problem.add_variable(0..2);
        let y = problem.add_variable(0..2);
        problem.add_constraint(binary("differ", x, y, |a, b| a != b));

        let mut search = problem.solutions(&CancelToken::new());
        let count = search.by_ref().count();
        let stats = search.stats();

        assert_eq!(count, 2);
        assert_eq!(stats.solutions, 2);
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.backtracks, 2);
    }
}
