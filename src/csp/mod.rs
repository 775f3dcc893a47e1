//! Finite-domain constraint satisfaction.
//!
//! A [`Problem`] holds integer variables with finite domains and constraints over them.
//! [`Problem::solutions`] enumerates every assignment satisfying all constraints by
//! depth-first backtracking, checking each constraint as soon as its scope is bound.

mod assignment;
mod cancel;
mod constraint;
mod search;

pub use assignment::Assignment;
pub use cancel::{CancelToken, Cancelled};
pub use constraint::{binary, unary, Constraint, Predicate};
pub use search::{Search, SearchStats};

/// Index of a variable in its problem.
pub type VarId = usize;

/// Value of a variable.
pub type Value = u64;

/// A constraint satisfaction problem over integer variables.
#[derive(Debug, Default)]
pub struct Problem {
    domains: Vec<Vec<Value>>,
    constraints: Vec<Box<dyn Constraint>>,
    watchers: Vec<Vec<usize>>,
}

impl Problem {
    /// Creates an empty problem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable with the given domain. Values are tried in the given order.
    pub fn add_variable(&mut self, domain: impl IntoIterator<Item = Value>) -> VarId {
        self.domains.push(domain.into_iter().collect());
        self.watchers.push(Vec::new());
        self.domains.len() - 1
    }

    /// Adds a constraint.
    ///
    /// # Panics
    /// - If the scope references a variable that was not added.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) {
        let index = self.constraints.len();

        for &var in constraint.scope() {
            assert!(var < self.domains.len(), "Unknown variable {var} in scope");
            if self.watchers[var].last() != Some(&index) {
                self.watchers[var].push(index);
            }
        }

        self.constraints.push(Box::new(constraint));
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn variables_len(&self) -> usize {
        self.domains.len()
    }

    /// Returns the number of constraints.
    #[must_use]
    pub fn constraints_len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the remaining domain of a variable.
    #[must_use]
    pub fn domain(&self, var: VarId) -> &[Value] {
        &self.domains[var]
    }

    /// Returns a lazy enumeration of every feasible assignment.
    /// Calling it again restarts the enumeration from the beginning.
    pub fn solutions(&mut self, cancel: &CancelToken) -> Search<'_> {
        self.prune_unary();

        for constraint in &mut self.constraints {
            constraint.prepare(&self.domains);
        }

        Search::new(self, cancel.clone())
    }

    /// Removes domain values rejected by constraints over a single variable.
    fn prune_unary(&mut self) {
        let mut scratch = Assignment::new(self.domains.len());

        for constraint in &self.constraints {
            if let &[var] = constraint.scope() {
                self.domains[var].retain(|&value| {
                    scratch.bind(var, value);
                    let keep = constraint.check(&scratch);
                    scratch.unbind(var);
                    keep
                });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unary_constraints_prune_domains() {
        let mut problem = Problem::new();
        let x = problem.add_variable(0..5);
        problem.add_constraint(unary("even", x, |value| value % 2 == 0));

        let solutions: Vec<_> = problem
            .solutions(&CancelToken::new())
            .collect::<Result<_, _>>()
            .unwrap_or_default();

        assert_eq!(problem.domain(x), &[0, 2, 4]);
        assert_eq!(solutions.len(), 3);
    }

    #[test]
    #[should_panic(expected = "Unknown variable 3 in scope")]
    fn unknown_variable_in_scope() {
        let mut problem = Problem::new();
        problem.add_variable(0..2);
        problem.add_constraint(binary("pair", 0, 3, |_, _| true));
    }
}
