use super::{Assignment, Value, VarId};
use std::fmt::{Debug, Formatter};

/// A constraint over a scope of variables.
///
/// The search calls [`Constraint::on_bind`] on every constraint whose scope contains a
/// variable right after binding it, and [`Constraint::on_unbind`] in reverse order right
/// before unbinding it, for every constraint `on_bind` was called on, whatever it returned.
/// Constraints that keep incremental state rely on this pairing.
pub trait Constraint: Debug {
    /// Returns the variables the constraint depends on.
    fn scope(&self) -> &[VarId];

    /// Returns whether the constraint holds. Only called with the whole scope bound.
    fn check(&self, assignment: &Assignment) -> bool;

    /// Called once before the search starts with the domains it will iterate.
    fn prepare(&mut self, _domains: &[Vec<Value>]) {}

    /// Called after `var` was bound. Returns `false` to reject the binding.
    /// By default the constraint is deferred until its whole scope is bound.
    fn on_bind(&mut self, _var: VarId, assignment: &Assignment) -> bool {
        !assignment.all_bound(self.scope()) || self.check(assignment)
    }

    /// Called before `var` is unbound, while its value is still in the assignment.
    fn on_unbind(&mut self, _var: VarId, _assignment: &Assignment) {}
}

/// A constraint given by a predicate over the values of its scope, in scope order.
pub struct Predicate<F> {
    name: &'static str,
    scope: Vec<VarId>,
    predicate: F,
}

impl<F: Fn(&[Value]) -> bool> Predicate<F> {
    /// Creates a new predicate constraint.
    #[must_use]
    pub fn new(name: &'static str, scope: Vec<VarId>, predicate: F) -> Self {
        Self {
            name,
            scope,
            predicate,
        }
    }
}

impl<F> Debug for Predicate<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(&[Value]) -> bool> Constraint for Predicate<F> {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let values: Option<Vec<_>> = self.scope.iter().map(|&var| assignment.get(var)).collect();
        values.is_some_and(|values| (self.predicate)(&values))
    }
}

/// Creates a constraint over a single variable.
pub fn unary(
    name: &'static str,
    var: VarId,
    predicate: impl Fn(Value) -> bool,
) -> Predicate<impl Fn(&[Value]) -> bool> {
    Predicate::new(name, vec![var], move |values: &[Value]| predicate(values[0]))
}

/// Creates a constraint over an ordered pair of variables.
pub fn binary(
    name: &'static str,
    first: VarId,
    second: VarId,
    predicate: impl Fn(Value, Value) -> bool,
) -> Predicate<impl Fn(&[Value]) -> bool> {
    Predicate::new(name, vec![first, second], move |values: &[Value]| {
        predicate(values[0], values[1])
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn predicate_is_deferred_until_scope_bound() {
        let mut constraint = binary("less", 0, 1, |a, b| a < b);
        let mut assignment = Assignment::new(2);

        assignment.bind(0, 5);
        assert!(constraint.on_bind(0, &assignment));

        assignment.bind(1, 3);
        assert!(!constraint.on_bind(1, &assignment));

        assignment.bind(1, 6);
        assert!(constraint.on_bind(1, &assignment));
    }

    #[test]
    fn check_requires_whole_scope() {
        let constraint = unary("any", 1, |_| true);
        let mut assignment = Assignment::new(2);
        assert!(!constraint.check(&assignment));

        assignment.bind(1, 0);
        assert!(constraint.check(&assignment));
        assert_eq!(constraint.scope(), &[1]);
    }
}
