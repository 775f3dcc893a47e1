use super::{Value, VarId};

/// Values bound to the variables of a problem. Unbound variables hold nothing.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Assignment {
    values: Vec<Option<Value>>,
}

impl Assignment {
    /// Creates an assignment with every one of `len` variables unbound.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// Returns the value of the variable, if bound.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<Value> {
        self.values.get(var).copied().flatten()
    }

    #[must_use]
    pub fn is_bound(&self, var: VarId) -> bool {
        self.get(var).is_some()
    }

    /// Returns whether every variable of the scope is bound.
    #[must_use]
    pub fn all_bound(&self, scope: &[VarId]) -> bool {
        scope.iter().all(|&var| self.is_bound(var))
    }

    /// Returns whether every variable is bound.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the bound variables with their values, ordered by variable.
    pub fn bound(&self) -> impl Iterator<Item = (VarId, Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(var, value)| value.map(|value| (var, value)))
    }

    pub(super) fn bind(&mut self, var: VarId, value: Value) {
        self.values[var] = Some(value);
    }

    pub(super) fn unbind(&mut self, var: VarId) {
        self.values[var] = None;
    }
}

impl FromIterator<Option<Value>> for Assignment {
    fn from_iter<I: IntoIterator<Item = Option<Value>>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binding_tracks_scope() {
        let mut assignment = Assignment::new(3);
        assert!(!assignment.is_complete());

        assignment.bind(0, 4);
        assignment.bind(2, 1);
        assert!(assignment.all_bound(&[0, 2]));
        assert!(!assignment.all_bound(&[0, 1]));
        assert_eq!(assignment.bound().collect::<Vec<_>>(), vec![(0, 4), (2, 1)]);

        assignment.bind(1, 0);
        assert!(assignment.is_complete());

        assignment.unbind(0);
        assert_eq!(assignment.get(0), None);
        assert_eq!(assignment.get(7), None);
    }
}
