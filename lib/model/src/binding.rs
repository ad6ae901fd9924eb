use itertools::Itertools;
use oxrdf::{Term, Variable};
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// An assignment of variables to ground terms.
///
/// Bindings are produced by evaluating a graph pattern and consumed when instantiating the
/// templates of a pattern-driven update. A binding can also be supplied by the caller to seed the
/// evaluation of an update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    values: FxHashMap<Variable, Term>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.values.get(variable)
    }

    /// Binds `variable` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, variable: Variable, value: Term) -> Option<Term> {
        self.values.insert(variable, value)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter()
    }

    /// Returns whether every variable bound in both bindings is bound to the same term.
    pub fn is_compatible(&self, other: &Binding) -> bool {
        self.values
            .iter()
            .all(|(variable, value)| other.get(variable).map_or(true, |o| o == value))
    }

    /// Merges two compatible bindings. Returns [None] if the bindings disagree on a variable.
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        if !self.is_compatible(other) {
            return None;
        }
        let mut result = self.clone();
        for (variable, value) in other.iter() {
            result.values.insert(variable.clone(), value.clone());
        }
        Some(result)
    }

    /// Restricts this binding to the given variables.
    #[must_use]
    pub fn project(&self, variables: &[Variable]) -> Binding {
        variables
            .iter()
            .filter_map(|v| self.get(v).map(|t| (v.clone(), t.clone())))
            .collect()
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Binding {
    type Item = (&'a Variable, &'a Term);
    type IntoIter = std::collections::hash_map::Iter<'a, Variable, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entries = self
            .values
            .iter()
            .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
            .map(|(variable, value)| format!("{variable} -> {value}"))
            .join(", ");
        write!(f, "{{{entries}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn iri(value: &str) -> Term {
        NamedNode::new_unchecked(value).into()
    }

    #[test]
    fn merge_compatible_bindings() {
        let left: Binding = [(var("s"), iri("http://example.com/s"))].into_iter().collect();
        let right: Binding = [
            (var("s"), iri("http://example.com/s")),
            (var("o"), Literal::from(1).into()),
        ]
        .into_iter()
        .collect();

        let merged = left.merge(&right).unwrap();
        assert_eq!(merged.len(), 2);
        insta::assert_snapshot!(merged, @r#"{?o -> "1"^^<http://www.w3.org/2001/XMLSchema#integer>, ?s -> <http://example.com/s>}"#);
    }

    #[test]
    fn merge_incompatible_bindings() {
        let left: Binding = [(var("s"), iri("http://example.com/a"))].into_iter().collect();
        let right: Binding = [(var("s"), iri("http://example.com/b"))].into_iter().collect();
        assert!(left.merge(&right).is_none());
    }

    #[test]
    fn project_drops_other_variables() {
        let binding: Binding = [
            (var("a"), iri("http://example.com/a")),
            (var("b"), iri("http://example.com/b")),
        ]
        .into_iter()
        .collect();
        let projected = binding.project(&[var("b"), var("c")]);
        assert_eq!(projected.len(), 1);
        assert!(projected.contains(&var("b")));
    }
}
