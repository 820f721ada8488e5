//! A binding map records the ground value each variable matched.  The
//! merge operation is the engine's only consistency check: a variable
//! may be bound any number of times, but always to the same value.

use crate::ground::{Symbol, Term};
use std::collections::BTreeMap;
use std::fmt;

/// A mapping from variable name to the ground term it is bound to.
///
/// Binding maps are ordered and hashable so that sets of them
/// deduplicate structurally; an empty map is a successful result,
/// distinct from the `None` a failed merge or match produces.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bindings(BTreeMap<Symbol, Term>);

impl Bindings {
    /// Returns an empty binding map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &Symbol) -> Option<&Term> {
        self.0.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Term)> {
        self.0.iter()
    }

    /// Binds `name` to `value`.  Returns the extended map, or `None`
    /// when `name` is already bound to a different value.
    #[must_use]
    pub fn bind(mut self, name: Symbol, value: Term) -> Option<Self> {
        if let Some(previous) = self.0.get(&name) {
            if *previous == value {
                return Some(self);
            }

            return None;
        }

        self.0.insert(name, value);
        Some(self)
    }

    /// Folds every entry of `other` into `self` with [`Bindings::bind`].
    /// Returns `None` when the two maps disagree on any variable.
    #[must_use]
    pub fn merge(self, other: &Bindings) -> Option<Self> {
        let mut merged = self;

        for (name, value) in other.iter() {
            merged = merged.bind(name.clone(), value.clone())?;
        }

        Some(merged)
    }
}

impl FromIterator<(Symbol, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (Symbol, Term)>>(entries: I) -> Self {
        Self(entries.into_iter().collect())
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{} {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[test]
fn test_bind_fresh() {
    let bound = Bindings::new()
        .bind(Symbol::new("x"), Term::int(3))
        .expect("ok");

    assert_eq!(bound.get(&Symbol::new("x")), Some(&Term::int(3)));
    assert_eq!(bound.len(), 1);
}

#[test]
fn test_bind_agreeing_rebind() {
    let bound = Bindings::new()
        .bind(Symbol::new("x"), Term::int(3))
        .expect("ok")
        .bind(Symbol::new("x"), Term::int(3))
        .expect("same value must merge");

    assert_eq!(bound.len(), 1);
}

#[test]
fn test_bind_conflict() {
    let result = Bindings::new()
        .bind(Symbol::new("x"), Term::int(3))
        .expect("ok")
        .bind(Symbol::new("x"), Term::int(4));

    assert_eq!(result, None);
}

#[test]
fn test_merge_happy_path() {
    let left: Bindings = [(Symbol::new("x"), Term::int(3))].into_iter().collect();
    let right: Bindings = [
        (Symbol::new("x"), Term::int(3)),
        (Symbol::new("y"), Term::string("socrates")),
    ]
    .into_iter()
    .collect();

    let merged = left.merge(&right).expect("consistent maps must merge");
    assert_eq!(merged.len(), 2);
    assert_eq!(
        merged.get(&Symbol::new("y")),
        Some(&Term::string("socrates"))
    );
}

#[test]
fn test_merge_conflict() {
    let left: Bindings = [(Symbol::new("x"), Term::int(3))].into_iter().collect();
    let right: Bindings = [(Symbol::new("x"), Term::int(4))].into_iter().collect();

    assert_eq!(left.merge(&right), None);
}

#[test]
fn test_empty_success_is_not_failure() {
    // A merge of empty maps succeeds with an empty map; failure is a
    // distinct value.
    let merged = Bindings::new().merge(&Bindings::new());
    assert_eq!(merged, Some(Bindings::new()));
    assert_ne!(merged, None);
}

#[test]
fn test_display() {
    let bound: Bindings = [
        (Symbol::new("bar"), Term::int(3)),
        (Symbol::new("quux"), Term::int(5)),
    ]
    .into_iter()
    .collect();

    assert_eq!(bound.to_string(), "{:bar 3, :quux 5}");
}
