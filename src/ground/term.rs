//! A term is either a scalar leaf, a symbol-keyed tree of sub-terms,
//! or a variable.  Facts are ground terms: trees whose reachable
//! leaves are all scalars.  Patterns are terms that may contain `Var`
//! nodes at any depth.
//!
//! `Var` is a distinct variant in memory; external data encodes a
//! variable as the literal one-entry tree `{var: <name>}`, and the
//! wire layer converts between the two forms at the boundary.

use super::{Scalar, Symbol};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A fact, pattern, or any sub-structure of either.
///
/// Trees are `BTreeMap`s so that equality, hashing, and ordering
/// ignore insertion order, and so that sets of terms (and of binding
/// maps) have a canonical representation.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    Scalar(Scalar),
    Tree(BTreeMap<Symbol, Term>),
    Var(Symbol),
}

impl Term {
    /// Returns an integer leaf.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Term::Scalar(Scalar::Int(value))
    }

    /// Returns a string leaf.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Term::Scalar(Scalar::Str(value.into()))
    }

    /// Returns a symbolic-name leaf.
    #[must_use]
    pub fn sym(name: &str) -> Self {
        Term::Scalar(Scalar::Sym(Symbol::new(name)))
    }

    /// Returns a boolean leaf.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Term::Scalar(Scalar::Bool(value))
    }

    /// Returns the variable named `name`.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Term::Var(Symbol::new(name))
    }

    /// Returns a tree with the given entries.  Later entries win when
    /// a key repeats.
    #[must_use]
    pub fn tree<K, I>(entries: I) -> Self
    where
        K: Into<Symbol>,
        I: IntoIterator<Item = (K, Term)>,
    {
        Term::Tree(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Returns true iff this node is a variable.
    #[must_use]
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Returns true iff no variable occurs at any depth of this term.
    /// Facts must be ground; binding values always are.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Scalar(_) => true,
            Term::Var(_) => false,
            Term::Tree(entries) => entries.values().all(Term::is_ground),
        }
    }

    /// Inserts the names of all variables under this term into `dst`.
    #[must_use]
    pub fn insert_variables(&self, mut dst: BTreeSet<Symbol>) -> BTreeSet<Symbol> {
        match self {
            Term::Scalar(_) => (),
            Term::Var(name) => {
                dst.insert(name.clone());
            }
            Term::Tree(entries) => {
                for value in entries.values() {
                    dst = value.insert_variables(dst);
                }
            }
        }

        dst
    }
}

impl From<Scalar> for Term {
    fn from(scalar: Scalar) -> Self {
        Term::Scalar(scalar)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Scalar(scalar) => write!(f, "{}", scalar),
            Term::Var(name) => write!(f, "{{:var {}}}", name),
            Term::Tree(entries) => {
                write!(f, "{{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{} {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[test]
fn test_equality_ignores_entry_order() {
    let forward = Term::tree([("foo", Term::int(3)), ("bar", Term::int(5))]);
    let backward = Term::tree([("bar", Term::int(5)), ("foo", Term::int(3))]);

    assert_eq!(forward, backward);

    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut h0 = DefaultHasher::new();
    let mut h1 = DefaultHasher::new();
    forward.hash(&mut h0);
    backward.hash(&mut h1);
    assert_eq!(h0.finish(), h1.finish());
}

#[test]
fn test_is_var() {
    assert!(Term::var("x").is_var());
    assert!(!Term::sym("x").is_var());
    assert!(!Term::tree([("var", Term::sym("x"))]).is_var());
}

#[test]
fn test_is_ground() {
    let fact = Term::tree([
        ("foo", Term::tree([("baz", Term::int(3))])),
        ("bing", Term::string("five")),
    ]);
    assert!(fact.is_ground());

    let pattern = Term::tree([("foo", Term::tree([("baz", Term::var("bar"))]))]);
    assert!(!pattern.is_ground());
    assert!(!Term::var("x").is_ground());
}

#[test]
fn test_insert_variables() {
    let pattern = Term::tree([
        ("foo", Term::tree([("baz", Term::var("bar"))])),
        ("bing", Term::var("quux")),
        ("sky", Term::sym("blue")),
    ]);

    let expected: BTreeSet<Symbol> = [Symbol::new("bar"), Symbol::new("quux")]
        .iter()
        .cloned()
        .collect();
    assert_eq!(pattern.insert_variables(BTreeSet::new()), expected);

    // A pre-initialised accumulator keeps its contents.
    let seeded = pattern.insert_variables([Symbol::new("w")].iter().cloned().collect());
    assert_eq!(seeded.len(), 3);
}

#[test]
fn test_display() {
    let term = Term::tree([
        ("foo", Term::tree([("baz", Term::var("bar"))])),
        ("bing", Term::int(5)),
    ]);

    assert_eq!(term.to_string(), "{:bing 5, :foo {:baz {:var :bar}}}");
}
