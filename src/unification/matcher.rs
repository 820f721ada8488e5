//! Matching one pattern node against one fact node dispatches on the
//! pattern's shape: a variable binds the whole sub-fact, a tree
//! recurses key-wise, and a scalar must be equal.  Patterns are
//! submap-style: every pattern key must find a matching sub-fact, and
//! fact keys the pattern does not mention are ignored.

use super::Bindings;
use crate::ground::Term;

/// Matches `pattern` against `fact`, starting from an empty binding
/// map.  Returns the accumulated bindings (possibly empty, when the
/// pattern has no variables), or `None` when any part of the pattern
/// fails to match.
#[must_use]
pub fn bindings(pattern: &Term, fact: &Term) -> Option<Bindings> {
    match_term(pattern, fact, Bindings::new())
}

/// Matches `pattern` against `fact`, extending `cur`.  A variable that
/// is already bound in `cur` must agree with the sub-fact it would
/// capture here.
#[must_use]
pub fn match_term(pattern: &Term, fact: &Term, cur: Bindings) -> Option<Bindings> {
    match pattern {
        Term::Var(name) => cur.bind(name.clone(), fact.clone()),
        Term::Scalar(expected) => match fact {
            Term::Scalar(actual) if actual == expected => Some(cur),
            _ => None,
        },
        Term::Tree(entries) => {
            let fact_entries = match fact {
                Term::Tree(fact_entries) => fact_entries,
                _ => return None,
            };

            let mut acc = cur;
            for (key, sub_pattern) in entries {
                let sub_fact = fact_entries.get(key)?;
                acc = match_term(sub_pattern, sub_fact, acc)?;
            }

            Some(acc)
        }
    }
}

#[test]
fn test_single_binding() {
    use crate::ground::Symbol;

    // {foo {:var :bar}} against {foo 3} binds :bar to 3.
    let pattern = Term::tree([("foo", Term::var("bar"))]);
    let fact = Term::tree([("foo", Term::int(3))]);

    let expected: Bindings = [(Symbol::new("bar"), Term::int(3))].into_iter().collect();
    assert_eq!(bindings(&pattern, &fact), Some(expected));
}

#[test]
fn test_nested_bindings() {
    use crate::ground::Symbol;

    // Two variables at different depths bind independently.
    let pattern = Term::tree([
        ("foo", Term::tree([("baz", Term::var("bar"))])),
        ("bing", Term::var("quux")),
    ]);
    let fact = Term::tree([
        ("foo", Term::tree([("baz", Term::int(3))])),
        ("bing", Term::int(5)),
    ]);

    let expected: Bindings = [
        (Symbol::new("bar"), Term::int(3)),
        (Symbol::new("quux"), Term::int(5)),
    ]
    .into_iter()
    .collect();
    assert_eq!(bindings(&pattern, &fact), Some(expected));
}

#[test]
fn test_repeated_variable_conflict() {
    // The same variable in two positions must capture the same value.
    let pattern = Term::tree([("foo", Term::var("bar")), ("baz", Term::var("bar"))]);
    let fact = Term::tree([("foo", Term::int(3)), ("baz", Term::int(4))]);

    assert_eq!(bindings(&pattern, &fact), None);
}

#[test]
fn test_repeated_variable_agreement() {
    use crate::ground::Symbol;

    let pattern = Term::tree([("foo", Term::var("bar")), ("baz", Term::var("bar"))]);
    let fact = Term::tree([("foo", Term::int(3)), ("baz", Term::int(3))]);

    let expected: Bindings = [(Symbol::new("bar"), Term::int(3))].into_iter().collect();
    assert_eq!(bindings(&pattern, &fact), Some(expected));
}

#[test]
fn test_missing_key_fails() {
    let pattern = Term::tree([("foo", Term::var("bar"))]);
    let fact = Term::tree([("quux", Term::int(3))]);

    assert_eq!(bindings(&pattern, &fact), None);
}

#[test]
fn test_extra_fact_keys_are_ignored() {
    use crate::ground::Symbol;

    // Submap semantics: the pattern does not forbid keys it does not
    // mention.
    let pattern = Term::tree([("foo", Term::var("bar"))]);
    let fact = Term::tree([("foo", Term::int(3)), ("extra", Term::sym("noise"))]);

    let expected: Bindings = [(Symbol::new("bar"), Term::int(3))].into_iter().collect();
    assert_eq!(bindings(&pattern, &fact), Some(expected));
}

#[test]
fn test_variable_free_pattern_is_existence_check() {
    // A pattern with no variables matches with an empty binding map.
    let pattern = Term::tree([("sky", Term::sym("blue"))]);
    let fact = Term::tree([("sky", Term::sym("blue")), ("sea", Term::sym("green"))]);

    assert_eq!(bindings(&pattern, &fact), Some(Bindings::new()));
}

#[test]
fn test_scalar_mismatch() {
    let pattern = Term::tree([("sky", Term::sym("blue"))]);
    let fact = Term::tree([("sky", Term::sym("grey"))]);

    assert_eq!(bindings(&pattern, &fact), None);
}

#[test]
fn test_tree_pattern_against_scalar_fact() {
    // A structural mismatch is a failed match, not an error.
    let pattern = Term::tree([("foo", Term::tree([("baz", Term::var("bar"))]))]);
    let fact = Term::tree([("foo", Term::int(3))]);

    assert_eq!(bindings(&pattern, &fact), None);
}

#[test]
fn test_scalar_pattern_against_tree_fact() {
    let pattern = Term::tree([("foo", Term::int(3))]);
    let fact = Term::tree([("foo", Term::tree([("baz", Term::int(3))]))]);

    assert_eq!(bindings(&pattern, &fact), None);
}

#[test]
fn test_variable_captures_subtree() {
    use crate::ground::Symbol;

    // A variable may bind a whole subtree, not just a leaf.
    let pattern = Term::tree([("rect", Term::var("r"))]);
    let subtree = Term::tree([("width", Term::int(4)), ("height", Term::int(4))]);
    let fact = Term::tree([("rect", subtree.clone())]);

    let expected: Bindings = [(Symbol::new("r"), subtree)].into_iter().collect();
    assert_eq!(bindings(&pattern, &fact), Some(expected));
}
