//! The core of the rule engine is matching a *conjunction* of premise
//! patterns against the fact set.  Each premise independently yields a
//! set of candidate binding maps; a globally consistent binding is a
//! choice of one candidate per premise whose maps all agree on every
//! shared variable.  We enumerate the Cartesian product of the
//! per-premise candidate sets one tuple at a time and fold each tuple
//! through the binding merge, dropping tuples that disagree.
//!
//! Premises with no variables act as existence checks: they must match
//! at least one fact for the conjunction to be satisfiable at all, but
//! they contribute no rows of their own, and a merged map that comes
//! out empty is dropped from the result.

use crate::ground::Term;
use crate::unification::{bindings, Bindings};
use std::collections::BTreeSet;

/// Matches `pattern` against every fact, collecting the binding maps
/// of the successful matches.  No fact matching at all yields the
/// empty set, which is distinct from a match with empty bindings.
pub fn matches_over<'a, I>(pattern: &Term, facts: I) -> BTreeSet<Bindings>
where
    I: IntoIterator<Item = &'a Term>,
{
    facts
        .into_iter()
        .filter_map(|fact| bindings(pattern, fact))
        .collect()
}

/// Returns every globally consistent binding map across `patterns`:
/// for each way of picking one successful match per pattern, the merge
/// of the picked binding maps, when they agree.
///
/// The result is empty when any pattern matches no fact (the
/// conjunction is unsatisfiable), and never contains an empty map.
pub fn all_bindings<'a, P, F>(patterns: P, facts: F) -> BTreeSet<Bindings>
where
    P: IntoIterator<Item = &'a Term>,
    F: IntoIterator<Item = &'a Term>,
    F::IntoIter: Clone,
{
    let facts = facts.into_iter();
    let per_pattern: Vec<Vec<Bindings>> = patterns
        .into_iter()
        .map(|pattern| matches_over(pattern, facts.clone()).into_iter().collect())
        .collect();

    if per_pattern.iter().any(Vec::is_empty) {
        return BTreeSet::new();
    }

    let mut result = BTreeSet::new();

    // Walk the Cartesian product odometer-style: `cursor[i]` indexes
    // into `per_pattern[i]`, and the rightmost position advances
    // fastest.  The tuple fold short-circuits on the first
    // disagreement.
    let mut cursor = vec![0usize; per_pattern.len()];
    loop {
        let mut merged = Some(Bindings::new());
        for (slot, rows) in cursor.iter().zip(per_pattern.iter()) {
            merged = merged.and_then(|acc| acc.merge(&rows[*slot]));
            if merged.is_none() {
                break;
            }
        }

        if let Some(joined) = merged {
            if !joined.is_empty() {
                result.insert(joined);
            }
        }

        let mut index = cursor.len();
        loop {
            if index == 0 {
                return result;
            }

            index -= 1;
            cursor[index] += 1;
            if cursor[index] < per_pattern[index].len() {
                break;
            }

            cursor[index] = 0;
        }
    }
}

#[test]
fn test_matches_over_collects_each_match() {
    use crate::ground::Symbol;

    let pattern = Term::tree([("man", Term::var("x"))]);
    let facts = vec![
        Term::tree([("man", Term::string("socrates"))]),
        Term::tree([("man", Term::string("plato"))]),
        Term::tree([("sky", Term::sym("blue"))]),
    ];

    let expected: BTreeSet<Bindings> = [
        [(Symbol::new("x"), Term::string("socrates"))]
            .into_iter()
            .collect(),
        [(Symbol::new("x"), Term::string("plato"))]
            .into_iter()
            .collect(),
    ]
    .into_iter()
    .collect();
    assert_eq!(matches_over(&pattern, &facts), expected);
}

#[test]
fn test_matches_over_no_match_is_empty() {
    let pattern = Term::tree([("cat", Term::var("x"))]);
    let facts = vec![Term::tree([("man", Term::string("socrates"))])];

    assert!(matches_over(&pattern, &facts).is_empty());
}

#[test]
fn test_existence_pattern_gates_the_join() {
    use crate::ground::Symbol;

    // {sky :blue} has no variables: it contributes no rows, but the
    // join only produces anything when it matches at least one fact.
    let patterns = vec![
        Term::tree([("sky", Term::sym("blue"))]),
        Term::tree([("man", Term::var("x"))]),
    ];
    let facts = vec![
        Term::tree([("man", Term::string("socrates"))]),
        Term::tree([("man", Term::string("plato"))]),
        Term::tree([("sky", Term::sym("blue"))]),
    ];

    let expected: BTreeSet<Bindings> = [
        [(Symbol::new("x"), Term::string("socrates"))]
            .into_iter()
            .collect(),
        [(Symbol::new("x"), Term::string("plato"))]
            .into_iter()
            .collect(),
    ]
    .into_iter()
    .collect();
    assert_eq!(all_bindings(&patterns, &facts), expected);

    // Without {sky :blue} in the facts, the conjunction is
    // unsatisfiable.
    let cloudy: Vec<Term> = facts
        .iter()
        .filter(|fact| **fact != Term::tree([("sky", Term::sym("blue"))]))
        .cloned()
        .collect();
    assert!(all_bindings(&patterns, &cloudy).is_empty());
}

#[test]
fn test_join_drops_disagreeing_tuples() {
    use crate::ground::Symbol;

    // Both premises bind :x; only picks that agree survive.
    let patterns = vec![
        Term::tree([("walks", Term::var("x"))]),
        Term::tree([("quacks", Term::var("x"))]),
    ];
    let facts = vec![
        Term::tree([("walks", Term::string("dolan"))]),
        Term::tree([("walks", Term::string("daffy"))]),
        Term::tree([("quacks", Term::string("dolan"))]),
    ];

    let expected: BTreeSet<Bindings> = [[(Symbol::new("x"), Term::string("dolan"))]
        .into_iter()
        .collect()]
    .into_iter()
    .collect();
    assert_eq!(all_bindings(&patterns, &facts), expected);
}

#[test]
fn test_join_of_variable_free_patterns_is_empty() {
    // Every premise matches, but none binds anything: the merged maps
    // are all empty and the result set stays empty.
    let patterns = vec![
        Term::tree([("sky", Term::sym("blue"))]),
        Term::tree([("sea", Term::sym("green"))]),
    ];
    let facts = vec![
        Term::tree([("sky", Term::sym("blue"))]),
        Term::tree([("sea", Term::sym("green"))]),
    ];

    assert!(all_bindings(&patterns, &facts).is_empty());
}

#[test]
fn test_join_deduplicates() {
    use crate::ground::Symbol;

    // Two facts produce the same binding for the first premise; the
    // result is still a single row.
    let patterns = vec![Term::tree([("age", Term::var("n"))])];
    let facts = vec![
        Term::tree([("age", Term::int(7)), ("name", Term::string("a"))]),
        Term::tree([("age", Term::int(7)), ("name", Term::string("b"))]),
    ];

    let expected: BTreeSet<Bindings> = [[(Symbol::new("n"), Term::int(7))].into_iter().collect()]
        .into_iter()
        .collect();
    assert_eq!(all_bindings(&patterns, &facts), expected);
}

#[test]
fn test_join_cross_product_of_independent_variables() {
    // Premises with disjoint variables multiply.
    let patterns = vec![
        Term::tree([("man", Term::var("x"))]),
        Term::tree([("city", Term::var("y"))]),
    ];
    let facts = vec![
        Term::tree([("man", Term::string("socrates"))]),
        Term::tree([("man", Term::string("plato"))]),
        Term::tree([("city", Term::string("athens"))]),
        Term::tree([("city", Term::string("sparta"))]),
    ];

    assert_eq!(all_bindings(&patterns, &facts).len(), 4);
}
