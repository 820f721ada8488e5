//! Randomized checks of the engine's quantified laws: matching and
//! substitution invert each other, joins only produce consistent
//! rows, inference steps are monotone, the closure is a fixed point,
//! and neither fact nor rule ordering is observable in results.

use arbor_logic::{
    all_bindings, bindings, infer_all, infer_step, substitute, KnowledgeBase, Rule, Symbol, Term,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn key() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(vec!["foo", "bar", "baz", "quux"])
}

/// A small ground tree: integer leaves under one or two levels of
/// symbol keys drawn from a fixed pool, so that independently drawn
/// facts collide often enough for matches to happen.
fn fact() -> impl Strategy<Value = Term> {
    let leaf = (0i64..4).prop_map(Term::int);
    let node = leaf.prop_recursive(2, 8, 3, |inner| {
        proptest::collection::btree_map(key().prop_map(Symbol::new), inner, 1..3)
            .prop_map(Term::Tree)
    });

    proptest::collection::btree_map(key().prop_map(Symbol::new), node, 1..4).prop_map(Term::Tree)
}

/// Replaces the leaves of `term` selected by `seed` with fresh,
/// distinct variables.  The result always matches `term`.
fn patternize(term: &Term, seed: u64, counter: &mut u32) -> Term {
    match term {
        Term::Tree(entries) => Term::Tree(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), patternize(value, seed, counter)))
                .collect(),
        ),
        leaf => {
            let index = *counter;
            *counter += 1;

            if (seed >> (index % 64)) & 1 == 1 {
                Term::Var(Symbol::new(&format!("v{}", index)))
            } else {
                leaf.clone()
            }
        }
    }
}

/// Drops the tree entries of `term` selected by `seed`, yielding a
/// submap at every depth.
fn prune(term: &Term, seed: u64, counter: &mut u32) -> Term {
    match term {
        Term::Tree(entries) => {
            let mut kept = BTreeMap::new();
            for (key, value) in entries {
                let index = *counter;
                *counter += 1;

                let pruned = prune(value, seed, counter);
                if (seed >> (index % 64)) & 1 == 1 {
                    kept.insert(key.clone(), pruned);
                }
            }

            Term::Tree(kept)
        }
        leaf => leaf.clone(),
    }
}

fn chain_rule(from: &str, to: &str) -> Rule {
    Rule::implies(
        vec![Term::tree([(from, Term::var("x"))])],
        vec![Term::tree([(to, Term::var("x"))])],
    )
    .expect("chain rules are well formed")
}

fn chain_kb(facts: &BTreeSet<Term>, links: &[(&'static str, &'static str)]) -> KnowledgeBase {
    let rules: Vec<Rule> = links.iter().map(|(from, to)| chain_rule(from, to)).collect();
    KnowledgeBase::new(facts.iter().cloned(), rules).expect("facts are ground")
}

fn chain_facts() -> impl Strategy<Value = BTreeSet<Term>> {
    proptest::collection::btree_set(
        (key(), 0i64..3).prop_map(|(name, value)| Term::tree([(name, Term::int(value))])),
        1..4,
    )
}

fn chain_links() -> impl Strategy<Value = Vec<(&'static str, &'static str)>> {
    proptest::collection::vec((key(), key()), 1..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn match_of_variable_free_submap_is_empty_bindings(source in fact(), seed in any::<u64>()) {
        // A pattern with no variables that is key-wise contained in
        // the fact matches with the empty binding map.
        let pattern = prune(&source, seed, &mut 0);

        let bound = bindings(&pattern, &source);
        prop_assert_eq!(bound, Some(arbor_logic::Bindings::new()));
    }

    #[test]
    fn substitution_inverts_matching(source in fact(), seed in any::<u64>()) {
        // Variables capture exactly the sub-terms they stood for:
        // substituting the match's bindings back into the pattern
        // reconstructs the pattern's submap of the fact.
        let pattern = patternize(&prune(&source, seed.rotate_left(17), &mut 0), seed, &mut 0);

        let bound = bindings(&pattern, &source).expect("pattern was cut from the fact");
        let rebuilt = substitute(&pattern, &bound).expect("match binds every variable");
        prop_assert_eq!(rebuilt, prune(&source, seed.rotate_left(17), &mut 0));
    }

    #[test]
    fn joined_bindings_are_consistent(sources in proptest::collection::vec(fact(), 1..4), seed in any::<u64>()) {
        // Every row of the join instantiates every premise to a
        // submap of some fact.
        let mut counter = 0;
        let patterns: Vec<Term> = sources
            .iter()
            .map(|source| patternize(source, seed, &mut counter))
            .collect();

        for row in all_bindings(&patterns, &sources) {
            for pattern in &patterns {
                let instantiated = substitute(pattern, &row).expect("row covers premise variables");
                prop_assert!(
                    sources.iter().any(|source| bindings(&instantiated, source).is_some()),
                    "instantiated premise {} matches no fact",
                    instantiated
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn inference_step_is_monotone(facts in chain_facts(), links in chain_links()) {
        let kb = chain_kb(&facts, &links);
        let stepped = infer_step(&kb).expect("chain rules cannot fail");

        prop_assert!(stepped.facts().is_superset(kb.facts()));
    }

    #[test]
    fn closure_is_a_fixed_point(facts in chain_facts(), links in chain_links()) {
        let closed = infer_all(chain_kb(&facts, &links)).expect("chain rules cannot fail");
        let again = infer_step(&closed).expect("chain rules cannot fail");

        prop_assert_eq!(again.facts(), closed.facts());
    }

    #[test]
    fn closure_ignores_rule_order(
        facts in chain_facts(),
        links in chain_links(),
        seed in any::<prop::sample::Index>(),
    ) {
        // Any permutation of the same rule set closes to the same
        // facts.
        let mut reordered = links.clone();
        let len = reordered.len().max(1);
        reordered.rotate_left(seed.index(len));

        let closed = infer_all(chain_kb(&facts, &links)).expect("chain rules cannot fail");
        let closed_reordered =
            infer_all(chain_kb(&facts, &reordered)).expect("chain rules cannot fail");

        prop_assert_eq!(closed.facts(), closed_reordered.facts());
    }
}
