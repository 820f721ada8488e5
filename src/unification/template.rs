//! Substitution is the instantiation half of matching: a conclusion
//! template is a pattern whose variables are replaced by the values a
//! binding map assigned them.  Substitution is total over templates
//! whose variables all appear in the bindings; anything else is a
//! misuse of the library (a conclusion referencing a variable no
//! premise binds) and surfaces as an error instead of an absent
//! result.

use super::Bindings;
use crate::ground::{Symbol, Term};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when instantiating a template that references a variable
/// absent from the binding map.  Carries the variable and the bindings
/// at the failure point.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("variable {name} is not bound (bindings: {bindings})")]
pub struct UnboundVariable {
    pub name: Symbol,
    pub bindings: Bindings,
}

/// Instantiates `template` under `bindings`: every variable is
/// replaced by its bound value, trees are rebuilt entry-wise, and
/// scalars pass through unchanged.
///
/// # Errors
///
/// Returns [`UnboundVariable`] when `template` references a variable
/// that `bindings` does not cover.
pub fn substitute(template: &Term, bindings: &Bindings) -> Result<Term, UnboundVariable> {
    match template {
        Term::Scalar(_) => Ok(template.clone()),
        Term::Var(name) => match bindings.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(UnboundVariable {
                name: name.clone(),
                bindings: bindings.clone(),
            }),
        },
        Term::Tree(entries) => {
            let mut result = BTreeMap::new();
            for (key, value) in entries {
                result.insert(key.clone(), substitute(value, bindings)?);
            }

            Ok(Term::Tree(result))
        }
    }
}

#[test]
fn test_substitute_happy_path() {
    let template = Term::tree([
        ("duck", Term::var("x")),
        ("label", Term::tree([("since", Term::var("t"))])),
    ]);
    let bindings: Bindings = [
        (Symbol::new("x"), Term::string("dolan")),
        (Symbol::new("t"), Term::int(2009)),
    ]
    .into_iter()
    .collect();

    let expected = Term::tree([
        ("duck", Term::string("dolan")),
        ("label", Term::tree([("since", Term::int(2009))])),
    ]);
    assert_eq!(substitute(&template, &bindings), Ok(expected));
}

#[test]
fn test_substitute_ground_template_is_identity() {
    let template = Term::tree([("sky", Term::sym("blue"))]);

    assert_eq!(
        substitute(&template, &Bindings::new()),
        Ok(template.clone())
    );
}

#[test]
fn test_substitute_unbound_variable() {
    let template = Term::tree([("duck", Term::var("x")), ("age", Term::var("y"))]);
    let bindings: Bindings = [(Symbol::new("x"), Term::string("dolan"))]
        .into_iter()
        .collect();

    let err = substitute(&template, &bindings).expect_err("y is unbound");
    assert_eq!(err.name, Symbol::new("y"));
    assert_eq!(err.bindings, bindings);
}

#[test]
fn test_substitute_inverts_match() {
    use super::bindings as match_bindings;

    // Substituting a match's bindings back into the pattern
    // reconstructs the matched submap of the fact.
    let pattern = Term::tree([("foo", Term::tree([("baz", Term::var("bar"))]))]);
    let fact = Term::tree([
        ("foo", Term::tree([("baz", Term::int(3))])),
        ("other", Term::int(9)),
    ]);

    let bound = match_bindings(&pattern, &fact).expect("matches");
    let rebuilt = substitute(&pattern, &bound).expect("all variables bound");
    assert_eq!(rebuilt, Term::tree([("foo", Term::tree([("baz", Term::int(3))]))]));
}
