//! JSON is the exchange form for facts and patterns.  The mapping is
//! mostly direct — trees are objects, integers, strings, and booleans
//! are themselves — with two conventions on top:
//!
//! * Symbols are strings with a leading `:` (`":blue"`), which keeps
//!   them distinguishable from plain strings through a round-trip.  A
//!   plain string that itself starts with `:` consequently has no wire
//!   form.
//! * A variable is the literal one-entry object `{"var": ":name"}`.
//!   The in-memory model uses a distinct `Var` node; this module
//!   converts between the two forms, in both directions.
//!
//! Object keys may arrive spelled with or without the leading colon.
//! A key that is not identifier-like cannot name a tree entry; the
//! decode options choose whether such keys are silently dropped (the
//! default, matching the historical behavior of this data format) or
//! rejected.

use crate::ground::{Scalar, Symbol, Term};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// What to do with an object key that is not identifier-like.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyPolicy {
    /// Drop the entry and keep decoding.
    #[default]
    Ignore,
    /// Fail the decode with [`WireError::NonSymbolicKey`].
    Reject,
}

/// Options for [`term_from_json`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    pub key_policy: KeyPolicy,
}

#[derive(Debug, Error)]
pub enum WireError {
    /// Nulls, floats, and arrays have no counterpart in the term
    /// model.
    #[error("unsupported JSON value: {0}")]
    Unsupported(String),
    #[error("non-symbolic key {0:?}")]
    NonSymbolicKey(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encodes `term` as a JSON value, emitting variables in their literal
/// `{"var": ":name"}` form.
#[must_use]
pub fn term_to_json(term: &Term) -> Value {
    match term {
        Term::Scalar(scalar) => scalar_to_json(scalar),
        Term::Var(name) => {
            let mut entries = Map::new();
            entries.insert("var".into(), Value::String(format!(":{}", name.as_str())));
            Value::Object(entries)
        }
        Term::Tree(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.as_str().into(), term_to_json(value)))
                .collect(),
        ),
    }
}

/// Encodes `term` as compact JSON text.
#[must_use]
pub fn term_to_json_string(term: &Term) -> String {
    term_to_json(term).to_string()
}

/// Decodes a term from a JSON value, recognizing the literal variable
/// form.
///
/// # Errors
///
/// Returns `Err` on JSON values outside the term model (nulls, floats,
/// arrays), and on non-identifier-like object keys when the options
/// say to reject them.
pub fn term_from_json(value: &Value, options: DecodeOptions) -> Result<Term, WireError> {
    match value {
        Value::Bool(value) => Ok(Term::bool(*value)),
        Value::Number(number) => match number.as_i64() {
            Some(value) => Ok(Term::int(value)),
            None => Err(WireError::Unsupported(number.to_string())),
        },
        Value::String(text) => Ok(decode_string(text)),
        Value::Object(entries) => decode_tree(entries, options),
        Value::Null | Value::Array(_) => Err(WireError::Unsupported(value.to_string())),
    }
}

/// Decodes a term from JSON text.
///
/// # Errors
///
/// Same conditions as [`term_from_json`], plus malformed JSON.
pub fn term_from_json_str(text: &str, options: DecodeOptions) -> Result<Term, WireError> {
    let value: Value = serde_json::from_str(text)?;
    term_from_json(&value, options)
}

fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Bool(value) => Value::Bool(*value),
        Scalar::Int(value) => Value::Number((*value).into()),
        Scalar::Str(value) => Value::String(value.clone()),
        Scalar::Sym(name) => Value::String(format!(":{}", name.as_str())),
    }
}

fn decode_string(text: &str) -> Term {
    match text.strip_prefix(':') {
        Some(name) => Term::Scalar(Scalar::Sym(Symbol::new(name))),
        None => Term::string(text),
    }
}

fn decode_tree(entries: &Map<String, Value>, options: DecodeOptions) -> Result<Term, WireError> {
    // The literal variable form: exactly one entry, keyed `var`, whose
    // value is a symbol.
    if entries.len() == 1 {
        if let Some(Value::String(text)) = entries.get("var") {
            if let Some(name) = text.strip_prefix(':') {
                return Ok(Term::var(name));
            }
        }
    }

    let mut tree = BTreeMap::new();
    for (key, value) in entries {
        let symbol = Symbol::new(key.strip_prefix(':').unwrap_or(key));
        if !symbol.is_identifier_like() {
            match options.key_policy {
                KeyPolicy::Ignore => continue,
                KeyPolicy::Reject => return Err(WireError::NonSymbolicKey(key.clone())),
            }
        }

        tree.insert(symbol, term_from_json(value, options)?);
    }

    Ok(Term::Tree(tree))
}

#[test]
fn test_round_trip_scalars() {
    for term in [
        Term::int(-7),
        Term::bool(true),
        Term::string("socrates"),
        Term::sym("blue"),
    ] {
        let encoded = term_to_json(&term);
        let decoded = term_from_json(&encoded, DecodeOptions::default()).expect("ok");
        assert_eq!(decoded, term);
    }
}

#[test]
fn test_round_trip_nested_pattern() {
    let pattern = Term::tree([
        ("foo", Term::tree([("baz", Term::var("bar"))])),
        ("bing", Term::var("quux")),
        ("sky", Term::sym("blue")),
    ]);

    let encoded = term_to_json_string(&pattern);
    let decoded = term_from_json_str(&encoded, DecodeOptions::default()).expect("ok");
    assert_eq!(decoded, pattern);
}

#[test]
fn test_variable_literal_form() {
    let decoded =
        term_from_json_str(r#"{"var": ":x"}"#, DecodeOptions::default()).expect("ok");
    assert_eq!(decoded, Term::var("x"));

    assert_eq!(term_to_json_string(&Term::var("x")), r#"{"var":":x"}"#);
}

#[test]
fn test_var_key_with_plain_string_is_a_tree() {
    // The value must be a symbol for the entry to read as a variable.
    let decoded =
        term_from_json_str(r#"{"var": "x"}"#, DecodeOptions::default()).expect("ok");
    assert_eq!(decoded, Term::tree([("var", Term::string("x"))]));
}

#[test]
fn test_var_key_among_others_is_a_tree() {
    let decoded = term_from_json_str(
        r#"{"var": ":x", "other": 3}"#,
        DecodeOptions::default(),
    )
    .expect("ok");
    assert_eq!(
        decoded,
        Term::tree([("var", Term::sym("x")), ("other", Term::int(3))])
    );
}

#[test]
fn test_keys_accept_optional_colon() {
    let bare = term_from_json_str(r#"{"foo": 1}"#, DecodeOptions::default()).expect("ok");
    let keyword = term_from_json_str(r#"{":foo": 1}"#, DecodeOptions::default()).expect("ok");
    assert_eq!(bare, keyword);
}

#[test]
fn test_non_symbolic_key_ignored_by_default() {
    let decoded = term_from_json_str(
        r#"{"two words": 1, "fine": 2}"#,
        DecodeOptions::default(),
    )
    .expect("ok");
    assert_eq!(decoded, Term::tree([("fine", Term::int(2))]));
}

#[test]
fn test_non_symbolic_key_rejected_on_request() {
    let options = DecodeOptions {
        key_policy: KeyPolicy::Reject,
    };

    let err = term_from_json_str(r#"{"two words": 1}"#, options).expect_err("must reject");
    assert!(matches!(err, WireError::NonSymbolicKey(key) if key == "two words"));
}

#[test]
fn test_unsupported_values() {
    for text in ["null", "[1, 2]", "1.5"] {
        assert!(matches!(
            term_from_json_str(text, DecodeOptions::default()),
            Err(WireError::Unsupported(_))
        ));
    }
}
