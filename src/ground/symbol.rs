//! Symbolic names key every tree and identify every variable.  A
//! symbol is compared and hashed by its text; unlike interned-id
//! schemes, two symbols with the same spelling are the same symbol,
//! which is what lets independently parsed patterns agree on a
//! variable's identity.

use std::fmt;

/// An identifier-like name, as used for tree keys and variable
/// identities.
///
/// The implicit order on symbols is lexicographic, which makes
/// symbol-keyed containers canonical.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    /// Returns the symbol spelled `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true iff this symbol is spelled like an identifier: a
    /// leading alphabetic character (or `-` / `_`), followed by
    /// alphanumerics or `-`, `_`, `?`, `!`, `*`.
    ///
    /// Symbols that fail this test can only enter the system from
    /// external data; see the wire layer's key policy.
    #[must_use]
    pub fn is_identifier_like(&self) -> bool {
        let mut chars = self.0.chars();

        match chars.next() {
            Some(head) if head.is_ascii_alphabetic() || head == '-' || head == '_' => (),
            _ => return false,
        }

        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '?' | '!' | '*'))
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

#[test]
fn test_eq_by_spelling() {
    assert_eq!(Symbol::new("foo"), Symbol::new("foo"));
    assert_ne!(Symbol::new("foo"), Symbol::new("bar"));
    assert!(Symbol::new("bar") < Symbol::new("foo"));
}

#[test]
fn test_identifier_like() {
    assert!(Symbol::new("foo").is_identifier_like());
    assert!(Symbol::new("walks-like-duck").is_identifier_like());
    assert!(Symbol::new("is-positive?").is_identifier_like());
    assert!(Symbol::new("_x2").is_identifier_like());

    assert!(!Symbol::new("").is_identifier_like());
    assert!(!Symbol::new("2fast").is_identifier_like());
    assert!(!Symbol::new("two words").is_identifier_like());
    assert!(!Symbol::new("semi;colon").is_identifier_like());
}

#[test]
fn test_display() {
    assert_eq!(Symbol::new("quux").to_string(), ":quux");
}
