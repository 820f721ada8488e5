//! This engine never needs full first-order unification: patterns are
//! the only side that may carry variables, and they are always matched
//! against fully ground facts, or fully instantiated from a binding
//! environment.  That leaves three operations: matching one pattern
//! against one fact (yielding a binding map on success), merging
//! partial binding maps while checking that they agree on every shared
//! variable, and substituting bound values back into a template.
//!
//! Failure to match and failure to merge are ordinary outcomes, not
//! errors; both are represented as `None`, distinct from a successful
//! match that happens to bind nothing.  The one true error in this
//! layer is instantiating a template whose variable was never bound,
//! which is a misuse of the library rather than a property of the
//! data.

mod binding;
mod matcher;
mod template;

pub use binding::Bindings;
pub use matcher::bindings;
pub use matcher::match_term;
pub use template::substitute;
pub use template::UnboundVariable;
