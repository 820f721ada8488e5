//! Arbor Logic is a small forward-chaining inference engine over
//! tree-structured facts.  Facts are nested symbol-keyed trees of
//! scalar values; rules pair premise patterns with conclusion
//! templates.  Matching a pattern against a fact extracts a map of
//! variable bindings, bindings are joined across premises, and
//! conclusions are instantiated under the joined bindings, optionally
//! firing a side effect once per newly derived fact.  Repeating the
//! process until the fact set stops growing yields the closure of
//! everything derivable from the initial knowledge base.
//!
//! The crate is layered bottom-up:
//!
//! * [`ground`] defines the term model: symbols, scalars, and trees,
//!   plus the `Var` nodes that may only appear inside patterns.
//! * [`unification`] matches one pattern against one ground fact,
//!   merges partial binding maps, and instantiates templates.
//! * [`matching`] lifts single-pattern matching to fact sets and
//!   computes the globally consistent bindings across a premise set.
//! * [`deduce`] owns rules and knowledge bases, the per-rule inference
//!   step, and the fixed-point driver.
//! * [`wire`] round-trips terms through JSON, including the literal
//!   `{var: <name>}` encoding of variables used by external data.
//!
//! The engine is single-threaded and computes each closure from
//! scratch; derivation order is never observable in results, only in
//! side effects.

pub mod deduce;
pub mod ground;
pub mod matching;
pub mod unification;
pub mod wire;

pub use deduce::{infer, infer_all, infer_step, Effect, KnowledgeBase, Rule};
pub use ground::{Scalar, Symbol, Term};
pub use matching::{all_bindings, matches_over};
pub use unification::{bindings, substitute, Bindings, UnboundVariable};
