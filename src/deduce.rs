//! Rules pair premise patterns with conclusion templates, and a
//! knowledge base pairs a ground fact set with its rules.  One
//! inference step joins a rule's premises against the facts,
//! instantiates every conclusion under every joined binding, and fires
//! a conclusion's side effect once per fact that is new to this step.
//! The fixed-point driver folds each step's output back into the fact
//! set and stops when a step adds nothing.
//!
//! Termination does not need a safety valve: conclusions cannot invent
//! values, so every derivable fact is an instantiation of a conclusion
//! template over sub-terms of the initial facts, and that universe is
//! finite.
//!
//! Nothing here promises an iteration order.  Rules, bindings, and
//! conclusions may be visited in any order; the final fact set is the
//! same regardless, and only side effects can observe the difference.

use crate::ground::Term;
use crate::matching::all_bindings;
use crate::unification::{substitute, UnboundVariable};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// A conclusion's side effect: an opaque callable handed each newly
/// derived fact.  Its return value is discarded; only its observable
/// side channel matters.
pub type Effect = Rc<dyn Fn(&Term)>;

/// Premise patterns plus a map from conclusion template to the effect
/// to fire when that conclusion derives a new fact.
#[derive(Clone)]
pub struct Rule {
    premises: BTreeSet<Term>,
    conclusions: BTreeMap<Term, Effect>,
}

impl Rule {
    /// Constructs a rule for
    ///
    /// ```text
    /// premise_1 premise_2 ...
    /// -----------------------
    ///       conclusions
    /// ```
    ///
    /// where every variable in a conclusion template is bound by at
    /// least one premise.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `premises` is empty, or when a conclusion
    /// references a variable no premise binds (such a rule could never
    /// instantiate its conclusion).
    pub fn new<P, C>(premises: P, conclusions: C) -> Result<Self, &'static str>
    where
        P: IntoIterator<Item = Term>,
        C: IntoIterator<Item = (Term, Effect)>,
    {
        let premises: BTreeSet<Term> = premises.into_iter().collect();
        if premises.is_empty() {
            return Err("A rule needs at least one premise.");
        }

        let mut captured = BTreeSet::new();
        for premise in &premises {
            captured = premise.insert_variables(captured);
        }

        let mut conclusion_map = BTreeMap::new();
        for (template, effect) in conclusions {
            if !template.insert_variables(BTreeSet::new()).is_subset(&captured) {
                return Err("Conclusion variable not bound by any premise.");
            }

            conclusion_map.insert(template, effect);
        }

        Ok(Self {
            premises,
            conclusions: conclusion_map,
        })
    }

    /// Constructs a rule whose conclusions carry no side effect.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Rule::new`].
    pub fn implies<P, C>(premises: P, conclusions: C) -> Result<Self, &'static str>
    where
        P: IntoIterator<Item = Term>,
        C: IntoIterator<Item = Term>,
    {
        let noop: Effect = Rc::new(|_| ());
        Self::new(
            premises,
            conclusions
                .into_iter()
                .map(|template| (template, noop.clone())),
        )
    }

    #[must_use]
    pub fn premises(&self) -> &BTreeSet<Term> {
        &self.premises
    }

    #[must_use]
    pub fn conclusions(&self) -> &BTreeMap<Term, Effect> {
        &self.conclusions
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("premises", &self.premises)
            .field(
                "conclusions",
                &self.conclusions.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A ground fact set plus the rules that derive from it.  Inference
/// never mutates a knowledge base: each step produces a new one with
/// an enlarged fact set and the same rules.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    facts: BTreeSet<Term>,
    rules: Vec<Rule>,
}

impl KnowledgeBase {
    /// Constructs a knowledge base from initial facts and rules.
    ///
    /// # Errors
    ///
    /// Returns `Err` when any fact contains a variable.
    pub fn new<F, R>(facts: F, rules: R) -> Result<Self, &'static str>
    where
        F: IntoIterator<Item = Term>,
        R: IntoIterator<Item = Rule>,
    {
        let facts: BTreeSet<Term> = facts.into_iter().collect();
        if !facts.iter().all(Term::is_ground) {
            return Err("Facts must be ground.");
        }

        Ok(Self {
            facts,
            rules: rules.into_iter().collect(),
        })
    }

    #[must_use]
    pub fn facts(&self) -> &BTreeSet<Term> {
        &self.facts
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Applies one rule to `facts`: joins `premises` across the fact set,
/// instantiates each conclusion under each joined binding, and fires
/// each conclusion's effect exactly once per distinct instantiated
/// fact that `facts` did not already contain.
///
/// Returns every instantiated fact, new or not; the caller unions them
/// into the fact set.
///
/// # Errors
///
/// Returns [`UnboundVariable`] when a conclusion references a variable
/// the premises did not bind.  Rules built with [`Rule::new`] cannot
/// trip this.
pub fn infer(
    premises: &BTreeSet<Term>,
    conclusions: &BTreeMap<Term, Effect>,
    facts: &BTreeSet<Term>,
) -> Result<BTreeSet<Term>, UnboundVariable> {
    let joined = all_bindings(premises, facts);

    let mut derived = BTreeSet::new();
    for (template, effect) in conclusions {
        let mut fresh = BTreeSet::new();
        for binding in &joined {
            let fact = substitute(template, binding)?;
            if !facts.contains(&fact) {
                fresh.insert(fact.clone());
            }

            derived.insert(fact);
        }

        for fact in &fresh {
            trace!("derived new fact {}", fact);
            effect(fact);
        }
    }

    Ok(derived)
}

/// Applies every rule to `kb`'s facts once, all against the same
/// snapshot, and returns a knowledge base whose fact set is the union
/// of the snapshot and everything derived.
///
/// # Errors
///
/// Propagates [`UnboundVariable`] from [`infer`].
pub fn infer_step(kb: &KnowledgeBase) -> Result<KnowledgeBase, UnboundVariable> {
    let mut facts = kb.facts.clone();
    for rule in &kb.rules {
        facts.extend(infer(&rule.premises, &rule.conclusions, &kb.facts)?);
    }

    Ok(KnowledgeBase {
        facts,
        rules: kb.rules.clone(),
    })
}

/// Iterates [`infer_step`] until the fact set stops growing, and
/// returns the knowledge base at the fixed point.  The rule set is
/// carried through unchanged.
///
/// # Errors
///
/// Propagates [`UnboundVariable`] from [`infer`].
pub fn infer_all(kb: KnowledgeBase) -> Result<KnowledgeBase, UnboundVariable> {
    debug!(
        "computing closure of {} facts under {} rules",
        kb.facts.len(),
        kb.rules.len()
    );

    let mut current = kb;
    let mut round = 0usize;
    loop {
        round += 1;

        let next = infer_step(&current)?;
        debug!("round {} holds {} facts", round, next.facts.len());

        if next.facts == current.facts {
            return Ok(next);
        }

        current = next;
    }
}

#[test]
fn test_rule_rejects_empty_premises() {
    let conclusion = Term::tree([("duck", Term::var("x"))]);

    assert!(Rule::implies(Vec::new(), vec![conclusion]).is_err());
}

#[test]
fn test_rule_rejects_uncovered_conclusion_variable() {
    // duck(x) concludes quacks(y): y is bound by no premise.
    let premise = Term::tree([("duck", Term::var("x"))]);
    let conclusion = Term::tree([("quacks", Term::var("y"))]);

    assert!(Rule::implies(vec![premise], vec![conclusion]).is_err());
}

#[test]
fn test_rule_accepts_covered_conclusions() {
    let premises = vec![
        Term::tree([("walks", Term::var("x"))]),
        Term::tree([("talks", Term::var("y"))]),
    ];
    let conclusion = Term::tree([("pair", Term::tree([
        ("walker", Term::var("x")),
        ("talker", Term::var("y")),
    ]))]);

    let rule = Rule::implies(premises, vec![conclusion]).expect("ok");
    assert_eq!(rule.premises().len(), 2);
    assert_eq!(rule.conclusions().len(), 1);
}

#[test]
fn test_knowledge_base_rejects_non_ground_facts() {
    assert!(KnowledgeBase::new(vec![Term::tree([("foo", Term::var("x"))])], Vec::new()).is_err());
}

#[test]
fn test_substitute_error_escapes_infer() {
    use crate::ground::Symbol;

    // Bypass Rule::new and hand infer a conclusion it cannot
    // instantiate.
    let premises: BTreeSet<Term> = [Term::tree([("foo", Term::var("x"))])].into_iter().collect();
    let noop: Effect = Rc::new(|_| ());
    let conclusions: BTreeMap<Term, Effect> =
        [(Term::tree([("bar", Term::var("y"))]), noop)].into_iter().collect();
    let facts: BTreeSet<Term> = [Term::tree([("foo", Term::int(5))])].into_iter().collect();

    let err = infer(&premises, &conclusions, &facts).expect_err("y is unbound");
    assert_eq!(err.name, Symbol::new("y"));
}

#[test]
fn test_duck_rule() {
    // Anything that walks, looks, and quacks like a duck is a duck.
    // Dolan does all three; Daffy never quacks.
    let rule = Rule::implies(
        vec![
            Term::tree([("walks-like-duck", Term::var("x"))]),
            Term::tree([("looks-like-duck", Term::var("x"))]),
            Term::tree([("quacks-like-duck", Term::var("x"))]),
        ],
        vec![Term::tree([("duck", Term::var("x"))])],
    )
    .expect("ok");

    let facts = vec![
        Term::tree([("walks-like-duck", Term::string("dolan"))]),
        Term::tree([("looks-like-duck", Term::string("dolan"))]),
        Term::tree([("quacks-like-duck", Term::string("dolan"))]),
        Term::tree([("walks-like-duck", Term::string("daffy"))]),
        Term::tree([("looks-like-duck", Term::string("daffy"))]),
    ];

    let kb = KnowledgeBase::new(facts, vec![rule]).expect("ok");
    let closed = infer_all(kb).expect("ok");

    assert!(closed
        .facts()
        .contains(&Term::tree([("duck", Term::string("dolan"))])));
    assert!(!closed
        .facts()
        .contains(&Term::tree([("duck", Term::string("daffy"))])));
}

#[test]
fn test_chained_rules_reach_fixed_point() {
    // foo -> bar -> baz -> quux, starting from {foo 5}.
    let chain = |from: &str, to: &str| {
        Rule::implies(
            vec![Term::tree([(from, Term::var("x"))])],
            vec![Term::tree([(to, Term::var("x"))])],
        )
        .expect("ok")
    };

    let kb = KnowledgeBase::new(
        vec![Term::tree([("foo", Term::int(5))])],
        vec![chain("foo", "bar"), chain("bar", "baz"), chain("baz", "quux")],
    )
    .expect("ok");

    let closed = infer_all(kb).expect("ok");

    let expected: BTreeSet<Term> = [
        Term::tree([("foo", Term::int(5))]),
        Term::tree([("bar", Term::int(5))]),
        Term::tree([("baz", Term::int(5))]),
        Term::tree([("quux", Term::int(5))]),
    ]
    .into_iter()
    .collect();
    assert_eq!(*closed.facts(), expected);

    // One more step at the fixed point changes nothing.
    let again = infer_step(&closed).expect("ok");
    assert_eq!(again.facts(), closed.facts());
}

#[test]
fn test_step_is_monotone() {
    let rule = Rule::implies(
        vec![Term::tree([("foo", Term::var("x"))])],
        vec![Term::tree([("bar", Term::var("x"))])],
    )
    .expect("ok");

    let kb = KnowledgeBase::new(
        vec![
            Term::tree([("foo", Term::int(1))]),
            Term::tree([("unrelated", Term::sym("noise"))]),
        ],
        vec![rule],
    )
    .expect("ok");

    let stepped = infer_step(&kb).expect("ok");
    assert!(stepped.facts().is_superset(kb.facts()));
}

#[test]
fn test_square_from_repeated_variable() {
    // A rectangle whose width and height bind the same variable, and
    // whose width is known positive, is a square.
    let rule = Rule::implies(
        vec![
            Term::tree([(
                "rect",
                Term::tree([
                    ("top", Term::var("t")),
                    ("left", Term::var("l")),
                    ("width", Term::var("w")),
                    ("height", Term::var("w")),
                ]),
            )]),
            Term::tree([("is-positive", Term::var("w"))]),
        ],
        vec![Term::tree([("square", Term::var("w"))])],
    )
    .expect("ok");

    let rect = |top: i64, left: i64, width: i64, height: i64| {
        Term::tree([(
            "rect",
            Term::tree([
                ("top", Term::int(top)),
                ("left", Term::int(left)),
                ("width", Term::int(width)),
                ("height", Term::int(height)),
            ]),
        )])
    };

    let kb = KnowledgeBase::new(
        vec![
            rect(0, 0, 4, 4),
            rect(2, 2, 4, 7),
            rect(5, 5, 9, 9),
            Term::tree([("is-positive", Term::int(4))]),
        ],
        vec![rule],
    )
    .expect("ok");

    let closed = infer_all(kb).expect("ok");

    // 4x4 is square and known positive; 4x7 is not square; 9x9 is
    // square but 9 is not known positive.
    assert!(closed.facts().contains(&Term::tree([("square", Term::int(4))])));
    assert!(!closed.facts().contains(&Term::tree([("square", Term::int(9))])));
}

#[test]
fn test_effect_fires_once_per_new_fact() {
    use std::cell::RefCell;

    let log = Rc::new(RefCell::new(Vec::<Term>::new()));
    let sink = log.clone();

    let rule = Rule::new(
        vec![Term::tree([("man", Term::var("x"))])],
        vec![(
            Term::tree([("mortal", Term::var("x"))]),
            Rc::new(move |fact: &Term| sink.borrow_mut().push(fact.clone())) as Effect,
        )],
    )
    .expect("ok");

    let kb = KnowledgeBase::new(
        vec![
            Term::tree([("man", Term::string("socrates"))]),
            Term::tree([("man", Term::string("plato"))]),
        ],
        vec![rule],
    )
    .expect("ok");

    let closed = infer_all(kb).expect("ok");
    assert!(closed
        .facts()
        .contains(&Term::tree([("mortal", Term::string("socrates"))])));

    // Each conclusion was new exactly once, in the first round; the
    // rounds after that re-derive facts that already exist and stay
    // silent.
    let mut seen = log.borrow().clone();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            Term::tree([("mortal", Term::string("plato"))]),
            Term::tree([("mortal", Term::string("socrates"))]),
        ]
    );
}

#[test]
fn test_effect_not_fired_for_existing_fact() {
    use std::cell::Cell;

    let count = Rc::new(Cell::new(0usize));
    let counter = count.clone();

    let rule = Rule::new(
        vec![Term::tree([("foo", Term::var("x"))])],
        vec![(
            Term::tree([("bar", Term::var("x"))]),
            Rc::new(move |_: &Term| counter.set(counter.get() + 1)) as Effect,
        )],
    )
    .expect("ok");

    // The conclusion {bar 5} is already a fact.
    let kb = KnowledgeBase::new(
        vec![
            Term::tree([("foo", Term::int(5))]),
            Term::tree([("bar", Term::int(5))]),
        ],
        vec![rule],
    )
    .expect("ok");

    let _ = infer_all(kb).expect("ok");
    assert_eq!(count.get(), 0);
}

#[test]
fn test_closure_ignores_rule_order() {
    let chain = |from: &str, to: &str| {
        Rule::implies(
            vec![Term::tree([(from, Term::var("x"))])],
            vec![Term::tree([(to, Term::var("x"))])],
        )
        .expect("ok")
    };

    let facts = vec![Term::tree([("foo", Term::int(5))])];
    let forward = vec![chain("foo", "bar"), chain("bar", "baz"), chain("baz", "quux")];
    let backward = vec![chain("baz", "quux"), chain("bar", "baz"), chain("foo", "bar")];

    let closed_forward =
        infer_all(KnowledgeBase::new(facts.clone(), forward).expect("ok")).expect("ok");
    let closed_backward =
        infer_all(KnowledgeBase::new(facts, backward).expect("ok")).expect("ok");

    assert_eq!(closed_forward.facts(), closed_backward.facts());
}
