//! LR(0) item machinery and the canonical collection.
//!
//! An [`Item`] pairs a production index with a dot position marking how much
//! of the right side has been recognized. States are sets of items closed
//! under non-terminal expansion; the canonical collection is the list of all
//! distinct states reachable from the initial state by [`goto`] transitions.
//!
//! State numbering is the order of first discovery, with state 0 the closure
//! of the augmented start item. Discovery iterates pending symbols in
//! interning order, so the numbering is deterministic and reproducible for a
//! given grammar and production declaration order.

use crate::error::EngineError;
use crate::grammar::{GrammarSpec, Production, SymbolId};
use std::collections::BTreeSet;

const MAX_STATES: usize = 10_000;

/// An LR(0) item: a production index and a dot position.
///
/// The production index refers to the automaton's internal list, where index
/// 0 is the augmented start production. Two items are equal iff both fields
/// match; states deduplicate them by structural equality.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    /// Index into the internal production list.
    pub prod: usize,
    /// Dot position within the production's right side, in `[0, len]`.
    pub dot: usize,
}

/// A set of LR(0) items.
pub type ItemSet = BTreeSet<Item>;

/// Computes the LR(0) closure of a set of items.
///
/// For every item with the dot immediately before a non-terminal `X`, adds
/// an item `(P, 0)` for every production `P` with left side `X`, repeating
/// until no new items appear.
pub fn closure(items: &ItemSet, prods: &[Production], grammar: &GrammarSpec) -> ItemSet {
    let mut closed = items.clone();
    let mut inserted = true;
    while inserted {
        inserted = false;
        // Iterate over a snapshot to avoid borrowing issues
        for item in closed.clone() {
            let right = &prods[item.prod].right;
            if item.dot >= right.len() {
                continue;
            }
            let sym = right[item.dot];
            if !grammar.is_nonterminal(sym) {
                continue;
            }
            for (j, p) in prods.iter().enumerate() {
                if p.left == sym && closed.insert(Item { prod: j, dot: 0 }) {
                    inserted = true;
                }
            }
        }
    }
    closed
}

/// Computes the LR(0) goto of an item set on a grammar symbol.
///
/// Advances the dot past `sym` in every item where the dot sits immediately
/// before it, then closes the result. An empty result means the state has no
/// transition on `sym`.
pub fn goto(items: &ItemSet, sym: SymbolId, prods: &[Production], grammar: &GrammarSpec) -> ItemSet {
    let mut moved = ItemSet::new();
    for item in items {
        let right = &prods[item.prod].right;
        if item.dot < right.len() && right[item.dot] == sym {
            moved.insert(Item {
                prod: item.prod,
                dot: item.dot + 1,
            });
        }
    }
    closure(&moved, prods, grammar)
}

/// The canonical collection of LR(0) states for an augmented grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    prods: Vec<Production>,
    states: Vec<ItemSet>,
    augmented: SymbolId,
}

impl Automaton {
    /// Builds the canonical collection for `grammar`.
    ///
    /// A synthetic start production `S' -> S` is placed at internal index 0;
    /// its left side is a virtual symbol id one past the grammar's interned
    /// range, so it never leaks into the grammar's symbol classification or
    /// the First/Follow output.
    pub fn build(grammar: &GrammarSpec) -> Result<Self, EngineError> {
        let start = grammar.start_symbol()?;
        let augmented = grammar.symbol_count();
        let mut prods = Vec::with_capacity(grammar.productions().len() + 1);
        prods.push(Production {
            left: augmented,
            right: vec![start],
        });
        prods.extend(grammar.productions().iter().cloned());

        let seed = ItemSet::from([Item { prod: 0, dot: 0 }]);
        let mut states = vec![closure(&seed, &prods, grammar)];
        let mut current = 0;
        while current < states.len() {
            if states.len() > MAX_STATES {
                return Err(EngineError::IterationCap {
                    stage: "canonical collection",
                    limit: MAX_STATES,
                });
            }
            let mut pending: BTreeSet<SymbolId> = BTreeSet::new();
            for item in &states[current] {
                let right = &prods[item.prod].right;
                if item.dot < right.len() {
                    pending.insert(right[item.dot]);
                }
            }
            for sym in pending {
                let target = goto(&states[current], sym, &prods, grammar);
                if !target.is_empty() && !states.contains(&target) {
                    states.push(target);
                }
            }
            current += 1;
        }
        log::debug!("canonical collection: {} states", states.len());
        Ok(Self {
            prods,
            states,
            augmented,
        })
    }

    /// The internal production list; index 0 is the augmented production.
    pub fn prods(&self) -> &[Production] {
        &self.prods
    }

    /// The states in discovery order.
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    /// The virtual symbol id of the augmented start symbol `S'`.
    pub fn augmented_symbol(&self) -> SymbolId {
        self.augmented
    }

    /// Finds the state id of an item set, by structural equality.
    pub fn state_of(&self, items: &ItemSet) -> Option<usize> {
        self.states.iter().position(|state| state == items)
    }

    /// The goto target state for `(state, sym)`, if the transition exists.
    pub fn goto_state(
        &self,
        state: usize,
        sym: SymbolId,
        grammar: &GrammarSpec,
    ) -> Option<usize> {
        let target = goto(&self.states[state], sym, &self.prods, grammar);
        if target.is_empty() {
            None
        } else {
            self.state_of(&target)
        }
    }
}
