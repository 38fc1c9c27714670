//! First/Follow set computation.
//!
//! Both computations iterate full passes over the production list until no
//! set grows, operating over arrays of [`BTreeSet`]s indexed by symbol id.
//! Termination is guaranteed because every set is bounded by the finite
//! symbol alphabet and only grows monotonically; a defensive pass cap guards
//! against surprises anyway.
//!
//! The `ε` marker participates the way a pseudo-terminal would: a production
//! whose right side starts with `ε` contributes `ε` to its left side's First
//! set, and downstream rules test for `ε` membership to decide whether
//! scanning continues past a symbol. The reference arithmetic grammar never
//! exercises this path.

use crate::error::EngineError;
use crate::grammar::{GrammarSpec, SymbolId};
use indexmap::IndexMap;
use smartstring::alias::String;
use std::collections::BTreeSet;

const MAX_PASSES: usize = 10_000;

/// Computes First sets for every grammar symbol.
///
/// `First(t) = {t}` for every terminal `t` (including the end marker). For a
/// production `N -> s1 s2 ... sk`, the right side is walked left to right: a
/// terminal is added to `First(N)` and ends the walk; a non-terminal
/// contributes `First(s_i) \ {ε}`, and the walk continues only while
/// `First(s_i)` contains `ε`.
pub fn first_sets(grammar: &GrammarSpec) -> Result<Vec<BTreeSet<SymbolId>>, EngineError> {
    let n = grammar.symbol_count();
    let epsilon = grammar.epsilon_id();
    let mut first: Vec<BTreeSet<SymbolId>> = vec![BTreeSet::new(); n];
    for id in 0..n {
        if grammar.is_terminal(id) {
            first[id].insert(id);
        }
    }

    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        if passes > MAX_PASSES {
            return Err(EngineError::IterationCap {
                stage: "First-set fixpoint",
                limit: MAX_PASSES,
            });
        }
        for production in grammar.productions() {
            let left = production.left;
            for &sym in &production.right {
                if grammar.is_terminal(sym) || Some(sym) == epsilon {
                    if first[left].insert(sym) {
                        changed = true;
                    }
                    break;
                }
                let from = first[sym].clone();
                for f in from {
                    if Some(f) == epsilon {
                        continue;
                    }
                    if first[left].insert(f) {
                        changed = true;
                    }
                }
                let nullable = epsilon.map_or(false, |e| first[sym].contains(&e));
                if !nullable {
                    break;
                }
            }
        }
    }
    Ok(first)
}

/// Computes Follow sets for every non-terminal, given the First sets.
///
/// `Follow(start)` gains `$`. For every occurrence of a non-terminal `B` in
/// a production `N -> ... B β`: a terminal immediately after `B` joins
/// `Follow(B)`; a non-terminal `C` after `B` contributes `First(C) \ {ε}`,
/// plus `Follow(N)` when `ε ∈ First(C)`; and when `B` ends the production,
/// `Follow(N)` flows into `Follow(B)`.
pub fn follow_sets(
    grammar: &GrammarSpec,
    first: &[BTreeSet<SymbolId>],
) -> Result<Vec<BTreeSet<SymbolId>>, EngineError> {
    let n = grammar.symbol_count();
    let epsilon = grammar.epsilon_id();
    let mut follow: Vec<BTreeSet<SymbolId>> = vec![BTreeSet::new(); n];
    follow[grammar.start_symbol()?].insert(grammar.end_marker());

    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        if passes > MAX_PASSES {
            return Err(EngineError::IterationCap {
                stage: "Follow-set fixpoint",
                limit: MAX_PASSES,
            });
        }
        for production in grammar.productions() {
            let left = production.left;
            let right = &production.right;
            for (i, &sym) in right.iter().enumerate() {
                if !grammar.is_nonterminal(sym) {
                    continue;
                }
                if i + 1 == right.len() {
                    let from = follow[left].clone();
                    for f in from {
                        if follow[sym].insert(f) {
                            changed = true;
                        }
                    }
                    continue;
                }
                let next = right[i + 1];
                if grammar.is_terminal(next) {
                    if follow[sym].insert(next) {
                        changed = true;
                    }
                } else {
                    let from = first[next].clone();
                    for f in from {
                        if Some(f) == epsilon {
                            continue;
                        }
                        if follow[sym].insert(f) {
                            changed = true;
                        }
                    }
                    if epsilon.map_or(false, |e| first[next].contains(&e)) {
                        let from = follow[left].clone();
                        for f in from {
                            if follow[sym].insert(f) {
                                changed = true;
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(follow)
}

/// First and Follow sets bundled with their formatting accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    /// First sets, indexed by symbol id.
    pub first: Vec<BTreeSet<SymbolId>>,
    /// Follow sets, indexed by symbol id; meaningful for non-terminals.
    pub follow: Vec<BTreeSet<SymbolId>>,
}

impl FirstFollow {
    /// Runs both fixpoint computations for the given grammar.
    pub fn solve(grammar: &GrammarSpec) -> Result<Self, EngineError> {
        let first = first_sets(grammar)?;
        let follow = follow_sets(grammar, &first)?;
        Ok(Self { first, follow })
    }

    fn named_sorted(grammar: &GrammarSpec, set: &BTreeSet<SymbolId>) -> Vec<String> {
        let mut names: Vec<String> = set.iter().map(|&id| grammar.name(id).into()).collect();
        names.sort();
        names
    }

    /// First sets as symbol name → sorted terminal names, in interning order.
    pub fn first_output(&self, grammar: &GrammarSpec) -> IndexMap<String, Vec<String>> {
        let mut out = IndexMap::new();
        for id in 0..grammar.symbol_count() {
            if !grammar.is_terminal(id) && !grammar.is_nonterminal(id) {
                continue;
            }
            out.insert(
                grammar.name(id).into(),
                Self::named_sorted(grammar, &self.first[id]),
            );
        }
        out
    }

    /// Follow sets as non-terminal name → sorted terminal names.
    pub fn follow_output(&self, grammar: &GrammarSpec) -> IndexMap<String, Vec<String>> {
        let mut out = IndexMap::new();
        for id in grammar.nonterminals() {
            out.insert(
                grammar.name(id).into(),
                Self::named_sorted(grammar, &self.follow[id]),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::EPSILON;

    fn names(set: &[String]) -> Vec<&str> {
        set.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn reference_first_sets() {
        let grammar = GrammarSpec::arithmetic();
        let sets = FirstFollow::solve(&grammar).unwrap();
        let first = sets.first_output(&grammar);
        assert_eq!(names(&first["F"]), vec!["(", "id"]);
        assert_eq!(first["T"], first["F"]);
        assert_eq!(first["E"], first["T"]);
        assert_eq!(first["S"], first["E"]);
        // Terminals are their own First sets.
        assert_eq!(names(&first["+"]), vec!["+"]);
        assert_eq!(names(&first["$"]), vec!["$"]);
    }

    #[test]
    fn reference_follow_sets() {
        let grammar = GrammarSpec::arithmetic();
        let sets = FirstFollow::solve(&grammar).unwrap();
        let follow = sets.follow_output(&grammar);
        assert_eq!(names(&follow["S"]), vec!["$"]);
        assert_eq!(names(&follow["E"]), vec!["$", ")", "+"]);
        assert_eq!(names(&follow["T"]), vec!["$", ")", "*", "+"]);
        assert_eq!(names(&follow["F"]), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn follow_output_has_only_nonterminals() {
        let grammar = GrammarSpec::arithmetic();
        let sets = FirstFollow::solve(&grammar).unwrap();
        let follow = sets.follow_output(&grammar);
        let keys: Vec<&str> = follow.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["S", "E", "T", "F"]);
    }

    #[test]
    fn solve_is_idempotent() {
        let grammar = GrammarSpec::arithmetic();
        let once = FirstFollow::solve(&grammar).unwrap();
        let twice = FirstFollow::solve(&grammar).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.first_output(&grammar), twice.first_output(&grammar));
        assert_eq!(once.follow_output(&grammar), twice.follow_output(&grammar));
    }

    #[test]
    fn left_and_right_recursion_both_converge() {
        let mut grammar = GrammarSpec::new();
        grammar.add_production("S", &["S", "a"]);
        grammar.add_production("S", &["a"]);
        grammar.add_production("R", &["a", "R"]);
        grammar.add_production("R", &["a"]);
        let sets = FirstFollow::solve(&grammar).unwrap();
        let first = sets.first_output(&grammar);
        assert_eq!(names(&first["S"]), vec!["a"]);
        assert_eq!(names(&first["R"]), vec!["a"]);
    }

    #[test]
    fn epsilon_production_marks_nullable_first() {
        let mut grammar = GrammarSpec::new();
        grammar.add_production("S", &["A", "b"]);
        grammar.add_production("A", &[EPSILON]);
        grammar.add_production("A", &["a"]);
        let sets = FirstFollow::solve(&grammar).unwrap();
        let first = sets.first_output(&grammar);
        // A derives empty, so b can begin S; ε itself is filtered out.
        assert_eq!(names(&first["S"]), vec!["a", "b"]);
        assert_eq!(names(&first["A"]), vec!["a", EPSILON]);
        let follow = sets.follow_output(&grammar);
        assert_eq!(names(&follow["A"]), vec!["b"]);
    }
}
