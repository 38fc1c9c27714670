//! Action/goto table construction.
//!
//! For each state, shift and accept entries (and goto entries for
//! non-terminals) are recorded first; completed items then fill every
//! remaining terminal cell with their reduce. Entries are never overwritten,
//! so a shift always beats a reduce and each `(state, terminal)` pair holds
//! at most one action.
//!
//! Reduce placement runs through a small operator-precedence filter (see
//! [`PRECEDENCE`]) that withholds a reduce when a higher-precedence
//! operator could still be shifted. The filter is tailored to the
//! arithmetic reference grammar and is not a sound LR(0)/SLR/LALR
//! disambiguation rule; a wider grammar set needs proper lookahead-based
//! conflict resolution instead.

use crate::grammar::{GrammarSpec, Production, SymbolId};
use crate::items::Automaton;
use indexmap::IndexMap;
use smartstring::alias::String;

/// A parse action stored at a `(state, terminal)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Push the target state and consume the terminal.
    Shift(usize),
    /// Replace a handle by the left side of the indexed production.
    /// The index refers to the grammar's declared production list.
    Reduce(usize),
    /// The augmented item completed on `$`: the input is accepted.
    Accept,
}

/// Operator precedence assignments for the reduce-suppression heuristic.
///
/// `*` binds tighter than `+`; the brackets carry the neutral precedence 0
/// and never suppress a reduce. Terminals without an entry (including `$`)
/// do not participate at all.
const PRECEDENCE: &[(&str, u8)] = &[("*", 2), ("+", 1), ("(", 0), (")", 0)];

fn precedence_of(name: &str) -> Option<u8> {
    PRECEDENCE
        .iter()
        .find(|(sym, _)| *sym == name)
        .map(|&(_, prec)| prec)
}

/// True if the reduce by `production` must be withheld in favor of a shift.
///
/// A completed production ending in an operator is suppressed whenever some
/// terminal carries a strictly higher precedence, leaving its cells free for
/// the eventual shift of that operator.
fn reduce_suppressed(grammar: &GrammarSpec, production: &Production, terminals: &[SymbolId]) -> bool {
    let Some(&last) = production.right.last() else {
        return false;
    };
    let Some(last_prec) = precedence_of(grammar.name(last)) else {
        return false;
    };
    if last_prec == 0 {
        return false;
    }
    terminals.iter().any(|&t| {
        precedence_of(grammar.name(t)).is_some_and(|prec| prec > last_prec)
    })
}

/// The shift-reduce action table and the goto table, both indexed
/// `[state][symbol id]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    actions: Vec<Vec<Option<Action>>>,
    gotos: Vec<Vec<Option<usize>>>,
}

impl ParseTable {
    /// Derives the tables from a canonical collection.
    pub fn build(grammar: &GrammarSpec, automaton: &Automaton) -> Self {
        let n_states = automaton.states().len();
        let n_symbols = grammar.symbol_count();
        let terminals = grammar.terminals();
        let end = grammar.end_marker();
        let mut actions: Vec<Vec<Option<Action>>> = vec![vec![None; n_symbols]; n_states];
        let mut gotos: Vec<Vec<Option<usize>>> = vec![vec![None; n_symbols]; n_states];

        for (state, items) in automaton.states().iter().enumerate() {
            for item in items {
                let production = &automaton.prods()[item.prod];
                if item.dot < production.right.len() {
                    let sym = production.right[item.dot];
                    let Some(target) = automaton.goto_state(state, sym, grammar) else {
                        continue;
                    };
                    if grammar.is_nonterminal(sym) {
                        gotos[state][sym] = Some(target);
                    } else {
                        actions[state][sym] = Some(Action::Shift(target));
                    }
                } else if production.left == automaton.augmented_symbol() {
                    actions[state][end] = Some(Action::Accept);
                }
            }
            for item in items {
                let production = &automaton.prods()[item.prod];
                if item.dot < production.right.len()
                    || production.left == automaton.augmented_symbol()
                {
                    continue;
                }
                if reduce_suppressed(grammar, production, &terminals) {
                    log::trace!(
                        "state {}: reduce by {} withheld by precedence",
                        state,
                        grammar.describe(production)
                    );
                    continue;
                }
                for &t in &terminals {
                    if actions[state][t].is_none() {
                        actions[state][t] = Some(Action::Reduce(item.prod - 1));
                    }
                }
            }
        }

        Self { actions, gotos }
    }

    /// Number of states covered by the tables.
    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// The action at `(state, terminal)`, if any.
    pub fn action(&self, state: usize, sym: SymbolId) -> Option<Action> {
        self.actions
            .get(state)
            .and_then(|row| row.get(sym))
            .copied()
            .flatten()
    }

    /// The goto target at `(state, non-terminal)`, if any.
    pub fn goto(&self, state: usize, sym: SymbolId) -> Option<usize> {
        self.gotos
            .get(state)
            .and_then(|row| row.get(sym))
            .copied()
            .flatten()
    }

    /// Encodes the tables as per-state symbol → string mappings: `sN` for a
    /// shift, `rN` for a reduce by declared production `N`, `acc` for
    /// accept, and a bare integer for a goto entry.
    pub fn encoded(&self, grammar: &GrammarSpec) -> IndexMap<String, IndexMap<String, String>> {
        let mut table = IndexMap::new();
        for state in 0..self.state_count() {
            let mut row: IndexMap<String, String> = IndexMap::new();
            for id in 0..grammar.symbol_count() {
                if !grammar.is_terminal(id) && !grammar.is_nonterminal(id) {
                    continue;
                }
                let cell: String = if let Some(action) = self.action(state, id) {
                    match action {
                        Action::Shift(j) => format!("s{j}").into(),
                        Action::Reduce(p) => format!("r{p}").into(),
                        Action::Accept => "acc".into(),
                    }
                } else if let Some(j) = self.goto(state, id) {
                    format!("{j}").into()
                } else {
                    continue;
                };
                row.insert(grammar.name(id).into(), cell);
            }
            table.insert(format!("{state}").into(), row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_table() -> (GrammarSpec, ParseTable) {
        let grammar = GrammarSpec::arithmetic();
        let automaton = Automaton::build(&grammar).unwrap();
        let table = ParseTable::build(&grammar, &automaton);
        (grammar, table)
    }

    #[test]
    fn initial_state_shifts_into_parens_and_id() {
        let (grammar, table) = reference_table();
        let encoded = table.encoded(&grammar);
        assert_eq!(encoded["0"]["("], "s5");
        assert_eq!(encoded["0"]["id"], "s6");
        // Goto entries for the non-terminals of the initial closure.
        assert_eq!(encoded["0"]["S"], "1");
        assert_eq!(encoded["0"]["E"], "2");
        assert_eq!(encoded["0"]["T"], "3");
        assert_eq!(encoded["0"]["F"], "4");
    }

    #[test]
    fn accept_sits_on_end_marker_of_augmented_state() {
        let (grammar, table) = reference_table();
        let encoded = table.encoded(&grammar);
        assert_eq!(encoded["1"]["$"], "acc");
        // Accept appears nowhere else.
        let accepts = encoded
            .values()
            .flat_map(|row| row.values())
            .filter(|cell| *cell == "acc")
            .count();
        assert_eq!(accepts, 1);
    }

    #[test]
    fn shift_beats_reduce_in_conflicted_states() {
        let (grammar, table) = reference_table();
        let encoded = table.encoded(&grammar);
        // State 3 holds E -> T . and T -> T . * F: shift on *, reduce elsewhere.
        assert_eq!(encoded["3"]["*"], "s8");
        assert_eq!(encoded["3"]["+"], "r2");
        assert_eq!(encoded["3"]["$"], "r2");
        // State 2 holds S -> E . and E -> E . + T.
        assert_eq!(encoded["2"]["+"], "s7");
        assert_eq!(encoded["2"]["$"], "r0");
    }

    #[test]
    fn completed_units_reduce_on_every_terminal() {
        let (grammar, table) = reference_table();
        let encoded = table.encoded(&grammar);
        for terminal in ["$", "+", "*", "(", ")", "id"] {
            assert_eq!(encoded["4"][terminal], "r4");
            assert_eq!(encoded["6"][terminal], "r6");
        }
    }

    #[test]
    fn bracket_closing_production_still_reduces() {
        let (grammar, table) = reference_table();
        let encoded = table.encoded(&grammar);
        // F -> ( E ) . completes in the last discovered state; its reduce
        // must not be withheld even though * outranks the bracket.
        assert_eq!(encoded["12"]["$"], "r5");
        assert_eq!(encoded["12"]["*"], "r5");
    }

    #[test]
    fn actions_and_gotos_never_share_a_column() {
        let (grammar, table) = reference_table();
        for state in 0..table.state_count() {
            for t in grammar.terminals() {
                assert_eq!(table.goto(state, t), None);
            }
            for n in grammar.nonterminals() {
                assert_eq!(table.action(state, n), None);
            }
        }
    }

    #[test]
    fn operator_ending_production_is_suppressed() {
        // A production ending in + must yield to the higher-precedence *.
        let mut grammar = GrammarSpec::new();
        grammar.add_production("S", &["A"]);
        grammar.add_production("A", &["a", "+"]);
        grammar.add_production("A", &["a", "*"]);
        let suppressed = reduce_suppressed(
            &grammar,
            &grammar.productions()[1],
            &grammar.terminals(),
        );
        let kept = reduce_suppressed(
            &grammar,
            &grammar.productions()[2],
            &grammar.terminals(),
        );
        assert!(suppressed);
        assert!(!kept);
    }

    #[test]
    fn build_is_idempotent() {
        let grammar = GrammarSpec::arithmetic();
        let automaton = Automaton::build(&grammar).unwrap();
        let once = ParseTable::build(&grammar, &automaton);
        let twice = ParseTable::build(&grammar, &automaton);
        assert_eq!(once, twice);
        assert_eq!(once.encoded(&grammar), twice.encoded(&grammar));
    }
}
