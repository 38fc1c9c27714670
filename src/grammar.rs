//! Grammar specification module.
//!
//! [`GrammarSpec`] holds an ordered, indexed list of productions and
//! classifies every symbol it has seen as terminal or non-terminal.
//! Classification is decided by registration, not by spelling: a symbol
//! becomes (and stays) a non-terminal the moment it appears as a production's
//! left side; every other referenced symbol is a terminal. The end marker `$`
//! is always part of the terminal set, and the reserved empty-derivation
//! marker `ε` is neither terminal nor non-terminal.
//!
//! Symbols are interned into dense ids so that downstream set and table
//! computations can run over indexed arrays; interning order is the iteration
//! order everywhere, which keeps all derived outputs deterministic for a
//! fixed production declaration order.
//!
//! The module also parses a small textual rule notation (one
//! `Lhs -> sym sym ...` per line, `--` comments, blank lines ignored) via a
//! [`logos`] scanner and a [`chumsky`] parser.

use crate::error::EngineError;
use chumsky::prelude::*;
use indexmap::IndexSet;
use logos::Logos;
use smartstring::alias::String;

/// The end-of-input marker terminal.
pub const END_MARKER: &str = "$";

/// The reserved marker for an empty (epsilon) derivation.
pub const EPSILON: &str = "ε";

/// Dense index of an interned grammar symbol.
pub type SymbolId = usize;

/// A single production rule, `left -> right`.
///
/// Productions are ordered and indexed; the index is the identity used by
/// reduce actions in the parsing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// Left-side non-terminal.
    pub left: SymbolId,
    /// Right-side symbol sequence. Never literally empty: an empty
    /// derivation is spelled with the explicit `ε` marker.
    pub right: Vec<SymbolId>,
}

/// An ordered set of productions with append-only symbol classification.
#[derive(Debug, Clone)]
pub struct GrammarSpec {
    symbols: IndexSet<String>,
    lhs_flag: Vec<bool>,
    productions: Vec<Production>,
}

impl GrammarSpec {
    /// Creates an empty grammar. The end marker `$` is registered up front,
    /// as symbol id 0.
    pub fn new() -> Self {
        let mut spec = Self {
            symbols: IndexSet::new(),
            lhs_flag: Vec::new(),
            productions: Vec::new(),
        };
        spec.intern(END_MARKER);
        spec
    }

    fn intern(&mut self, name: &str) -> SymbolId {
        let (id, fresh) = self.symbols.insert_full(name.into());
        if fresh {
            self.lhs_flag.push(false);
        }
        id
    }

    /// Appends a production and updates symbol classification.
    ///
    /// `left` is registered as a non-terminal; right-side symbols not already
    /// known as non-terminals default to terminal. The classification is
    /// stable: once a symbol has been a left side it stays a non-terminal,
    /// even when later referenced on a right side.
    pub fn add_production(&mut self, left: &str, right: &[&str]) {
        let left_id = self.intern(left);
        self.lhs_flag[left_id] = true;
        let right_ids = right.iter().map(|name| self.intern(name)).collect();
        self.productions.push(Production {
            left: left_id,
            right: right_ids,
        });
    }

    /// Number of interned symbols (including `$`).
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The name of a symbol id.
    pub fn name(&self, id: SymbolId) -> &str {
        self.symbols.get_index(id).map(|s| s.as_str()).unwrap_or("?")
    }

    /// Looks up the id of a symbol name.
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get_index_of(name)
    }

    /// The id of the end marker `$`. Interned first, so always 0.
    pub fn end_marker(&self) -> SymbolId {
        0
    }

    /// The id of the `ε` marker, if the grammar references it.
    pub fn epsilon_id(&self) -> Option<SymbolId> {
        self.symbol_id(EPSILON)
    }

    /// True if `id` has appeared as a production's left side.
    pub fn is_nonterminal(&self, id: SymbolId) -> bool {
        self.lhs_flag.get(id).copied().unwrap_or(false)
    }

    /// True if `id` was never a left side and is not the `ε` marker.
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id < self.symbol_count() && !self.is_nonterminal(id) && self.name(id) != EPSILON
    }

    /// Terminal ids in interning order. Always contains the end marker.
    pub fn terminals(&self) -> Vec<SymbolId> {
        (0..self.symbol_count())
            .filter(|&id| self.is_terminal(id))
            .collect()
    }

    /// Non-terminal ids in interning order.
    pub fn nonterminals(&self) -> Vec<SymbolId> {
        (0..self.symbol_count())
            .filter(|&id| self.is_nonterminal(id))
            .collect()
    }

    /// The declared productions, in order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The start symbol: the left side of the first production.
    pub fn start_symbol(&self) -> Result<SymbolId, EngineError> {
        self.productions
            .first()
            .map(|p| p.left)
            .ok_or(EngineError::EmptyGrammar)
    }

    /// Renders a production as `L -> r1 r2 ...`.
    pub fn describe(&self, production: &Production) -> String {
        let mut out = String::from(self.name(production.left));
        out.push_str(" ->");
        for &sym in &production.right {
            out.push(' ');
            out.push_str(self.name(sym));
        }
        out
    }

    /// Builds the reference arithmetic expression grammar.
    pub fn arithmetic() -> Self {
        let mut spec = Self::new();
        spec.add_production("S", &["E"]);
        spec.add_production("E", &["E", "+", "T"]);
        spec.add_production("E", &["T"]);
        spec.add_production("T", &["T", "*", "F"]);
        spec.add_production("T", &["F"]);
        spec.add_production("F", &["(", "E", ")"]);
        spec.add_production("F", &["id"]);
        spec
    }

    /// Parses a textual rule list into a grammar.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let tokens = rule_tokens(text)?;
        let rules = rules_parser()
            .parse(&tokens)
            .into_result()
            .map_err(|errs| EngineError::GrammarText {
                message: format!("{} syntax error(s) in rule list", errs.len()).into(),
            })?;
        if rules.is_empty() {
            return Err(EngineError::EmptyGrammar);
        }
        let mut spec = Self::new();
        for (left, right) in &rules {
            let right_refs: Vec<&str> = right.iter().map(|s| s.as_str()).collect();
            spec.add_production(left, &right_refs);
        }
        Ok(spec)
    }
}

impl Default for GrammarSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw tokens of the rule notation.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
enum RuleToken {
    /// Line break, marking a rule boundary.
    #[regex(r"\n")]
    LineFeed,

    /// A comment line beginning with `--`, ignored.
    #[regex(r"--[^\n]*", priority = 3)]
    Comment,

    /// The production separator symbol.
    #[token("->")]
    Arrow,

    /// Any other whitespace-delimited word: a grammar symbol.
    #[regex(r"[^ \t\f\r\n]+", |lex| String::from(lex.slice()), priority = 1)]
    Name(String),
}

fn rule_tokens(text: &str) -> Result<Vec<RuleToken>, EngineError> {
    let mut tokens = Vec::new();
    let mut line = 1usize;
    for raw in RuleToken::lexer(text) {
        match raw {
            Ok(RuleToken::Comment) => continue,
            Ok(RuleToken::LineFeed) => {
                line += 1;
                tokens.push(RuleToken::LineFeed);
            }
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(EngineError::GrammarText {
                    message: format!("unrecognized input at line {line}").into(),
                });
            }
        }
    }
    // Terminate the last rule when the text lacks a trailing newline.
    tokens.push(RuleToken::LineFeed);
    Ok(tokens)
}

type RawRule = (String, Vec<String>);

fn rules_parser<'a>() -> impl Parser<'a, &'a [RuleToken], Vec<RawRule>> {
    let name = select! {
        RuleToken::Name(s) => s,
    }
    .labelled("symbol");

    let arrow = select! { RuleToken::Arrow => () }.labelled("arrow");
    let lf = select! { RuleToken::LineFeed => () }.labelled("line feed");

    let rule = name
        .clone()
        .then_ignore(arrow)
        .then(name.repeated().collect::<Vec<_>>())
        .then_ignore(lf.clone())
        .map(|(left, right)| Some((left, right)));

    let blank = lf.map(|_| None);

    rule.or(blank)
        .repeated()
        .collect::<Vec<_>>()
        .map(|rules| rules.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_marker_is_always_a_terminal() {
        let spec = GrammarSpec::new();
        assert_eq!(spec.end_marker(), 0);
        assert!(spec.is_terminal(spec.end_marker()));
        assert_eq!(spec.terminals(), vec![0]);
    }

    #[test]
    fn classification_follows_left_sides() {
        let mut spec = GrammarSpec::new();
        spec.add_production("S", &["a", "B"]);
        spec.add_production("B", &["b"]);
        let s = spec.symbol_id("S").unwrap();
        let a = spec.symbol_id("a").unwrap();
        let b_upper = spec.symbol_id("B").unwrap();
        let b = spec.symbol_id("b").unwrap();
        assert!(spec.is_nonterminal(s));
        assert!(spec.is_nonterminal(b_upper));
        assert!(spec.is_terminal(a));
        assert!(spec.is_terminal(b));
    }

    #[test]
    fn classification_is_stable_once_a_left_side() {
        let mut spec = GrammarSpec::new();
        spec.add_production("A", &["x"]);
        spec.add_production("S", &["A", "A"]);
        let a = spec.symbol_id("A").unwrap();
        assert!(spec.is_nonterminal(a));
        assert!(!spec.is_terminal(a));
    }

    #[test]
    fn epsilon_is_neither_terminal_nor_nonterminal() {
        let mut spec = GrammarSpec::new();
        spec.add_production("S", &[EPSILON]);
        let eps = spec.epsilon_id().unwrap();
        assert!(!spec.is_terminal(eps));
        assert!(!spec.is_nonterminal(eps));
        assert!(!spec.terminals().contains(&eps));
    }

    #[test]
    fn arithmetic_grammar_shape() {
        let spec = GrammarSpec::arithmetic();
        assert_eq!(spec.productions().len(), 7);
        assert_eq!(spec.name(spec.start_symbol().unwrap()), "S");
        let terminal_names: Vec<&str> =
            spec.terminals().into_iter().map(|id| spec.name(id)).collect();
        assert_eq!(terminal_names, vec!["$", "+", "*", "(", ")", "id"]);
        let nonterminal_names: Vec<&str> = spec
            .nonterminals()
            .into_iter()
            .map(|id| spec.name(id))
            .collect();
        assert_eq!(nonterminal_names, vec!["S", "E", "T", "F"]);
    }

    #[test]
    fn describe_renders_production() {
        let spec = GrammarSpec::arithmetic();
        assert_eq!(spec.describe(&spec.productions()[1]), "E -> E + T");
        assert_eq!(spec.describe(&spec.productions()[5]), "F -> ( E )");
    }

    #[test]
    fn empty_grammar_has_no_start_symbol() {
        let spec = GrammarSpec::new();
        assert_eq!(spec.start_symbol(), Err(EngineError::EmptyGrammar));
    }

    #[test]
    fn parse_rule_text_matches_programmatic_build() {
        let text = "\
-- arithmetic expressions
S -> E
E -> E + T
E -> T
T -> T * F
T -> F
F -> ( E )
F -> id";
        let parsed = GrammarSpec::parse(text).unwrap();
        let built = GrammarSpec::arithmetic();
        assert_eq!(parsed.productions(), built.productions());
        assert_eq!(parsed.terminals(), built.terminals());
        assert_eq!(parsed.nonterminals(), built.nonterminals());
    }

    #[test]
    fn parse_skips_blank_lines_and_comments() {
        let text = "\n-- only a comment\n\nS -> a\n\n";
        let parsed = GrammarSpec::parse(text).unwrap();
        assert_eq!(parsed.productions().len(), 1);
    }

    #[test]
    fn parse_rejects_rule_without_arrow() {
        let err = GrammarSpec::parse("S E +\n").unwrap_err();
        assert!(matches!(err, EngineError::GrammarText { .. }));
    }

    #[test]
    fn parse_rejects_empty_text() {
        let err = GrammarSpec::parse("\n\n").unwrap_err();
        assert_eq!(err, EngineError::EmptyGrammar);
    }
}
