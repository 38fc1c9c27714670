//! Per-request analysis engine.
//!
//! An [`Engine`] is an explicit value constructed for one analysis and
//! discarded afterwards; nothing is shared between engines, so concurrent
//! callers simply instantiate their own. [`Engine::analyze`] runs the whole
//! pipeline (tokenize, solve First/Follow, build the canonical collection
//! and the parsing tables, drive the token stream) and collects everything
//! a transport layer needs into a serializable [`AnalysisReport`].

use crate::driver::{self, TraceStep};
use crate::error::EngineError;
use crate::grammar::GrammarSpec;
use crate::items::Automaton;
use crate::lexer::{Lexer, TokenKind};
use crate::sets::FirstFollow;
use crate::table::ParseTable;
use indexmap::IndexMap;
use serde::Serialize;
use smartstring::alias::String;

/// A token as exposed to callers: the stable kind tag plus the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenOut {
    /// Token kind tag (`IDENTIFIER`, `PLUS`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// The matched source text.
    pub value: String,
}

/// The complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Whether the driver accepted the input.
    pub success: bool,
    /// The token sequence, EOF excluded.
    pub tokens: Vec<TokenOut>,
    /// Human-readable verdict label.
    pub verdict: String,
    /// Encoded action/goto table, state id → symbol → cell.
    pub parsing_table: IndexMap<String, IndexMap<String, String>>,
    /// First sets, symbol → sorted terminal list.
    pub first_sets: IndexMap<String, Vec<String>>,
    /// Follow sets, non-terminal → sorted terminal list.
    pub follow_sets: IndexMap<String, Vec<String>>,
    /// The full step trace of the drive.
    pub analysis_steps: Vec<TraceStep>,
}

/// A self-contained analysis engine over one grammar.
#[derive(Debug, Clone)]
pub struct Engine {
    grammar: GrammarSpec,
}

impl Engine {
    /// Creates an engine for the given grammar.
    pub fn new(grammar: GrammarSpec) -> Self {
        Self { grammar }
    }

    /// Creates an engine for the reference arithmetic grammar.
    pub fn with_arithmetic() -> Self {
        Self::new(GrammarSpec::arithmetic())
    }

    /// The grammar this engine analyzes against.
    pub fn grammar(&self) -> &GrammarSpec {
        &self.grammar
    }

    /// Analyzes a source string: tokenizes it, derives sets and tables for
    /// the grammar, and drives the parser over the mapped token stream.
    ///
    /// A rejected input still produces a report (`success == false` with the
    /// partial trace); only lexical errors and table inconsistencies surface
    /// as [`EngineError`]s.
    pub fn analyze(&self, source: &str) -> Result<AnalysisReport, EngineError> {
        let tokens = Lexer::tokenize(source)?;
        log::debug!("tokenized {} tokens", tokens.len());

        let sets = FirstFollow::solve(&self.grammar)?;
        let automaton = Automaton::build(&self.grammar)?;
        let table = ParseTable::build(&self.grammar, &automaton);

        let mapped = driver::map_terminals(&tokens);
        let outcome = driver::drive(&self.grammar, &table, &mapped)?;
        log::debug!(
            "drive finished: accepted={} in {} steps",
            outcome.accepted,
            outcome.steps.len()
        );

        Ok(AnalysisReport {
            success: outcome.accepted,
            tokens: tokens
                .iter()
                .filter(|t| t.kind != TokenKind::Eof)
                .map(|t| TokenOut {
                    kind: t.kind.name().into(),
                    value: t.text.clone(),
                })
                .collect(),
            verdict: if outcome.accepted {
                "analysis succeeded".into()
            } else {
                "analysis failed".into()
            },
            parsing_table: table.encoded(&self.grammar),
            first_sets: sets.first_output(&self.grammar),
            follow_sets: sets.follow_output(&self.grammar),
            analysis_steps: outcome.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_analysis_fills_every_field() {
        let engine = Engine::with_arithmetic();
        let report = engine.analyze("x + y * z").unwrap();
        assert!(report.success);
        assert_eq!(report.verdict, "analysis succeeded");
        assert_eq!(report.tokens.len(), 5);
        assert_eq!(report.tokens[0].kind, "IDENTIFIER");
        assert_eq!(report.tokens[1].kind, "PLUS");
        assert_eq!(report.parsing_table.len(), 13);
        assert!(report.first_sets.contains_key("E"));
        assert!(report.follow_sets.contains_key("F"));
        assert_eq!(
            report.analysis_steps[report.analysis_steps.len() - 1].action,
            "accept"
        );
    }

    #[test]
    fn tokens_exclude_eof() {
        let engine = Engine::with_arithmetic();
        let report = engine.analyze("(a)").unwrap();
        let kinds: Vec<&str> = report.tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["LPAREN", "IDENTIFIER", "RPAREN"]);
    }

    #[test]
    fn rejection_is_a_report_not_an_error() {
        let engine = Engine::with_arithmetic();
        let report = engine.analyze("a + + b").unwrap();
        assert!(!report.success);
        assert_eq!(report.verdict, "analysis failed");
        assert_eq!(
            report.analysis_steps[report.analysis_steps.len() - 1].action,
            "error"
        );
    }

    #[test]
    fn lexical_error_surfaces_as_engine_error() {
        let engine = Engine::with_arithmetic();
        let err = engine.analyze("1.2.3 + x").unwrap_err();
        assert!(matches!(err, EngineError::Lexical { ch: '.', .. }));
    }

    #[test]
    fn analysis_is_idempotent() {
        let engine = Engine::with_arithmetic();
        let first = engine.analyze("(a + b) * c").unwrap();
        let second = engine.analyze("(a + b) * c").unwrap();
        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn report_serializes_with_transport_field_names() {
        let engine = Engine::with_arithmetic();
        let report = engine.analyze("x").unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("success").is_some());
        assert!(value.get("parsing_table").is_some());
        assert!(value.get("first_sets").is_some());
        assert!(value.get("follow_sets").is_some());
        let step = &value["analysis_steps"][0];
        assert!(step.get("stateStack").is_some());
        assert!(step.get("symbolStack").is_some());
        assert!(step.get("input").is_some());
        assert!(step.get("action").is_some());
        let token = &value["tokens"][0];
        assert_eq!(token["type"], "IDENTIFIER");
        assert_eq!(token["value"], "x");
    }

    #[test]
    fn custom_grammar_engine() {
        let mut grammar = GrammarSpec::new();
        grammar.add_production("S", &["id", ";"]);
        let engine = Engine::new(grammar);
        let accepted = engine.analyze("x ;").unwrap();
        assert!(accepted.success);
        let rejected = engine.analyze("x").unwrap();
        assert!(!rejected.success);
    }
}
