//! Trace-producing shift-reduce driver.
//!
//! The driver simulates the automaton against a terminal-mapped token
//! sequence, keeping a state stack (starting at `[0]`) and a parallel
//! symbol stack (starting at `[$]`) while a cursor walks the
//! `$`-terminated terminal list. Every step, the terminal one included,
//! records the pre-action stacks, the remaining input, and a label for the
//! action taken, so the trace is never empty and always ends in `accept`
//! or `error`.
//!
//! A missing action entry is a normal rejection, reported as a false verdict
//! with the partial trace. A missing goto entry after a reduce indicates an
//! inconsistent table and is surfaced as a hard error. The driver never
//! mutates the tables, so independent runs over the same tables are safely
//! re-entrant.

use crate::error::EngineError;
use crate::grammar::{GrammarSpec, END_MARKER};
use crate::lexer::{Token, TokenKind};
use crate::table::{Action, ParseTable};
use serde::Serialize;
use smartstring::alias::String;

/// Fixed mapping from token kinds to grammar terminals.
///
/// Token kinds without an entry pass through their literal text.
const TERMINAL_MAP: &[(TokenKind, &str)] = &[
    (TokenKind::Identifier, "id"),
    (TokenKind::Integer, "id"),
    (TokenKind::Float, "id"),
    (TokenKind::Plus, "+"),
    (TokenKind::Multiply, "*"),
    (TokenKind::LParen, "("),
    (TokenKind::RParen, ")"),
    (TokenKind::Eof, "$"),
];

/// Maps a token sequence onto grammar terminal names.
pub fn map_terminals(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            TERMINAL_MAP
                .iter()
                .find(|(kind, _)| *kind == token.kind)
                .map(|&(_, terminal)| String::from(terminal))
                .unwrap_or_else(|| token.text.clone())
        })
        .collect()
}

/// One recorded step of the shift-reduce simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    /// State stack before the action, bottom first.
    #[serde(rename = "stateStack")]
    pub state_stack: Vec<usize>,
    /// Symbol stack before the action, bottom first.
    #[serde(rename = "symbolStack")]
    pub symbol_stack: Vec<String>,
    /// Remaining terminal-mapped input, current lookahead first.
    pub input: Vec<String>,
    /// `shift X`, `reduce L -> R`, `accept`, or `error`.
    pub action: String,
}

/// The verdict of a drive together with its full step trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Whether the driver reached the accept action.
    pub accepted: bool,
    /// The recorded steps, ending in `accept` or `error`.
    pub steps: Vec<TraceStep>,
}

/// Runs the shift-reduce simulation over a terminal-mapped input.
///
/// `input` must be terminated by the end marker `$`; terminals unknown to
/// the grammar simply find no action and end the drive with an error step.
pub fn drive(
    grammar: &GrammarSpec,
    table: &ParseTable,
    input: &[String],
) -> Result<ParseOutcome, EngineError> {
    let mut steps: Vec<TraceStep> = Vec::new();
    let mut state_stack: Vec<usize> = vec![0];
    let mut symbol_stack: Vec<String> = vec![END_MARKER.into()];
    let mut pos = 0;

    loop {
        let state = state_stack[state_stack.len() - 1];
        let mut step = TraceStep {
            state_stack: state_stack.clone(),
            symbol_stack: symbol_stack.clone(),
            input: input.get(pos..).unwrap_or_default().to_vec(),
            action: String::new(),
        };
        let action = input
            .get(pos)
            .and_then(|name| grammar.symbol_id(name))
            .and_then(|terminal| table.action(state, terminal));

        match action {
            Some(Action::Shift(target)) => {
                let lookahead = &input[pos];
                log::trace!("shift {:?} -> state {}", lookahead, target);
                step.action = format!("shift {lookahead}").into();
                state_stack.push(target);
                symbol_stack.push(lookahead.clone());
                pos += 1;
            }
            Some(Action::Reduce(index)) => {
                let production = &grammar.productions()[index];
                log::trace!("reduce by {}", grammar.describe(production));
                if state_stack.len() <= production.right.len() {
                    return Err(EngineError::StackUnderflow);
                }
                for _ in 0..production.right.len() {
                    state_stack.pop();
                    symbol_stack.pop();
                }
                let top = state_stack[state_stack.len() - 1];
                let left_name = grammar.name(production.left);
                let target =
                    table
                        .goto(top, production.left)
                        .ok_or_else(|| EngineError::MissingGoto {
                            state: top,
                            symbol: left_name.into(),
                        })?;
                symbol_stack.push(left_name.into());
                state_stack.push(target);
                step.action = format!("reduce {}", grammar.describe(production)).into();
            }
            Some(Action::Accept) => {
                log::trace!("accept");
                step.action = "accept".into();
                steps.push(step);
                return Ok(ParseOutcome {
                    accepted: true,
                    steps,
                });
            }
            None => {
                log::trace!("no action for state {} at position {}", state, pos);
                step.action = "error".into();
                steps.push(step);
                return Ok(ParseOutcome {
                    accepted: false,
                    steps,
                });
            }
        }
        steps.push(step);
    }
}
