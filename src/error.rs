//! Error types shared across the analysis engine.
//!
//! Lexical errors and table inconsistencies are the only hard failures the
//! engine produces; a parse that merely rejects its input is *not* an error
//! (the driver reports it as a false verdict with a trace instead).

use smartstring::alias::String;
use thiserror::Error;

/// Errors produced by the grammar analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An illegal character was encountered during tokenization.
    ///
    /// Positions are 1-based. Tokenization aborts at the first offending
    /// character; there is no recovery or resynchronization.
    #[error("illegal character {ch:?} at {line}:{column}")]
    Lexical {
        /// The offending character.
        ch: char,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
    },

    /// A reduce step required a goto transition the goto table does not hold.
    ///
    /// This indicates an inconsistent parsing table and is unrecoverable.
    #[error("no goto entry for state {state} on {symbol:?}")]
    MissingGoto {
        /// State on top of the stack after popping the handle.
        state: usize,
        /// The non-terminal the goto was attempted on.
        symbol: String,
    },

    /// A reduce popped more stack entries than were available.
    #[error("parse stack underflow during reduce")]
    StackUnderflow,

    /// Set or state computation was asked for on a grammar with no productions.
    #[error("grammar has no productions")]
    EmptyGrammar,

    /// A textual rule list could not be parsed.
    #[error("malformed grammar text: {message}")]
    GrammarText {
        /// Human-readable description of the failure.
        message: String,
    },

    /// A convergence loop exceeded its defensive pass limit.
    #[error("{stage} did not converge within {limit} passes")]
    IterationCap {
        /// Which computation overran.
        stage: &'static str,
        /// The pass limit that was hit.
        limit: usize,
    },
}
