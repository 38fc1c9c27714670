//! # lrtrace
//!
//! A grammar analysis engine: given a context-free grammar and a source
//! string, it tokenizes the string, derives First/Follow sets, builds the
//! canonical collection of LR(0) item sets, constructs a shift-reduce
//! parsing table, and drives that table against the token stream while
//! recording every stack/action step for inspection.
//!
//! ## Overview
//!
//! - [`lexer`] — position-tracked tokenization of source text.
//! - [`grammar`] — [`GrammarSpec`]: productions, symbol interning, and
//!   terminal/non-terminal classification.
//! - [`sets`] — First/Follow fixpoint computation.
//! - [`items`] — LR(0) items, closure/goto, and the canonical collection.
//! - [`table`] — action/goto table construction with the operator-precedence
//!   reduce filter.
//! - [`driver`] — the trace-producing shift-reduce simulation.
//! - [`engine`] — a per-request [`Engine`] tying the stages together into a
//!   serializable [`AnalysisReport`].
//!
//! ## Example
//!
//! ```rust
//! use lrtrace::Engine;
//!
//! let engine = Engine::with_arithmetic();
//! let report = engine.analyze("(a + b) * c").unwrap();
//! assert!(report.success);
//! assert_eq!(report.analysis_steps.last().unwrap().action, "accept");
//! ```
//!
//! Parse rejection is a normal outcome (`success == false` plus the partial
//! trace); only lexical errors and table inconsistencies are [`EngineError`]s.

pub mod driver;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod items;
pub mod lexer;
pub mod sets;
pub mod table;

pub use driver::{drive, map_terminals, ParseOutcome, TraceStep};
pub use engine::{AnalysisReport, Engine, TokenOut};
pub use error::EngineError;
pub use grammar::{GrammarSpec, Production, SymbolId, END_MARKER, EPSILON};
pub use items::{closure, goto, Automaton, Item, ItemSet};
pub use lexer::{Lexer, Token, TokenKind};
pub use sets::{first_sets, follow_sets, FirstFollow};
pub use table::{Action, ParseTable};
