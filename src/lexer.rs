//! Lexer module.
//!
//! Converts raw source text into a finite, position-tracked sequence of
//! [`Token`]s. Tokenization is the first stage of the analysis pipeline; the
//! resulting token kinds are later mapped onto grammar terminals and fed to
//! the shift-reduce driver.
//!
//! The lexer is built on the [`logos`] crate. Line and column counters are
//! 1-based; a newline increments the line and resets the column. Whitespace
//! is skipped silently. Recognized categories, in priority order:
//!
//! - digit sequences with at most one decimal point (a second point is a
//!   lexical error at its exact position),
//! - letter/underscore-led identifiers, checked against the keyword table
//!   first,
//! - a fixed set of operator and punctuation tokens, with `==` winning over
//!   `=` by longest match.
//!
//! End of input yields an EOF token indefinitely on repeated calls. Any
//! unrecognized character aborts with [`EngineError::Lexical`].

use crate::error::EngineError;
use logos::Logos;
use smartstring::alias::String;

/// Raw tokens recognized by the `logos`-based scanner.
///
/// `extras` tracks `(line index, byte offset of current line start)` so that
/// 1-based positions can be derived from token spans.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
#[logos(extras = (usize, usize))]
enum RawToken {
    #[regex(r"\n", |lex| {
        lex.extras.0 += 1;
        lex.extras.1 = lex.span().end;
        logos::Skip
    })]
    Newline,

    // Greedy digits-and-dots run; dot count is validated in `next_token` so
    // the second decimal point can be reported at its exact column.
    #[regex(r"[0-9][0-9.]*")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
}

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    Float,
    Identifier,
    If,
    Else,
    While,
    Int,
    Return,
    Plus,
    Minus,
    Multiply,
    Divide,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Assign,
    Equals,
    Eof,
}

/// Reserved words and the token kinds they lex to.
///
/// The `float` keyword shares [`TokenKind::Float`] with fractional numeric
/// literals; both carry the `FLOAT` tag downstream.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("int", TokenKind::Int),
    ("float", TokenKind::Float),
    ("return", TokenKind::Return),
];

impl TokenKind {
    /// Returns the stable string tag used in reports and terminal mapping.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Integer => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Int => "INT",
            TokenKind::Return => "RETURN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Equals => "EQUALS",
            TokenKind::Eof => "EOF",
        }
    }
}

/// A single lexical token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token's category.
    pub kind: TokenKind,
    /// The matched source text (empty for EOF).
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

/// Source-level lexer over an immutable input buffer.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, RawToken>,
    exhausted: bool,
}

impl<'source> Lexer<'source> {
    /// Creates a new [`Lexer`] over the given source text.
    pub fn new(input: &'source str) -> Self {
        Self {
            inner: RawToken::lexer(input),
            exhausted: false,
        }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let (line, line_start) = self.inner.extras;
        (line + 1, offset - line_start + 1)
    }

    fn eof_token(&self) -> Token {
        let (line, column) = self.position(self.inner.source().len());
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
            column,
        }
    }

    /// Consumes and returns exactly one token.
    ///
    /// Once the input is exhausted, every further call returns an EOF token.
    pub fn next_token(&mut self) -> Result<Token, EngineError> {
        if self.exhausted {
            return Ok(self.eof_token());
        }
        let Some(raw) = self.inner.next() else {
            self.exhausted = true;
            return Ok(self.eof_token());
        };
        let slice = self.inner.slice();
        let (line, column) = self.position(self.inner.span().start);
        let kind = match raw {
            Err(()) => {
                let ch = match slice.chars().next() {
                    Some(c) => c,
                    None => unreachable!(),
                };
                return Err(EngineError::Lexical { ch, line, column });
            }
            Ok(RawToken::Number) => {
                if let Some(extra) = second_dot(slice) {
                    return Err(EngineError::Lexical {
                        ch: '.',
                        line,
                        column: column + extra,
                    });
                }
                if slice.contains('.') {
                    TokenKind::Float
                } else {
                    TokenKind::Integer
                }
            }
            Ok(RawToken::Ident) => KEYWORDS
                .iter()
                .find(|(word, _)| *word == slice)
                .map(|&(_, kind)| kind)
                .unwrap_or(TokenKind::Identifier),
            Ok(RawToken::EqEq) => TokenKind::Equals,
            Ok(RawToken::Eq) => TokenKind::Assign,
            Ok(RawToken::Plus) => TokenKind::Plus,
            Ok(RawToken::Minus) => TokenKind::Minus,
            Ok(RawToken::Star) => TokenKind::Multiply,
            Ok(RawToken::Slash) => TokenKind::Divide,
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::LBrace) => TokenKind::LBrace,
            Ok(RawToken::RBrace) => TokenKind::RBrace,
            Ok(RawToken::Semi) => TokenKind::Semicolon,
            Ok(RawToken::Newline) => unreachable!(),
        };
        Ok(Token {
            kind,
            text: slice.into(),
            line,
            column,
        })
    }

    /// Tokenizes the entire input, up to and including the first EOF token.
    pub fn tokenize(input: &'source str) -> Result<Vec<Token>, EngineError> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            out.push(token);
            if done {
                return Ok(out);
            }
        }
    }
}

/// Byte offset of the second `.` in a numeric slice, if any.
fn second_dot(text: &str) -> Option<usize> {
    text.match_indices('.').nth(1).map(|(offset, _)| offset)
}
