//! Tokenization for Blueprint source
//!
//! [`tokenize`] is the raw logos pass (tokens with byte spans). [`Scanner`] is what the
//! parser consumes: it converts spans into [`Position`]s and reports how many line
//! breaks separate each token from the previous one, which drives comment attachment
//! and blank-line preservation.

pub mod strings;
pub mod tokens;

pub use tokens::{LexError, Token};

use crate::bp::ast::{Position, SourceLocation};
use logos::Logos;
use std::ops::Range;

/// Tokenize source into tokens with their byte spans
pub fn tokenize(source: &str) -> Vec<(Result<Token, LexError>, Range<usize>)> {
    Token::lexer(source).spanned().collect()
}

/// One token as seen by the parser; `token` is `None` at end of input
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Option<Token>,
    pub pos: Position,
    pub end: Position,
    /// Line breaks between the end of the previous token and the start of this one
    pub newlines_before: usize,
}

/// A failed token, with where it started
#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    pub pos: Position,
    pub error: LexError,
}

/// Positioned token stream over one source text
pub struct Scanner<'a> {
    source: &'a str,
    lexer: logos::Lexer<'a, Token>,
    location: SourceLocation<'a>,
    prev_end: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: Token::lexer(source),
            location: SourceLocation::new(source),
            prev_end: 0,
            done: false,
        }
    }

    /// The next token, or a lexing error for the next malformed one
    ///
    /// Returns an end-of-input lexeme (with `token: None`) forever once input is
    /// exhausted.
    pub fn next_lexeme(&mut self) -> Result<Lexeme, ScanError> {
        if self.done {
            return Ok(self.eof());
        }
        match self.lexer.next() {
            None => {
                self.done = true;
                let eof = self.eof();
                self.prev_end = self.source.len();
                Ok(eof)
            }
            Some(result) => {
                let span = self.lexer.span();
                let newlines_before = self.count_newlines(self.prev_end, span.start);
                self.prev_end = span.end;
                let pos = self.location.position(span.start);
                match result {
                    Ok(token) => Ok(Lexeme {
                        token: Some(token),
                        pos,
                        end: self.location.position(span.end),
                        newlines_before,
                    }),
                    Err(error) => Err(ScanError { pos, error }),
                }
            }
        }
    }

    fn eof(&self) -> Lexeme {
        let pos = self.location.position(self.source.len());
        Lexeme {
            token: None,
            pos,
            end: pos,
            newlines_before: self.count_newlines(self.prev_end, self.source.len()),
        }
    }

    fn count_newlines(&self, from: usize, to: usize) -> usize {
        self.source
            .get(from..to)
            .map_or(0, |gap| gap.bytes().filter(|b| *b == b'\n').count())
    }
}
