//! Parsing Blueprint source into a [`SyntaxTree`]
//!
//! All entry points return the tree together with every error found. A non-empty error
//! list means the tree is best-effort: fine for diagnostics, not for semantic use.
//!
//! - [`parse`]: syntax only; variable references stay unevaluated.
//! - [`parse_and_eval`]: also resolves variables and computes `+` and `+=`.
//! - [`parse_with_config`]: explicit [`ParseConfig`] (evaluation, error threshold,
//!   dangling-comment policy).
//! - [`parse_reader`]: reads the input from any [`Read`] first.
//!
//! Assignments are bound into the caller's [`Scope`], which therefore carries the
//! file's variables afterwards.

mod error;
mod eval;
mod parser;

pub use error::{ParseError, ParseErrorKind};

use crate::bp::ast::{Position, SyntaxTree};
use crate::bp::config::ParseConfig;
use crate::bp::scope::Scope;
use parser::Parser;
use std::io::Read;

/// Parse without evaluating
pub fn parse(filename: &str, source: &str, scope: &mut Scope) -> (SyntaxTree, Vec<ParseError>) {
    parse_with_config(filename, source, scope, ParseConfig::default())
}

/// Parse and evaluate variables and operators
pub fn parse_and_eval(
    filename: &str,
    source: &str,
    scope: &mut Scope,
) -> (SyntaxTree, Vec<ParseError>) {
    parse_with_config(filename, source, scope, ParseConfig::evaluating())
}

pub fn parse_with_config(
    filename: &str,
    source: &str,
    scope: &mut Scope,
    config: ParseConfig,
) -> (SyntaxTree, Vec<ParseError>) {
    Parser::new(filename, source, scope, config).parse()
}

/// Read all of `reader`, then parse it
pub fn parse_reader(
    filename: &str,
    mut reader: impl Read,
    scope: &mut Scope,
    config: ParseConfig,
) -> (SyntaxTree, Vec<ParseError>) {
    let mut source = String::new();
    if let Err(err) = reader.read_to_string(&mut source) {
        let error = ParseError {
            filename: filename.to_string(),
            pos: Position::default(),
            err: ParseErrorKind::Io(err.to_string()),
        };
        return (SyntaxTree::new(filename), vec![error]);
    }
    parse_with_config(filename, &source, scope, config)
}
