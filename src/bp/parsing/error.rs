//! Parse errors
//!
//! Every problem the parser reports about its input is a [`ParseError`]: a message kind
//! plus where it happened. Errors accumulate; the caller receives all of them next to a
//! best-effort tree.

use crate::bp::ast::{Position, Type};
use crate::bp::lexing::LexError;
use crate::bp::scope::ScopeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{filename}:{pos}: {err}")]
pub struct ParseError {
    pub filename: String,
    pub pos: Position,
    pub err: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found}")]
    Unexpected { expected: String, found: String },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("variable {0:?} is not set")]
    UndefinedVariable(String),

    #[error("mismatched type in operator {operator}: {left} != {right}")]
    MismatchedType {
        operator: char,
        left: Type,
        right: Type,
    },

    #[error("operator {operator} not supported on type {ty}")]
    UnsupportedOperator { operator: char, ty: Type },

    #[error("subtraction not supported")]
    SubtractionNotSupported,

    #[error("integer {0} out of range")]
    IntOutOfRange(String),

    #[error("integer overflow in operator +")]
    IntOverflow,

    #[error("modified non-existent variable {0:?} with +=")]
    ModifiedNonExistent(String),

    #[error("modified non-local variable {0:?} with +=")]
    ModifiedNonLocal(String),

    #[error("modified variable {0:?} with += after referencing")]
    ModifiedAfterReference(String),

    #[error("failed to read input: {0}")]
    Io(String),
}

impl ParseErrorKind {
    /// Whether the error is about meaning rather than syntax
    pub fn is_semantic(&self) -> bool {
        !matches!(
            self,
            ParseErrorKind::Lex(_)
                | ParseErrorKind::Unexpected { .. }
                | ParseErrorKind::SubtractionNotSupported
                | ParseErrorKind::Io(_)
        )
    }
}
