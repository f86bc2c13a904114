//! Internal invariant violations
//!
//! These are not user errors: they mean the parser, printer or a mutation helper broke
//! the tree's invariants. Validation functions return them so tests can observe them;
//! everything else turns them into panics.

use super::expression::Type;
use super::node_id::NodeId;
use super::position::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("comment {text:?} at {pos} is attached to {node}, which is not reachable from the tree")]
    DanglingComment {
        node: NodeId,
        text: String,
        pos: Position,
    },

    #[error("{kind} {node} has no source position")]
    MissingPosition { kind: &'static str, node: NodeId },

    #[error("read {read} comments from source but only {placed} ended up in the tree")]
    LostComments { read: usize, placed: usize },

    #[error("expected a list, found {found}")]
    NotAList { found: Type },

    #[error("expected a list of strings, found a {found} element")]
    NotAStringList { found: Type },
}
