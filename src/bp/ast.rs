//! Syntax tree for Blueprint files
//!
//! Expressions and definitions form an owned tree; comments live beside it in a
//! [`CommentTable`] keyed by [`NodeId`]. See [`tree`] for the invariants a finished tree
//! satisfies.

pub mod comment;
pub mod definition;
pub mod error;
pub mod expression;
pub mod node;
pub mod node_id;
pub mod position;
pub mod tree;

pub use comment::{Comment, CommentKind, CommentPair, CommentTable};
pub use definition::{Assigner, Assignment, Definition, Module};
pub use error::InvariantError;
pub use expression::{
    Bool, Expression, Int64, List, Map, NotEvaluated, Operator, Property, Str, Type, Variable,
};
pub use node::NodeRef;
pub use node_id::NodeId;
pub use position::{Position, SourceLocation};
pub use tree::{DanglingPolicy, Node, SyntaxTree};
