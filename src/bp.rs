//! Main module for Blueprint library functionality
//!
//! Data flows one way for parsing and the reverse way for printing:
//!
//!     text -> tokens (lexing) -> SyntaxTree (parsing, with a comment side table)
//!     SyntaxTree + comment table -> text (formats::printer)
//!
//! Scope is threaded through parsing only. Mutation ([sort], [mutation]) works in place
//! on a parsed tree and keeps the comment table consistent with the nodes it points to.

pub mod ast;
pub mod config;
pub mod formats;
pub mod lexing;
pub mod mutation;
pub mod parsing;
pub mod processor;
pub mod scope;
pub mod sort;
pub mod testing;

pub use ast::SyntaxTree;
pub use config::{FormatConfig, ParseConfig};
pub use formats::printer::{print, print_tree, print_with_config};
pub use parsing::{parse, parse_and_eval, parse_reader, parse_with_config, ParseError};
pub use scope::Scope;
